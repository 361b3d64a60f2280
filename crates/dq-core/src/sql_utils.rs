//! SQL identifier quoting and validation utilities
//!
//! Identifiers cannot be bound as query parameters, so every table and column
//! name that ends up in generated SQL goes through [`validate_identifier`]
//! before it is quoted with [`quote_ident`].

use crate::error::{CoreError, CoreResult};

/// Maximum identifier length accepted by the allow-list.
pub const MAX_IDENTIFIER_LEN: usize = 255;

/// Quote a SQL identifier to prevent injection.
///
/// Wraps the identifier in double quotes and escapes any embedded double quotes
/// by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use dq_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("USERS"), r#""USERS""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Check an identifier against the allow-list: ASCII letters, digits, `_`
/// and `$`, non-empty and at most [`MAX_IDENTIFIER_LEN`] characters.
pub fn validate_identifier(ident: &str) -> CoreResult<()> {
    if ident.is_empty() {
        return Err(CoreError::InvalidIdentifier {
            ident: ident.to_string(),
            reason: "identifier is empty".to_string(),
        });
    }
    if ident.len() > MAX_IDENTIFIER_LEN {
        return Err(CoreError::InvalidIdentifier {
            ident: ident.to_string(),
            reason: format!("longer than {MAX_IDENTIFIER_LEN} characters"),
        });
    }
    if let Some(bad) = ident
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '$'))
    {
        return Err(CoreError::InvalidIdentifier {
            ident: ident.to_string(),
            reason: format!("character {bad:?} is not allowed"),
        });
    }
    Ok(())
}

/// Validate then quote an identifier.
pub fn safe_ident(ident: &str) -> CoreResult<String> {
    validate_identifier(ident)?;
    Ok(quote_ident(ident))
}

#[cfg(test)]
#[path = "sql_utils_test.rs"]
mod tests;
