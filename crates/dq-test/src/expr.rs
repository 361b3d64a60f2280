//! Predicate expression tree
//!
//! Rule templates build violation predicates as [`Expr`] values instead of
//! SQL strings. Rendering validates every column reference against the
//! identifier allow-list, escapes string literals and picks the function
//! spelling for the target [`Dialect`].

use crate::error::CompileResult;
use dq_core::sql_utils::{escape_sql_string, safe_ident};
use dq_core::Dialect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn as_sql(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// A boolean or scalar SQL expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Column reference, rendered as a quoted identifier
    Column(String),
    Int(i64),
    Str(String),
    Bool(bool),
    /// `CURRENT_DATE` shifted by a number of days (0 is today)
    DateOffset(i32),
    /// Character length of a string expression
    Length(Box<Expr>),
    Trim(Box<Expr>),
    /// Date rendered as a `YYYYMMDD` integer
    DateKey(Box<Expr>),
    Compare {
        left: Box<Expr>,
        op: CmpOp,
        right: Box<Expr>,
    },
    IsNull(Box<Expr>),
    IsNotNull(Box<Expr>),
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    /// Whole-value regular expression match
    RegexFullMatch { expr: Box<Expr>, pattern: String },
    /// Value parses as JSON
    JsonParseable(Box<Expr>),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub fn col(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    pub fn int(value: i64) -> Self {
        Expr::Int(value)
    }

    pub fn str(value: impl Into<String>) -> Self {
        Expr::Str(value.into())
    }

    pub fn current_date() -> Self {
        Expr::DateOffset(0)
    }

    pub fn days_ago(days: u32) -> Self {
        Expr::DateOffset(-(days.min(i32::MAX as u32) as i32))
    }

    pub fn days_ahead(days: u32) -> Self {
        Expr::DateOffset(days.min(i32::MAX as u32) as i32)
    }

    pub fn and(items: Vec<Expr>) -> Self {
        Expr::And(items)
    }

    pub fn or(items: Vec<Expr>) -> Self {
        Expr::Or(items)
    }

    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    fn compare(self, op: CmpOp, right: Expr) -> Self {
        Expr::Compare {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    pub fn equals(self, right: Expr) -> Self {
        self.compare(CmpOp::Eq, right)
    }

    pub fn not_equals(self, right: Expr) -> Self {
        self.compare(CmpOp::Ne, right)
    }

    pub fn less_than(self, right: Expr) -> Self {
        self.compare(CmpOp::Lt, right)
    }

    pub fn at_most(self, right: Expr) -> Self {
        self.compare(CmpOp::Le, right)
    }

    pub fn greater_than(self, right: Expr) -> Self {
        self.compare(CmpOp::Gt, right)
    }

    pub fn at_least(self, right: Expr) -> Self {
        self.compare(CmpOp::Ge, right)
    }

    pub fn is_null(self) -> Self {
        Expr::IsNull(Box::new(self))
    }

    pub fn is_not_null(self) -> Self {
        Expr::IsNotNull(Box::new(self))
    }

    pub fn not_in(self, list: Vec<Expr>) -> Self {
        Expr::InList {
            expr: Box::new(self),
            list,
            negated: true,
        }
    }

    pub fn length(self) -> Self {
        Expr::Length(Box::new(self))
    }

    pub fn trim(self) -> Self {
        Expr::Trim(Box::new(self))
    }

    pub fn date_key(self) -> Self {
        Expr::DateKey(Box::new(self))
    }

    pub fn full_match(self, pattern: impl Into<String>) -> Self {
        Expr::RegexFullMatch {
            expr: Box::new(self),
            pattern: pattern.into(),
        }
    }

    pub fn json_parseable(self) -> Self {
        Expr::JsonParseable(Box::new(self))
    }

    /// Column names referenced anywhere in the expression
    pub fn columns(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Column(name) => {
                out.insert(name.clone());
            }
            Expr::Int(_) | Expr::Str(_) | Expr::Bool(_) | Expr::DateOffset(_) => {}
            Expr::Length(e)
            | Expr::Trim(e)
            | Expr::DateKey(e)
            | Expr::IsNull(e)
            | Expr::IsNotNull(e)
            | Expr::JsonParseable(e)
            | Expr::Not(e) => e.collect_columns(out),
            Expr::RegexFullMatch { expr, .. } => expr.collect_columns(out),
            Expr::Compare { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::InList { expr, list, .. } => {
                expr.collect_columns(out);
                for item in list {
                    item.collect_columns(out);
                }
            }
            Expr::And(items) | Expr::Or(items) => {
                for item in items {
                    item.collect_columns(out);
                }
            }
        }
    }

    /// Render the expression as SQL for `dialect`
    ///
    /// Fails if a column name does not pass the identifier allow-list.
    pub fn render(&self, dialect: Dialect) -> CompileResult<String> {
        let sql = match self {
            Expr::Column(name) => safe_ident(name)?,
            Expr::Int(value) => value.to_string(),
            Expr::Str(value) => format!("'{}'", escape_sql_string(value)),
            Expr::Bool(true) => "TRUE".to_string(),
            Expr::Bool(false) => "FALSE".to_string(),
            Expr::DateOffset(0) => today(dialect).to_string(),
            Expr::DateOffset(days) if *days < 0 => {
                format!("{} - INTERVAL '{} DAY'", today(dialect), days.unsigned_abs())
            }
            Expr::DateOffset(days) => format!("{} + INTERVAL '{days} DAY'", today(dialect)),
            Expr::Length(e) => {
                let inner = e.render(dialect)?;
                match dialect {
                    Dialect::DuckDb => format!("length({inner})"),
                    Dialect::Snowflake => format!("LEN({inner})"),
                }
            }
            Expr::Trim(e) => format!("TRIM({})", e.render(dialect)?),
            Expr::DateKey(e) => {
                let inner = e.render(dialect)?;
                match dialect {
                    Dialect::DuckDb => format!("CAST(strftime({inner}, '%Y%m%d') AS BIGINT)"),
                    Dialect::Snowflake => format!("TO_NUMBER(TO_CHAR({inner}, 'YYYYMMDD'))"),
                }
            }
            Expr::Compare { left, op, right } => format!(
                "{} {} {}",
                left.render_operand(dialect)?,
                op.as_sql(),
                right.render_operand(dialect)?
            ),
            Expr::IsNull(e) => format!("{} IS NULL", e.render_operand(dialect)?),
            Expr::IsNotNull(e) => format!("{} IS NOT NULL", e.render_operand(dialect)?),
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                let items = list
                    .iter()
                    .map(|item| item.render(dialect))
                    .collect::<CompileResult<Vec<_>>>()?;
                let keyword = if *negated { "NOT IN" } else { "IN" };
                format!(
                    "{} {keyword} ({})",
                    expr.render_operand(dialect)?,
                    items.join(", ")
                )
            }
            Expr::RegexFullMatch { expr, pattern } => {
                let inner = expr.render(dialect)?;
                let pattern = escape_sql_string(pattern);
                match dialect {
                    Dialect::DuckDb => format!("regexp_full_match({inner}, '{pattern}')"),
                    Dialect::Snowflake => format!("REGEXP_LIKE({inner}, '{pattern}')"),
                }
            }
            Expr::JsonParseable(e) => {
                let inner = e.render(dialect)?;
                match dialect {
                    Dialect::DuckDb => format!("json_valid({inner})"),
                    Dialect::Snowflake => format!("(TRY_PARSE_JSON({inner}) IS NOT NULL)"),
                }
            }
            Expr::Not(e) => format!("NOT ({})", e.render(dialect)?),
            Expr::And(items) => render_junction(items, "AND", dialect)?,
            Expr::Or(items) => render_junction(items, "OR", dialect)?,
        };
        Ok(sql)
    }

    /// Render as the operand of a comparison or postfix test, parenthesizing
    /// anything that is itself a predicate or arithmetic on dates.
    fn render_operand(&self, dialect: Dialect) -> CompileResult<String> {
        let sql = self.render(dialect)?;
        if self.needs_parens() {
            Ok(format!("({sql})"))
        } else {
            Ok(sql)
        }
    }

    fn needs_parens(&self) -> bool {
        match self {
            Expr::DateOffset(days) => *days != 0,
            Expr::Compare { .. }
            | Expr::IsNull(_)
            | Expr::IsNotNull(_)
            | Expr::InList { .. }
            | Expr::And(_)
            | Expr::Or(_) => true,
            _ => false,
        }
    }
}

fn render_junction(items: &[Expr], keyword: &str, dialect: Dialect) -> CompileResult<String> {
    match items {
        [] => Ok(if keyword == "AND" { "TRUE" } else { "FALSE" }.to_string()),
        [single] => single.render(dialect),
        _ => {
            let parts = items
                .iter()
                .map(|item| match item {
                    Expr::And(_) | Expr::Or(_) if item_len(item) > 1 => {
                        item.render(dialect).map(|sql| format!("({sql})"))
                    }
                    _ => item.render(dialect),
                })
                .collect::<CompileResult<Vec<_>>>()?;
            Ok(parts.join(&format!(" {keyword} ")))
        }
    }
}

fn item_len(expr: &Expr) -> usize {
    match expr {
        Expr::And(items) | Expr::Or(items) => items.len(),
        _ => 1,
    }
}

/// Today's date in `dialect`
///
/// DuckDB resolves `CURRENT_DATE` through the `icu` extension, which an
/// offline host cannot autoload. The transaction timestamp cast down to a
/// DATE needs only built-in functions.
fn today(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::DuckDb => "CAST(CAST(get_current_timestamp() AS TIMESTAMP) AS DATE)",
        Dialect::Snowflake => "CURRENT_DATE",
    }
}

#[cfg(test)]
#[path = "expr_test.rs"]
mod tests;
