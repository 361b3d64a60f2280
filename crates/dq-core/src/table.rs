//! Table and column descriptors

use crate::error::{CoreError, CoreResult};
use crate::sql_utils::safe_ident;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Three-part table identifier (`database.schema.table`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    /// Database name
    pub database: String,

    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,
}

impl QualifiedName {
    /// Create a qualified name from its parts
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Render as a delimited SQL identifier, validating each part.
    pub fn to_sql(&self) -> CoreResult<String> {
        Ok(format!(
            "{}.{}.{}",
            safe_ident(&self.database)?,
            safe_ident(&self.schema)?,
            safe_ident(&self.table)?
        ))
    }

    /// Case-insensitive substring test against the full dotted name
    pub fn contains_marker(&self, marker: &str) -> bool {
        self.to_string()
            .to_uppercase()
            .contains(&marker.to_uppercase())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}

impl FromStr for QualifiedName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [db, schema, table] if !db.is_empty() && !schema.is_empty() && !table.is_empty() => {
                Ok(Self::new(*db, *schema, *table))
            }
            _ => Err(CoreError::InvalidQualifiedName {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.to_string()
    }
}

/// A column as reported by the warehouse: name plus free-form type string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name, in the case the warehouse reports it
    pub name: String,

    /// Declared type, e.g. `NUMBER(38,0)`, `VARCHAR`, `TIMESTAMP_NTZ`
    pub declared_type: String,
}

impl ColumnDescriptor {
    /// Create a column descriptor
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }

    /// Uppercased column name used for convention matching
    pub fn upper_name(&self) -> String {
        self.name.to_uppercase()
    }

    /// Uppercased declared type used for type matching
    pub fn upper_type(&self) -> String {
        self.declared_type.to_uppercase()
    }

    /// Whether the declared type is a date or timestamp type
    pub fn is_temporal(&self) -> bool {
        let ty = self.upper_type();
        ty.contains("DATE") || ty.contains("TIMESTAMP")
    }
}

/// Everything the rule synthesizer needs to know about one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Three-part table name
    pub qualified_name: QualifiedName,

    /// Columns in warehouse order
    pub columns: Vec<ColumnDescriptor>,

    /// Column used for time-window filtering, if any
    pub primary_time_column: Option<String>,
}

impl TableDescriptor {
    /// Create a table descriptor
    pub fn new(
        qualified_name: QualifiedName,
        columns: Vec<ColumnDescriptor>,
        primary_time_column: Option<String>,
    ) -> Self {
        Self {
            qualified_name,
            columns,
            primary_time_column,
        }
    }

    /// Look up a column by name, ignoring case. Returns the column as declared.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Whether the table has every named column (case-insensitive)
    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.column(n).is_some())
    }
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
