//! Target database families.
//!
//! A migration run targets exactly one family. Families differ in which
//! column type they accept for primary keys, and that rule is enforced as
//! soon as a primary-key column is parsed or a primary-key constraint is
//! applied.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::schema::Column;

/// The relational engine a migration set targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseFamily {
    /// PostgreSQL. Primary keys must be `uuid`.
    #[default]
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    /// SQLite and libSQL. Primary keys must be `text`.
    #[serde(alias = "sqlite3", alias = "libsql")]
    Sqlite,
}

impl DatabaseFamily {
    /// Returns the canonical family identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Returns the type family primary-key columns must use.
    #[must_use]
    pub const fn primary_key_type(self) -> &'static str {
        match self {
            Self::Postgres => "uuid",
            Self::Sqlite => "text",
        }
    }

    /// Checks a primary-key column against the mandated type.
    ///
    /// Columns that are not primary keys always pass.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::PrimaryKeyType`] naming the migration file, the
    /// column, the declared type and the required type.
    pub fn check_primary_key(
        self,
        file: &str,
        table: &str,
        column: &Column,
    ) -> Result<(), ParseError> {
        let required = self.primary_key_type();
        if !column.primary_key || (column.data_type.name == required && !column.array) {
            return Ok(());
        }
        let mut found = column.data_type.to_string();
        if column.array {
            found.push_str("[]");
        }
        Err(ParseError::PrimaryKeyType {
            file: file.to_string(),
            table: table.to_string(),
            column: column.name.clone(),
            found,
            required: required.to_string(),
            family: self,
        })
    }
}

impl fmt::Display for DatabaseFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatabaseFamily {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "sqlite" | "sqlite3" | "libsql" => Ok(Self::Sqlite),
            _ => Err(ParseError::UnknownDatabaseFamily(s.to_string())),
        }
    }
}
