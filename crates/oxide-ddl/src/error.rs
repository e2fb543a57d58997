//! Parser error types.

use crate::family::DatabaseFamily;

/// Errors produced while parsing a DDL statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The statement text does not match the grammar of its kind.
    #[error("Syntax error in migration '{file}': {message} in `{statement}`")]
    Syntax {
        /// Migration file the statement came from.
        file: String,
        /// The offending statement or clause text.
        statement: String,
        /// What was wrong.
        message: String,
    },

    /// A primary-key column has a type the database family does not allow.
    #[error(
        "Migration '{file}': primary key column '{table}.{column}' has type '{found}', \
         but {family} requires primary keys of type '{required}'"
    )]
    PrimaryKeyType {
        /// Migration file the column was declared in.
        file: String,
        /// Table owning the column.
        table: String,
        /// Column name.
        column: String,
        /// Declared type.
        found: String,
        /// Type mandated by the database family.
        required: String,
        /// The target database family.
        family: DatabaseFamily,
    },

    /// The database family identifier is not recognized.
    #[error("Unknown database family '{0}'")]
    UnknownDatabaseFamily(String),
}

impl ParseError {
    /// Creates a syntax error.
    #[must_use]
    pub fn syntax(file: &str, statement: &str, message: impl Into<String>) -> Self {
        Self::Syntax {
            file: file.to_string(),
            statement: statement.trim().to_string(),
            message: message.into(),
        }
    }

    /// Returns true for syntax errors.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}
