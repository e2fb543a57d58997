//! Error types for the schema catalog.

use oxide_ddl::ParseError;

/// Errors that can occur while building or querying the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A statement could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The schema does not exist.
    #[error("Schema '{0}' does not exist")]
    SchemaNotFound(String),

    /// The schema already exists.
    #[error("Schema '{0}' already exists")]
    SchemaExists(String),

    /// The table does not exist.
    #[error("Table '{0}' does not exist")]
    TableNotFound(String),

    /// The table already exists.
    #[error("Table '{0}' already exists")]
    TableExists(String),

    /// The column does not exist.
    #[error("Column '{column}' does not exist in table '{table}'")]
    ColumnNotFound {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// The column already exists.
    #[error("Column '{column}' already exists in table '{table}'")]
    ColumnExists {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// The index does not exist.
    #[error("Index '{index}' does not exist on table '{table}'")]
    IndexNotFound {
        /// Table name.
        table: String,
        /// Index name.
        index: String,
    },

    /// The index already exists.
    #[error("Index '{index}' already exists on table '{table}'")]
    IndexExists {
        /// Table name.
        table: String,
        /// Index name.
        index: String,
    },

    /// The foreign key does not exist.
    #[error("Foreign key '{name}' does not exist on table '{table}'")]
    ForeignKeyNotFound {
        /// Table name.
        table: String,
        /// Constraint name.
        name: String,
    },

    /// The foreign key already exists.
    #[error("Foreign key '{name}' already exists on table '{table}'")]
    ForeignKeyExists {
        /// Table name.
        table: String,
        /// Constraint name.
        name: String,
    },

    /// The enum type already exists.
    #[error("Enum type '{0}' already exists")]
    EnumExists(String),

    /// The enum type does not exist.
    #[error("Enum type '{0}' does not exist")]
    EnumNotFound(String),

    /// A foreign key points at a schema, table or column that does not exist.
    #[error("Foreign key '{name}' on table '{table}' references missing {target}")]
    UnresolvedReference {
        /// Table owning the foreign key.
        table: String,
        /// Constraint name.
        name: String,
        /// The missing target, e.g. `table 'public.users'`.
        target: String,
    },

    /// An alteration would break a table invariant.
    #[error("Invalid alteration of table '{table}': {message}")]
    InvalidAlteration {
        /// Table name.
        table: String,
        /// What was wrong.
        message: String,
    },

    /// The operation is recognized but cannot be applied to the catalog.
    #[error("Unsupported operation in migration '{file}': {operation}")]
    Unsupported {
        /// Migration file.
        file: String,
        /// The operation text.
        operation: String,
    },

    /// A statement failed while replaying a migration.
    #[error("Migration '{file}' failed at `{statement}`: {source}")]
    Statement {
        /// Migration file.
        file: String,
        /// The statement text.
        statement: String,
        /// The underlying error.
        source: Box<CatalogError>,
    },

    /// Configuration could not be read.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Broad classification of catalog errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A statement does not match its grammar.
    Syntax,
    /// A statement conflicts with the current catalog state.
    SchemaViolation,
    /// A primary-key column has a type the database family forbids.
    PrimaryKeyType,
    /// A recognized construct the catalog cannot model.
    Unsupported,
    /// Invalid replay configuration.
    Configuration,
    /// Snapshot or configuration (de)serialization failed.
    Serialization,
}

impl CatalogError {
    /// Returns the broad kind of this error.
    ///
    /// A [`CatalogError::Statement`] reports the kind of its source.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(ParseError::Syntax { .. }) => ErrorKind::Syntax,
            Self::Parse(ParseError::PrimaryKeyType { .. }) => ErrorKind::PrimaryKeyType,
            Self::Parse(ParseError::UnknownDatabaseFamily(_)) | Self::Configuration(_) => {
                ErrorKind::Configuration
            }
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::Statement { source, .. } => source.kind(),
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::SchemaNotFound(_)
            | Self::SchemaExists(_)
            | Self::TableNotFound(_)
            | Self::TableExists(_)
            | Self::ColumnNotFound { .. }
            | Self::ColumnExists { .. }
            | Self::IndexNotFound { .. }
            | Self::IndexExists { .. }
            | Self::ForeignKeyNotFound { .. }
            | Self::ForeignKeyExists { .. }
            | Self::EnumExists(_)
            | Self::EnumNotFound(_)
            | Self::UnresolvedReference { .. }
            | Self::InvalidAlteration { .. } => ErrorKind::SchemaViolation,
        }
    }

    /// Returns the innermost error, looking through statement context.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Statement { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
