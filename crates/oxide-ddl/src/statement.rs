//! Typed DDL statements.
//!
//! Every statement the dispatcher recognizes parses into one variant of the
//! closed [`Statement`] enum. Anything else is kept verbatim as
//! [`Statement::Unknown`].

use core::fmt;

use crate::lexer::quote_identifier;
use crate::schema::{Column, ForeignKey, ReferentialAction};
use crate::types::ParsedType;

/// A possibly schema-qualified object name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Schema name, when written explicitly.
    pub schema: Option<String>,
    /// Object name.
    pub name: String,
}

impl QualifiedName {
    /// Creates an unqualified name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// Creates a schema-qualified name.
    #[must_use]
    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Returns the schema, falling back to `default` when unqualified.
    #[must_use]
    pub fn schema_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.schema.as_deref().unwrap_or(default)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.", quote_identifier(schema))?;
        }
        f.write_str(&quote_identifier(&self.name))
    }
}

/// A parsed DDL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// CREATE TABLE.
    CreateTable(CreateTable),
    /// ALTER TABLE.
    AlterTable(AlterTable),
    /// DROP TABLE.
    DropTable(DropTable),
    /// CREATE INDEX.
    CreateIndex(CreateIndex),
    /// DROP INDEX.
    DropIndex(DropIndex),
    /// CREATE SCHEMA.
    CreateSchema(CreateSchema),
    /// DROP SCHEMA.
    DropSchema(DropSchema),
    /// CREATE TYPE ... AS ENUM.
    CreateEnum(CreateEnum),
    /// DROP TYPE.
    DropEnum(DropEnum),
    /// Any statement the parser does not model, kept verbatim.
    Unknown(String),
}

impl Statement {
    /// Returns a short name of the statement kind, used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CreateTable(_) => "CREATE TABLE",
            Self::AlterTable(_) => "ALTER TABLE",
            Self::DropTable(_) => "DROP TABLE",
            Self::CreateIndex(_) => "CREATE INDEX",
            Self::DropIndex(_) => "DROP INDEX",
            Self::CreateSchema(_) => "CREATE SCHEMA",
            Self::DropSchema(_) => "DROP SCHEMA",
            Self::CreateEnum(_) => "CREATE TYPE AS ENUM",
            Self::DropEnum(_) => "DROP TYPE",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

/// CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    /// Table name.
    pub name: QualifiedName,
    /// Whether IF NOT EXISTS was given.
    pub if_not_exists: bool,
    /// Columns in declaration order, with primary-key flags already applied.
    pub columns: Vec<Column>,
    /// Foreign keys from inline REFERENCES and table-level constraints.
    pub foreign_keys: Vec<ForeignKey>,
    /// Table-level primary key columns, if one was declared.
    pub primary_key: Vec<String>,
}

/// ALTER TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterTable {
    /// Table name.
    pub name: QualifiedName,
    /// Whether IF EXISTS was given.
    pub if_exists: bool,
    /// The operation to perform.
    pub operation: AlterOperation,
}

/// A single ALTER TABLE operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterOperation {
    /// ADD [COLUMN] [IF NOT EXISTS] column definition.
    AddColumn {
        /// The new column.
        column: Column,
        /// Inline REFERENCES clause on the column.
        foreign_key: Option<ForeignKeyConstraint>,
        /// Whether IF NOT EXISTS was given.
        if_not_exists: bool,
    },
    /// DROP [COLUMN] [IF EXISTS] name.
    DropColumn {
        /// Column name.
        column: String,
        /// Whether IF EXISTS was given.
        if_exists: bool,
    },
    /// ALTER [COLUMN] name ...
    AlterColumn {
        /// Column name.
        column: String,
        /// What changes.
        change: ColumnChange,
    },
    /// RENAME [COLUMN] from TO to.
    RenameColumn {
        /// Current column name.
        from: String,
        /// New column name.
        to: String,
    },
    /// RENAME TO name.
    RenameTo {
        /// New table name.
        name: String,
    },
    /// ADD [CONSTRAINT name] ...
    AddConstraint(TableConstraint),
    /// DROP CONSTRAINT [IF EXISTS] name.
    DropConstraint {
        /// Constraint name.
        name: String,
        /// Whether IF EXISTS was given.
        if_exists: bool,
    },
    /// RENAME CONSTRAINT from TO to.
    RenameConstraint {
        /// Current constraint name.
        from: String,
        /// New constraint name.
        to: String,
    },
    /// Several comma-separated operations, kept as raw clauses in order.
    Multiple(Vec<String>),
    /// An operation the parser recognizes but the catalog cannot model.
    Unsupported(String),
}

/// The change requested by ALTER COLUMN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnChange {
    /// TYPE t / SET DATA TYPE t.
    Type(ParsedType),
    /// SET NOT NULL.
    SetNotNull,
    /// DROP NOT NULL.
    DropNotNull,
    /// SET DEFAULT expr.
    SetDefault(String),
    /// DROP DEFAULT.
    DropDefault,
    /// Any other ALTER COLUMN form, kept verbatim.
    Unsupported(String),
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableConstraint {
    /// PRIMARY KEY (cols).
    PrimaryKey {
        /// Constraint name.
        name: Option<String>,
        /// Key columns.
        columns: Vec<String>,
    },
    /// FOREIGN KEY (cols) REFERENCES ...
    ForeignKey(ForeignKeyConstraint),
    /// UNIQUE (cols).
    Unique {
        /// Constraint name.
        name: Option<String>,
        /// Constrained columns.
        columns: Vec<String>,
    },
    /// CHECK (expr).
    Check {
        /// Constraint name.
        name: Option<String>,
        /// The check expression, as written.
        expression: String,
    },
    /// Any other constraint, kept verbatim.
    Other(String),
}

/// A foreign-key constraint as written, before expansion into per-column keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    /// Constraint name.
    pub name: Option<String>,
    /// Referencing columns.
    pub columns: Vec<String>,
    /// Referenced schema, when written explicitly.
    pub referenced_schema: Option<String>,
    /// Referenced table.
    pub referenced_table: String,
    /// Referenced columns, paired with `columns` by position.
    pub referenced_columns: Vec<String>,
    /// Action on delete.
    pub on_delete: ReferentialAction,
    /// Action on update.
    pub on_update: ReferentialAction,
}

impl ForeignKeyConstraint {
    /// Expands the constraint into one [`ForeignKey`] per column pair.
    ///
    /// A named single-column constraint keeps its name; a named composite
    /// constraint yields `<name>_<column>`; unnamed keys get
    /// [`ForeignKey::default_name`].
    #[must_use]
    pub fn to_foreign_keys(&self, table: &str, file: &str) -> Vec<ForeignKey> {
        let composite = self.columns.len() > 1;
        self.columns
            .iter()
            .zip(&self.referenced_columns)
            .map(|(column, referenced)| {
                let name = match &self.name {
                    Some(name) if composite => format!("{name}_{column}"),
                    Some(name) => name.clone(),
                    None => ForeignKey::default_name(table, column),
                };
                ForeignKey {
                    name,
                    column: column.clone(),
                    referenced_schema: self.referenced_schema.clone(),
                    referenced_table: self.referenced_table.clone(),
                    referenced_column: referenced.clone(),
                    on_update: self.on_update,
                    on_delete: self.on_delete,
                    created_in: file.to_string(),
                }
            })
            .collect()
    }
}

/// DROP TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTable {
    /// Tables to drop.
    pub names: Vec<QualifiedName>,
    /// Whether IF EXISTS was given.
    pub if_exists: bool,
    /// Whether CASCADE was given.
    pub cascade: bool,
}

/// CREATE INDEX statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndex {
    /// Index name, absent for anonymous indexes.
    pub name: Option<String>,
    /// Indexed table.
    pub table: QualifiedName,
    /// Indexed columns or expressions.
    pub columns: Vec<String>,
    /// Whether this is a UNIQUE index.
    pub unique: bool,
    /// Whether IF NOT EXISTS was given.
    pub if_not_exists: bool,
}

/// DROP INDEX statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndex {
    /// Indexes to drop.
    pub names: Vec<QualifiedName>,
    /// Whether IF EXISTS was given.
    pub if_exists: bool,
}

/// CREATE SCHEMA statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSchema {
    /// Schema name.
    pub name: String,
    /// Whether IF NOT EXISTS was given.
    pub if_not_exists: bool,
}

/// DROP SCHEMA statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropSchema {
    /// Schemas to drop.
    pub names: Vec<String>,
    /// Whether IF EXISTS was given.
    pub if_exists: bool,
    /// Whether CASCADE was given.
    pub cascade: bool,
}

/// CREATE TYPE ... AS ENUM statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEnum {
    /// Type name.
    pub name: QualifiedName,
    /// Enum values, unquoted, in order.
    pub values: Vec<String>,
}

/// DROP TYPE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEnum {
    /// Types to drop.
    pub names: Vec<QualifiedName>,
    /// Whether IF EXISTS was given.
    pub if_exists: bool,
}
