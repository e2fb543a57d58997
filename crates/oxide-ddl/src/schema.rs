//! Schema value types shared by the parser and the catalog.
//!
//! These describe columns, foreign keys, indexes and enums as they appear in
//! migration DDL. Every value records the migration file that created it.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DataType;

/// Referential action for ON DELETE / ON UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReferentialAction {
    /// No action (error if referenced row is deleted/updated).
    #[default]
    NoAction,
    /// Restrict (same as NoAction but checked immediately).
    Restrict,
    /// Cascade the delete/update to referencing rows.
    Cascade,
    /// Set the referencing column to NULL.
    SetNull,
    /// Set the referencing column to its default value.
    SetDefault,
}

impl ReferentialAction {
    /// Returns the SQL representation of this action.
    #[must_use]
    pub const fn to_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }

    /// Parses an action from the words following `ON DELETE` / `ON UPDATE`.
    ///
    /// Returns the action and how many words it spans.
    #[must_use]
    pub fn from_words(words: &[String]) -> Option<(Self, usize)> {
        let first = words.first()?.to_lowercase();
        let second = words.get(1).map(|w| w.to_lowercase());
        match (first.as_str(), second.as_deref()) {
            ("cascade", _) => Some((Self::Cascade, 1)),
            ("restrict", _) => Some((Self::Restrict, 1)),
            ("no", Some("action")) => Some((Self::NoAction, 2)),
            ("set", Some("null")) => Some((Self::SetNull, 2)),
            ("set", Some("default")) => Some((Self::SetDefault, 2)),
            _ => None,
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Data type family and size parameters.
    pub data_type: DataType,
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Whether the column holds an array of `data_type`.
    pub array: bool,
    /// Default value expression, as written.
    pub default: Option<String>,
    /// Whether this column is part of the primary key.
    pub primary_key: bool,
    /// Whether this column has a UNIQUE constraint.
    pub unique: bool,
    /// Migration file that created the column.
    pub created_in: String,
    /// Migration file that last modified the column.
    pub modified_in: Option<String>,
}

impl Column {
    /// Creates a new nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            array: false,
            default: None,
            primary_key: false,
            unique: false,
            created_in: String::new(),
            modified_in: None,
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the column as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false; // Primary keys are always NOT NULL
        self
    }

    /// Sets the column as unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the column as an array.
    #[must_use]
    pub const fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// Sets the default value expression.
    #[must_use]
    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Records the migration file that created the column.
    #[must_use]
    pub fn created_in(mut self, file: impl Into<String>) -> Self {
        self.created_in = file.into();
        self
    }
}

/// A single-column foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,
    /// Referencing column in the owning table.
    pub column: String,
    /// Referenced schema, when written explicitly.
    pub referenced_schema: Option<String>,
    /// Referenced table name.
    pub referenced_table: String,
    /// Referenced column name.
    pub referenced_column: String,
    /// Action on update.
    pub on_update: ReferentialAction,
    /// Action on delete.
    pub on_delete: ReferentialAction,
    /// Migration file that created the foreign key.
    pub created_in: String,
}

impl ForeignKey {
    /// Returns the name given to an unnamed foreign key.
    #[must_use]
    pub fn default_name(table: &str, column: &str) -> String {
        format!("{table}_{column}_fkey")
    }

    /// Returns the schema the referenced table lives in, given the schema
    /// of the owning table.
    #[must_use]
    pub fn target_schema<'a>(&'a self, owner_schema: &'a str) -> &'a str {
        self.referenced_schema.as_deref().unwrap_or(owner_schema)
    }
}

/// An index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Indexed columns (or expressions), in order.
    pub columns: Vec<String>,
    /// Whether this is a unique index.
    pub unique: bool,
    /// Migration file that created the index.
    pub created_in: String,
}

impl Index {
    /// Creates a non-unique index.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            unique: false,
            created_in: String::new(),
        }
    }

    /// Makes this a unique index.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Records the migration file that created the index.
    #[must_use]
    pub fn created_in(mut self, file: impl Into<String>) -> Self {
        self.created_in = file.into();
        self
    }
}

/// An enumerated type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumType {
    /// Type name.
    pub name: String,
    /// Permitted values, in declaration order.
    pub values: Vec<String>,
    /// Migration file that created the type.
    pub created_in: String,
}
