//! Applies parsed statements to a [`Catalog`].
//!
//! Each [`Statement`] variant maps to one branch of [`Applier::apply`].
//! Statements the catalog does not track (indexes, schema drops, anything
//! unrecognized) are accepted and logged.

use oxide_ddl::{
    parse_statement, AlterOperation, AlterTable, Column, ColumnChange, CreateEnum, CreateTable,
    DropEnum, DropTable, EnumType, ParseContext, QualifiedName, Statement, TableConstraint,
};
use tracing::{debug, warn};

use crate::catalog::{Alteration, Catalog};
use crate::error::{CatalogError, Result};
use crate::schema::Table;

/// Applies statements from one migration file to a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Applier<'a> {
    catalog: &'a Catalog,
    ctx: ParseContext<'a>,
}

impl<'a> Applier<'a> {
    /// Creates an applier for statements of the migration in `ctx`.
    #[must_use]
    pub const fn new(catalog: &'a Catalog, ctx: ParseContext<'a>) -> Self {
        Self { catalog, ctx }
    }

    /// Applies one statement.
    ///
    /// # Errors
    ///
    /// Returns the catalog error raised by the statement. A multi-operation
    /// ALTER TABLE stops at its first failing clause; earlier clauses stay
    /// applied.
    pub fn apply(&self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::CreateTable(stmt) => self.create_table(stmt),
            Statement::AlterTable(stmt) => self.alter_table(stmt),
            Statement::DropTable(stmt) => self.drop_table(stmt),
            Statement::CreateIndex(stmt) => {
                debug!(
                    file = self.ctx.file,
                    table = %stmt.table,
                    index = ?stmt.name,
                    "index not tracked"
                );
                Ok(())
            }
            Statement::DropIndex(stmt) => {
                debug!(file = self.ctx.file, indexes = stmt.names.len(), "index not tracked");
                Ok(())
            }
            Statement::CreateSchema(stmt) => {
                self.catalog.ensure_schema(&stmt.name);
                Ok(())
            }
            Statement::DropSchema(stmt) => {
                warn!(file = self.ctx.file, schemas = ?stmt.names, "ignoring DROP SCHEMA");
                Ok(())
            }
            Statement::CreateEnum(stmt) => self.create_enum(stmt),
            Statement::DropEnum(stmt) => {
                self.drop_enum(stmt);
                Ok(())
            }
            Statement::Unknown(sql) => {
                if starts_with_words(sql, &["create", "type"]) {
                    warn!(
                        file = self.ctx.file,
                        statement = %sql,
                        "ignoring non-enum type definition"
                    );
                } else {
                    debug!(file = self.ctx.file, statement = %sql, "ignoring statement");
                }
                Ok(())
            }
        }
    }

    fn schema_of<'n>(&'n self, name: &'n QualifiedName) -> &'n str {
        name.schema_or(self.catalog.default_schema())
    }

    fn create_table(&self, stmt: &CreateTable) -> Result<()> {
        let schema = self.schema_of(&stmt.name);
        self.catalog.ensure_schema(schema);
        if stmt.if_not_exists && self.catalog.has_table(schema, &stmt.name.name) {
            debug!(file = self.ctx.file, table = %stmt.name, "table exists, skipping");
            return Ok(());
        }

        let mut table = Table::new(schema, stmt.name.name.clone(), self.ctx.file);
        for column in &stmt.columns {
            table.add_column(column.clone())?;
        }
        for fk in &stmt.foreign_keys {
            table.add_foreign_key(fk.clone())?;
        }
        self.catalog.add_table(table)
    }

    fn drop_table(&self, stmt: &DropTable) -> Result<()> {
        for name in &stmt.names {
            let schema = self.schema_of(name);
            if stmt.if_exists && !self.catalog.has_table(schema, &name.name) {
                debug!(file = self.ctx.file, table = %name, "table missing, skipping");
                continue;
            }
            self.catalog.drop_table(schema, &name.name)?;
        }
        Ok(())
    }

    fn create_enum(&self, stmt: &CreateEnum) -> Result<()> {
        let schema = self.schema_of(&stmt.name);
        self.catalog.ensure_schema(schema);
        if self.catalog.get_enum(schema, &stmt.name.name).is_some() {
            debug!(file = self.ctx.file, name = %stmt.name, "enum type exists, keeping it");
            return Ok(());
        }
        self.catalog.add_enum(
            schema,
            EnumType {
                name: stmt.name.name.clone(),
                values: stmt.values.clone(),
                created_in: self.ctx.file.to_string(),
            },
        )
    }

    fn drop_enum(&self, stmt: &DropEnum) {
        for name in &stmt.names {
            if self.catalog.drop_enum(self.schema_of(name), &name.name).is_err() {
                debug!(file = self.ctx.file, name = %name, "enum type missing, skipping");
            }
        }
    }

    fn alter_table(&self, stmt: &AlterTable) -> Result<()> {
        let schema = self.schema_of(&stmt.name);
        let name = stmt.name.name.as_str();
        if stmt.if_exists && !self.catalog.has_table(schema, name) {
            debug!(file = self.ctx.file, table = %stmt.name, "table missing, skipping");
            return Ok(());
        }
        let table = self.catalog.get_table(schema, name)?;
        let alter = |alteration: Alteration| self.catalog.alter_table(schema, name, alteration);
        let log_skip = |column: &str, reason: &str| {
            debug!(file = self.ctx.file, table = %stmt.name, column, reason, "skipping column");
        };

        match &stmt.operation {
            AlterOperation::AddColumn {
                column,
                foreign_key,
                if_not_exists,
            } => {
                if *if_not_exists && table.has_column(&column.name) {
                    log_skip(&column.name, "exists");
                    return Ok(());
                }
                let keys = foreign_key
                    .iter()
                    .flat_map(|fk| fk.to_foreign_keys(name, self.ctx.file))
                    .map(Alteration::AddForeignKey);
                let add = Alteration::AddColumn(column.clone());
                self.catalog
                    .alter_table_batch(schema, name, std::iter::once(add).chain(keys))
            }
            AlterOperation::DropColumn { column, if_exists } => {
                if *if_exists && !table.has_column(column) {
                    log_skip(column, "missing");
                    return Ok(());
                }
                alter(Alteration::DropColumn(column.clone()))
            }
            AlterOperation::AlterColumn { column, change } => {
                let modified = self.change_column(&table, column, change)?;
                alter(Alteration::ModifyColumn(modified))
            }
            AlterOperation::RenameColumn { from, to } => alter(Alteration::RenameColumn {
                from: from.clone(),
                to: to.clone(),
            }),
            AlterOperation::RenameTo { name: to } => self.catalog.rename_table(schema, name, to),
            AlterOperation::AddConstraint(constraint) => self.add_constraint(&table, constraint),
            AlterOperation::DropConstraint {
                name: constraint, ..
            } => {
                if table.foreign_key(constraint).is_some() {
                    return alter(Alteration::DropForeignKey(constraint.clone()));
                }
                if constraint.strip_suffix("_pkey") == Some(name) {
                    let cleared = table.primary_key_columns().into_iter().map(|column| {
                        let mut column = column.clone();
                        column.primary_key = false;
                        column.modified_in = Some(self.ctx.file.to_string());
                        Alteration::ModifyColumn(column)
                    });
                    return self.catalog.alter_table_batch(schema, name, cleared);
                }
                self.untracked(&table, constraint);
                Ok(())
            }
            AlterOperation::RenameConstraint { from, to } => {
                if table.foreign_key(from).is_none() {
                    self.untracked(&table, from);
                    return Ok(());
                }
                alter(Alteration::RenameForeignKey {
                    from: from.clone(),
                    to: to.clone(),
                })
            }
            AlterOperation::Multiple(clauses) => {
                for clause in clauses {
                    let sql = format!("ALTER TABLE {} {clause}", stmt.name);
                    let single = parse_statement(&sql, &self.ctx)?;
                    self.apply(&single)?;
                }
                Ok(())
            }
            AlterOperation::Unsupported(operation) => Err(self.unsupported(operation)),
        }
    }

    /// Returns a copy of `column` with `change` applied and provenance set.
    fn change_column(&self, table: &Table, column: &str, change: &ColumnChange) -> Result<Column> {
        let mut modified = table
            .column(column)
            .cloned()
            .ok_or_else(|| CatalogError::ColumnNotFound {
                table: table.qualified_name(),
                column: column.to_string(),
            })?;

        match change {
            ColumnChange::Type(parsed) => {
                modified.data_type = parsed.data_type.clone();
                modified.array = parsed.array;
            }
            ColumnChange::SetNotNull => modified.nullable = false,
            ColumnChange::DropNotNull => {
                if modified.primary_key {
                    return Err(CatalogError::InvalidAlteration {
                        table: table.qualified_name(),
                        message: format!("primary key column '{column}' cannot be nullable"),
                    });
                }
                modified.nullable = true;
            }
            ColumnChange::SetDefault(expr) => modified.default = Some(expr.clone()),
            ColumnChange::DropDefault => modified.default = None,
            ColumnChange::Unsupported(operation) => return Err(self.unsupported(operation)),
        }

        modified.modified_in = Some(self.ctx.file.to_string());
        self.ctx
            .family
            .check_primary_key(self.ctx.file, &table.name, &modified)?;
        Ok(modified)
    }

    fn add_constraint(&self, table: &Table, constraint: &TableConstraint) -> Result<()> {
        let batch = |alterations: Vec<Alteration>| {
            self.catalog
                .alter_table_batch(&table.schema, &table.name, alterations)
        };

        match constraint {
            TableConstraint::PrimaryKey { columns, .. } => {
                let mut keys = Vec::with_capacity(columns.len());
                for column in columns {
                    let mut key = table
                        .column(column)
                        .cloned()
                        .ok_or_else(|| CatalogError::ColumnNotFound {
                            table: table.qualified_name(),
                            column: column.clone(),
                        })?;
                    key.primary_key = true;
                    key.nullable = false;
                    key.modified_in = Some(self.ctx.file.to_string());
                    self.ctx
                        .family
                        .check_primary_key(self.ctx.file, &table.name, &key)?;
                    keys.push(Alteration::ModifyColumn(key));
                }
                batch(keys)
            }
            TableConstraint::ForeignKey(fk) => batch(
                fk.to_foreign_keys(&table.name, self.ctx.file)
                    .into_iter()
                    .map(Alteration::AddForeignKey)
                    .collect(),
            ),
            TableConstraint::Unique { columns, .. } if columns.len() == 1 => {
                let mut column = table
                    .column(&columns[0])
                    .cloned()
                    .ok_or_else(|| CatalogError::ColumnNotFound {
                        table: table.qualified_name(),
                        column: columns[0].clone(),
                    })?;
                column.unique = true;
                column.modified_in = Some(self.ctx.file.to_string());
                batch(vec![Alteration::ModifyColumn(column)])
            }
            TableConstraint::Unique { .. }
            | TableConstraint::Check { .. }
            | TableConstraint::Other(_) => {
                debug!(
                    file = self.ctx.file,
                    table = %table.qualified_name(),
                    "constraint not tracked"
                );
                Ok(())
            }
        }
    }

    fn untracked(&self, table: &Table, constraint: &str) {
        debug!(
            file = self.ctx.file,
            table = %table.qualified_name(),
            constraint,
            "constraint not tracked"
        );
    }

    fn unsupported(&self, operation: &str) -> CatalogError {
        CatalogError::Unsupported {
            file: self.ctx.file.to_string(),
            operation: operation.to_string(),
        }
    }
}

/// Parses and applies one statement.
///
/// # Errors
///
/// Returns the parse or catalog error of the statement.
pub fn apply_sql(catalog: &Catalog, sql: &str, ctx: &ParseContext<'_>) -> Result<()> {
    let statement = parse_statement(sql, ctx)?;
    Applier::new(catalog, *ctx).apply(&statement)
}

fn starts_with_words(sql: &str, words: &[&str]) -> bool {
    let mut actual = sql.split_whitespace();
    words
        .iter()
        .all(|w| actual.next().is_some_and(|a| a.eq_ignore_ascii_case(w)))
}
