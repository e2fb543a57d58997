//! The schema catalog.
//!
//! A [`Catalog`] maps schema names to [`Schema`]s behind a single
//! reader/writer lock. Mutations validate against the current state and
//! write back only on success.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use oxide_ddl::{Column, EnumType, ForeignKey, Index};
use tracing::debug;

use crate::config::DEFAULT_SCHEMA;
use crate::error::{CatalogError, Result};
use crate::relationships::RelationshipGraph;
use crate::schema::{Schema, Table};
use crate::snapshot::CatalogSnapshot;

/// A single change to an existing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alteration {
    /// Append a column.
    AddColumn(Column),
    /// Remove a column by name.
    DropColumn(String),
    /// Replace a column definition, matched by name.
    ModifyColumn(Column),
    /// Rename a column.
    RenameColumn {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// Add an index.
    AddIndex(Index),
    /// Remove an index by name.
    DropIndex(String),
    /// Add a foreign key; its target is validated.
    AddForeignKey(ForeignKey),
    /// Remove a foreign key by name.
    DropForeignKey(String),
    /// Rename a foreign key.
    RenameForeignKey {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
}

/// In-memory schema catalog.
///
/// The default schema exists from construction. Reads clone out owned
/// values so no lock is held by callers.
#[derive(Debug)]
pub struct Catalog {
    default_schema: String,
    schemas: RwLock<BTreeMap<String, Schema>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Creates a catalog whose default schema is `public`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_schema(DEFAULT_SCHEMA)
    }

    /// Creates a catalog with the given default schema.
    #[must_use]
    pub fn with_default_schema(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut schemas = BTreeMap::new();
        schemas.insert(name.clone(), Schema::new(name.clone()));
        Self {
            default_schema: name,
            schemas: RwLock::new(schemas),
        }
    }

    /// Returns the default schema name.
    #[must_use]
    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Schema>> {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Schema>> {
        self.schemas.write().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Schemas ---

    /// Gets a copy of a schema.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::SchemaNotFound`] if the schema is missing.
    pub fn get_schema(&self, name: &str) -> Result<Schema> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::SchemaNotFound(name.to_string()))
    }

    /// Returns true if the schema exists.
    #[must_use]
    pub fn has_schema(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Returns all schema names in sorted order.
    #[must_use]
    pub fn schema_names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Creates an empty schema.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::SchemaExists`] if the name is taken.
    pub fn create_schema(&self, name: &str) -> Result<()> {
        let mut schemas = self.write();
        if schemas.contains_key(name) {
            return Err(CatalogError::SchemaExists(name.to_string()));
        }
        schemas.insert(name.to_string(), Schema::new(name));
        debug!(schema = name, "created schema");
        Ok(())
    }

    /// Creates the schema if it does not exist. Returns true if created.
    pub fn ensure_schema(&self, name: &str) -> bool {
        let mut schemas = self.write();
        if schemas.contains_key(name) {
            return false;
        }
        schemas.insert(name.to_string(), Schema::new(name));
        debug!(schema = name, "created schema");
        true
    }

    // --- Tables ---

    /// Gets a copy of a table.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TableNotFound`] if the schema or table is
    /// missing.
    pub fn get_table(&self, schema: &str, name: &str) -> Result<Table> {
        self.read()
            .get(schema)
            .and_then(|s| s.table(name))
            .cloned()
            .ok_or_else(|| CatalogError::TableNotFound(qualified(schema, name)))
    }

    /// Returns true if the table exists.
    #[must_use]
    pub fn has_table(&self, schema: &str, name: &str) -> bool {
        self.read()
            .get(schema)
            .is_some_and(|s| s.table(name).is_some())
    }

    /// Returns copies of all tables in a schema, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::SchemaNotFound`] if the schema is missing.
    pub fn list_tables(&self, schema: &str) -> Result<Vec<Table>> {
        self.read()
            .get(schema)
            .map(|s| s.tables().cloned().collect())
            .ok_or_else(|| CatalogError::SchemaNotFound(schema.to_string()))
    }

    /// Returns the number of tables across all schemas.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.read().values().map(|s| s.tables().count()).sum()
    }

    /// Inserts a new table.
    ///
    /// Every foreign key on the table must resolve: the referenced schema,
    /// table and column must exist. A table may reference itself.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::SchemaNotFound`], [`CatalogError::TableExists`]
    /// or [`CatalogError::UnresolvedReference`].
    pub fn add_table(&self, table: Table) -> Result<()> {
        let mut schemas = self.write();
        let schema = schemas
            .get(&table.schema)
            .ok_or_else(|| CatalogError::SchemaNotFound(table.schema.clone()))?;
        if schema.table(&table.name).is_some() {
            return Err(CatalogError::TableExists(table.qualified_name()));
        }
        for fk in table.foreign_keys() {
            check_reference(&schemas, &table, fk)?;
        }

        debug!(table = %table.qualified_name(), columns = table.columns().len(), "added table");
        if let Some(schema) = schemas.get_mut(&table.schema) {
            schema.insert_table(table);
        }
        Ok(())
    }

    /// Removes a table.
    ///
    /// Foreign keys on other tables that referenced it are removed as well.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TableNotFound`] if the table is missing.
    pub fn drop_table(&self, schema: &str, name: &str) -> Result<Table> {
        let mut schemas = self.write();
        let table = schemas
            .get_mut(schema)
            .and_then(|s| s.remove_table(name))
            .ok_or_else(|| CatalogError::TableNotFound(qualified(schema, name)))?;

        drop_references(&mut schemas, schema, name, None);
        debug!(table = %table.qualified_name(), "dropped table");
        Ok(table)
    }

    /// Renames a table within its schema.
    ///
    /// Foreign keys anywhere in the catalog that referenced the old name are
    /// updated to the new one.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TableNotFound`] if `from` is missing and
    /// [`CatalogError::TableExists`] if `to` is taken.
    pub fn rename_table(&self, schema: &str, from: &str, to: &str) -> Result<()> {
        let mut schemas = self.write();
        let target = schemas
            .get_mut(schema)
            .ok_or_else(|| CatalogError::TableNotFound(qualified(schema, from)))?;
        if target.table(from).is_none() {
            return Err(CatalogError::TableNotFound(qualified(schema, from)));
        }
        if from == to {
            return Ok(());
        }
        if target.table(to).is_some() {
            return Err(CatalogError::TableExists(qualified(schema, to)));
        }

        if let Some(mut table) = target.remove_table(from) {
            table.name = to.to_string();
            target.insert_table(table);
        }
        for table in schemas.values_mut().flat_map(Schema::tables_mut) {
            table.retarget_references(schema, from, to);
        }
        debug!(schema, from, to, "renamed table");
        Ok(())
    }

    /// Applies one alteration to a table.
    ///
    /// The alteration runs against a copy of the table, which replaces the
    /// stored table only on success.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TableNotFound`] if the table is missing, or
    /// the error of the failed alteration.
    pub fn alter_table(&self, schema: &str, name: &str, alteration: Alteration) -> Result<()> {
        self.alter_table_batch(schema, name, [alteration])
    }

    /// Applies several alterations to a table as one unit.
    ///
    /// All alterations run in order against a copy of the table. The copy
    /// replaces the stored table only if every alteration succeeds; other
    /// tables are only touched after that point.
    ///
    /// Renaming a column retargets foreign keys on other tables that
    /// referenced it. Dropping a column removes those foreign keys.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TableNotFound`] if the table is missing, or
    /// the error of the first failed alteration.
    pub fn alter_table_batch(
        &self,
        schema: &str,
        name: &str,
        alterations: impl IntoIterator<Item = Alteration>,
    ) -> Result<()> {
        let mut schemas = self.write();
        let mut table = schemas
            .get(schema)
            .and_then(|s| s.table(name))
            .cloned()
            .ok_or_else(|| CatalogError::TableNotFound(qualified(schema, name)))?;

        let mut follow_ups = Vec::new();
        for alteration in alterations {
            match alteration {
                Alteration::AddColumn(column) => table.add_column(column)?,
                Alteration::DropColumn(column) => {
                    table.drop_column(&column)?;
                    follow_ups.push(ColumnFollowUp::Dropped(column));
                }
                Alteration::ModifyColumn(column) => table.modify_column(column)?,
                Alteration::RenameColumn { from, to } => {
                    table.rename_column(&from, &to)?;
                    follow_ups.push(ColumnFollowUp::Renamed { from, to });
                }
                Alteration::AddIndex(index) => table.add_index(index)?,
                Alteration::DropIndex(index) => {
                    table.drop_index(&index)?;
                }
                Alteration::AddForeignKey(fk) => {
                    check_reference(&schemas, &table, &fk)?;
                    table.add_foreign_key(fk)?;
                }
                Alteration::DropForeignKey(fk) => {
                    table.drop_foreign_key(&fk)?;
                }
                Alteration::RenameForeignKey { from, to } => {
                    table.rename_foreign_key(&from, &to)?;
                }
            }
        }

        if let Some(s) = schemas.get_mut(schema) {
            s.insert_table(table);
        }
        for follow_up in follow_ups {
            match follow_up {
                ColumnFollowUp::Renamed { from, to } => {
                    rename_referenced_column(&mut schemas, schema, name, &from, &to);
                }
                ColumnFollowUp::Dropped(column) => {
                    drop_references(&mut schemas, schema, name, Some(&column));
                }
            }
        }
        Ok(())
    }

    // --- Enums ---

    /// Registers an enum type.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::SchemaNotFound`] or [`CatalogError::EnumExists`].
    pub fn add_enum(&self, schema: &str, enum_type: EnumType) -> Result<()> {
        let mut schemas = self.write();
        let target = schemas
            .get_mut(schema)
            .ok_or_else(|| CatalogError::SchemaNotFound(schema.to_string()))?;
        if target.enum_type(&enum_type.name).is_some() {
            return Err(CatalogError::EnumExists(qualified(schema, &enum_type.name)));
        }
        debug!(schema, name = %enum_type.name, values = enum_type.values.len(), "added enum type");
        target.insert_enum(enum_type);
        Ok(())
    }

    /// Gets a copy of an enum type.
    #[must_use]
    pub fn get_enum(&self, schema: &str, name: &str) -> Option<EnumType> {
        self.read()
            .get(schema)
            .and_then(|s| s.enum_type(name))
            .cloned()
    }

    /// Removes an enum type.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EnumNotFound`] if the type is missing.
    pub fn drop_enum(&self, schema: &str, name: &str) -> Result<EnumType> {
        self.write()
            .get_mut(schema)
            .and_then(|s| s.remove_enum(name))
            .ok_or_else(|| CatalogError::EnumNotFound(qualified(schema, name)))
    }

    // --- Derived views ---

    /// Derives the relationship graph from the current foreign keys.
    #[must_use]
    pub fn relationship_graph(&self) -> RelationshipGraph {
        RelationshipGraph::build(self.read().values())
    }

    /// Takes a serializable copy of the whole catalog.
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            default_schema: self.default_schema.clone(),
            schemas: self.read().clone(),
        }
    }
}

fn qualified(schema: &str, name: &str) -> String {
    format!("{schema}.{name}")
}

/// Checks that a foreign key on `owner` resolves.
///
/// `owner` may not be in `schemas` yet; references to itself resolve
/// against it directly.
fn check_reference(
    schemas: &BTreeMap<String, Schema>,
    owner: &Table,
    fk: &ForeignKey,
) -> Result<()> {
    if !owner.has_column(&fk.column) {
        return Err(CatalogError::ColumnNotFound {
            table: owner.qualified_name(),
            column: fk.column.clone(),
        });
    }
    let unresolved = |target: String| CatalogError::UnresolvedReference {
        table: owner.qualified_name(),
        name: fk.name.clone(),
        target,
    };

    let target_schema = fk.target_schema(&owner.schema);
    let target = if target_schema == owner.schema && fk.referenced_table == owner.name {
        owner
    } else {
        let table = qualified(target_schema, &fk.referenced_table);
        schemas
            .get(target_schema)
            .ok_or_else(|| unresolved(format!("schema '{target_schema}'")))?
            .table(&fk.referenced_table)
            .ok_or_else(|| unresolved(format!("table '{table}'")))?
    };
    if !target.has_column(&fk.referenced_column) {
        return Err(unresolved(format!(
            "column '{}.{}'",
            target.qualified_name(),
            fk.referenced_column
        )));
    }
    Ok(())
}

/// Cross-table work left over after a column alteration commits.
enum ColumnFollowUp {
    Renamed { from: String, to: String },
    Dropped(String),
}

/// Follows a column rename into foreign keys on other tables that target it.
fn rename_referenced_column(
    schemas: &mut BTreeMap<String, Schema>,
    schema: &str,
    table: &str,
    from: &str,
    to: &str,
) {
    for other in schemas.values_mut().flat_map(Schema::tables_mut) {
        if other.schema == schema && other.name == table {
            continue;
        }
        other.retarget_column(schema, table, from, to);
    }
}

/// Removes foreign keys aimed at `schema.table`, or only at one of its
/// columns when `column` is given.
fn drop_references(
    schemas: &mut BTreeMap<String, Schema>,
    schema: &str,
    table: &str,
    column: Option<&str>,
) {
    for other in schemas.values_mut().flat_map(Schema::tables_mut) {
        for fk in other.remove_references(schema, table, column) {
            debug!(
                table = %other.qualified_name(),
                foreign_key = %fk.name,
                "dropping dangling foreign key"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_ddl::{DataType, ReferentialAction};

    fn users() -> Table {
        let mut t = Table::new("public", "users", "0001.sql");
        t.add_column(Column::new("id", DataType::new("uuid")).primary_key()).unwrap();
        t.add_column(Column::new("email", DataType::new("text"))).unwrap();
        t
    }

    fn posts_fk() -> ForeignKey {
        ForeignKey {
            name: "posts_user_id_fkey".into(),
            column: "user_id".into(),
            referenced_schema: None,
            referenced_table: "users".into(),
            referenced_column: "id".into(),
            on_update: ReferentialAction::NoAction,
            on_delete: ReferentialAction::Cascade,
            created_in: "0002.sql".into(),
        }
    }

    fn posts() -> Table {
        let mut t = Table::new("public", "posts", "0002.sql");
        t.add_column(Column::new("id", DataType::new("uuid")).primary_key()).unwrap();
        t.add_column(Column::new("user_id", DataType::new("uuid"))).unwrap();
        t.add_foreign_key(posts_fk()).unwrap();
        t
    }

    #[test]
    fn test_default_schema_exists() {
        let catalog = Catalog::new();
        assert_eq!(catalog.default_schema(), "public");
        assert!(catalog.has_schema("public"));
        assert!(catalog.list_tables("public").unwrap().is_empty());
        assert!(matches!(catalog.create_schema("public"), Err(CatalogError::SchemaExists(_))));
        assert!(catalog.ensure_schema("audit"));
        assert!(!catalog.ensure_schema("audit"));
        assert_eq!(catalog.schema_names(), vec!["audit", "public"]);
    }

    #[test]
    fn test_add_table_validates_references() {
        let catalog = Catalog::new();
        assert!(matches!(
            catalog.add_table(posts()),
            Err(CatalogError::UnresolvedReference { .. })
        ));
        catalog.add_table(users()).unwrap();
        catalog.add_table(posts()).unwrap();
        assert!(matches!(catalog.add_table(users()), Err(CatalogError::TableExists(_))));
        assert!(matches!(
            catalog.add_table(Table::new("nope", "t", "f")),
            Err(CatalogError::SchemaNotFound(_))
        ));
        assert_eq!(catalog.table_count(), 2);
    }

    #[test]
    fn test_self_reference_allowed() {
        let catalog = Catalog::new();
        let mut t = Table::new("public", "employees", "0001.sql");
        t.add_column(Column::new("id", DataType::new("uuid")).primary_key()).unwrap();
        t.add_column(Column::new("manager_id", DataType::new("uuid"))).unwrap();
        let mut fk = posts_fk();
        fk.name = "employees_manager_id_fkey".into();
        fk.column = "manager_id".into();
        fk.referenced_table = "employees".into();
        t.add_foreign_key(fk).unwrap();
        catalog.add_table(t).unwrap();
    }

    #[test]
    fn test_failed_alteration_leaves_table_intact() {
        let catalog = Catalog::new();
        catalog.add_table(users()).unwrap();
        let before = catalog.get_table("public", "users").unwrap();
        let err = catalog
            .alter_table(
                "public",
                "users",
                Alteration::AddColumn(Column::new("email", DataType::new("text"))),
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::ColumnExists { .. }));
        assert_eq!(catalog.get_table("public", "users").unwrap(), before);
    }

    #[test]
    fn test_rename_table_updates_references() {
        let catalog = Catalog::new();
        catalog.add_table(users()).unwrap();
        catalog.add_table(posts()).unwrap();
        catalog.rename_table("public", "users", "accounts").unwrap();
        assert!(!catalog.has_table("public", "users"));
        let posts = catalog.get_table("public", "posts").unwrap();
        assert_eq!(posts.foreign_keys()[0].referenced_table, "accounts");
        assert!(matches!(
            catalog.rename_table("public", "accounts", "posts"),
            Err(CatalogError::TableExists(_))
        ));
        assert!(matches!(
            catalog.rename_table("public", "users", "x"),
            Err(CatalogError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_rename_referenced_column() {
        let catalog = Catalog::new();
        catalog.add_table(users()).unwrap();
        catalog.add_table(posts()).unwrap();
        catalog
            .alter_table(
                "public",
                "users",
                Alteration::RenameColumn {
                    from: "id".into(),
                    to: "user_id".into(),
                },
            )
            .unwrap();
        let posts = catalog.get_table("public", "posts").unwrap();
        assert_eq!(posts.foreign_keys()[0].referenced_column, "user_id");
    }

    #[test]
    fn test_drop_table_removes_dangling_keys() {
        let catalog = Catalog::new();
        catalog.add_table(users()).unwrap();
        catalog.add_table(posts()).unwrap();
        catalog.drop_table("public", "users").unwrap();
        assert!(catalog.get_table("public", "posts").unwrap().foreign_keys().is_empty());
        assert!(matches!(
            catalog.drop_table("public", "users"),
            Err(CatalogError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_failed_batch_leaves_table_intact() {
        let catalog = Catalog::new();
        catalog.add_table(users()).unwrap();
        let mut posts = posts();
        posts.drop_foreign_key("posts_user_id_fkey").unwrap();
        catalog.add_table(posts).unwrap();
        let before = catalog.get_table("public", "posts").unwrap();

        let mut ghost = posts_fk();
        ghost.name = "posts_ghost_id_fkey".into();
        ghost.column = "ghost_id".into();
        ghost.referenced_table = "ghosts".into();
        let err = catalog
            .alter_table_batch(
                "public",
                "posts",
                [
                    Alteration::AddForeignKey(posts_fk()),
                    Alteration::AddColumn(Column::new("ghost_id", DataType::new("uuid"))),
                    Alteration::AddForeignKey(ghost),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnresolvedReference { .. }));
        assert_eq!(catalog.get_table("public", "posts").unwrap(), before);
    }

    #[test]
    fn test_drop_referenced_column_removes_foreign_keys() {
        let catalog = Catalog::new();
        catalog.add_table(users()).unwrap();
        catalog.add_table(posts()).unwrap();
        catalog
            .alter_table("public", "users", Alteration::DropColumn("email".into()))
            .unwrap();
        assert_eq!(catalog.get_table("public", "posts").unwrap().foreign_keys().len(), 1);

        catalog
            .alter_table("public", "users", Alteration::DropColumn("id".into()))
            .unwrap();
        assert!(catalog.get_table("public", "posts").unwrap().foreign_keys().is_empty());
        assert!(catalog.relationship_graph().is_empty());
    }

    #[test]
    fn test_index_alterations() {
        let catalog = Catalog::new();
        catalog.add_table(users()).unwrap();
        let index = Index::new("users_email_idx", vec!["email".into()]).unique();
        catalog
            .alter_table("public", "users", Alteration::AddIndex(index.clone()))
            .unwrap();
        assert!(matches!(
            catalog.alter_table("public", "users", Alteration::AddIndex(index)),
            Err(CatalogError::IndexExists { .. })
        ));
        let users = catalog.get_table("public", "users").unwrap();
        assert!(users.index("users_email_idx").unwrap().unique);

        catalog
            .alter_table("public", "users", Alteration::DropIndex("users_email_idx".into()))
            .unwrap();
        assert!(matches!(
            catalog.alter_table("public", "users", Alteration::DropIndex("users_email_idx".into())),
            Err(CatalogError::IndexNotFound { .. })
        ));
    }

    #[test]
    fn test_enums() {
        let catalog = Catalog::new();
        let mood = EnumType {
            name: "mood".into(),
            values: vec!["sad".into(), "happy".into()],
            created_in: "0001.sql".into(),
        };
        catalog.add_enum("public", mood.clone()).unwrap();
        assert!(matches!(
            catalog.add_enum("public", mood.clone()),
            Err(CatalogError::EnumExists(_))
        ));
        assert_eq!(catalog.get_enum("public", "mood"), Some(mood));
        catalog.drop_enum("public", "mood").unwrap();
        assert!(matches!(catalog.drop_enum("public", "mood"), Err(CatalogError::EnumNotFound(_))));
    }

    #[test]
    fn test_catalog_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }
}
