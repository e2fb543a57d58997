//! Schemas and tables held by the catalog.

use std::collections::BTreeMap;

use oxide_ddl::{Column, EnumType, ForeignKey, Index};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// A table: ordered columns plus its indexes and foreign keys.
///
/// Column, index and foreign-key names are unique within a table. Mutators
/// validate before changing anything, so a failed call leaves the table as
/// it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Schema the table belongs to.
    pub schema: String,
    /// Table name.
    pub name: String,
    columns: Vec<Column>,
    indexes: Vec<Index>,
    foreign_keys: Vec<ForeignKey>,
    /// Migration file that created the table.
    pub created_in: String,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        created_in: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            created_in: created_in.into(),
        }
    }

    /// Returns `schema.name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Returns the columns in physical order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Gets a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns true if the table has a column with the given name.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Returns the indexes.
    #[must_use]
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Gets an index by name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Returns the foreign keys.
    #[must_use]
    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Gets a foreign key by name.
    #[must_use]
    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.name == name)
    }

    /// Returns the foreign keys that point at `table`.
    #[must_use]
    pub fn foreign_keys_referencing(&self, table: &str) -> Vec<&ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(|fk| fk.referenced_table == table)
            .collect()
    }

    /// Returns the primary-key columns in physical order.
    #[must_use]
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ColumnExists`] if the name is taken.
    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if self.has_column(&column.name) {
            return Err(self.column_exists(&column.name));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Removes a column, along with indexes covering it and foreign keys on
    /// it or, for self-references, aimed at it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ColumnNotFound`] if the column is missing.
    pub fn drop_column(&mut self, name: &str) -> Result<Column> {
        let pos = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| self.column_not_found(name))?;
        self.foreign_keys.retain(|fk| fk.column != name);
        let (schema, table) = (self.schema.clone(), self.name.clone());
        self.remove_references(&schema, &table, Some(name));
        self.indexes.retain(|idx| !idx.columns.iter().any(|c| c == name));
        Ok(self.columns.remove(pos))
    }

    /// Replaces the column with the same name, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ColumnNotFound`] if the column is missing.
    pub fn modify_column(&mut self, column: Column) -> Result<()> {
        let slot = self
            .columns
            .iter()
            .position(|c| c.name == column.name)
            .ok_or_else(|| self.column_not_found(&column.name))?;
        self.columns[slot] = column;
        Ok(())
    }

    /// Renames a column, updating foreign keys and indexes that use it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ColumnNotFound`] if `from` is missing and
    /// [`CatalogError::ColumnExists`] if `to` is taken.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        let pos = self
            .columns
            .iter()
            .position(|c| c.name == from)
            .ok_or_else(|| self.column_not_found(from))?;
        if from == to {
            return Ok(());
        }
        if self.has_column(to) {
            return Err(self.column_exists(to));
        }

        self.columns[pos].name = to.to_string();
        for fk in &mut self.foreign_keys {
            if fk.column == from {
                fk.column = to.to_string();
            }
            let self_reference = fk.referenced_table == self.name
                && fk.target_schema(&self.schema) == self.schema;
            if self_reference && fk.referenced_column == from {
                fk.referenced_column = to.to_string();
            }
        }
        for idx in &mut self.indexes {
            for column in &mut idx.columns {
                if column == from {
                    *column = to.to_string();
                }
            }
        }
        Ok(())
    }

    /// Adds an index.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::IndexExists`] if the name is taken.
    pub fn add_index(&mut self, index: Index) -> Result<()> {
        if self.index(&index.name).is_some() {
            return Err(CatalogError::IndexExists {
                table: self.qualified_name(),
                index: index.name,
            });
        }
        self.indexes.push(index);
        Ok(())
    }

    /// Removes an index.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::IndexNotFound`] if the index is missing.
    pub fn drop_index(&mut self, name: &str) -> Result<Index> {
        let pos = self
            .indexes
            .iter()
            .position(|i| i.name == name)
            .ok_or_else(|| CatalogError::IndexNotFound {
                table: self.qualified_name(),
                index: name.to_string(),
            })?;
        Ok(self.indexes.remove(pos))
    }

    /// Adds a foreign key on an existing column.
    ///
    /// The referenced side is checked by the catalog, which can see other
    /// tables.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ForeignKeyExists`] if the name is taken and
    /// [`CatalogError::ColumnNotFound`] if the referencing column is missing.
    pub fn add_foreign_key(&mut self, fk: ForeignKey) -> Result<()> {
        if self.foreign_key(&fk.name).is_some() {
            return Err(CatalogError::ForeignKeyExists {
                table: self.qualified_name(),
                name: fk.name,
            });
        }
        if !self.has_column(&fk.column) {
            return Err(self.column_not_found(&fk.column));
        }
        self.foreign_keys.push(fk);
        Ok(())
    }

    /// Removes a foreign key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ForeignKeyNotFound`] if the key is missing.
    pub fn drop_foreign_key(&mut self, name: &str) -> Result<ForeignKey> {
        let pos = self
            .foreign_keys
            .iter()
            .position(|fk| fk.name == name)
            .ok_or_else(|| self.foreign_key_not_found(name))?;
        Ok(self.foreign_keys.remove(pos))
    }

    /// Renames a foreign key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ForeignKeyNotFound`] if `from` is missing and
    /// [`CatalogError::ForeignKeyExists`] if `to` is taken.
    pub fn rename_foreign_key(&mut self, from: &str, to: &str) -> Result<()> {
        let pos = self
            .foreign_keys
            .iter()
            .position(|fk| fk.name == from)
            .ok_or_else(|| self.foreign_key_not_found(from))?;
        if from != to && self.foreign_key(to).is_some() {
            return Err(CatalogError::ForeignKeyExists {
                table: self.qualified_name(),
                name: to.to_string(),
            });
        }
        self.foreign_keys[pos].name = to.to_string();
        Ok(())
    }

    /// Removes and returns the foreign keys aimed at `schema.table`, or only
    /// those aimed at `column` of it when given.
    pub(crate) fn remove_references(
        &mut self,
        schema: &str,
        table: &str,
        column: Option<&str>,
    ) -> Vec<ForeignKey> {
        let own_schema = self.schema.clone();
        let (removed, kept) = std::mem::take(&mut self.foreign_keys)
            .into_iter()
            .partition(|fk| {
                fk.referenced_table == table
                    && fk.target_schema(&own_schema) == schema
                    && column.is_none_or(|c| fk.referenced_column == c)
            });
        self.foreign_keys = kept;
        removed
    }

    /// Points foreign keys aimed at `schema.from` to `schema.to` instead.
    pub(crate) fn retarget_references(&mut self, schema: &str, from: &str, to: &str) {
        let own_schema = self.schema.clone();
        for fk in &mut self.foreign_keys {
            if fk.referenced_table == from && fk.target_schema(&own_schema) == schema {
                fk.referenced_table = to.to_string();
            }
        }
    }

    /// Points foreign keys aimed at column `from` of `schema.table` to `to`.
    pub(crate) fn retarget_column(&mut self, schema: &str, table: &str, from: &str, to: &str) {
        let own_schema = self.schema.clone();
        for fk in &mut self.foreign_keys {
            if fk.referenced_table == table
                && fk.referenced_column == from
                && fk.target_schema(&own_schema) == schema
            {
                fk.referenced_column = to.to_string();
            }
        }
    }

    fn column_not_found(&self, column: &str) -> CatalogError {
        CatalogError::ColumnNotFound {
            table: self.qualified_name(),
            column: column.to_string(),
        }
    }

    fn column_exists(&self, column: &str) -> CatalogError {
        CatalogError::ColumnExists {
            table: self.qualified_name(),
            column: column.to_string(),
        }
    }

    fn foreign_key_not_found(&self, name: &str) -> CatalogError {
        CatalogError::ForeignKeyNotFound {
            table: self.qualified_name(),
            name: name.to_string(),
        }
    }
}

/// A named schema holding tables and enum types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name.
    pub name: String,
    tables: BTreeMap<String, Table>,
    enums: BTreeMap<String, EnumType>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
            enums: BTreeMap::new(),
        }
    }

    /// Gets a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Returns the tables sorted by name.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Returns the table names in sorted order.
    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Gets an enum type by name.
    #[must_use]
    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enums.get(name)
    }

    /// Returns the enum types sorted by name.
    pub fn enums(&self) -> impl Iterator<Item = &EnumType> {
        self.enums.values()
    }

    pub(crate) fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.tables.values_mut()
    }

    pub(crate) fn insert_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    pub(crate) fn remove_table(&mut self, name: &str) -> Option<Table> {
        self.tables.remove(name)
    }

    pub(crate) fn insert_enum(&mut self, enum_type: EnumType) {
        self.enums.insert(enum_type.name.clone(), enum_type);
    }

    pub(crate) fn remove_enum(&mut self, name: &str) -> Option<EnumType> {
        self.enums.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_ddl::{DataType, ReferentialAction};

    fn col(name: &str) -> Column {
        Column::new(name, DataType::new("text")).created_in("0001.sql")
    }

    fn fk(name: &str, column: &str, table: &str, referenced: &str) -> ForeignKey {
        ForeignKey {
            name: name.to_string(),
            column: column.to_string(),
            referenced_schema: None,
            referenced_table: table.to_string(),
            referenced_column: referenced.to_string(),
            on_update: ReferentialAction::NoAction,
            on_delete: ReferentialAction::NoAction,
            created_in: "0001.sql".to_string(),
        }
    }

    fn table() -> Table {
        let mut t = Table::new("public", "nodes", "0001.sql");
        t.add_column(col("id").primary_key()).unwrap();
        t.add_column(col("parent_id")).unwrap();
        t.add_column(col("label")).unwrap();
        t.add_foreign_key(fk("nodes_parent_id_fkey", "parent_id", "nodes", "id")).unwrap();
        t.add_index(Index::new("nodes_label_idx", vec!["label".into()])).unwrap();
        t
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut t = table();
        assert!(matches!(t.add_column(col("label")), Err(CatalogError::ColumnExists { .. })));
        assert!(matches!(
            t.add_index(Index::new("nodes_label_idx", vec![])),
            Err(CatalogError::IndexExists { .. })
        ));
        assert!(matches!(
            t.add_foreign_key(fk("nodes_parent_id_fkey", "label", "x", "id")),
            Err(CatalogError::ForeignKeyExists { .. })
        ));
        assert!(matches!(
            t.add_foreign_key(fk("other", "missing", "x", "id")),
            Err(CatalogError::ColumnNotFound { .. })
        ));
        assert_eq!(t, table());
    }

    #[test]
    fn test_drop_column_cascades_to_keys_and_indexes() {
        let mut t = table();
        t.drop_column("parent_id").unwrap();
        assert!(t.foreign_keys().is_empty());
        t.drop_column("label").unwrap();
        assert!(t.indexes().is_empty());
        assert!(matches!(t.drop_column("label"), Err(CatalogError::ColumnNotFound { .. })));
    }

    #[test]
    fn test_drop_referenced_column_removes_self_reference() {
        let mut t = table();
        t.drop_column("id").unwrap();
        assert!(t.foreign_keys().is_empty());
        assert!(t.has_column("parent_id"));
    }

    #[test]
    fn test_remove_references() {
        let mut t = table();
        assert!(t.remove_references("public", "nodes", Some("label")).is_empty());
        assert!(t.remove_references("other", "nodes", None).is_empty());
        let removed = t.remove_references("public", "nodes", Some("id"));
        assert_eq!(removed.len(), 1);
        assert!(t.foreign_keys().is_empty());
    }

    #[test]
    fn test_rename_column_updates_references() {
        let mut t = table();
        t.rename_column("id", "node_id").unwrap();
        t.rename_column("label", "title").unwrap();
        assert_eq!(t.foreign_keys()[0].referenced_column, "node_id");
        assert_eq!(t.indexes()[0].columns, vec!["title"]);
        assert_eq!(t.columns()[0].name, "node_id");
        assert!(matches!(
            t.rename_column("title", "parent_id"),
            Err(CatalogError::ColumnExists { .. })
        ));
    }

    #[test]
    fn test_queries() {
        let t = table();
        assert_eq!(t.qualified_name(), "public.nodes");
        assert_eq!(t.primary_key_columns().len(), 1);
        assert_eq!(t.foreign_keys_referencing("nodes").len(), 1);
        assert!(t.foreign_keys_referencing("users").is_empty());
        assert!(t.index("nodes_label_idx").is_some());
    }

    #[test]
    fn test_foreign_key_rename() {
        let mut t = table();
        t.rename_foreign_key("nodes_parent_id_fkey", "fk_parent").unwrap();
        assert!(t.foreign_key("fk_parent").is_some());
        assert!(matches!(
            t.drop_foreign_key("nodes_parent_id_fkey"),
            Err(CatalogError::ForeignKeyNotFound { .. })
        ));
    }
}
