//! Relationships derived from foreign keys.
//!
//! The graph is recomputed from the catalog on every request; nothing here
//! is stored.

use std::collections::{BTreeMap, BTreeSet};

use oxide_ddl::ForeignKey;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{Schema, Table};

/// Cardinality of a relation, seen from its source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// The source is referenced by many rows of the target.
    OneToMany,
    /// Many source rows reference one target row.
    ManyToOne,
    /// Source and target are linked through a join table.
    ManyToMany,
    /// At most one row on each side. Emitted alongside the many-to-one and
    /// one-to-many pair when the referencing column is unique.
    OneToOne,
}

/// The join table behind a many-to-many relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinTable {
    /// Schema of the join table.
    pub schema: String,
    /// Join table name.
    pub table: String,
    /// Join column referencing the relation's source table.
    pub source_column: String,
    /// Join column referencing the relation's target table.
    pub target_column: String,
}

/// A directed relation from one table to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// Cardinality from the source side.
    pub kind: RelationKind,
    /// Source schema.
    pub source_schema: String,
    /// Source table.
    pub source_table: String,
    /// Column on the source side of the link.
    pub source_column: String,
    /// Target schema.
    pub target_schema: String,
    /// Target table.
    pub target_table: String,
    /// Column on the target side of the link.
    pub target_column: String,
    /// Name of the foreign key this relation comes from.
    pub foreign_key: String,
    /// Whether source and target are the same table.
    pub self_referential: bool,
    /// Join table, for many-to-many relations.
    pub join: Option<JoinTable>,
}

/// Relations per `(schema, table)`, in derivation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipGraph {
    relations: BTreeMap<(String, String), Vec<Relation>>,
}

impl RelationshipGraph {
    /// Derives the graph from the given schemas.
    ///
    /// Tables are visited by schema then name, and foreign keys in table
    /// order. Foreign keys whose target table no longer exists are skipped.
    pub fn build<'a>(schemas: impl IntoIterator<Item = &'a Schema>) -> Self {
        let tables: Vec<&Table> = schemas.into_iter().flat_map(Schema::tables).collect();
        let known: BTreeSet<(&str, &str)> = tables
            .iter()
            .map(|t| (t.schema.as_str(), t.name.as_str()))
            .collect();

        let mut graph = Self::default();
        for table in &tables {
            for fk in table.foreign_keys() {
                let target_schema = fk.target_schema(&table.schema);
                if !known.contains(&(target_schema, fk.referenced_table.as_str())) {
                    debug!(
                        table = %table.qualified_name(),
                        foreign_key = %fk.name,
                        "skipping unresolved foreign key"
                    );
                    continue;
                }
                graph.add_foreign_key(table, fk);
            }
            if let Some((a, b)) = join_keys(table) {
                graph.add_many_to_many(table, a, b);
                graph.add_many_to_many(table, b, a);
            }
        }
        graph
    }

    /// Returns the relations of `schema.table`; empty if it has none.
    #[must_use]
    pub fn relations_in(&self, schema: &str, table: &str) -> &[Relation] {
        self.relations
            .get(&(schema.to_string(), table.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the relations of every table named `table`, whatever its
    /// schema. Tables sharing a name across schemas are merged in schema
    /// order; use [`relations_in`](Self::relations_in) to tell them apart.
    #[must_use]
    pub fn relations_for(&self, table: &str) -> Vec<&Relation> {
        self.relations
            .iter()
            .filter(|((_, name), _)| name == table)
            .flat_map(|(_, relations)| relations)
            .collect()
    }

    /// Iterates over `(schema, table, relations)` sorted by schema then
    /// table.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[Relation])> {
        self.relations
            .iter()
            .map(|((schema, table), v)| (schema.as_str(), table.as_str(), v.as_slice()))
    }

    /// Returns the total number of relations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.values().map(Vec::len).sum()
    }

    /// Returns true if there are no relations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    fn push(&mut self, relation: Relation) {
        self.relations
            .entry((relation.source_schema.clone(), relation.source_table.clone()))
            .or_default()
            .push(relation);
    }

    fn add_foreign_key(&mut self, table: &Table, fk: &ForeignKey) {
        let target_schema = fk.target_schema(&table.schema).to_string();
        let self_referential = target_schema == table.schema && fk.referenced_table == table.name;
        let forward = Relation {
            kind: RelationKind::ManyToOne,
            source_schema: table.schema.clone(),
            source_table: table.name.clone(),
            source_column: fk.column.clone(),
            target_schema: target_schema.clone(),
            target_table: fk.referenced_table.clone(),
            target_column: fk.referenced_column.clone(),
            foreign_key: fk.name.clone(),
            self_referential,
            join: None,
        };
        let reverse = Relation {
            kind: RelationKind::OneToMany,
            source_schema: target_schema,
            source_table: fk.referenced_table.clone(),
            source_column: fk.referenced_column.clone(),
            target_schema: table.schema.clone(),
            target_table: table.name.clone(),
            target_column: fk.column.clone(),
            ..forward.clone()
        };

        let one_to_one = is_one_to_one(table, &fk.column).then(|| {
            let forward = Relation {
                kind: RelationKind::OneToOne,
                ..forward.clone()
            };
            let reverse = Relation {
                kind: RelationKind::OneToOne,
                ..reverse.clone()
            };
            [forward, reverse]
        });
        self.push(forward);
        self.push(reverse);
        for relation in one_to_one.into_iter().flatten() {
            self.push(relation);
        }
    }

    /// Adds `from.referenced_table -> to.referenced_table` through `join`.
    fn add_many_to_many(&mut self, join: &Table, from: &ForeignKey, to: &ForeignKey) {
        self.push(Relation {
            kind: RelationKind::ManyToMany,
            source_schema: from.target_schema(&join.schema).to_string(),
            source_table: from.referenced_table.clone(),
            source_column: from.referenced_column.clone(),
            target_schema: to.target_schema(&join.schema).to_string(),
            target_table: to.referenced_table.clone(),
            target_column: to.referenced_column.clone(),
            foreign_key: from.name.clone(),
            self_referential: false,
            join: Some(JoinTable {
                schema: join.schema.clone(),
                table: join.name.clone(),
                source_column: from.column.clone(),
                target_column: to.column.clone(),
            }),
        });
    }
}

/// A referencing column is one-to-one when it is unique or the sole
/// primary-key column.
fn is_one_to_one(table: &Table, column: &str) -> bool {
    let unique = table.column(column).is_some_and(|c| c.unique);
    let sole_key = matches!(table.primary_key_columns().as_slice(), [pk] if pk.name == column);
    unique || sole_key
}

/// Returns the two foreign keys of a join table.
///
/// A join table has exactly two foreign keys on different columns, aimed at
/// two distinct tables other than itself, and every other column is a
/// primary key or has a default.
fn join_keys(table: &Table) -> Option<(&ForeignKey, &ForeignKey)> {
    let [a, b] = table.foreign_keys() else {
        return None;
    };
    let target = |fk: &ForeignKey| {
        (
            fk.target_schema(&table.schema).to_string(),
            fk.referenced_table.clone(),
        )
    };
    let own = (table.schema.clone(), table.name.clone());
    if a.column == b.column || target(a) == target(b) || target(a) == own || target(b) == own {
        return None;
    }
    let others_covered = table
        .columns()
        .iter()
        .filter(|c| c.name != a.column && c.name != b.column)
        .all(|c| c.primary_key || c.default.is_some());
    others_covered.then_some((a, b))
}
