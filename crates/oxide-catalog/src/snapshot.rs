//! Serializable catalog snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::{Schema, Table};

/// A point-in-time copy of the catalog for external tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Default schema name.
    pub default_schema: String,
    /// All schemas, sorted by name.
    pub schemas: BTreeMap<String, Schema>,
}

impl CatalogSnapshot {
    /// Gets a table by schema and name.
    #[must_use]
    pub fn table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.schemas.get(schema).and_then(|s| s.table(name))
    }

    /// Renders the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`](crate::CatalogError::Serialization)
    /// if rendering fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
