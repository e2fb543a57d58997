//! Replay configuration.

use oxide_ddl::DatabaseFamily;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// Default schema name used for unqualified tables.
pub const DEFAULT_SCHEMA: &str = "public";

/// Settings for a replay run.
///
/// # Example
///
/// ```rust
/// use oxide_catalog::ReplayConfig;
/// use oxide_ddl::DatabaseFamily;
///
/// let config = ReplayConfig::from_json(r#"{ "database_family": "libsql" }"#).unwrap();
/// assert_eq!(config.database_family, DatabaseFamily::Sqlite);
/// assert_eq!(config.default_schema, "public");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Target database family; decides the mandated primary-key type.
    pub database_family: DatabaseFamily,
    /// Schema that unqualified names resolve to.
    pub default_schema: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            database_family: DatabaseFamily::default(),
            default_schema: DEFAULT_SCHEMA.to_string(),
        }
    }
}

impl ReplayConfig {
    /// Creates a configuration for the given database family.
    #[must_use]
    pub fn new(database_family: DatabaseFamily) -> Self {
        Self {
            database_family,
            ..Self::default()
        }
    }

    /// Sets the database family.
    #[must_use]
    pub const fn with_family(mut self, database_family: DatabaseFamily) -> Self {
        self.database_family = database_family;
        self
    }

    /// Sets the default schema name.
    #[must_use]
    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }

    /// Checks that the configuration can drive a replay.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Configuration`] for an empty default schema.
    pub fn validate(&self) -> Result<()> {
        if self.default_schema.trim().is_empty() {
            return Err(CatalogError::Configuration(
                "default schema name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Reads a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialization`] for malformed JSON or an
    /// unknown database family, and [`CatalogError::Configuration`] when
    /// the result fails [`ReplayConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReplayConfig::default();
        assert_eq!(config.database_family, DatabaseFamily::Postgres);
        assert_eq!(config.default_schema, DEFAULT_SCHEMA);

        let config = ReplayConfig::from_json("{}").unwrap();
        assert_eq!(config, ReplayConfig::default());
    }

    #[test]
    fn test_builders_and_json() {
        let config = ReplayConfig::new(DatabaseFamily::Sqlite).with_default_schema("main");
        assert_eq!(config.default_schema, "main");
        assert_eq!(
            config.clone().with_family(DatabaseFamily::Postgres).database_family,
            DatabaseFamily::Postgres
        );

        let config =
            ReplayConfig::from_json(r#"{"database_family":"pg","default_schema":"app"}"#).unwrap();
        assert_eq!(config.database_family, DatabaseFamily::Postgres);
        assert_eq!(config.default_schema, "app");

        assert!(ReplayConfig::from_json(r#"{"database_family":"oracle"}"#).is_err());
        assert!(matches!(
            ReplayConfig::from_json(r#"{"default_schema":"  "}"#),
            Err(CatalogError::Configuration(_))
        ));
    }
}
