//! Replays migrations into a fresh catalog.

use oxide_ddl::ParseContext;
use tracing::{info, info_span};

use crate::apply::apply_sql;
use crate::catalog::Catalog;
use crate::config::ReplayConfig;
use crate::error::{CatalogError, Result};

/// One migration file: its path and its comment-stripped statements in
/// file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Migration {
    /// Path or name of the migration file.
    pub file: String,
    /// Statements in file order.
    pub statements: Vec<String>,
}

impl Migration {
    /// Creates a migration with no statements.
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            statements: Vec::new(),
        }
    }

    /// Appends a statement.
    #[must_use]
    pub fn statement(mut self, sql: impl Into<String>) -> Self {
        self.statements.push(sql.into());
        self
    }

    /// Appends several statements.
    #[must_use]
    pub fn statements<I, S>(mut self, statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statements.extend(statements.into_iter().map(Into::into));
        self
    }
}

/// Builds a catalog by applying migrations one statement at a time.
///
/// # Example
///
/// ```rust
/// use oxide_catalog::{Migration, ReplayConfig, Replayer};
///
/// let replayer = Replayer::new(ReplayConfig::default()).unwrap();
/// replayer
///     .apply_migration(
///         &Migration::new("0001_users.sql")
///             .statement("CREATE TABLE users (id uuid PRIMARY KEY, email text NOT NULL)"),
///     )
///     .unwrap();
/// replayer
///     .apply_sql("0002_name.sql", "ALTER TABLE users ADD COLUMN name text")
///     .unwrap();
///
/// let users = replayer.catalog().get_table("public", "users").unwrap();
/// assert_eq!(users.columns().len(), 3);
/// ```
#[derive(Debug)]
pub struct Replayer {
    catalog: Catalog,
    config: ReplayConfig,
}

impl Replayer {
    /// Creates a replayer with an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Configuration`] if the configuration is
    /// invalid.
    pub fn new(config: ReplayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog: Catalog::with_default_schema(config.default_schema.clone()),
            config,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Returns the catalog built so far.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Consumes the replayer and returns its catalog.
    #[must_use]
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Parses and applies one statement attributed to `file`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Statement`] wrapping the parse or catalog
    /// error.
    pub fn apply_sql(&self, file: &str, sql: &str) -> Result<()> {
        let ctx = ParseContext::new(file, self.config.database_family);
        apply_sql(&self.catalog, sql, &ctx).map_err(|source| CatalogError::Statement {
            file: file.to_string(),
            statement: sql.trim().to_string(),
            source: Box::new(source),
        })
    }

    /// Applies every statement of a migration in order.
    ///
    /// # Errors
    ///
    /// Returns the first failing statement's error; later statements are
    /// not applied.
    pub fn apply_migration(&self, migration: &Migration) -> Result<()> {
        let span = info_span!("migration", file = %migration.file);
        let _enter = span.enter();

        for sql in &migration.statements {
            self.apply_sql(&migration.file, sql)?;
        }
        info!(
            file = %migration.file,
            statements = migration.statements.len(),
            "applied migration"
        );
        Ok(())
    }

    /// Applies migrations in order.
    ///
    /// # Errors
    ///
    /// Returns the first failing statement's error.
    pub fn apply_migrations<'m>(
        &self,
        migrations: impl IntoIterator<Item = &'m Migration>,
    ) -> Result<()> {
        for migration in migrations {
            self.apply_migration(migration)?;
        }
        Ok(())
    }
}

/// Replays migrations in order into a new catalog.
///
/// # Errors
///
/// Returns the configuration error, or the first failing statement wrapped
/// as [`CatalogError::Statement`]. The partial catalog is discarded.
///
/// # Example
///
/// ```rust
/// use oxide_catalog::{replay, Migration, RelationKind, ReplayConfig};
///
/// let migrations = [
///     Migration::new("0001_users.sql").statement("CREATE TABLE users (id uuid PRIMARY KEY)"),
///     Migration::new("0002_posts.sql").statement(
///         "CREATE TABLE posts (id uuid PRIMARY KEY, user_id uuid NOT NULL REFERENCES users(id))",
///     ),
/// ];
/// let catalog = replay(&migrations, &ReplayConfig::default()).unwrap();
///
/// let graph = catalog.relationship_graph();
/// assert_eq!(graph.relations_for("users")[0].kind, RelationKind::OneToMany);
/// ```
pub fn replay<'m>(
    migrations: impl IntoIterator<Item = &'m Migration>,
    config: &ReplayConfig,
) -> Result<Catalog> {
    let replayer = Replayer::new(config.clone())?;
    replayer.apply_migrations(migrations)?;
    let catalog = replayer.into_catalog();
    info!(
        schemas = catalog.schema_names().len(),
        tables = catalog.table_count(),
        "replay complete"
    );
    Ok(catalog)
}
