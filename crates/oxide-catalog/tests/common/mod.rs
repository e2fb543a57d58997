#![allow(dead_code)]

use oxide_catalog::{replay, Catalog, CatalogError, Migration, ReplayConfig, Replayer, Table};
use oxide_ddl::DatabaseFamily;

/// Builds a migration from `;`-separated statements.
pub fn migration(file: &str, script: &str) -> Migration {
    Migration::new(file).statements(
        script
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty()),
    )
}

pub fn replay_with(migrations: &[Migration], family: DatabaseFamily) -> Catalog {
    replay(migrations, &ReplayConfig::new(family))
        .unwrap_or_else(|e| panic!("Replay failed: {e}"))
}

pub fn replay_all(migrations: &[Migration]) -> Catalog {
    replay_with(migrations, DatabaseFamily::Postgres)
}

pub fn replay_err_with(migrations: &[Migration], family: DatabaseFamily) -> CatalogError {
    match replay(migrations, &ReplayConfig::new(family)) {
        Ok(_) => panic!("Expected replay to fail"),
        Err(e) => e,
    }
}

pub fn replay_err(migrations: &[Migration]) -> CatalogError {
    replay_err_with(migrations, DatabaseFamily::Postgres)
}

/// Replays a single script as `0001_initial.sql`.
pub fn replay_sql(script: &str) -> Catalog {
    replay_all(&[migration("0001_initial.sql", script)])
}

pub fn replayer() -> Replayer {
    Replayer::new(ReplayConfig::default()).unwrap_or_else(|e| panic!("Invalid config: {e}"))
}

pub fn run(replayer: &Replayer, file: &str, sql: &str) {
    replayer
        .apply_sql(file, sql)
        .unwrap_or_else(|e| panic!("Failed to apply: {sql}\nError: {e}"));
}

pub fn table(catalog: &Catalog, name: &str) -> Table {
    catalog
        .get_table(catalog.default_schema(), name)
        .unwrap_or_else(|e| panic!("Missing table {name}: {e}"))
}

pub fn column_names(table: &Table) -> Vec<&str> {
    table.columns().iter().map(|c| c.name.as_str()).collect()
}
