//! Schema catalog built by replaying DDL migrations.
//!
//! `oxide-catalog` turns an ordered set of migration files into an
//! in-memory model of the database they describe, without connecting to
//! one:
//!
//! - **Catalog** - Schemas, tables, columns, foreign keys and enum types
//!   behind a reader/writer lock
//! - **Applier** - Applies one parsed [`oxide_ddl::Statement`] to the catalog
//! - **Replay** - Runs migrations in order, stopping at the first failure
//! - **Relationships** - One-to-many, many-to-many and one-to-one relations
//!   derived from foreign keys
//! - **Snapshot** - A serializable copy of the catalog for external tools
//!
//! # Example
//!
//! ```rust
//! use oxide_catalog::{replay, Migration, RelationKind, ReplayConfig};
//!
//! let migrations = vec![
//!     Migration::new("0001_users.sql").statement(
//!         "CREATE TABLE users (id uuid PRIMARY KEY, email varchar(320) NOT NULL UNIQUE)",
//!     ),
//!     Migration::new("0002_posts.sql").statements([
//!         "CREATE TABLE posts (id uuid PRIMARY KEY, title text NOT NULL)",
//!         "ALTER TABLE posts ADD COLUMN user_id uuid REFERENCES users(id) ON DELETE CASCADE",
//!     ]),
//! ];
//!
//! let catalog = replay(&migrations, &ReplayConfig::default()).unwrap();
//! let posts = catalog.get_table("public", "posts").unwrap();
//! assert_eq!(posts.foreign_keys()[0].name, "posts_user_id_fkey");
//!
//! let graph = catalog.relationship_graph();
//! assert_eq!(graph.relations_for("posts")[0].kind, RelationKind::ManyToOne);
//! ```

pub mod apply;
pub mod catalog;
pub mod config;
pub mod error;
pub mod relationships;
pub mod replay;
pub mod schema;
pub mod snapshot;

pub use apply::{apply_sql, Applier};
pub use catalog::{Alteration, Catalog};
pub use config::{ReplayConfig, DEFAULT_SCHEMA};
pub use error::{CatalogError, ErrorKind, Result};
pub use relationships::{JoinTable, Relation, RelationKind, RelationshipGraph};
pub use replay::{replay, Migration, Replayer};
pub use schema::{Schema, Table};
pub use snapshot::CatalogSnapshot;
