//! Hand-written DDL parser for schema migration scripts.
//!
//! `oxide-ddl` turns comment-stripped DDL statements into typed
//! [`Statement`] values without a parser generator:
//!
//! - **Lexer** - Quote- and paren-aware clause and word splitting
//! - **Types** - Column type parsing into a canonical family plus parameters
//! - **Parser** - One parser per statement kind, behind [`parse_statement`]
//! - **Family** - Target database families and their primary-key type rules
//!
//! Statements outside the modeled subset are returned as
//! [`Statement::Unknown`] so that a migration can be replayed even when it
//! contains views, functions or data changes.
//!
//! # Example
//!
//! ```rust
//! use oxide_ddl::{parse_statement, DatabaseFamily, ParseContext, Statement};
//!
//! let ctx = ParseContext::new("0002_posts.sql", DatabaseFamily::Postgres);
//! let stmt = parse_statement(
//!     "CREATE TABLE posts (
//!         id uuid PRIMARY KEY,
//!         user_id uuid NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!         title varchar(200) NOT NULL
//!     )",
//!     &ctx,
//! )
//! .unwrap();
//!
//! let Statement::CreateTable(create) = stmt else { unreachable!() };
//! assert_eq!(create.columns.len(), 3);
//! assert_eq!(create.foreign_keys[0].name, "posts_user_id_fkey");
//! ```

pub mod error;
pub mod family;
pub mod lexer;
pub mod parser;
pub mod schema;
pub mod statement;
pub mod types;

pub use error::ParseError;
pub use family::DatabaseFamily;
pub use parser::{parse_statement, ParseContext};
pub use schema::{Column, EnumType, ForeignKey, Index, ReferentialAction};
pub use statement::{
    AlterOperation, AlterTable, ColumnChange, CreateEnum, CreateIndex, CreateSchema, CreateTable,
    DropEnum, DropIndex, DropSchema, DropTable, ForeignKeyConstraint, QualifiedName, Statement,
    TableConstraint,
};
pub use types::{parse_data_type, DataType, ParsedType};
