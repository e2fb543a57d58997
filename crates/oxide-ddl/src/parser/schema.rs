//! CREATE SCHEMA and DROP SCHEMA parsing.

use super::cursor::Cursor;
use super::{name_list, ParseContext};
use crate::error::ParseError;
use crate::lexer::unquote_identifier;
use crate::statement::{CreateSchema, DropSchema};

/// Parses `CREATE SCHEMA [IF NOT EXISTS] name [AUTHORIZATION role]`.
///
/// `CREATE SCHEMA AUTHORIZATION role` names the schema after the role.
///
/// # Errors
///
/// Returns a syntax error when no schema name is given.
pub fn parse_create_schema(sql: &str, ctx: &ParseContext<'_>) -> Result<CreateSchema, ParseError> {
    let mut cursor = Cursor::new(sql, ctx.file);
    cursor.expect_keyword("create")?;
    cursor.expect_keyword("schema")?;
    let if_not_exists = cursor.eat_keywords(&["if", "not", "exists"]);
    cursor.eat_keyword("authorization");
    let name = cursor.expect_identifier("schema name")?;
    if cursor.eat_keyword("authorization") {
        cursor.expect_word("role name")?;
    }
    cursor.expect_end()?;
    Ok(CreateSchema { name, if_not_exists })
}

/// Parses `DROP SCHEMA [IF EXISTS] name[, name...] [CASCADE|RESTRICT]`.
///
/// # Errors
///
/// Returns a syntax error when no schema name is given.
pub fn parse_drop_schema(sql: &str, ctx: &ParseContext<'_>) -> Result<DropSchema, ParseError> {
    let mut cursor = Cursor::new(sql, ctx.file);
    cursor.expect_keyword("drop")?;
    cursor.expect_keyword("schema")?;
    let if_exists = cursor.eat_keywords(&["if", "exists"]);
    let (names, cascade) = name_list(&mut cursor, "schema name")?;
    Ok(DropSchema {
        names: names.iter().map(|n| unquote_identifier(n)).collect(),
        if_exists,
        cascade,
    })
}
