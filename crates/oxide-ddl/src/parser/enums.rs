//! CREATE TYPE ... AS ENUM and DROP TYPE parsing.

use super::cursor::Cursor;
use super::{name_list, qualified_name, ParseContext};
use crate::error::ParseError;
use crate::lexer::{split_clauses, unquote_literal};
use crate::statement::{CreateEnum, DropEnum};

/// Parses `CREATE TYPE name AS ENUM ('a', 'b', ...)`.
///
/// Values are unquoted, with doubled quotes unescaped.
///
/// # Errors
///
/// Returns a syntax error for a missing value list or a value that is not a
/// string literal.
pub fn parse_create_enum(sql: &str, ctx: &ParseContext<'_>) -> Result<CreateEnum, ParseError> {
    let mut cursor = Cursor::new(sql, ctx.file);
    cursor.expect_keyword("create")?;
    cursor.expect_keyword("type")?;
    let name = qualified_name(&cursor.expect_word("type name")?);
    cursor.expect_keyword("as")?;
    let keyword = cursor.expect_keyword("enum")?;
    let body = cursor.expect_group(&keyword, "values")?;
    cursor.expect_end()?;

    let values = split_clauses(&body)
        .iter()
        .map(|value| {
            unquote_literal(value)
                .ok_or_else(|| cursor.error(format!("enum value {value} is not a string literal")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CreateEnum { name, values })
}

/// Parses `DROP TYPE [IF EXISTS] name[, name...] [CASCADE|RESTRICT]`.
///
/// # Errors
///
/// Returns a syntax error when no type name is given.
pub fn parse_drop_enum(sql: &str, ctx: &ParseContext<'_>) -> Result<DropEnum, ParseError> {
    let mut cursor = Cursor::new(sql, ctx.file);
    cursor.expect_keyword("drop")?;
    cursor.expect_keyword("type")?;
    let if_exists = cursor.eat_keywords(&["if", "exists"]);
    let (names, _) = name_list(&mut cursor, "type name")?;
    Ok(DropEnum {
        names: names.iter().map(|n| qualified_name(n)).collect(),
        if_exists,
    })
}
