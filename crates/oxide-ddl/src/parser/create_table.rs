//! CREATE TABLE parsing.

use tracing::trace;

use super::cursor::Cursor;
use super::{parse_column_definition, parse_table_constraint, qualified_name, ParseContext};
use crate::error::ParseError;
use crate::lexer::{split_call, split_clauses};
use crate::schema::Column;
use crate::statement::{CreateTable, TableConstraint};

/// Parses `CREATE [TEMP|TEMPORARY|UNLOGGED] TABLE [IF NOT EXISTS] name (...)`.
///
/// Table-level primary keys are folded into the column flags and checked
/// against the database family. Foreign keys from inline `REFERENCES` and
/// table-level `FOREIGN KEY` clauses are returned in the order written.
///
/// # Errors
///
/// Returns a syntax error for a missing or empty column list, a duplicate
/// column, a table-level primary key naming an unknown column, or any
/// malformed clause.
pub fn parse_create_table(sql: &str, ctx: &ParseContext<'_>) -> Result<CreateTable, ParseError> {
    let mut cursor = Cursor::new(sql, ctx.file);
    cursor.expect_keyword("create")?;
    cursor.eat_any_keyword(&["global", "local"]);
    cursor.eat_any_keyword(&["temp", "temporary", "unlogged"]);
    cursor.expect_keyword("table")?;
    let if_not_exists = cursor.eat_keywords(&["if", "not", "exists"]);

    let word = cursor.expect_word("table name")?;
    let name = qualified_name(split_call(&word).0);
    if name.name.is_empty() {
        return Err(cursor.error("expected table name"));
    }
    let body = cursor
        .take_group(&word)
        .ok_or_else(|| cursor.error("missing column list"))?;
    if !cursor.is_at_end() {
        trace!(table = %name, options = ?cursor.remaining(), "ignoring table options");
    }

    let clauses = split_clauses(&body);
    trace!(table = %name, clauses = clauses.len(), "split column list");
    if clauses.is_empty() {
        return Err(cursor.error("empty column list"));
    }

    let mut columns: Vec<Column> = Vec::new();
    let mut constraints = Vec::new();
    let mut primary_key = Vec::new();
    let mut unique = Vec::new();

    for clause in &clauses {
        match parse_table_constraint(clause, ctx)? {
            Some(TableConstraint::PrimaryKey { columns: pk, .. }) => {
                if !primary_key.is_empty() {
                    return Err(cursor.error("multiple primary keys"));
                }
                primary_key = pk;
            }
            Some(TableConstraint::ForeignKey(fk)) => constraints.push(fk),
            Some(TableConstraint::Unique { columns: cols, .. }) if cols.len() == 1 => {
                unique.extend(cols);
            }
            Some(other) => trace!(table = %name, constraint = ?other, "skipping table constraint"),
            None => {
                let def = parse_column_definition(clause, &name.name, ctx)?;
                if columns.iter().any(|c| c.name == def.column.name) {
                    return Err(cursor.error(format!("duplicate column '{}'", def.column.name)));
                }
                columns.push(def.column);
                constraints.extend(def.foreign_key);
            }
        }
    }

    for pk in &primary_key {
        let column = columns
            .iter_mut()
            .find(|c| c.name == *pk)
            .ok_or_else(|| cursor.error(format!("PRIMARY KEY references unknown column '{pk}'")))?;
        column.primary_key = true;
        column.nullable = false;
        ctx.family.check_primary_key(ctx.file, &name.name, column)?;
    }
    for col in &unique {
        if let Some(column) = columns.iter_mut().find(|c| c.name == *col) {
            column.unique = true;
        }
    }

    let foreign_keys = constraints
        .iter()
        .flat_map(|fk| fk.to_foreign_keys(&name.name, ctx.file))
        .collect();

    Ok(CreateTable {
        name,
        if_not_exists,
        columns,
        foreign_keys,
        primary_key,
    })
}
