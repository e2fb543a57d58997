//! Table-level constraint parsing.

use super::cursor::Cursor;
use super::{identifier_list, parse_references, ParseContext};
use crate::error::ParseError;
use crate::statement::TableConstraint;

/// Parses `[CONSTRAINT name] PRIMARY KEY|FOREIGN KEY|UNIQUE|CHECK|EXCLUDE ...`.
///
/// Returns `Ok(None)` when the clause is not a table constraint, which in a
/// CREATE TABLE body means it is a column definition. A named constraint of
/// an unmodeled kind is returned as [`TableConstraint::Other`].
///
/// # Errors
///
/// Returns a syntax error for a malformed constraint, including a foreign
/// key whose referencing and referenced column counts differ.
pub fn parse_table_constraint(
    clause: &str,
    ctx: &ParseContext<'_>,
) -> Result<Option<TableConstraint>, ParseError> {
    let mut cursor = Cursor::new(clause, ctx.file);
    let name = if cursor.eat_keyword("constraint") {
        Some(cursor.expect_identifier("constraint name")?)
    } else {
        None
    };

    if cursor.check_keyword("primary") && cursor.check_keyword_at(1, "key") {
        cursor.advance();
        let key = cursor.expect_keyword("key")?;
        let columns = identifier_list(&cursor.expect_group(&key, "columns")?);
        if columns.is_empty() {
            return Err(cursor.error("empty PRIMARY KEY column list"));
        }
        return Ok(Some(TableConstraint::PrimaryKey { name, columns }));
    }

    if cursor.check_keyword("foreign") && cursor.check_keyword_at(1, "key") {
        cursor.advance();
        let key = cursor.expect_keyword("key")?;
        let columns = identifier_list(&cursor.expect_group(&key, "columns")?);
        if columns.is_empty() {
            return Err(cursor.error("empty FOREIGN KEY column list"));
        }
        cursor.expect_keyword("references")?;
        let mut fk = parse_references(&mut cursor)?;
        if fk.referenced_columns.is_empty() && columns.len() == 1 {
            fk.referenced_columns.push("id".to_string());
        }
        if fk.referenced_columns.len() != columns.len() {
            return Err(cursor.error(format!(
                "FOREIGN KEY has {} columns but references {}",
                columns.len(),
                fk.referenced_columns.len()
            )));
        }
        fk.name = name;
        fk.columns = columns;
        return Ok(Some(TableConstraint::ForeignKey(fk)));
    }

    if cursor.check_keyword("unique") {
        let word = cursor.advance().unwrap_or_default();
        let columns = identifier_list(&cursor.expect_group(&word, "columns")?);
        return Ok(Some(TableConstraint::Unique { name, columns }));
    }

    if cursor.check_keyword("check") {
        let word = cursor.advance().unwrap_or_default();
        let expression = cursor.expect_group(&word, "expression")?;
        return Ok(Some(TableConstraint::Check { name, expression }));
    }

    if cursor.check_keyword("exclude") || name.is_some() {
        return Ok(Some(TableConstraint::Other(clause.trim().to_string())));
    }

    Ok(None)
}
