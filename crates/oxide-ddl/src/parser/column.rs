//! Column definition parsing, shared by CREATE TABLE and ALTER TABLE ADD COLUMN.

use tracing::trace;

use super::cursor::Cursor;
use super::{parse_references, ParseContext};
use crate::error::ParseError;
use crate::lexer::is_keyword;
use crate::schema::Column;
use crate::statement::ForeignKeyConstraint;
use crate::types::parse_data_type;

/// Words that end the type of a column definition.
const CONSTRAINT_KEYWORDS: &[&str] = &[
    "not",
    "null",
    "primary",
    "key",
    "unique",
    "default",
    "references",
    "check",
    "constraint",
    "collate",
    "generated",
];

fn is_constraint_keyword(word: &str) -> bool {
    CONSTRAINT_KEYWORDS.iter().any(|kw| is_keyword(word, kw))
}

/// A parsed column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    /// The column, with constraints applied.
    pub column: Column,
    /// Inline REFERENCES clause.
    pub foreign_key: Option<ForeignKeyConstraint>,
}

/// Parses `name type [constraints...]`.
///
/// A primary-key column is checked against the database family before
/// returning.
///
/// # Errors
///
/// Returns a syntax error for a missing name or type, or a malformed
/// constraint, and [`ParseError::PrimaryKeyType`] for a primary key of the
/// wrong type.
pub fn parse_column_definition(
    clause: &str,
    table: &str,
    ctx: &ParseContext<'_>,
) -> Result<ColumnDefinition, ParseError> {
    let mut cursor = Cursor::new(clause, ctx.file);
    let name = cursor.expect_identifier("column name")?;

    let mut type_words = Vec::new();
    while let Some(word) = cursor.peek() {
        if is_constraint_keyword(word) {
            break;
        }
        type_words.push(word.to_string());
        cursor.advance();
    }
    if type_words.is_empty() {
        return Err(cursor.error(format!("missing type for column '{name}'")));
    }
    let raw_type = type_words.join(" ");
    let parsed = parse_data_type(&raw_type)
        .ok_or_else(|| cursor.error(format!("invalid type '{raw_type}'")))?;

    let mut column = Column::new(name, parsed.data_type).created_in(ctx.file);
    column.array = parsed.array;

    let mut foreign_key = None;
    let mut constraint_name = None;

    while let Some(word) = cursor.advance() {
        let keyword = word.to_lowercase();
        match keyword.as_str() {
            "not" => {
                cursor.expect_keyword("null")?;
                column.nullable = false;
            }
            "null" => {
                if !column.primary_key {
                    column.nullable = true;
                }
            }
            "primary" => {
                cursor.expect_keyword("key")?;
                column = column.primary_key();
            }
            "unique" => column.unique = true,
            "default" => {
                let mut value = vec![cursor.expect_word("default value")?];
                while let Some(next) = cursor.peek() {
                    if is_constraint_keyword(next) {
                        break;
                    }
                    value.push(next.to_string());
                    cursor.advance();
                }
                column.default = Some(value.join(" "));
            }
            "references" => {
                let mut fk = parse_references(&mut cursor)?;
                if fk.referenced_columns.is_empty() {
                    fk.referenced_columns.push("id".to_string());
                }
                if fk.referenced_columns.len() != 1 {
                    return Err(cursor.error(format!(
                        "column '{}' references {} columns",
                        column.name,
                        fk.referenced_columns.len()
                    )));
                }
                fk.name = constraint_name.take();
                fk.columns = vec![column.name.clone()];
                foreign_key = Some(fk);
            }
            "collate" => {
                cursor.expect_word("collation")?;
            }
            "constraint" => {
                constraint_name = Some(cursor.expect_identifier("constraint name")?);
            }
            "generated" => skip_generated(&mut cursor),
            _ if is_keyword(&word, "check") => {
                cursor.take_group(&word);
            }
            "key" => return Err(cursor.error("KEY without PRIMARY")),
            _ => trace!(word = %word, column = %column.name, "skipping column option"),
        }
    }

    ctx.family.check_primary_key(ctx.file, table, &column)?;

    Ok(ColumnDefinition {
        column,
        foreign_key,
    })
}

/// Skips `GENERATED ALWAYS AS ...` / `GENERATED BY DEFAULT AS IDENTITY`.
fn skip_generated(cursor: &mut Cursor<'_>) {
    loop {
        if cursor.eat_keywords(&["by", "default"]) {
            continue;
        }
        match cursor.peek() {
            Some(word) if !is_constraint_keyword(word) => {
                cursor.advance();
            }
            _ => break,
        }
    }
}
