//! DDL statement parsers.
//!
//! [`parse_statement`] classifies a statement by its leading keywords and
//! hands it to the parser for that kind. Statements outside the modeled DDL
//! subset come back as [`Statement::Unknown`].

mod alter_table;
mod column;
mod constraint;
mod create_table;
mod cursor;
mod drop_table;
mod enums;
mod index;
mod schema;

pub use alter_table::{parse_alter_operation, parse_alter_table};
pub use column::{parse_column_definition, ColumnDefinition};
pub use constraint::parse_table_constraint;
pub use create_table::parse_create_table;
pub use cursor::Cursor;
pub use drop_table::parse_drop_table;
pub use enums::{parse_create_enum, parse_drop_enum};
pub use index::{parse_create_index, parse_drop_index};
pub use schema::{parse_create_schema, parse_drop_schema};

use tracing::debug;

use crate::error::ParseError;
use crate::family::DatabaseFamily;
use crate::lexer::{
    is_keyword, split_call, split_clauses, split_qualified_name, split_words, unquote_identifier,
};
use crate::schema::ReferentialAction;
use crate::statement::{ForeignKeyConstraint, QualifiedName, Statement};

/// Where a statement came from and which database it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext<'a> {
    /// Migration file the statement belongs to.
    pub file: &'a str,
    /// Target database family, used for primary-key type checks.
    pub family: DatabaseFamily,
}

impl<'a> ParseContext<'a> {
    /// Creates a parse context.
    #[must_use]
    pub const fn new(file: &'a str, family: DatabaseFamily) -> Self {
        Self { file, family }
    }
}

/// Parses one comment-stripped DDL statement.
///
/// Leading keywords are matched case-insensitively; a trailing `;` is
/// ignored.
///
/// # Errors
///
/// Returns a syntax error for empty input or a malformed statement of a
/// recognized kind, and [`ParseError::PrimaryKeyType`] when a primary-key
/// column violates the family's type rule.
///
/// # Example
///
/// ```rust
/// use oxide_ddl::{parse_statement, DatabaseFamily, ParseContext, Statement};
///
/// let ctx = ParseContext::new("0001_init.sql", DatabaseFamily::Postgres);
/// let stmt = parse_statement("CREATE TABLE users (id uuid PRIMARY KEY);", &ctx).unwrap();
/// assert!(matches!(stmt, Statement::CreateTable(_)));
///
/// let other = parse_statement("CREATE VIEW v AS SELECT 1", &ctx).unwrap();
/// assert!(matches!(other, Statement::Unknown(_)));
/// ```
pub fn parse_statement(sql: &str, ctx: &ParseContext<'_>) -> Result<Statement, ParseError> {
    let sql = sql.trim().trim_end_matches(';').trim_end();
    if sql.is_empty() {
        return Err(ParseError::syntax(ctx.file, sql, "empty statement"));
    }

    let words = split_words(sql);
    let word = |i: usize| words.get(i).map_or("", String::as_str);
    let kw = |i: usize, keyword: &str| is_keyword(word(i), keyword);

    let statement = if kw(0, "create") {
        let mut i = 1;
        if kw(i, "global") || kw(i, "local") {
            i += 1;
        }
        if kw(i, "temp") || kw(i, "temporary") || kw(i, "unlogged") {
            i += 1;
        }
        if kw(i, "table") {
            Statement::CreateTable(parse_create_table(sql, ctx)?)
        } else if kw(1, "index") || (kw(1, "unique") && kw(2, "index")) {
            Statement::CreateIndex(parse_create_index(sql, ctx)?)
        } else if kw(1, "schema") {
            Statement::CreateSchema(parse_create_schema(sql, ctx)?)
        } else if kw(1, "type") && is_enum_definition(&words) {
            Statement::CreateEnum(parse_create_enum(sql, ctx)?)
        } else {
            Statement::Unknown(sql.to_string())
        }
    } else if kw(0, "alter") && kw(1, "table") {
        Statement::AlterTable(parse_alter_table(sql, ctx)?)
    } else if kw(0, "drop") && kw(1, "table") {
        Statement::DropTable(parse_drop_table(sql, ctx)?)
    } else if kw(0, "drop") && kw(1, "index") {
        Statement::DropIndex(parse_drop_index(sql, ctx)?)
    } else if kw(0, "drop") && kw(1, "schema") {
        Statement::DropSchema(parse_drop_schema(sql, ctx)?)
    } else if kw(0, "drop") && kw(1, "type") {
        Statement::DropEnum(parse_drop_enum(sql, ctx)?)
    } else {
        Statement::Unknown(sql.to_string())
    };

    debug!(file = ctx.file, kind = statement.kind(), "parsed statement");
    Ok(statement)
}

/// `CREATE TYPE name AS ENUM ...`: `AS` directly followed by `ENUM`.
fn is_enum_definition(words: &[String]) -> bool {
    words
        .windows(2)
        .any(|pair| is_keyword(&pair[0], "as") && is_keyword(&pair[1], "enum"))
}

/// Parses a possibly qualified, possibly quoted object name.
pub(crate) fn qualified_name(raw: &str) -> QualifiedName {
    let (schema, name) = split_qualified_name(raw);
    QualifiedName { schema, name }
}

/// Parses a parenthesized identifier list body: `a, "B", c`.
pub(crate) fn identifier_list(inner: &str) -> Vec<String> {
    split_clauses(inner)
        .iter()
        .map(|ident| unquote_identifier(ident))
        .collect()
}

/// Collects the comma-separated names that remain on the cursor, stripping a
/// trailing `CASCADE` or `RESTRICT`.
///
/// Returns the names and whether `CASCADE` was given.
pub(crate) fn name_list(
    cursor: &mut Cursor<'_>,
    what: &str,
) -> Result<(Vec<String>, bool), ParseError> {
    let mut rest = cursor.take_rest();
    let mut cascade = false;
    if let Some(last) = rest.last() {
        if is_keyword(last, "cascade") {
            cascade = true;
            rest.pop();
        } else if is_keyword(last, "restrict") {
            rest.pop();
        }
    }
    let names = split_clauses(&rest.join(" "));
    if names.is_empty() {
        return Err(cursor.error(format!("expected {what}")));
    }
    Ok((names, cascade))
}

/// Parses `REFERENCES` onwards: `table[(cols)] [ON DELETE a] [ON UPDATE a]`.
///
/// The cursor must be positioned just after `REFERENCES`. The returned
/// constraint has no name or referencing columns; callers fill those in.
/// Referenced columns are empty when not written.
pub(crate) fn parse_references(
    cursor: &mut Cursor<'_>,
) -> Result<ForeignKeyConstraint, ParseError> {
    let target = cursor.expect_word("referenced table")?;
    let (schema, table) = split_qualified_name(split_call(&target).0);
    if table.is_empty() {
        return Err(cursor.error("expected referenced table"));
    }
    let referenced_columns = cursor
        .take_group(&target)
        .map(|group| identifier_list(&group))
        .unwrap_or_default();

    let mut on_delete = ReferentialAction::default();
    let mut on_update = ReferentialAction::default();
    loop {
        if cursor.check_keyword("on") {
            cursor.advance();
            let event = cursor.expect_word("DELETE or UPDATE")?;
            let (action, len) = ReferentialAction::from_words(cursor.remaining()).ok_or_else(|| {
                cursor.error(format!("invalid referential action after ON {event}"))
            })?;
            cursor.skip(len);
            if is_keyword(&event, "delete") {
                on_delete = action;
            } else if is_keyword(&event, "update") {
                on_update = action;
            } else {
                return Err(cursor.error(format!(
                    "expected DELETE or UPDATE after ON, found '{event}'"
                )));
            }
        } else if cursor.eat_keyword("match") {
            cursor.expect_word("match type")?;
        } else if cursor.eat_keyword("initially") {
            cursor.expect_word("DEFERRED or IMMEDIATE")?;
        } else if !(cursor.eat_keyword("deferrable")
            || cursor.eat_keywords(&["not", "deferrable"]))
        {
            break;
        }
    }

    Ok(ForeignKeyConstraint {
        name: None,
        columns: Vec::new(),
        referenced_schema: schema,
        referenced_table: table,
        referenced_columns,
        on_delete,
        on_update,
    })
}
