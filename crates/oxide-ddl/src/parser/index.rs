//! CREATE INDEX and DROP INDEX parsing.

use super::cursor::Cursor;
use super::{name_list, qualified_name, ParseContext};
use crate::error::ParseError;
use crate::lexer::{is_keyword, split_call, split_clauses, split_words, unquote_identifier};
use crate::statement::{CreateIndex, DropIndex};

/// Parses `CREATE [UNIQUE] INDEX [CONCURRENTLY] [IF NOT EXISTS] [name] ON
/// [ONLY] table [USING method] (columns)`.
///
/// Plain column references are unquoted; expressions are kept as written.
/// Trailing `INCLUDE`, `WITH` and `WHERE` clauses are ignored.
///
/// # Errors
///
/// Returns a syntax error when `ON`, the table name or the column list is
/// missing.
pub fn parse_create_index(sql: &str, ctx: &ParseContext<'_>) -> Result<CreateIndex, ParseError> {
    let mut cursor = Cursor::new(sql, ctx.file);
    cursor.expect_keyword("create")?;
    let unique = cursor.eat_keyword("unique");
    cursor.expect_keyword("index")?;
    cursor.eat_keyword("concurrently");
    let if_not_exists = cursor.eat_keywords(&["if", "not", "exists"]);

    let name = if cursor.check_keyword("on") {
        None
    } else {
        Some(cursor.expect_identifier("index name")?)
    };
    cursor.expect_keyword("on")?;
    cursor.eat_keyword("only");

    let table_word = cursor.expect_word("table name")?;
    let table = qualified_name(split_call(&table_word).0);
    let mut group = cursor.take_group(&table_word);
    if group.is_none() && cursor.eat_keyword("using") {
        let method = cursor.expect_word("index method")?;
        group = cursor.take_group(&method);
    }
    let body = group.ok_or_else(|| cursor.error("expected indexed column list"))?;
    let columns: Vec<String> = split_clauses(&body).iter().map(|c| index_column(c)).collect();
    if columns.is_empty() {
        return Err(cursor.error("empty indexed column list"));
    }

    Ok(CreateIndex {
        name,
        table,
        columns,
        unique,
        if_not_exists,
    })
}

/// Reduces `col [ASC|DESC] [NULLS FIRST|LAST]` to the column name.
fn index_column(clause: &str) -> String {
    let mut words = split_words(clause);
    while words.last().is_some_and(|w| {
        ["asc", "desc", "first", "last", "nulls"]
            .iter()
            .any(|kw| is_keyword(w, kw))
    }) {
        words.pop();
    }
    match words.as_slice() {
        [column] if !column.contains('(') => unquote_identifier(column),
        _ => clause.trim().to_string(),
    }
}

/// Parses `DROP INDEX [CONCURRENTLY] [IF EXISTS] name[, name...] [CASCADE|RESTRICT]`.
///
/// # Errors
///
/// Returns a syntax error when no index name is given.
pub fn parse_drop_index(sql: &str, ctx: &ParseContext<'_>) -> Result<DropIndex, ParseError> {
    let mut cursor = Cursor::new(sql, ctx.file);
    cursor.expect_keyword("drop")?;
    cursor.expect_keyword("index")?;
    cursor.eat_keyword("concurrently");
    let if_exists = cursor.eat_keywords(&["if", "exists"]);
    let (names, _) = name_list(&mut cursor, "index name")?;
    Ok(DropIndex {
        names: names.iter().map(|n| qualified_name(n)).collect(),
        if_exists,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::DatabaseFamily;
    use crate::statement::QualifiedName;

    const CTX: ParseContext<'static> = ParseContext::new("0005_idx.sql", DatabaseFamily::Postgres);

    fn create(sql: &str) -> CreateIndex {
        parse_create_index(sql, &CTX).unwrap_or_else(|e| panic!("failed to parse `{sql}`: {e}"))
    }

    #[test]
    fn test_create_index() {
        let idx = create(
            "CREATE UNIQUE INDEX CONCURRENTLY IF NOT EXISTS users_email_idx \
             ON public.users (email DESC NULLS LAST)",
        );
        assert!(idx.unique);
        assert!(idx.if_not_exists);
        assert_eq!(idx.name.as_deref(), Some("users_email_idx"));
        assert_eq!(idx.table, QualifiedName::qualified("public", "users"));
        assert_eq!(idx.columns, vec!["email"]);
    }

    #[test]
    fn test_attached_groups_and_methods() {
        let idx = create("create index on posts(author_id, \"Created\")");
        assert_eq!(idx.name, None);
        assert_eq!(idx.table.name, "posts");
        assert_eq!(idx.columns, vec!["author_id", "Created"]);

        let idx =
            create("CREATE INDEX tags_idx ON ONLY posts USING gin(tags) WHERE tags IS NOT NULL");
        assert_eq!(idx.columns, vec!["tags"]);

        let idx = create("CREATE INDEX lower_email ON users USING btree (lower(email))");
        assert_eq!(idx.columns, vec!["lower(email)"]);
    }

    #[test]
    fn test_create_index_errors() {
        assert!(parse_create_index("CREATE INDEX i users (a)", &CTX).unwrap_err().is_syntax());
        assert!(parse_create_index("CREATE INDEX i ON users", &CTX).unwrap_err().is_syntax());
    }

    #[test]
    fn test_drop_index() {
        let stmt = parse_drop_index("DROP INDEX CONCURRENTLY IF EXISTS a, s.b", &CTX).unwrap();
        assert!(stmt.if_exists);
        assert_eq!(stmt.names, vec![QualifiedName::new("a"), QualifiedName::qualified("s", "b")]);
    }
}
