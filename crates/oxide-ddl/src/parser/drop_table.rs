//! DROP TABLE parsing.

use super::cursor::Cursor;
use super::{name_list, qualified_name, ParseContext};
use crate::error::ParseError;
use crate::statement::DropTable;

/// Parses `DROP TABLE [IF EXISTS] name[, name...] [CASCADE|RESTRICT]`.
///
/// # Errors
///
/// Returns a syntax error when no table name is given.
pub fn parse_drop_table(sql: &str, ctx: &ParseContext<'_>) -> Result<DropTable, ParseError> {
    let mut cursor = Cursor::new(sql, ctx.file);
    cursor.expect_keyword("drop")?;
    cursor.expect_keyword("table")?;
    let if_exists = cursor.eat_keywords(&["if", "exists"]);
    let (names, cascade) = name_list(&mut cursor, "table name")?;

    Ok(DropTable {
        names: names.iter().map(|n| qualified_name(n)).collect(),
        if_exists,
        cascade,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::DatabaseFamily;
    use crate::statement::QualifiedName;

    const CTX: ParseContext<'static> = ParseContext::new("0009.sql", DatabaseFamily::Sqlite);

    #[test]
    fn test_drop_table() {
        let stmt = parse_drop_table("DROP TABLE IF EXISTS a, app.b CASCADE", &CTX).unwrap();
        assert!(stmt.if_exists);
        assert!(stmt.cascade);
        assert_eq!(
            stmt.names,
            vec![QualifiedName::new("a"), QualifiedName::qualified("app", "b")]
        );

        let stmt = parse_drop_table("drop table users restrict", &CTX).unwrap();
        assert!(!stmt.if_exists);
        assert!(!stmt.cascade);
        assert_eq!(stmt.names, vec![QualifiedName::new("users")]);
    }

    #[test]
    fn test_missing_name() {
        assert!(parse_drop_table("DROP TABLE", &CTX).unwrap_err().is_syntax());
        assert!(parse_drop_table("DROP TABLE IF EXISTS CASCADE", &CTX).unwrap_err().is_syntax());
    }
}
