//! ALTER TABLE parsing.

use tracing::trace;

use super::cursor::Cursor;
use super::{parse_column_definition, parse_table_constraint, qualified_name, ParseContext};
use crate::error::ParseError;
use crate::lexer::{is_keyword, split_clauses, split_qualified_name};
use crate::statement::{AlterOperation, AlterTable, ColumnChange, TableConstraint};
use crate::types::parse_data_type;

/// Keywords that start a table constraint after `ADD`.
const CONSTRAINT_STARTERS: &[&str] = &[
    "constraint",
    "primary",
    "foreign",
    "unique",
    "check",
    "exclude",
];

/// Parses `ALTER TABLE [IF EXISTS] [ONLY] name operation[, operation...]`.
///
/// A single operation is parsed into its typed form. Several
/// comma-separated operations are kept as raw clauses in
/// [`AlterOperation::Multiple`], to be applied one by one.
///
/// # Errors
///
/// Returns a syntax error for a missing table name or operation, or a
/// malformed operation of a recognized kind.
pub fn parse_alter_table(sql: &str, ctx: &ParseContext<'_>) -> Result<AlterTable, ParseError> {
    let mut cursor = Cursor::new(sql, ctx.file);
    cursor.expect_keyword("alter")?;
    cursor.expect_keyword("table")?;
    let if_exists = cursor.eat_keywords(&["if", "exists"]);
    cursor.eat_keyword("only");
    let name = qualified_name(&cursor.expect_word("table name")?);

    let clauses = split_clauses(cursor.remainder());
    trace!(table = %name, clauses = clauses.len(), "split ALTER TABLE operations");

    let operation = match clauses.as_slice() {
        [] => return Err(cursor.error("missing ALTER TABLE operation")),
        [clause] => parse_alter_operation(clause, &name.name, ctx)?,
        _ => AlterOperation::Multiple(clauses),
    };

    Ok(AlterTable {
        name,
        if_exists,
        operation,
    })
}

/// Parses one ALTER TABLE operation clause for `table`.
///
/// # Errors
///
/// Returns a syntax error for a malformed operation of a recognized kind.
/// Unrecognized operations are returned as [`AlterOperation::Unsupported`].
pub fn parse_alter_operation(
    clause: &str,
    table: &str,
    ctx: &ParseContext<'_>,
) -> Result<AlterOperation, ParseError> {
    let mut cursor = Cursor::new(clause, ctx.file);

    if cursor.eat_keyword("add") {
        if CONSTRAINT_STARTERS.iter().any(|kw| cursor.check_keyword(kw)) {
            let constraint = parse_table_constraint(cursor.remainder(), ctx)?
                .unwrap_or_else(|| TableConstraint::Other(cursor.remainder().to_string()));
            return Ok(AlterOperation::AddConstraint(constraint));
        }
        cursor.eat_keyword("column");
        let if_not_exists = cursor.eat_keywords(&["if", "not", "exists"]);
        if cursor.is_at_end() {
            return Err(cursor.error("expected column definition"));
        }
        let def = parse_column_definition(cursor.remainder(), table, ctx)?;
        return Ok(AlterOperation::AddColumn {
            column: def.column,
            foreign_key: def.foreign_key,
            if_not_exists,
        });
    }

    if cursor.eat_keyword("drop") {
        if cursor.eat_keyword("constraint") {
            let if_exists = cursor.eat_keywords(&["if", "exists"]);
            let name = cursor.expect_identifier("constraint name")?;
            expect_drop_behavior_end(&mut cursor)?;
            return Ok(AlterOperation::DropConstraint { name, if_exists });
        }
        cursor.eat_keyword("column");
        let if_exists = cursor.eat_keywords(&["if", "exists"]);
        let column = cursor.expect_identifier("column name")?;
        expect_drop_behavior_end(&mut cursor)?;
        return Ok(AlterOperation::DropColumn { column, if_exists });
    }

    if cursor.eat_keyword("alter") {
        cursor.eat_keyword("column");
        let column = cursor.expect_identifier("column name")?;
        let change = parse_column_change(&mut cursor, clause)?;
        return Ok(AlterOperation::AlterColumn { column, change });
    }

    if cursor.eat_keyword("rename") {
        if cursor.eat_keyword("to") {
            let (_, name) = split_qualified_name(&cursor.expect_word("new table name")?);
            cursor.expect_end()?;
            return Ok(AlterOperation::RenameTo { name });
        }
        if cursor.eat_keyword("constraint") {
            let from = cursor.expect_identifier("constraint name")?;
            cursor.expect_keyword("to")?;
            let to = cursor.expect_identifier("new constraint name")?;
            cursor.expect_end()?;
            return Ok(AlterOperation::RenameConstraint { from, to });
        }
        cursor.eat_keyword("column");
        let from = cursor.expect_identifier("column name")?;
        cursor.expect_keyword("to")?;
        let to = cursor.expect_identifier("new column name")?;
        cursor.expect_end()?;
        return Ok(AlterOperation::RenameColumn { from, to });
    }

    Ok(AlterOperation::Unsupported(clause.trim().to_string()))
}

/// Parses what follows `ALTER [COLUMN] name`.
fn parse_column_change(cursor: &mut Cursor<'_>, clause: &str) -> Result<ColumnChange, ParseError> {
    if cursor.eat_keyword("type") || cursor.eat_keywords(&["set", "data", "type"]) {
        let mut type_words = Vec::new();
        while let Some(word) = cursor.peek() {
            if is_keyword(word, "using") || is_keyword(word, "collate") {
                break;
            }
            type_words.push(word.to_string());
            cursor.advance();
        }
        let raw = type_words.join(" ");
        let parsed = parse_data_type(&raw).ok_or_else(|| cursor.error("expected type after TYPE"))?;
        return Ok(ColumnChange::Type(parsed));
    }
    if cursor.eat_keywords(&["set", "not", "null"]) {
        cursor.expect_end()?;
        return Ok(ColumnChange::SetNotNull);
    }
    if cursor.eat_keywords(&["drop", "not", "null"]) {
        cursor.expect_end()?;
        return Ok(ColumnChange::DropNotNull);
    }
    if cursor.eat_keywords(&["set", "default"]) {
        let value = cursor.take_rest();
        if value.is_empty() {
            return Err(cursor.error("expected value after SET DEFAULT"));
        }
        return Ok(ColumnChange::SetDefault(value.join(" ")));
    }
    if cursor.eat_keywords(&["drop", "default"]) {
        cursor.expect_end()?;
        return Ok(ColumnChange::DropDefault);
    }
    if cursor.is_at_end() {
        return Err(cursor.error("expected column change"));
    }
    Ok(ColumnChange::Unsupported(clause.trim().to_string()))
}

/// Accepts an optional trailing `CASCADE` or `RESTRICT` and nothing else.
fn expect_drop_behavior_end(cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
    cursor.eat_any_keyword(&["cascade", "restrict"]);
    cursor.expect_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::DatabaseFamily;
    use crate::types::DataType;

    const PG: ParseContext<'static> = ParseContext::new("0003_alter.sql", DatabaseFamily::Postgres);

    fn op(sql: &str) -> AlterOperation {
        parse_alter_table(sql, &PG)
            .unwrap_or_else(|e| panic!("failed to parse `{sql}`: {e}"))
            .operation
    }

    #[test]
    fn test_header() {
        let stmt =
            parse_alter_table("ALTER TABLE IF EXISTS ONLY app.users DROP COLUMN x", &PG).unwrap();
        assert!(stmt.if_exists);
        assert_eq!(stmt.name.schema.as_deref(), Some("app"));
        assert_eq!(stmt.name.name, "users");
    }

    #[test]
    fn test_add_column() {
        let AlterOperation::AddColumn {
            column,
            foreign_key,
            if_not_exists,
        } = op("ALTER TABLE posts ADD COLUMN IF NOT EXISTS author_id uuid REFERENCES users")
        else {
            panic!("expected ADD COLUMN");
        };
        assert!(if_not_exists);
        assert_eq!(column.name, "author_id");
        assert_eq!(column.created_in, "0003_alter.sql");
        let fk = foreign_key.unwrap();
        assert_eq!(fk.referenced_table, "users");
        assert_eq!(fk.referenced_columns, vec!["id"]);

        assert!(matches!(
            op("ALTER TABLE posts ADD title text"),
            AlterOperation::AddColumn { if_not_exists: false, .. }
        ));
    }

    #[test]
    fn test_add_primary_key_column_checked() {
        let err =
            parse_alter_table("ALTER TABLE t ADD COLUMN id bigint PRIMARY KEY", &PG).unwrap_err();
        assert!(matches!(err, ParseError::PrimaryKeyType { .. }));
    }

    #[test]
    fn test_add_constraint() {
        assert!(matches!(
            op("ALTER TABLE t ADD CONSTRAINT t_pkey PRIMARY KEY (id)"),
            AlterOperation::AddConstraint(TableConstraint::PrimaryKey { .. })
        ));
        assert!(matches!(
            op("ALTER TABLE t ADD FOREIGN KEY (u) REFERENCES users(id)"),
            AlterOperation::AddConstraint(TableConstraint::ForeignKey(_))
        ));
        assert!(matches!(
            op("ALTER TABLE t ADD UNIQUE (email)"),
            AlterOperation::AddConstraint(TableConstraint::Unique { .. })
        ));
    }

    #[test]
    fn test_drop() {
        assert_eq!(
            op("ALTER TABLE t DROP COLUMN IF EXISTS legacy CASCADE"),
            AlterOperation::DropColumn {
                column: "legacy".into(),
                if_exists: true,
            }
        );
        assert_eq!(
            op("ALTER TABLE t DROP legacy"),
            AlterOperation::DropColumn {
                column: "legacy".into(),
                if_exists: false,
            }
        );
        assert_eq!(
            op("ALTER TABLE t DROP CONSTRAINT IF EXISTS t_u_fkey"),
            AlterOperation::DropConstraint {
                name: "t_u_fkey".into(),
                if_exists: true,
            }
        );
        assert!(parse_alter_table("ALTER TABLE t DROP COLUMN", &PG).unwrap_err().is_syntax());
        assert!(parse_alter_table("ALTER TABLE t DROP COLUMN a b", &PG).unwrap_err().is_syntax());
    }

    #[test]
    fn test_alter_column() {
        let AlterOperation::AlterColumn { column, change } =
            op("ALTER TABLE t ALTER COLUMN price SET DATA TYPE numeric(12, 4) USING price::numeric")
        else {
            panic!("expected ALTER COLUMN");
        };
        assert_eq!(column, "price");
        let ColumnChange::Type(parsed) = change else {
            panic!("expected TYPE change");
        };
        assert_eq!(parsed.data_type, DataType::new("numeric").with_precision(12, 4));

        let change = |sql: &str| match op(sql) {
            AlterOperation::AlterColumn { change, .. } => change,
            other => panic!("expected ALTER COLUMN, got {other:?}"),
        };
        assert_eq!(change("ALTER TABLE t ALTER a SET NOT NULL"), ColumnChange::SetNotNull);
        assert_eq!(change("ALTER TABLE t ALTER a DROP NOT NULL"), ColumnChange::DropNotNull);
        assert_eq!(
            change("ALTER TABLE t ALTER a SET DEFAULT 'x'"),
            ColumnChange::SetDefault("'x'".into())
        );
        assert_eq!(change("ALTER TABLE t ALTER a DROP DEFAULT"), ColumnChange::DropDefault);
        assert!(matches!(
            change("ALTER TABLE t ALTER a SET STATISTICS 100"),
            ColumnChange::Unsupported(_)
        ));
        assert!(parse_alter_table("ALTER TABLE t ALTER a TYPE", &PG).unwrap_err().is_syntax());
    }

    #[test]
    fn test_rename() {
        assert_eq!(
            op("ALTER TABLE t RENAME COLUMN a TO b"),
            AlterOperation::RenameColumn {
                from: "a".into(),
                to: "b".into(),
            }
        );
        assert_eq!(
            op("ALTER TABLE t RENAME a TO b"),
            AlterOperation::RenameColumn {
                from: "a".into(),
                to: "b".into(),
            }
        );
        assert_eq!(
            op("ALTER TABLE t RENAME TO t2"),
            AlterOperation::RenameTo { name: "t2".into() }
        );
        assert_eq!(
            op("ALTER TABLE t RENAME CONSTRAINT a TO b"),
            AlterOperation::RenameConstraint {
                from: "a".into(),
                to: "b".into(),
            }
        );
        assert!(parse_alter_table("ALTER TABLE t RENAME a b", &PG).unwrap_err().is_syntax());
    }

    #[test]
    fn test_multiple_and_unsupported() {
        assert_eq!(
            op("ALTER TABLE t ADD COLUMN a text DEFAULT 'x, y', DROP COLUMN b, \
                RENAME COLUMN c TO d"),
            AlterOperation::Multiple(vec![
                "ADD COLUMN a text DEFAULT 'x, y'".into(),
                "DROP COLUMN b".into(),
                "RENAME COLUMN c TO d".into(),
            ])
        );
        assert_eq!(
            op("ALTER TABLE t OWNER TO admin"),
            AlterOperation::Unsupported("OWNER TO admin".into())
        );
        assert!(parse_alter_table("ALTER TABLE t", &PG).unwrap_err().is_syntax());
    }
}
