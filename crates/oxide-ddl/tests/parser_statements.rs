//! Tests for statement classification and the smaller DDL statements.

mod common;
use common::*;

use oxide_ddl::{QualifiedName, Statement};

#[test]
fn test_leading_keywords_are_case_insensitive() {
    assert!(matches!(
        parse("  cReAtE   TaBlE t (id uuid)  ;"),
        Statement::CreateTable(_)
    ));
    assert!(matches!(parse("DROP table t;"), Statement::DropTable(_)));
}

#[test]
fn test_unmodeled_statements_are_unknown() {
    for sql in [
        "CREATE OR REPLACE FUNCTION f() RETURNS int AS $$ SELECT 1 $$ LANGUAGE sql",
        "CREATE TYPE address AS (street text, city text)",
        "UPDATE users SET active = true",
        "GRANT SELECT ON users TO reader",
        "CREATE SEQUENCE s",
    ] {
        assert!(matches!(parse(sql), Statement::Unknown(_)), "{sql}");
    }
}

#[test]
fn test_enum_statements() {
    let Statement::CreateEnum(e) = parse("CREATE TYPE status AS ENUM ('active', 'on ''hold''')")
    else {
        panic!("Expected CREATE TYPE AS ENUM");
    };
    assert_eq!(e.name, QualifiedName::new("status"));
    assert_eq!(e.values, vec!["active", "on 'hold'"]);

    let Statement::DropEnum(d) = parse("DROP TYPE IF EXISTS status") else {
        panic!("Expected DROP TYPE");
    };
    assert!(d.if_exists);
}

#[test]
fn test_schema_and_index_statements() {
    let Statement::CreateSchema(s) = parse("CREATE SCHEMA IF NOT EXISTS billing") else {
        panic!("Expected CREATE SCHEMA");
    };
    assert_eq!(s.name, "billing");

    let Statement::CreateIndex(i) =
        parse("CREATE UNIQUE INDEX users_email ON billing.users (email)")
    else {
        panic!("Expected CREATE INDEX");
    };
    assert!(i.unique);
    assert_eq!(i.table, QualifiedName::qualified("billing", "users"));
}

#[test]
fn test_empty_input_is_a_syntax_error() {
    assert!(parse_err("").is_syntax());
    assert!(parse_err(" ;").is_syntax());
}
