#![allow(dead_code)]

use oxide_ddl::{
    parse_statement, AlterTable, CreateTable, DatabaseFamily, ParseContext, ParseError, Statement,
};

pub const FILE: &str = "0001_initial.sql";

pub fn parse_with(sql: &str, family: DatabaseFamily) -> Statement {
    parse_statement(sql, &ParseContext::new(FILE, family))
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse(sql: &str) -> Statement {
    parse_with(sql, DatabaseFamily::Postgres)
}

pub fn parse_err_with(sql: &str, family: DatabaseFamily) -> ParseError {
    parse_statement(sql, &ParseContext::new(FILE, family))
        .expect_err(&format!("Expected parse error for: {sql}"))
}

pub fn parse_err(sql: &str) -> ParseError {
    parse_err_with(sql, DatabaseFamily::Postgres)
}

pub fn parse_create(sql: &str) -> CreateTable {
    match parse(sql) {
        Statement::CreateTable(c) => c,
        other => panic!("Expected CREATE TABLE, got {other:?}"),
    }
}

pub fn parse_alter(sql: &str) -> AlterTable {
    match parse(sql) {
        Statement::AlterTable(a) => a,
        other => panic!("Expected ALTER TABLE, got {other:?}"),
    }
}
