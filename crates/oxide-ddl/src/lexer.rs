//! Quote- and paren-aware scanning helpers.
//!
//! DDL is decomposed without a full tokenizer: commas split clauses and
//! whitespace splits words, but only at nesting depth zero and outside
//! quoted text. Everything inside quotes, parentheses or brackets is kept
//! verbatim.

/// Tracks quoting and nesting state while walking a string.
#[derive(Debug, Default)]
struct Scanner {
    quote: Option<char>,
    depth: usize,
}

impl Scanner {
    /// Feeds one character to the scanner.
    ///
    /// `next` is the character that follows `c`. Returns `true` when `c`
    /// and `next` form a doubled-quote escape, in which case the caller must
    /// consume `next` without feeding it.
    fn step(&mut self, c: char, next: Option<char>) -> bool {
        match self.quote {
            Some(quote) if c == quote => {
                if next == Some(quote) {
                    return true;
                }
                self.quote = None;
            }
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => self.quote = Some(c),
                '(' | '[' => self.depth += 1,
                ')' | ']' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            },
        }
        false
    }

    /// Returns true when outside quotes and at nesting depth zero.
    const fn at_top(&self) -> bool {
        self.quote.is_none() && self.depth == 0
    }
}

/// Splits a comma-separated clause list at the top level.
///
/// Commas inside quoted literals or nested parentheses never split a
/// clause. Clauses are trimmed and empty clauses are dropped. Unbalanced
/// input degrades to a single trailing clause holding the remainder.
///
/// # Example
///
/// ```rust
/// use oxide_ddl::lexer::split_clauses;
///
/// let clauses = split_clauses("id uuid, price numeric(10, 2), note text DEFAULT 'a, b'");
/// assert_eq!(
///     clauses,
///     vec!["id uuid", "price numeric(10, 2)", "note text DEFAULT 'a, b'"]
/// );
/// ```
#[must_use]
pub fn split_clauses(input: &str) -> Vec<String> {
    split_top_level(input, ',')
}

/// Splits `input` on `delimiter` wherever it appears at the top level.
#[must_use]
pub fn split_top_level(input: &str, delimiter: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut scanner = Scanner::default();
    let mut start = 0;
    let mut chars = input.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c == delimiter && scanner.at_top() {
            push_trimmed(&mut parts, &input[start..idx]);
            start = idx + c.len_utf8();
            continue;
        }
        let next = chars.peek().map(|&(_, n)| n);
        if scanner.step(c, next) {
            chars.next();
        }
    }
    push_trimmed(&mut parts, &input[start..]);
    parts
}

fn push_trimmed(parts: &mut Vec<String>, part: &str) {
    let part = part.trim();
    if !part.is_empty() {
        parts.push(part.to_string());
    }
}

/// Splits a clause into whitespace-separated words at the top level.
///
/// A parenthesized group stays attached to the word it touches, so
/// `numeric(10, 2)` is one word while `varchar (255)` is two.
#[must_use]
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut scanner = Scanner::default();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() && scanner.at_top() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(c);
        if scanner.step(c, chars.peek().copied()) {
            if let Some(escaped) = chars.next() {
                current.push(escaped);
            }
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Returns the text that follows the first `count` top-level words.
///
/// Used to recover the raw tail of a statement (for example the operation
/// list of an ALTER TABLE) after its header words have been consumed.
#[must_use]
pub fn remainder_after_words(input: &str, count: usize) -> &str {
    let mut scanner = Scanner::default();
    let mut seen = 0;
    let mut in_word = false;
    let mut chars = input.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c.is_whitespace() && scanner.at_top() {
            if in_word {
                in_word = false;
                seen += 1;
            }
            continue;
        }
        if !in_word && seen == count {
            return &input[idx..];
        }
        in_word = true;
        let next = chars.peek().map(|&(_, n)| n);
        if scanner.step(c, next) {
            chars.next();
        }
    }
    ""
}

/// Finds the byte offset of the first top-level occurrence of `target`.
#[must_use]
pub fn find_top_level(input: &str, target: char) -> Option<usize> {
    let mut scanner = Scanner::default();
    let mut chars = input.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c == target && scanner.at_top() {
            return Some(idx);
        }
        let next = chars.peek().map(|&(_, n)| n);
        if scanner.step(c, next) {
            chars.next();
        }
    }
    None
}

/// Finds the `)` that closes the `(` at byte offset `open`.
#[must_use]
pub fn matching_paren(input: &str, open: usize) -> Option<usize> {
    if !input[open..].starts_with('(') {
        return None;
    }
    let mut scanner = Scanner::default();
    let mut chars = input[open..].char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let quoted = scanner.quote.is_some();
        let next = chars.peek().map(|&(_, n)| n);
        if scanner.step(c, next) {
            chars.next();
            continue;
        }
        if c == ')' && !quoted && scanner.at_top() {
            return Some(open + offset);
        }
    }
    None
}

/// Splits `name(args)` into the name and the text between the parentheses.
///
/// `users(id)` yields `("users", Some("id"))`, `(a, b)` yields
/// `("", Some("a, b"))` and a word without a top-level group yields the
/// word itself and `None`. An unclosed group is returned as part of the name.
#[must_use]
pub fn split_call(word: &str) -> (&str, Option<&str>) {
    let Some(open) = find_top_level(word, '(') else {
        return (word, None);
    };
    match matching_paren(word, open) {
        Some(close) => (word[..open].trim_end(), Some(&word[open + 1..close])),
        None => (word, None),
    }
}

/// Returns the part of a word before any attached parenthesized group.
///
/// Keyword checks use this so that `CHECK(price > 0)` is seen as `CHECK`.
#[must_use]
pub fn head(word: &str) -> &str {
    split_call(word).0
}

/// Case-insensitive keyword comparison against the head of a word.
#[must_use]
pub fn is_keyword(word: &str, keyword: &str) -> bool {
    head(word).eq_ignore_ascii_case(keyword)
}

/// Removes identifier quoting (`"x"`, `` `x` `` or `[x]`).
///
/// Doubled quote characters inside a quoted identifier are unescaped.
/// Unquoted identifiers are returned as written.
#[must_use]
pub fn unquote_identifier(ident: &str) -> String {
    let ident = ident.trim();
    for quote in ['"', '`'] {
        if ident.len() >= 2 && ident.starts_with(quote) && ident.ends_with(quote) {
            let inner = &ident[1..ident.len() - 1];
            return inner.replace(&format!("{quote}{quote}"), &quote.to_string());
        }
    }
    if ident.len() >= 2 && ident.starts_with('[') && ident.ends_with(']') {
        return ident[1..ident.len() - 1].to_string();
    }
    ident.to_string()
}

/// Removes single quotes from a string literal, unescaping `''`.
///
/// Returns `None` when the text is not a single-quoted literal.
#[must_use]
pub fn unquote_literal(literal: &str) -> Option<String> {
    let literal = literal.trim();
    if literal.len() >= 2 && literal.starts_with('\'') && literal.ends_with('\'') {
        Some(literal[1..literal.len() - 1].replace("''", "'"))
    } else {
        None
    }
}

/// Splits a possibly schema-qualified name into `(schema, name)`.
///
/// Dots inside quoted identifiers do not split. For names with more than
/// two parts (`db.schema.table`) the last two are used.
#[must_use]
pub fn split_qualified_name(raw: &str) -> (Option<String>, String) {
    let parts = split_top_level(raw, '.');
    match parts.as_slice() {
        [] => (None, String::new()),
        [name] => (None, unquote_identifier(name)),
        [.., schema, name] => (Some(unquote_identifier(schema)), unquote_identifier(name)),
    }
}

/// Quotes an identifier when it cannot be written bare.
#[must_use]
pub fn quote_identifier(ident: &str) -> String {
    let bare = !ident.is_empty()
        && !ident.starts_with(|c: char| c.is_ascii_digit())
        && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if bare {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_clauses_respects_nesting() {
        let clauses = split_clauses(
            "id uuid PRIMARY KEY, total numeric(10, 2), CHECK (total > 0 AND total < 10)",
        );
        assert_eq!(
            clauses,
            vec![
                "id uuid PRIMARY KEY",
                "total numeric(10, 2)",
                "CHECK (total > 0 AND total < 10)"
            ]
        );
    }

    #[test]
    fn test_split_clauses_respects_quotes() {
        let clauses =
            split_clauses(r#"a text DEFAULT 'x, y', "b,c" int, d text DEFAULT 'it''s, ok'"#);
        assert_eq!(
            clauses,
            vec![
                "a text DEFAULT 'x, y'",
                r#""b,c" int"#,
                "d text DEFAULT 'it''s, ok'"
            ]
        );
    }

    #[test]
    fn test_split_clauses_unbalanced_keeps_remainder() {
        let clauses = split_clauses("a int, b numeric(10, 2");
        assert_eq!(clauses, vec!["a int", "b numeric(10, 2"]);

        let clauses = split_clauses("a text DEFAULT 'open, b int");
        assert_eq!(clauses, vec!["a text DEFAULT 'open, b int"]);
    }

    #[test]
    fn test_split_clauses_empty() {
        assert!(split_clauses("").is_empty());
        assert!(split_clauses("  ,  ").is_empty());
    }

    #[test]
    fn test_split_words() {
        let words = split_words("price  numeric(10, 2) DEFAULT 'a b' NOT NULL");
        assert_eq!(
            words,
            vec!["price", "numeric(10, 2)", "DEFAULT", "'a b'", "NOT", "NULL"]
        );
    }

    #[test]
    fn test_remainder_after_words() {
        let sql = "ALTER TABLE  users ADD COLUMN note text DEFAULT 'x  y'";
        assert_eq!(
            remainder_after_words(sql, 3),
            "ADD COLUMN note text DEFAULT 'x  y'"
        );
        assert_eq!(remainder_after_words("ALTER TABLE users", 3), "");
    }

    #[test]
    fn test_matching_paren() {
        let s = "t (a int, b numeric(1, 2), c text DEFAULT ')') rest";
        let open = s.find('(').unwrap();
        let close = matching_paren(s, open).unwrap();
        assert_eq!(&s[close + 1..], " rest");
        assert_eq!(matching_paren("(a", 0), None);
    }

    #[test]
    fn test_split_call() {
        assert_eq!(split_call("users(id)"), ("users", Some("id")));
        assert_eq!(split_call("(a, b)"), ("", Some("a, b")));
        assert_eq!(split_call("users"), ("users", None));
        assert_eq!(head("CHECK(price > 0)"), "CHECK");
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(unquote_identifier("\"user \"\"id\"\"\""), "user \"id\"");
        assert_eq!(unquote_identifier("`orders`"), "orders");
        assert_eq!(unquote_identifier("[orders]"), "orders");
        assert_eq!(
            split_qualified_name("\"my.schema\".users"),
            (Some("my.schema".to_string()), "users".to_string())
        );
        assert_eq!(split_qualified_name("users"), (None, "users".to_string()));
        assert_eq!(quote_identifier("users"), "users");
        assert_eq!(quote_identifier("user table"), "\"user table\"");
        assert_eq!(unquote_literal("'it''s'"), Some("it's".to_string()));
        assert_eq!(unquote_literal("plain"), None);
    }
}
