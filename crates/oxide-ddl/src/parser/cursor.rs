//! Word cursor used by the statement parsers.

use crate::error::ParseError;
use crate::lexer::{is_keyword, remainder_after_words, split_call, split_words, unquote_identifier};

/// Walks the top-level words of a statement or clause.
pub struct Cursor<'a> {
    text: &'a str,
    file: &'a str,
    words: Vec<String>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over `text`; errors name `file`.
    #[must_use]
    pub fn new(text: &'a str, file: &'a str) -> Self {
        Self {
            text,
            file,
            words: split_words(text),
            pos: 0,
        }
    }

    /// Returns the current word without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&str> {
        self.words.get(self.pos).map(String::as_str)
    }

    /// Returns the word `n` positions ahead of the current one.
    #[must_use]
    pub fn peek_nth(&self, n: usize) -> Option<&str> {
        self.words.get(self.pos + n).map(String::as_str)
    }

    /// Consumes and returns the current word.
    pub fn advance(&mut self) -> Option<String> {
        let word = self.words.get(self.pos).cloned();
        if word.is_some() {
            self.pos += 1;
        }
        word
    }

    /// Returns true if no words remain.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.words.len()
    }

    /// Checks if the current word is the given keyword.
    #[must_use]
    pub fn check_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|w| is_keyword(w, keyword))
    }

    /// Checks if the word `n` ahead is the given keyword.
    #[must_use]
    pub fn check_keyword_at(&self, n: usize, keyword: &str) -> bool {
        self.peek_nth(n).is_some_and(|w| is_keyword(w, keyword))
    }

    /// Consumes the current word if it is the given keyword.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.check_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes a keyword sequence, all or nothing.
    pub fn eat_keywords(&mut self, keywords: &[&str]) -> bool {
        let matches = keywords
            .iter()
            .enumerate()
            .all(|(i, kw)| self.check_keyword_at(i, kw));
        if matches {
            self.pos += keywords.len();
        }
        matches
    }

    /// Consumes the current word if it is any of the given keywords.
    pub fn eat_any_keyword(&mut self, keywords: &[&str]) -> Option<String> {
        let word = self.peek()?;
        if keywords.iter().any(|kw| is_keyword(word, kw)) {
            self.advance()
        } else {
            None
        }
    }

    /// Expects the current word to be the given keyword and returns it.
    ///
    /// The returned word may carry an attached group, as in `KEY(id)`.
    ///
    /// # Errors
    ///
    /// Returns a syntax error if the keyword is missing.
    pub fn expect_keyword(&mut self, keyword: &str) -> Result<String, ParseError> {
        if self.check_keyword(keyword) {
            Ok(self.advance().unwrap_or_default())
        } else {
            Err(self.unexpected(&keyword.to_uppercase()))
        }
    }

    /// Expects any word, described as `what` in the error.
    ///
    /// # Errors
    ///
    /// Returns a syntax error at the end of input.
    pub fn expect_word(&mut self, what: &str) -> Result<String, ParseError> {
        self.advance().ok_or_else(|| self.error(format!("expected {what}")))
    }

    /// Expects an identifier and returns it unquoted.
    ///
    /// # Errors
    ///
    /// Returns a syntax error at the end of input.
    pub fn expect_identifier(&mut self, what: &str) -> Result<String, ParseError> {
        self.expect_word(what).map(|w| unquote_identifier(&w))
    }

    /// Returns the contents of the parenthesized group attached to `word`,
    /// or of the next word when it is a standalone group.
    pub fn take_group(&mut self, word: &str) -> Option<String> {
        if let (_, Some(args)) = split_call(word) {
            return Some(args.to_string());
        }
        if self.peek().is_some_and(|w| w.starts_with('(')) {
            let next = self.advance()?;
            return split_call(&next).1.map(String::from);
        }
        None
    }

    /// Like [`Cursor::take_group`], but the group is required.
    ///
    /// # Errors
    ///
    /// Returns a syntax error if no group follows.
    pub fn expect_group(&mut self, word: &str, what: &str) -> Result<String, ParseError> {
        self.take_group(word)
            .ok_or_else(|| self.error(format!("expected ({what}) after {}", word.to_uppercase())))
    }

    /// Returns the words not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> &[String] {
        &self.words[self.pos.min(self.words.len())..]
    }

    /// Skips `n` words.
    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.words.len());
    }

    /// Consumes and returns all remaining words.
    pub fn take_rest(&mut self) -> Vec<String> {
        let rest = self.remaining().to_vec();
        self.pos = self.words.len();
        rest
    }

    /// Returns the raw text after the consumed words.
    #[must_use]
    pub fn remainder(&self) -> &'a str {
        remainder_after_words(self.text, self.pos).trim()
    }

    /// Fails if any words remain.
    ///
    /// # Errors
    ///
    /// Returns a syntax error naming the first leftover word.
    pub fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(word) => Err(self.error(format!("unexpected '{word}'"))),
        }
    }

    /// Creates a syntax error for the text being parsed.
    #[must_use]
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::syntax(self.file, self.text, message)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(found) => self.error(format!("expected {expected}, found '{found}'")),
            None => self.error(format!("expected {expected}, found end of input")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let mut cursor = Cursor::new("create unique INDEX idx", "f.sql");
        assert!(cursor.eat_keyword("CREATE"));
        assert!(!cursor.eat_keywords(&["unique", "table"]));
        assert!(cursor.eat_keywords(&["unique", "index"]));
        assert_eq!(cursor.expect_word("name").unwrap(), "idx");
        assert!(cursor.is_at_end());
        assert!(cursor.expect_keyword("on").unwrap_err().is_syntax());
    }

    #[test]
    fn test_groups() {
        let mut cursor = Cursor::new("KEY(id) REFERENCES users (id)", "f.sql");
        let key = cursor.expect_keyword("key").unwrap();
        assert_eq!(cursor.take_group(&key).as_deref(), Some("id"));
        let refs = cursor.expect_keyword("references").unwrap();
        assert_eq!(cursor.take_group(&refs), None);
        let table = cursor.expect_word("table").unwrap();
        assert_eq!(cursor.take_group(&table).as_deref(), Some("id"));
    }

    #[test]
    fn test_remainder() {
        let mut cursor = Cursor::new("ADD COLUMN note text  DEFAULT 'a  b'", "f.sql");
        cursor.eat_keywords(&["add", "column"]);
        assert_eq!(cursor.remainder(), "note text  DEFAULT 'a  b'");
    }
}
