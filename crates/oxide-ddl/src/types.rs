//! SQL data type parsing.
//!
//! Column types are kept as canonical family names rather than a closed
//! enum: migrations use whatever types the target engine accepts, and the
//! catalog only needs the family plus its size parameters.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::lexer::{find_top_level, matching_paren, split_clauses};

/// A column data type: canonical family name plus size parameters.
///
/// At most one of `length` or `precision`/`scale` is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    /// Lower-cased type family name, e.g. `varchar` or `timestamp with time zone`.
    pub name: String,
    /// Length parameter (`varchar(255)`).
    pub length: Option<u32>,
    /// Precision parameter (`numeric(10, 2)`).
    pub precision: Option<u32>,
    /// Scale parameter (`numeric(10, 2)`).
    pub scale: Option<u32>,
}

impl DataType {
    /// Creates a data type without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            length: None,
            precision: None,
            scale: None,
        }
    }

    /// Sets the length parameter.
    #[must_use]
    pub const fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self.precision = None;
        self.scale = None;
        self
    }

    /// Sets the precision and scale parameters.
    #[must_use]
    pub const fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.length = None;
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match (self.length, self.precision, self.scale) {
            (Some(len), _, _) => write!(f, "({len})"),
            (None, Some(p), Some(s)) => write!(f, "({p}, {s})"),
            _ => Ok(()),
        }
    }
}

/// Result of parsing a column type: the data type and whether it is an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedType {
    /// The parsed data type.
    pub data_type: DataType,
    /// Whether the type carried an array suffix (`text[]`, `int ARRAY`).
    pub array: bool,
}

/// Parses raw type text into a [`ParsedType`].
///
/// Accepts parameterized types (`varchar(255)`, `numeric(10, 2)`), array
/// suffixes, and multi-word names such as `double precision` or
/// `timestamp(3) with time zone`. Parameter lists that are not one or two
/// unsigned integers are dropped; the family name is still returned.
/// Returns `None` only for empty input.
///
/// # Example
///
/// ```rust
/// use oxide_ddl::types::parse_data_type;
///
/// let parsed = parse_data_type("NUMERIC(10, 2)").unwrap();
/// assert_eq!(parsed.data_type.name, "numeric");
/// assert_eq!(parsed.data_type.precision, Some(10));
/// assert_eq!(parsed.data_type.scale, Some(2));
/// ```
#[must_use]
pub fn parse_data_type(raw: &str) -> Option<ParsedType> {
    let (text, array) = strip_array_suffix(raw.trim());
    if text.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();

    let (name_part, params, suffix) = match find_top_level(&lower, '(') {
        Some(open) => match matching_paren(&lower, open) {
            Some(close) => (
                &lower[..open],
                Some(&lower[open + 1..close]),
                &lower[close + 1..],
            ),
            None => (&lower[..open], None, ""),
        },
        None => (lower.as_str(), None, ""),
    };

    // Multi-word names (`double precision`, `time with time zone`) may carry
    // their parameters after the first word, so the words on both sides of
    // the parameter list form the family name.
    let name = collapse_whitespace(&format!("{name_part} {suffix}"));
    if name.is_empty() {
        return None;
    }

    let mut data_type = DataType::new(name);
    if let Some(params) = params {
        let numbers: Option<Vec<u32>> = split_clauses(params)
            .iter()
            .map(|p| p.parse::<u32>().ok())
            .collect();
        match numbers.as_deref() {
            Some([length]) => data_type = data_type.with_length(*length),
            Some([precision, scale]) => data_type = data_type.with_precision(*precision, *scale),
            _ => {}
        }
    }

    Some(ParsedType { data_type, array })
}

/// Strips `[]`, `[n]` (possibly repeated) or a trailing `ARRAY` keyword.
fn strip_array_suffix(text: &str) -> (&str, bool) {
    let mut text = text;
    let mut array = false;
    loop {
        if let Some(stripped) = text.strip_suffix(']') {
            if let Some(open) = stripped.rfind('[') {
                if stripped[open + 1..].trim().chars().all(|c| c.is_ascii_digit()) {
                    text = stripped[..open].trim_end();
                    array = true;
                    continue;
                }
            }
        }
        if text.len() > 5 && text.is_char_boundary(text.len() - 5) {
            let (rest, tail) = text.split_at(text.len() - 5);
            if tail.eq_ignore_ascii_case("array") && rest.ends_with(char::is_whitespace) {
                text = rest.trim_end();
                array = true;
                continue;
            }
        }
        return (text, array);
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ParsedType {
        parse_data_type(raw).unwrap_or_else(|| panic!("failed to parse type: {raw}"))
    }

    #[test]
    fn test_simple_types() {
        assert_eq!(parse("UUID").data_type, DataType::new("uuid"));
        assert_eq!(parse("text").data_type, DataType::new("text"));
        assert!(!parse("text").array);
    }

    #[test]
    fn test_length() {
        let parsed = parse("VARCHAR(255)");
        assert_eq!(parsed.data_type, DataType::new("varchar").with_length(255));

        let spaced = parse("varchar (64)");
        assert_eq!(spaced.data_type, DataType::new("varchar").with_length(64));
    }

    #[test]
    fn test_precision_and_scale() {
        let parsed = parse("numeric( 12 , 4 )");
        assert_eq!(parsed.data_type, DataType::new("numeric").with_precision(12, 4));
    }

    #[test]
    fn test_multi_word() {
        assert_eq!(parse("DOUBLE   PRECISION").data_type.name, "double precision");
        assert_eq!(
            parse("timestamp with time zone").data_type.name,
            "timestamp with time zone"
        );
        let tz = parse("TIMESTAMP(3) WITHOUT TIME ZONE");
        assert_eq!(tz.data_type.name, "timestamp without time zone");
        assert_eq!(tz.data_type.length, Some(3));

        let cv = parse("character varying(40)");
        assert_eq!(cv.data_type, DataType::new("character varying").with_length(40));
    }

    #[test]
    fn test_arrays() {
        let parsed = parse("text[]");
        assert!(parsed.array);
        assert_eq!(parsed.data_type.name, "text");

        let nested = parse("integer[3][]");
        assert!(nested.array);
        assert_eq!(nested.data_type.name, "integer");

        let keyword = parse("varchar(10) ARRAY");
        assert!(keyword.array);
        assert_eq!(keyword.data_type, DataType::new("varchar").with_length(10));
    }

    #[test]
    fn test_unparseable_params_are_dropped() {
        let parsed = parse("varchar(max)");
        assert_eq!(parsed.data_type, DataType::new("varchar"));

        let parsed = parse("numeric(1, 2, 3)");
        assert_eq!(parsed.data_type, DataType::new("numeric"));
    }

    #[test]
    fn test_empty() {
        assert!(parse_data_type("   ").is_none());
        assert!(parse_data_type("[]").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(DataType::new("numeric").with_precision(10, 2).to_string(), "numeric(10, 2)");
        assert_eq!(DataType::new("varchar").with_length(8).to_string(), "varchar(8)");
    }
}
