use crate::combinator::*;
use crate::config::Options;
use crate::error::ParseError;
use crate::parse::*;
use crate::state::State;
use crate::{all, any};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A value of the supported JSON subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonValue {
    Text(String),
    Number(f64),
    Array(Vec<JsonValue>),
}

impl Display for JsonValue {
    /// Compact JSON. Text is written verbatim between quotes, which is valid
    /// for every text the grammar accepts.
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            JsonValue::Text(text) => write!(formatter, "\"{}\"", text),
            JsonValue::Number(number) => Display::fmt(number, formatter),
            JsonValue::Array(values) => {
                formatter.write_str("[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        formatter.write_str(",")?;
                    }
                    Display::fmt(value, formatter)?;
                }
                formatter.write_str("]")
            }
        }
    }
}

pub fn whitespace() -> Parser<()> {
    map(
        many(any!(symbol(' '), symbol('\n'), symbol('\t'), symbol('\r'))),
        |_| (),
    )
}

/// A quoted string without escapes. A backslash inside the quotes is rejected.
pub fn string() -> Parser<String> {
    map(
        between(symbol('"'), many(none_of(&['"', '\\'])), symbol('"')),
        |characters| characters.into_iter().collect(),
    )
}

/// An unsigned integer. Digit runs too long to fit a finite `f64` are rejected.
pub fn number() -> Parser<f64> {
    filter_map(many1(range('0'..='9')), |digits| {
        let number = digits
            .into_iter()
            .collect::<String>()
            .parse::<f64>()
            .map_err(|error| format!("invalid number: {}", error))?;
        if number.is_finite() {
            Ok(number)
        } else {
            Err("number out of range".to_string())
        }
    })
}

/// A bracketed, comma separated list of `element`s.
pub fn array(element: Parser<JsonValue>, max_depth: usize) -> Parser<Vec<JsonValue>> {
    let separator = all!(whitespace(), symbol(','), whitespace());
    nested(
        max_depth,
        between(
            and(symbol('['), whitespace()),
            join(separator, element),
            and(whitespace(), symbol(']')),
        ),
    )
}

/// The recursive `value` rule: a string, a number, or an array of values.
pub fn value(options: &Options) -> Parser<JsonValue> {
    let value = Rule::new("value");
    let array = array(value.refer(), options.max_depth);
    value.define(any!(
        map(string(), JsonValue::Text),
        map(number(), JsonValue::Number),
        map(array, JsonValue::Array),
    ))
}

/// A value surrounded by optional whitespace, followed by the end of input
/// unless trailing input is allowed.
pub fn document(options: &Options) -> Parser<JsonValue> {
    let value = between(whitespace(), value(options), whitespace());
    if options.allow_trailing {
        value
    } else {
        map(and(value, end()), |(value, _)| value)
    }
}

pub fn parse_value(text: &str) -> Result<JsonValue, ParseError> {
    parse_value_with(text, &Options::default())
}

pub fn parse_value_with(text: &str, options: &Options) -> Result<JsonValue, ParseError> {
    let state = State::new(text);
    match document(options).parse(&state) {
        Ok((value, next)) => {
            debug!(
                "parsed {} characters, {} left over",
                next.index(),
                next.remaining().len()
            );
            Ok(value)
        }
        Err(failure) => {
            debug!("rejected input: {}", failure);
            Err(ParseError::new(failure, &state, text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_array_has_no_elements() {
        let (values, state) = run(&array(map(number(), JsonValue::Number), 4), "[ ]").unwrap();
        assert!(values.is_empty());
        assert_eq!(state.index(), 3);
    }

    #[test]
    fn number_keeps_leading_zeros() {
        let (number, _) = run(&number(), "007").unwrap();
        assert_eq!(number, 7.0);
    }

    #[test]
    fn number_out_of_range() {
        let failure = run(&number(), &"9".repeat(400)).unwrap_err();
        assert_eq!(failure.index, 0);
        assert_eq!(
            failure.kind,
            FailureKind::Invalid {
                reason: "number out of range".into()
            }
        );
        assert!(run(&number(), &"9".repeat(300)).unwrap().0.is_finite());
    }

    #[test]
    fn string_rejects_backslash() {
        let failure = run(&string(), r#""a\b""#).unwrap_err();
        assert_eq!(failure.index, 2);
        assert!(matches!(failure.kind, FailureKind::UnclosedDelimiter { opened: 0, .. }));
    }

    #[test]
    fn display_is_compact() {
        let value = JsonValue::Array(vec![
            JsonValue::Number(1.),
            JsonValue::Text("a b".into()),
            JsonValue::Array(Vec::new()),
        ]);
        assert_eq!(value.to_string(), r#"[1,"a b",[]]"#);
    }
}
