use crate::state::State;
use std::ops::RangeInclusive;
use std::rc::Rc;
use thiserror::Error;

/// Why a parser could not match at a given position.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FailureKind {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput { expected: String },
    #[error("expected {expected}, found '{found}'")]
    UnexpectedCharacter { expected: String, found: char },
    #[error("unclosed delimiter opened at offset {opened}: {cause}")]
    UnclosedDelimiter {
        opened: usize,
        cause: Box<FailureKind>,
    },
    #[error("no alternative matched ({})", describe(.alternatives))]
    NoAlternativeMatched { alternatives: Vec<FailureKind> },
    #[error("invalid input: {reason}")]
    Invalid { reason: String },
    #[error("nesting deeper than {limit} levels")]
    DepthLimit { limit: usize },
    #[error("unexpected trailing input '{found}'")]
    TrailingInput { found: char },
}

fn describe(alternatives: &[FailureKind]) -> String {
    alternatives
        .iter()
        .map(|kind| kind.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl FailureKind {
    fn into_alternatives(self) -> Vec<FailureKind> {
        match self {
            FailureKind::NoAlternativeMatched { alternatives } => alternatives,
            kind => vec![kind],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at offset {index}")]
pub struct Failure {
    pub kind: FailureKind,
    pub index: usize,
}

impl Failure {
    pub fn new(kind: FailureKind, index: usize) -> Self {
        Self { kind, index }
    }

    /// Fatal failures abort the whole parse: alternation, repetition and
    /// options pass them through instead of backtracking.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, FailureKind::DepthLimit { .. })
    }

    /// Either a missing character or a wrong one, depending on what `state` holds.
    pub fn expected(expected: impl Into<String>, state: &State) -> Self {
        let expected = expected.into();
        let kind = match state.peek() {
            Some(found) => FailureKind::UnexpectedCharacter { expected, found },
            None => FailureKind::UnexpectedEndOfInput { expected },
        };
        Self::new(kind, state.index())
    }

    /// Combines the failures of two alternatives. The one that got further
    /// wins; failures at the same offset are listed together.
    pub fn merge(self, other: Failure) -> Failure {
        if self.index > other.index {
            self
        } else if self.index < other.index {
            other
        } else {
            let mut alternatives = self.kind.into_alternatives();
            alternatives.extend(other.kind.into_alternatives());
            Failure::new(
                FailureKind::NoAlternativeMatched { alternatives },
                self.index,
            )
        }
    }
}

/// Outcome of running a parser: the produced value and the state after it, or
/// a failure. A failure never carries a state; the caller still holds the one
/// it passed in.
pub type Match<T> = Result<(T, State), Failure>;

pub type Parse<T> = dyn Fn(&State) -> Match<T>;

/// A cheaply cloneable handle to a parse function.
pub struct Parser<T>(Rc<Parse<T>>);

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Parser(self.0.clone())
    }
}

impl<T> Parser<T> {
    pub fn new(parse: impl Fn(&State) -> Match<T> + 'static) -> Self {
        Parser(Rc::new(parse))
    }

    pub fn parse(&self, state: &State) -> Match<T> {
        (self.0)(state)
    }
}

/// Runs `parser` from the start of `text`.
pub fn run<T>(parser: &Parser<T>, text: &str) -> Match<T> {
    parser.parse(&State::new(text))
}

/// Consumes one character accepted by `predicate`.
pub fn satisfy(
    expected: impl Into<String>,
    predicate: impl Fn(char) -> bool + 'static,
) -> Parser<char> {
    let expected = expected.into();
    Parser::new(move |state| match state.peek() {
        Some(character) if predicate(character) => Ok((character, state.advance(1))),
        _ => Err(Failure::expected(expected.as_str(), state)),
    })
}

pub fn symbol(symbol: char) -> Parser<char> {
    satisfy(format!("'{}'", symbol.escape_default()), move |character| {
        character == symbol
    })
}

pub fn range(range: RangeInclusive<char>) -> Parser<char> {
    satisfy(
        format!(
            "'{}'..='{}'",
            range.start().escape_default(),
            range.end().escape_default()
        ),
        move |character| range.contains(&character),
    )
}

pub fn none_of(excluded: &[char]) -> Parser<char> {
    let excluded = excluded.to_vec();
    let listed = excluded
        .iter()
        .map(|character| format!("'{}'", character.escape_default()))
        .collect::<Vec<_>>()
        .join(", ");
    satisfy(format!("any character except {}", listed), move |character| {
        !excluded.contains(&character)
    })
}

/// Matches `word` exactly. Reports the failure where the first mismatch occurs.
pub fn word(word: &str) -> Parser<String> {
    let symbols: Vec<char> = word.chars().collect();
    let word = word.to_string();
    Parser::new(move |state| {
        let mut current = state.clone();
        for symbol in &symbols {
            match current.peek() {
                Some(character) if character == *symbol => current = current.advance(1),
                _ => return Err(Failure::expected(format!("\"{}\"", word), &current)),
            }
        }
        Ok((word.clone(), current))
    })
}

/// Succeeds only when no input is left.
pub fn end() -> Parser<()> {
    Parser::new(|state| match state.peek() {
        Some(found) => Err(Failure::new(
            FailureKind::TrailingInput { found },
            state.index(),
        )),
        None => Ok(((), state.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_consumes_one() {
        let (value, state) = run(&symbol('a'), "ab").unwrap();
        assert_eq!(value, 'a');
        assert_eq!(state.index(), 1);
    }

    #[test]
    fn symbol_at_end() {
        let failure = run(&symbol('a'), "").unwrap_err();
        assert_eq!(
            failure.kind,
            FailureKind::UnexpectedEndOfInput {
                expected: "'a'".into()
            }
        );
    }

    #[test]
    fn word_reports_mismatch_offset() {
        let failure = run(&word("Boba"), "Bobby").unwrap_err();
        assert_eq!(failure.index, 3);
        assert_eq!(
            failure.kind,
            FailureKind::UnexpectedCharacter {
                expected: "\"Boba\"".into(),
                found: 'b'
            }
        );
    }

    #[test]
    fn merge_prefers_furthest() {
        let near = Failure::new(FailureKind::Invalid { reason: "a".into() }, 1);
        let far = Failure::new(FailureKind::Invalid { reason: "b".into() }, 4);
        assert_eq!(near.clone().merge(far.clone()), far);
        assert_eq!(far.clone().merge(near), far);
    }

    #[test]
    fn merge_lists_ties() {
        let left = Failure::new(FailureKind::Invalid { reason: "a".into() }, 2);
        let right = Failure::new(FailureKind::Invalid { reason: "b".into() }, 2);
        let merged = left.clone().merge(right.clone());
        assert_eq!(merged.index, 2);
        assert_eq!(
            merged.kind,
            FailureKind::NoAlternativeMatched {
                alternatives: vec![left.kind, right.kind]
            }
        );
    }

    #[test]
    fn end_rejects_trailing() {
        let failure = run(&end(), "x").unwrap_err();
        assert_eq!(failure.kind, FailureKind::TrailingInput { found: 'x' });
    }
}
