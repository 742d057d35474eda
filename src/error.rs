use crate::parse::{Failure, FailureKind};
use crate::state::State;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// The reason a whole input was rejected.
#[derive(Debug, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic(code(strand::parse))]
pub struct ParseError {
    pub kind: FailureKind,
    /// Character offset of the failure.
    pub offset: usize,
    #[source_code]
    source_code: String,
    #[label("{label}")]
    span: SourceSpan,
    label: &'static str,
}

fn label(kind: &FailureKind) -> &'static str {
    match kind {
        FailureKind::UnexpectedEndOfInput { .. } => "input ends here",
        FailureKind::UnexpectedCharacter { .. } => "unexpected character",
        FailureKind::UnclosedDelimiter { .. } => "missing closing delimiter",
        FailureKind::NoAlternativeMatched { .. } => "nothing matches here",
        FailureKind::Invalid { .. } => "invalid",
        FailureKind::DepthLimit { .. } => "nested too deeply",
        FailureKind::TrailingInput { .. } => "expected end of input",
    }
}

impl ParseError {
    pub fn new(failure: Failure, state: &State, text: &str) -> Self {
        let start = state.byte_offset(failure.index);
        let width = state.byte_offset(failure.index + 1) - start;
        Self {
            label: label(&failure.kind),
            kind: failure.kind,
            offset: failure.index,
            source_code: text.to_string(),
            span: (start, width).into(),
        }
    }

    pub fn span(&self) -> SourceSpan {
        self.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_covers_failing_character() {
        let text = "[é x";
        let state = State::new(text);
        let failure = Failure::new(
            FailureKind::UnexpectedCharacter {
                expected: "','".into(),
                found: 'x',
            },
            3,
        );
        let error = ParseError::new(failure, &state, text);
        assert_eq!(error.offset, 3);
        assert_eq!(error.span().offset(), 4);
        assert_eq!(error.span().len(), 1);
        assert_eq!(error.to_string(), "expected ',', found 'x'");
    }

    #[test]
    fn span_at_end_is_empty() {
        let text = "[1";
        let state = State::new(text);
        let failure = Failure::new(
            FailureKind::UnexpectedEndOfInput {
                expected: "']'".into(),
            },
            2,
        );
        let error = ParseError::new(failure, &state, text);
        assert_eq!(error.span().offset(), 2);
        assert_eq!(error.span().len(), 0);
    }
}
