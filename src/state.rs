use crate::parse::Failure;
use std::fmt::{Debug, Error, Formatter};
use std::rc::Rc;

/// A position in the input. Cloning a state shares the text and copies the
/// offset, so callers keep earlier states around to backtrack to.
///
/// A state also remembers the furthest failure that was backtracked over on
/// the way to it, so a later failure closer to the start can be blamed on it.
#[derive(Clone)]
pub struct State {
    text: Rc<[char]>,
    index: usize,
    depth: usize,
    furthest: Option<Rc<Failure>>,
}

impl State {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            index: 0,
            depth: 0,
            furthest: None,
        }
    }

    /// Offset in characters from the start of the input.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.text.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.text.get(self.index).copied()
    }

    /// Returns a new state `count` characters further, clamped to the end of input.
    pub fn advance(&self, count: usize) -> Self {
        Self {
            text: self.text.clone(),
            index: (self.index + count).min(self.text.len()),
            depth: self.depth,
            furthest: self.furthest.clone(),
        }
    }

    pub fn with_depth(&self, depth: usize) -> Self {
        Self {
            text: self.text.clone(),
            index: self.index,
            depth,
            furthest: self.furthest.clone(),
        }
    }

    /// The same position, remembering `failure` if it got further than the
    /// failure remembered so far.
    pub fn discard(&self, failure: Failure) -> Self {
        let furthest = match &self.furthest {
            Some(furthest) if furthest.index >= failure.index => Some(furthest.clone()),
            _ => Some(Rc::new(failure)),
        };
        Self {
            text: self.text.clone(),
            index: self.index,
            depth: self.depth,
            furthest,
        }
    }

    /// The furthest failure backtracked over on the way here, if any.
    pub fn furthest(&self) -> Option<&Failure> {
        self.furthest.as_deref()
    }

    /// Picks between `failure` and the remembered one, whichever got further.
    /// Fatal failures and ties keep `failure`.
    pub fn blame(&self, failure: Failure) -> Failure {
        match &self.furthest {
            Some(furthest) if !failure.is_fatal() && furthest.index > failure.index => {
                Failure::clone(furthest)
            }
            _ => failure,
        }
    }

    pub fn remaining(&self) -> &[char] {
        &self.text[self.index..]
    }

    /// Converts a character offset into a byte offset into the original text.
    pub fn byte_offset(&self, index: usize) -> usize {
        self.text[..index.min(self.text.len())]
            .iter()
            .map(|character| character.len_utf8())
            .sum()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.depth == other.depth && self.text == other.text
    }
}

impl Debug for State {
    fn fmt(&self, formatter: &mut Formatter) -> Result<(), Error> {
        formatter
            .debug_struct("State")
            .field("index", &self.index)
            .field("depth", &self.depth)
            .field("furthest", &self.furthest)
            .field("remaining", &self.remaining().iter().collect::<String>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::FailureKind;

    #[test]
    fn advance_leaves_original_untouched() {
        let state = State::new("abc");
        let next = state.advance(2);
        assert_eq!(state.index(), 0);
        assert_eq!(next.index(), 2);
        assert_eq!(next.peek(), Some('c'));
    }

    #[test]
    fn advance_is_clamped() {
        let state = State::new("ab").advance(5);
        assert_eq!(state.index(), 2);
        assert!(state.is_at_end());
        assert_eq!(state.peek(), None);
    }

    #[test]
    fn byte_offset_counts_utf8() {
        let state = State::new("é1");
        assert_eq!(state.byte_offset(1), 2);
        assert_eq!(state.byte_offset(9), 3);
    }

    #[test]
    fn discard_keeps_furthest() {
        let near = Failure::new(FailureKind::Invalid { reason: "near".into() }, 1);
        let far = Failure::new(FailureKind::Invalid { reason: "far".into() }, 3);
        let state = State::new("abcd").discard(far.clone()).discard(near.clone());
        assert_eq!(state.furthest(), Some(&far));
        assert_eq!(state.advance(1).furthest(), Some(&far));
        assert_eq!(state.blame(near), far);
    }

    #[test]
    fn blame_keeps_ties_and_fatal_failures() {
        let discarded = Failure::new(FailureKind::Invalid { reason: "a".into() }, 2);
        let state = State::new("abc").discard(discarded);
        let tie = Failure::new(FailureKind::TrailingInput { found: 'c' }, 2);
        assert_eq!(state.blame(tie.clone()), tie);
        let fatal = Failure::new(FailureKind::DepthLimit { limit: 1 }, 0);
        assert_eq!(state.blame(fatal.clone()), fatal);
    }
}
