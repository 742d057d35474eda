use crate::parse::*;
use log::trace;
use std::cell::OnceCell;
use std::iter;
use std::ops::{Bound, RangeBounds};
use std::rc::Rc;

/// Runs `left` then `right` from where `left` stopped.
pub fn and<A: 'static, B: 'static>(left: Parser<A>, right: Parser<B>) -> Parser<(A, B)> {
    Parser::new(move |state| {
        let (left, state) = left.parse(state)?;
        let (right, state) = right
            .parse(&state)
            .map_err(|failure| state.blame(failure))?;
        Ok(((left, right), state))
    })
}

/// Runs every parser in order and collects their values.
pub fn all<T: 'static>(parsers: Vec<Parser<T>>) -> Parser<Vec<T>> {
    Parser::new(move |state| {
        let mut values = Vec::with_capacity(parsers.len());
        let mut current = state.clone();
        for parser in &parsers {
            let (value, next) = parser
                .parse(&current)
                .map_err(|failure| current.blame(failure))?;
            values.push(value);
            current = next;
        }
        Ok((values, current))
    })
}

/// Tries `left`, then `right` from the same state.
pub fn or<T: 'static>(left: Parser<T>, right: Parser<T>) -> Parser<T> {
    Parser::new(move |state| match left.parse(state) {
        Ok(matched) => Ok(matched),
        Err(failure) if failure.is_fatal() => Err(failure),
        Err(failure) => match right.parse(state) {
            Ok(matched) => Ok(matched),
            Err(other) if other.is_fatal() => Err(other),
            Err(other) => Err(failure.merge(other)),
        },
    })
}

/// Tries each parser in order from the same state; the first success wins.
pub fn any<T: 'static>(parsers: Vec<Parser<T>>) -> Parser<T> {
    Parser::new(move |state| {
        let mut failure: Option<Failure> = None;
        for parser in &parsers {
            match parser.parse(state) {
                Ok(matched) => return Ok(matched),
                Err(other) if other.is_fatal() => return Err(other),
                Err(other) => {
                    failure = Some(match failure {
                        Some(failure) => failure.merge(other),
                        None => other,
                    })
                }
            }
        }
        Err(failure.unwrap_or_else(|| {
            Failure::new(
                FailureKind::NoAlternativeMatched {
                    alternatives: Vec::new(),
                },
                state.index(),
            )
        }))
    })
}

/// Applies `parser` as many times as `range` allows, collecting the values.
///
/// Repetition stops at the first failure, which is discarded unless it is
/// fatal or fewer than the lower bound succeeded. A discarded failure is
/// remembered by the returned state. A match that consumes nothing ends the
/// repetition.
pub fn repeat<T: 'static>(range: impl RangeBounds<usize>, parser: Parser<T>) -> Parser<Vec<T>> {
    let low = match range.start_bound() {
        Bound::Included(index) => *index,
        Bound::Excluded(index) => index + 1,
        Bound::Unbounded => 0,
    };
    let high = match range.end_bound() {
        Bound::Included(index) => Some(*index),
        Bound::Excluded(index) => Some(index.saturating_sub(1)),
        Bound::Unbounded => None,
    };
    Parser::new(move |state| {
        let mut values = Vec::new();
        let mut current = state.clone();
        while high.map_or(true, |high| values.len() < high) {
            match parser.parse(&current) {
                Ok((value, next)) => {
                    let stalled = next.index() == current.index();
                    values.push(value);
                    current = next;
                    if stalled {
                        break;
                    }
                }
                Err(failure) if failure.is_fatal() || values.len() < low => {
                    return Err(current.blame(failure))
                }
                Err(failure) => {
                    current = current.discard(failure);
                    break;
                }
            }
        }
        if values.len() < low {
            return Err(current.blame(Failure::new(
                FailureKind::Invalid {
                    reason: format!(
                        "expected at least {} repetitions, found {}",
                        low,
                        values.len()
                    ),
                },
                current.index(),
            )));
        }
        Ok((values, current))
    })
}

/// Zero or more repetitions; never fails.
pub fn many<T: 'static>(parser: Parser<T>) -> Parser<Vec<T>> {
    repeat(.., parser)
}

/// One or more repetitions.
pub fn many1<T: 'static>(parser: Parser<T>) -> Parser<Vec<T>> {
    repeat(1.., parser)
}

/// Never fails except on a fatal failure. A failure of `parser` is remembered
/// by the returned state.
pub fn option<T: 'static>(parser: Parser<T>) -> Parser<Option<T>> {
    Parser::new(move |state| match parser.parse(state) {
        Ok((value, next)) => Ok((Some(value), next)),
        Err(failure) if failure.is_fatal() => Err(failure),
        Err(failure) => Ok((None, state.discard(failure))),
    })
}

pub fn map<A: 'static, B: 'static>(parser: Parser<A>, map: impl Fn(A) -> B + 'static) -> Parser<B> {
    Parser::new(move |state| {
        let (value, next) = parser.parse(state)?;
        Ok((map(value), next))
    })
}

/// Like [`map`], but the transform may reject the value. A rejection is
/// reported as [`FailureKind::Invalid`] at the start of the match.
pub fn filter_map<A: 'static, B: 'static>(
    parser: Parser<A>,
    map: impl Fn(A) -> Result<B, String> + 'static,
) -> Parser<B> {
    Parser::new(move |state| {
        let (value, next) = parser.parse(state)?;
        match map(value) {
            Ok(value) => Ok((value, next)),
            Err(reason) => Err(Failure::new(FailureKind::Invalid { reason }, state.index())),
        }
    })
}

/// Keeps only the value of `inner`. A missing `close` is reported as an
/// unclosed delimiter pointing back at where `open` matched.
pub fn between<O: 'static, T: 'static, C: 'static>(
    open: Parser<O>,
    inner: Parser<T>,
    close: Parser<C>,
) -> Parser<T> {
    Parser::new(move |state| {
        let (_, next) = open.parse(state)?;
        let (value, next) = inner
            .parse(&next)
            .map_err(|failure| next.blame(failure))?;
        match close.parse(&next) {
            Ok((_, next)) => Ok((value, next)),
            Err(failure) if failure.is_fatal() => Err(failure),
            Err(failure) => Err(next.blame(Failure::new(
                FailureKind::UnclosedDelimiter {
                    opened: state.index(),
                    cause: Box::new(failure.kind),
                },
                failure.index,
            ))),
        }
    })
}

/// Zero or more `item`s separated by `separator`, flattened into one list.
pub fn join<S: 'static, T: 'static>(separator: Parser<S>, item: Parser<T>) -> Parser<Vec<T>> {
    let list = option(and(item.clone(), many(and(separator, item))));
    map(list, |list| match list {
        Some((first, rest)) => iter::once(first)
            .chain(rest.into_iter().map(|(_, item)| item))
            .collect(),
        None => Vec::new(),
    })
}

/// Builds the wrapped parser anew at every invocation.
pub fn lazy<T: 'static>(factory: impl Fn() -> Parser<T> + 'static) -> Parser<T> {
    Parser::new(move |state| factory().parse(state))
}

/// Runs `parser` one nesting level deeper. Going past `limit` levels is a
/// fatal failure.
pub fn nested<T: 'static>(limit: usize, parser: Parser<T>) -> Parser<T> {
    Parser::new(move |state| {
        let depth = state.depth();
        if depth >= limit {
            return Err(Failure::new(FailureKind::DepthLimit { limit }, state.index()));
        }
        let (value, next) = parser.parse(&state.with_depth(depth + 1))?;
        Ok((value, next.with_depth(depth)))
    })
}

/// A named grammar rule that can be referenced before it is defined.
///
/// References hold a weak handle to the rule, so a rule that refers to
/// itself does not keep itself alive. The parser returned by
/// [`Rule::define`] owns the rule and is the entry point to use.
pub struct Rule<T> {
    name: Rc<str>,
    cell: Rc<OnceCell<Parser<T>>>,
}

impl<T: 'static> Rule<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            cell: Rc::new(OnceCell::new()),
        }
    }

    /// A parser that resolves the rule when it runs.
    ///
    /// # Panics
    ///
    /// Running it panics if the rule was never defined or its entry point was dropped.
    pub fn refer(&self) -> Parser<T> {
        let cell = Rc::downgrade(&self.cell);
        let name = self.name.clone();
        lazy(move || match cell.upgrade() {
            Some(cell) => resolve(&cell, &name),
            None => panic!("rule '{}' was dropped while still referenced", name),
        })
    }

    pub fn define(self, parser: Parser<T>) -> Parser<T> {
        let Rule { name, cell } = self;
        // `define` consumes the rule, so the cell is still empty here.
        let _ = cell.set(parser);
        Parser::new(move |state| resolve(&cell, &name).parse(state))
    }
}

fn resolve<T>(cell: &OnceCell<Parser<T>>, name: &str) -> Parser<T> {
    trace!("entering rule '{}'", name);
    match cell.get() {
        Some(parser) => parser.clone(),
        None => panic!("rule '{}' was referenced before it was defined", name),
    }
}

#[macro_export]
macro_rules! all {
    ($parser: expr $(,)?) => {{ $parser }};
    ($parser: expr, $($parsers: expr),+ $(,)?) => {{
        $crate::combinator::and($parser, $crate::all!($($parsers),+))
    }};
}

#[macro_export]
macro_rules! any {
    ($parser: expr $(,)?) => {{ $parser }};
    ($parser: expr, $($parsers: expr),+ $(,)?) => {{
        $crate::combinator::or($parser, $crate::any!($($parsers),+))
    }};
}
