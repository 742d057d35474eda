//! A parser combinator engine and a recursive JSON-subset grammar built on it.
//!
//! A [`Parser`] is a function from an immutable [`State`] to a [`Match`]:
//! either a value and the state after it, or a [`Failure`]. Combinators in
//! [`combinator`] build bigger parsers out of smaller ones; [`Rule`] lets a
//! grammar refer to a rule before it is defined.
//!
//! ```
//! use strand::json::{parse_value, JsonValue};
//!
//! let value = parse_value(r#"[ 1, [ "a" ] ]"#).unwrap();
//! assert_eq!(
//!     value,
//!     JsonValue::Array(vec![
//!         JsonValue::Number(1.),
//!         JsonValue::Array(vec![JsonValue::Text("a".into())]),
//!     ])
//! );
//! ```

pub mod combinator;
pub mod config;
pub mod error;
pub mod generate;
pub mod json;
pub mod parse;
pub mod state;

pub use combinator::Rule;
pub use config::Options;
pub use error::ParseError;
pub use json::{parse_value, parse_value_with, JsonValue};
pub use parse::{run, Failure, FailureKind, Match, Parser};
pub use state::State;
