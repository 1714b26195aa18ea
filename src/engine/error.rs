//! Engine error type.
//!
//! The matcher engine distinguishes *parse failure* (a normal control
//! signal, represented as `Ok((None, _))` everywhere in this crate — see
//! `engine::driver`) from the handful of situations that are genuine bugs
//! in the grammar or the host program. Those are collected here as
//! [`GrammarError`], mirroring the three raised kinds from the original
//! `GrammarException` (unknown rule/action, non-empty stacks at return,
//! and the user-triggered `fail` action).
//!
//! `message`/`fail` actions carry a filename + [`Position`] the same way
//! `GrammarException` did (`path:line:column: message`), so callers get a
//! diagnosable location without threading position plumbing through every
//! call site by hand.

use std::fmt;

use crate::engine::position::Position;

/// Errors that unwind an entire [`crate::api::apply`] call.
///
/// Parse failure is *not* represented here — see the module docs.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    /// Unknown entry rule, unknown rule reference at match time, unknown
    /// action name, or wrong action arity/argument kind.
    #[error("{}configuration error: {message}", FileAt(.filename, .position))]
    Configuration { message: String, filename: Option<String>, position: Option<Position> },

    /// Non-empty stacks at the end of `apply`, pop from an empty stack, or
    /// an unknown history operator encountered during checkpoint restore.
    #[error("{}integrity error: {message}", FileAt(.filename, .position))]
    Integrity { message: String, filename: Option<String>, position: Option<Position> },

    /// The grammar's own `fail` action.
    #[error("{}{message}", FileAt(.filename, .position))]
    UserFail { message: String, filename: Option<String>, position: Option<Position> },
}

impl GrammarError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        GrammarError::Configuration { message: message.into(), filename: None, position: None }
    }

    pub(crate) fn integrity(message: impl Into<String>) -> Self {
        GrammarError::Integrity { message: message.into(), filename: None, position: None }
    }

    pub(crate) fn with_location(self, filename: &str, position: Position) -> Self {
        match self {
            GrammarError::Configuration { message, .. } => {
                GrammarError::Configuration { message, filename: Some(filename.to_string()), position: Some(position) }
            }
            GrammarError::Integrity { message, .. } => {
                GrammarError::Integrity { message, filename: Some(filename.to_string()), position: Some(position) }
            }
            GrammarError::UserFail { message, .. } => {
                GrammarError::UserFail { message, filename: Some(filename.to_string()), position: Some(position) }
            }
        }
    }
}

struct FileAt<'a>(&'a Option<String>, &'a Option<Position>);

impl fmt::Display for FileAt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0, self.1) {
            (Some(filename), Some(position)) => write!(f, "{filename}:{}:{}: ", position.line, position.column),
            (Some(filename), None) => write!(f, "{filename}: "),
            (None, Some(position)) => write!(f, "<unknown>:{}:{}: ", position.line, position.column),
            (None, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_filename_and_position() {
        let err = GrammarError::configuration("unknown rule 'Foo'")
            .with_location("grammar.qrl", Position { index: 12, line: 2, column: 3 });
        assert_eq!(err.to_string(), "grammar.qrl:2:3: configuration error: unknown rule 'Foo'");
    }

    #[test]
    fn formats_without_location() {
        let err = GrammarError::integrity("stacks not empty after parsing");
        assert_eq!(err.to_string(), "integrity error: stacks not empty after parsing");
    }
}
