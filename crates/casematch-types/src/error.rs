use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Coarse classification of a [`MatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NullArgument,
    NoMatch,
    Deferred,
    InvalidRule,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NullArgument => "null_argument",
            ErrorKind::NoMatch => "no_match",
            ErrorKind::Deferred => "deferred",
            ErrorKind::InvalidRule => "invalid_rule",
        };
        f.write_str(s)
    }
}

/// Errors reported by case registration and by forcing a match.
///
/// Panics raised inside user closures are not represented here: they
/// unwind through the engine untouched.
#[derive(Debug, Clone, Error)]
pub enum MatchError {
    /// A required matcher was absent.
    #[error("null argument: {0}")]
    NullArgument(&'static str),

    /// `get` was called on a result where no case matched.
    #[error("no match for {0}")]
    NoMatch(String),

    /// An error produced by a `then_throw` / `otherwise_throw` factory.
    #[error(transparent)]
    Deferred(Arc<dyn StdError + Send + Sync>),

    /// A declarative rule table is malformed.
    #[error("invalid rule: {0}")]
    InvalidRule(String),
}

impl MatchError {
    /// Wrap a user error as a deferred match error.
    pub fn deferred<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Deferred(Arc::new(error))
    }

    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NullArgument(_) => ErrorKind::NullArgument,
            Self::NoMatch(_) => ErrorKind::NoMatch,
            Self::Deferred(_) => ErrorKind::Deferred,
            Self::InvalidRule(_) => ErrorKind::InvalidRule,
        }
    }

    /// Downcast a deferred error to its concrete type.
    pub fn downcast_deferred<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match self {
            Self::Deferred(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn deferred_is_transparent() {
        let err = MatchError::deferred(Boom);
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.kind(), ErrorKind::Deferred);
        assert!(err.downcast_deferred::<Boom>().is_some());
    }

    #[test]
    fn downcast_of_other_kinds_is_none() {
        let err = MatchError::NoMatch("1".into());
        assert!(err.downcast_deferred::<Boom>().is_none());
        assert_eq!(err.to_string(), "no match for 1");
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NullArgument).unwrap();
        assert_eq!(json, "\"null_argument\"");
    }
}
