//! The result of forcing a case chain.
//!
//! A [`MatchMonad`] is in one of three states. `Matched` and `Otherwise`
//! carry a payload (or a deferred error); `Unmatched` carries nothing.
//! `map`, `flat_map` and `filter` can move a result to `Unmatched` but
//! never out of it.

use crate::action::{Action, ErrorFactory, Payload};
use casematch_types::{MatchError, MatchResult, Value};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Which branch produced a [`MatchMonad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchState {
    /// A case fired.
    Matched,
    /// No case fired and the otherwise clause ran.
    Otherwise,
    /// Nothing fired.
    Unmatched,
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchState::Matched => "matched",
            MatchState::Otherwise => "otherwise",
            MatchState::Unmatched => "unmatched",
        };
        f.write_str(s)
    }
}

/// An evaluated match.
///
/// The deferred error, when present, wins over any payload: `get`,
/// `or_else*` and `iter` all raise it.
///
/// Once a case or otherwise clause has fired the result is settled: a
/// later `filter` may demote it to `Unmatched`, but no otherwise clause
/// runs on it again.
#[derive(Clone)]
pub struct MatchMonad<R> {
    subject: Arc<Value>,
    state: MatchState,
    payload: Option<R>,
    deferred: Option<ErrorFactory>,
    settled: bool,
}

impl<R> MatchMonad<R> {
    pub(crate) fn fired(subject: Arc<Value>, state: MatchState, payload: Payload<R>) -> Self {
        match payload {
            Payload::Value(value) => Self {
                subject,
                state,
                payload: Some(value),
                deferred: None,
                settled: true,
            },
            Payload::Raise(factory) => Self {
                subject,
                state,
                payload: None,
                deferred: Some(factory),
                settled: true,
            },
        }
    }

    pub(crate) fn unmatched(subject: Arc<Value>) -> Self {
        Self {
            subject,
            state: MatchState::Unmatched,
            payload: None,
            deferred: None,
            settled: false,
        }
    }

    /// A chain that could not be evaluated. The error is raised on extraction.
    pub(crate) fn failed(subject: Arc<Value>, error: MatchError) -> Self {
        Self {
            subject,
            state: MatchState::Unmatched,
            payload: None,
            deferred: Some(ErrorFactory::replay(error)),
            settled: false,
        }
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn is_matched(&self) -> bool {
        self.state == MatchState::Matched
    }

    pub fn is_otherwise(&self) -> bool {
        self.state == MatchState::Otherwise
    }

    pub fn is_unmatched(&self) -> bool {
        self.state == MatchState::Unmatched
    }

    /// `true` if extraction will raise an error instead of yielding a value.
    pub fn is_deferred_error(&self) -> bool {
        self.deferred.is_some()
    }

    pub fn subject(&self) -> &Value {
        &self.subject
    }

    // ══════════════════════════════════════════════════════════════════════
    // Extraction
    // ══════════════════════════════════════════════════════════════════════

    /// The payload, or an error.
    ///
    /// A deferred error is raised first. An unmatched result yields
    /// [`MatchError::NoMatch`].
    pub fn get(self) -> MatchResult<R> {
        if let Some(factory) = &self.deferred {
            return Err(factory.raise());
        }
        self.payload
            .ok_or_else(|| MatchError::NoMatch(self.subject.to_string()))
    }

    /// The payload, or `fallback` when unmatched.
    pub fn or_else(self, fallback: R) -> MatchResult<R> {
        self.or_else_map(|_| fallback)
    }

    pub fn or_else_get(self, fallback: impl FnOnce() -> R) -> MatchResult<R> {
        self.or_else_map(|_| fallback())
    }

    /// The payload, or `fallback` applied to the subject when unmatched.
    pub fn or_else_map(self, fallback: impl FnOnce(&Value) -> R) -> MatchResult<R> {
        if let Some(factory) = &self.deferred {
            return Err(factory.raise());
        }
        match self.payload {
            Some(value) => Ok(value),
            None => Ok(fallback(&self.subject)),
        }
    }

    /// Iterate over the payload: one element if matched or otherwise,
    /// none if unmatched. Each call starts a fresh iteration.
    pub fn iter(&self) -> MatchResult<std::option::Iter<'_, R>> {
        if let Some(factory) = &self.deferred {
            return Err(factory.raise());
        }
        Ok(self.payload.iter())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Monadic operations
    // ══════════════════════════════════════════════════════════════════════

    pub fn map<S>(self, f: impl FnOnce(R) -> S) -> MatchMonad<S> {
        MatchMonad {
            subject: self.subject,
            state: self.state,
            payload: self.payload.map(f),
            deferred: self.deferred,
            settled: self.settled,
        }
    }

    /// Replace this result with the one `f` computes from the payload.
    ///
    /// `f` may return an evaluated [`MatchMonad`] or an unevaluated
    /// [`Cases`](crate::Cases), which is forced.
    pub fn flat_map<S, M>(self, f: impl FnOnce(R) -> M) -> MatchMonad<S>
    where
        M: Into<MatchMonad<S>>,
    {
        match self.payload {
            Some(value) if self.deferred.is_none() => {
                let next: MatchMonad<S> = f(value).into();
                MatchMonad {
                    settled: true,
                    ..next
                }
            }
            _ => MatchMonad {
                subject: self.subject,
                state: self.state,
                payload: None,
                deferred: self.deferred,
                settled: self.settled,
            },
        }
    }

    /// Demote to `Unmatched` when the payload does not satisfy `predicate`.
    pub fn filter(self, predicate: impl FnOnce(&R) -> bool) -> Self {
        let keep = self.payload.as_ref().map_or(true, predicate);
        if keep {
            return self;
        }
        Self {
            subject: self.subject,
            state: MatchState::Unmatched,
            payload: None,
            deferred: self.deferred,
            settled: self.settled,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Otherwise
    // ══════════════════════════════════════════════════════════════════════

    /// Run `action` if, and only if, nothing has fired yet.
    ///
    /// A result that failed to evaluate keeps its error.
    pub(crate) fn otherwise_with(self, action: &Action<R>) -> Self {
        if self.settled || self.deferred.is_some() {
            return self;
        }
        let payload = action.run(&self.subject);
        Self::fired(self.subject, MatchState::Otherwise, payload)
    }
}

impl<R: 'static> MatchMonad<R> {
    pub fn otherwise(self, value: R) -> Self
    where
        R: Clone + Send + Sync,
    {
        self.otherwise_with(&Action::constant(value))
    }

    pub fn otherwise_get(self, supplier: impl Fn() -> R + Send + Sync + 'static) -> Self {
        self.otherwise_with(&Action::supplier(supplier))
    }

    pub fn otherwise_map(self, f: impl Fn(&Value) -> R + Send + Sync + 'static) -> Self {
        self.otherwise_with(&Action::function(f))
    }

    pub fn otherwise_run(self, runnable: impl Fn() + Send + Sync + 'static) -> Self
    where
        R: Default,
    {
        self.otherwise_with(&Action::runnable(runnable))
    }

    pub fn otherwise_consume(self, consumer: impl Fn(&Value) + Send + Sync + 'static) -> Self
    where
        R: Default,
    {
        self.otherwise_with(&Action::consumer(consumer))
    }

    pub fn otherwise_throw<E, F>(self, factory: F) -> Self
    where
        E: StdError + Send + Sync + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.otherwise_with(&Action::throw(ErrorFactory::new(factory)))
    }
}

impl<R: fmt::Debug> fmt::Debug for MatchMonad<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("MatchMonad");
        s.field("subject", &self.subject)
            .field("state", &self.state)
            .field("payload", &self.payload)
            .field("settled", &self.settled);
        if self.deferred.is_some() {
            s.field("deferred", &"..");
        }
        s.finish()
    }
}
