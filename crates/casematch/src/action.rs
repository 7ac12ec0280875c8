//! Actions bound to cases and otherwise clauses.

use casematch_types::{FromValue, MatchError, Value};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// A zero-argument factory for a deferred error.
///
/// The factory runs only when a result carrying it is forced.
#[derive(Clone)]
pub struct ErrorFactory(Arc<dyn Fn() -> MatchError + Send + Sync>);

impl ErrorFactory {
    pub fn new<E, F>(factory: F) -> Self
    where
        E: StdError + Send + Sync + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        Self(Arc::new(move || MatchError::deferred(factory())))
    }

    /// A factory that re-raises an error that is already known.
    pub(crate) fn replay(error: MatchError) -> Self {
        Self(Arc::new(move || error.clone()))
    }

    pub fn raise(&self) -> MatchError {
        (self.0)()
    }
}

impl fmt::Debug for ErrorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorFactory(..)")
    }
}

/// The outcome of running an action: a value, or an error to raise later.
#[derive(Debug, Clone)]
pub enum Payload<R> {
    Value(R),
    Raise(ErrorFactory),
}

impl<R> Payload<R> {
    pub fn map<S>(self, f: impl FnOnce(R) -> S) -> Payload<S> {
        match self {
            Payload::Value(v) => Payload::Value(f(v)),
            Payload::Raise(factory) => Payload::Raise(factory),
        }
    }

    pub fn into_result(self) -> Result<R, MatchError> {
        match self {
            Payload::Value(v) => Ok(v),
            Payload::Raise(factory) => Err(factory.raise()),
        }
    }
}

/// What a case or otherwise clause does when it fires.
pub enum Action<R> {
    /// A value fixed at registration.
    Constant(Arc<dyn Fn() -> R + Send + Sync>),
    /// A lazily computed value that ignores the subject.
    Supplier(Arc<dyn Fn() -> R + Send + Sync>),
    /// A function of the subject.
    Function(Arc<dyn Fn(&Value) -> R + Send + Sync>),
    /// A function of the subject narrowed to a typed parameter.
    Narrowed(Arc<dyn Fn(&Value) -> Option<R> + Send + Sync>),
    /// A deferred error.
    Throw(ErrorFactory),
}

impl<R: 'static> Action<R> {
    pub fn constant(value: R) -> Self
    where
        R: Clone + Send + Sync,
    {
        Action::Constant(Arc::new(move || value.clone()))
    }

    pub fn supplier(f: impl Fn() -> R + Send + Sync + 'static) -> Self {
        Action::Supplier(Arc::new(f))
    }

    pub fn function(f: impl Fn(&Value) -> R + Send + Sync + 'static) -> Self {
        Action::Function(Arc::new(f))
    }

    /// A side effect on the subject; yields `R::default()`.
    pub fn consumer(f: impl Fn(&Value) + Send + Sync + 'static) -> Self
    where
        R: Default,
    {
        Action::Function(Arc::new(move |subject| {
            f(subject);
            R::default()
        }))
    }

    /// A side effect that ignores the subject; yields `R::default()`.
    pub fn runnable(f: impl Fn() + Send + Sync + 'static) -> Self
    where
        R: Default,
    {
        Action::Supplier(Arc::new(move || {
            f();
            R::default()
        }))
    }

    pub fn narrowed<N, F>(f: F) -> Self
    where
        N: FromValue + 'static,
        F: Fn(N) -> R + Send + Sync + 'static,
    {
        Action::Narrowed(Arc::new(move |subject| N::from_value(subject).map(&f)))
    }

    pub fn throw(factory: ErrorFactory) -> Self {
        Action::Throw(factory)
    }
}

impl<R> Action<R> {
    /// Run the action against `subject`.
    pub fn run(&self, subject: &Value) -> Payload<R> {
        match self {
            Action::Constant(f) | Action::Supplier(f) => Payload::Value(f()),
            Action::Function(f) => Payload::Value(f(subject)),
            Action::Narrowed(f) => match f(subject) {
                Some(result) => Payload::Value(result),
                None => Payload::Raise(ErrorFactory::replay(MatchError::NoMatch(
                    subject.to_string(),
                ))),
            },
            Action::Throw(factory) => Payload::Raise(factory.clone()),
        }
    }
}

impl<R> Clone for Action<R> {
    fn clone(&self) -> Self {
        match self {
            Action::Constant(f) => Action::Constant(Arc::clone(f)),
            Action::Supplier(f) => Action::Supplier(Arc::clone(f)),
            Action::Function(f) => Action::Function(Arc::clone(f)),
            Action::Narrowed(f) => Action::Narrowed(Arc::clone(f)),
            Action::Throw(factory) => Action::Throw(factory.clone()),
        }
    }
}

impl<R> fmt::Debug for Action<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Constant(_) => "Constant",
            Action::Supplier(_) => "Supplier",
            Action::Function(_) => "Function",
            Action::Narrowed(_) => "Narrowed",
            Action::Throw(_) => "Throw",
        };
        f.write_str(name)
    }
}
