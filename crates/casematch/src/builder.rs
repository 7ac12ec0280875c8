//! Fluent construction and evaluation of case chains.
//!
//! ```text
//! Match::of(subject) ─▶ Cases ─ when_*(..) ─▶ When ─ then*(..) ─▶ Cases ─ …
//!                        │
//!                        └─ evaluate() ─▶ MatchMonad
//! ```
//!
//! Registration never evaluates anything. `Cases::evaluate` scans the chain
//! in insertion order and fires the first case that matches.

use crate::action::{Action, ErrorFactory};
use crate::case::{Case, PartialFn, Predicate};
use crate::chain::CaseChain;
use crate::monad::{MatchMonad, MatchState};
use casematch_types::{FromValue, MatchError, MatchResult, Type, Value};
use std::error::Error as StdError;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};

// ══════════════════════════════════════════════════════════════════════════════
// Match
// ══════════════════════════════════════════════════════════════════════════════

/// Entry point for building a match.
///
/// The result type of the cases is inferred from the first `then*` call,
/// or declared up front with [`Match::returning`] when several cases
/// should produce values of one common type.
#[derive(Debug, Clone, Copy)]
pub struct Match;

impl Match {
    pub fn of<R>(subject: impl Into<Value>) -> Cases<R> {
        Cases {
            subject: Arc::new(subject.into()),
            chain: CaseChain::new(),
            otherwise: None,
        }
    }

    /// Start a match whose cases all yield an `R`.
    ///
    /// This only fixes the static result type; nothing is checked at runtime.
    pub fn returning<R>(subject: impl Into<Value>) -> Cases<R> {
        Self::of(subject)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Cases
// ══════════════════════════════════════════════════════════════════════════════

/// A subject with an immutable chain of cases and an optional otherwise clause.
///
/// Every registration returns a new `Cases`; the receiver is left as it was
/// and can be extended again in a different direction.
pub struct Cases<R> {
    subject: Arc<Value>,
    chain: CaseChain<R>,
    otherwise: Option<Action<R>>,
}

impl<R> Cases<R> {
    pub fn subject(&self) -> &Value {
        &self.subject
    }

    /// Number of registered cases, not counting the otherwise clause.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn has_otherwise(&self) -> bool {
        self.otherwise.is_some()
    }

    /// The same cases, matched against another subject.
    pub fn rebind(&self, subject: impl Into<Value>) -> Self {
        Self {
            subject: Arc::new(subject.into()),
            chain: self.chain.clone(),
            otherwise: self.otherwise.clone(),
        }
    }

    fn push(&self, case: Case<R>) -> Self {
        Self {
            subject: Arc::clone(&self.subject),
            chain: self.chain.push(case),
            otherwise: self.otherwise.clone(),
        }
    }

    fn with_otherwise(&self, action: Action<R>) -> Self {
        Self {
            subject: Arc::clone(&self.subject),
            chain: self.chain.clone(),
            otherwise: Some(action),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Force the chain.
    ///
    /// Runs the action of the first matching case, or the otherwise clause
    /// if none matched. Results are not cached: every call re-runs the
    /// chosen action.
    pub fn evaluate(&self) -> MatchMonad<R> {
        let subject = &*self.subject;
        for (index, case) in self.chain.iter().enumerate() {
            match case.matches(subject) {
                Ok(true) => {
                    debug!(index, kind = %case.kind(), %subject, "case matched");
                    let payload = case.apply(subject);
                    return MatchMonad::fired(
                        Arc::clone(&self.subject),
                        MatchState::Matched,
                        payload,
                    );
                }
                Ok(false) => trace!(index, kind = %case.kind(), "case rejected"),
                Err(err) => {
                    debug!(index, kind = %case.kind(), %err, "case chain failed");
                    return MatchMonad::failed(Arc::clone(&self.subject), err);
                }
            }
        }
        match &self.otherwise {
            Some(action) => {
                debug!(%subject, "no case matched, running otherwise");
                MatchMonad::fired(
                    Arc::clone(&self.subject),
                    MatchState::Otherwise,
                    action.run(subject),
                )
            }
            None => {
                debug!(%subject, "no case matched");
                MatchMonad::unmatched(Arc::clone(&self.subject))
            }
        }
    }

    pub fn get(&self) -> MatchResult<R> {
        self.evaluate().get()
    }

    pub fn or_else(&self, fallback: R) -> MatchResult<R> {
        self.evaluate().or_else(fallback)
    }

    pub fn or_else_get(&self, fallback: impl FnOnce() -> R) -> MatchResult<R> {
        self.evaluate().or_else_get(fallback)
    }

    pub fn or_else_map(&self, fallback: impl FnOnce(&Value) -> R) -> MatchResult<R> {
        self.evaluate().or_else_map(fallback)
    }

    pub fn map<S>(&self, f: impl FnOnce(R) -> S) -> MatchMonad<S> {
        self.evaluate().map(f)
    }

    pub fn flat_map<S, M>(&self, f: impl FnOnce(R) -> M) -> MatchMonad<S>
    where
        M: Into<MatchMonad<S>>,
    {
        self.evaluate().flat_map(f)
    }

    pub fn filter(&self, predicate: impl FnOnce(&R) -> bool) -> MatchMonad<R> {
        self.evaluate().filter(predicate)
    }
}

impl<R: 'static> Cases<R> {
    // ══════════════════════════════════════════════════════════════════════
    // Registration
    // ══════════════════════════════════════════════════════════════════════

    /// Match a subject equal to `value`. `Value::Nil` is a legal target.
    pub fn when_is(&self, value: impl Into<Value>) -> When<R> {
        When::new(self.clone(), Matcher::Value(value.into()))
    }

    /// Match a subject equal to any of `values`.
    pub fn when_is_in<I>(&self, values: I) -> When<R>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        When::new(self.clone(), Matcher::ValueIn(Some(values)))
    }

    /// Like [`when_is_in`](Self::when_is_in), for a value set that may be
    /// absent. An absent set is accepted here and fails when forced.
    pub fn when_is_in_opt(&self, values: Option<Vec<Value>>) -> When<R> {
        When::new(self.clone(), Matcher::ValueIn(values))
    }

    /// Match when the subject converts to `A` and `predicate` holds.
    pub fn when<A, F>(&self, predicate: F) -> When<R, A>
    where
        A: FromValue + 'static,
        F: Fn(A) -> bool + Send + Sync + 'static,
    {
        When::new(self.clone(), Matcher::Predicate(Predicate::new(predicate)))
    }

    pub fn try_when<A, F>(&self, predicate: Option<F>) -> MatchResult<When<R, A>>
    where
        A: FromValue + 'static,
        F: Fn(A) -> bool + Send + Sync + 'static,
    {
        let predicate = predicate.ok_or(MatchError::NullArgument("predicate"))?;
        Ok(self.when(predicate))
    }

    /// Match a non-nil subject of `T`'s domain; `then_map` receives a `T`.
    pub fn when_type<T: FromValue + 'static>(&self) -> When<R, T> {
        When::new(self.clone(), Matcher::Type(T::domain()))
    }

    /// Match a non-nil subject whose runtime type is `ty` or a subtype of it.
    pub fn when_type_of(&self, ty: Type) -> When<R> {
        When::new(self.clone(), Matcher::Type(ty))
    }

    pub fn try_when_type(&self, ty: Option<Type>) -> MatchResult<When<R>> {
        let ty = ty.ok_or(MatchError::NullArgument("type"))?;
        Ok(self.when_type_of(ty))
    }

    pub fn when_type_in(&self, types: impl IntoIterator<Item = Type>) -> When<R> {
        When::new(self.clone(), Matcher::TypeIn(types.into_iter().collect()))
    }

    pub fn try_when_type_in(&self, types: Option<Vec<Type>>) -> MatchResult<When<R>> {
        let types = types.ok_or(MatchError::NullArgument("types"))?;
        Ok(self.when_type_in(types))
    }

    /// Match when the subject lies in `function`'s domain.
    /// [`WhenApplicable::then_apply`] registers the function as the action.
    pub fn when_applicable<A, F>(&self, function: F) -> WhenApplicable<R>
    where
        A: FromValue + 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        WhenApplicable {
            cases: self.clone(),
            function: PartialFn::new(function),
        }
    }

    pub fn try_when_applicable<A, F>(&self, function: Option<F>) -> MatchResult<WhenApplicable<R>>
    where
        A: FromValue + 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let function = function.ok_or(MatchError::NullArgument("function"))?;
        Ok(self.when_applicable(function))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Otherwise
    // ══════════════════════════════════════════════════════════════════════
    //
    // Each call replaces any earlier otherwise clause.

    pub fn otherwise(&self, value: R) -> Self
    where
        R: Clone + Send + Sync,
    {
        self.with_otherwise(Action::constant(value))
    }

    pub fn otherwise_get(&self, supplier: impl Fn() -> R + Send + Sync + 'static) -> Self {
        self.with_otherwise(Action::supplier(supplier))
    }

    pub fn otherwise_map(&self, f: impl Fn(&Value) -> R + Send + Sync + 'static) -> Self {
        self.with_otherwise(Action::function(f))
    }

    pub fn otherwise_run(&self, runnable: impl Fn() + Send + Sync + 'static) -> Self
    where
        R: Default,
    {
        self.with_otherwise(Action::runnable(runnable))
    }

    pub fn otherwise_consume(&self, consumer: impl Fn(&Value) + Send + Sync + 'static) -> Self
    where
        R: Default,
    {
        self.with_otherwise(Action::consumer(consumer))
    }

    pub fn otherwise_throw<E, F>(&self, factory: F) -> Self
    where
        E: StdError + Send + Sync + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.with_otherwise(Action::throw(ErrorFactory::new(factory)))
    }
}

impl<R> Clone for Cases<R> {
    fn clone(&self) -> Self {
        Self {
            subject: Arc::clone(&self.subject),
            chain: self.chain.clone(),
            otherwise: self.otherwise.clone(),
        }
    }
}

impl<R> fmt::Debug for Cases<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cases")
            .field("subject", &self.subject)
            .field("chain", &self.chain)
            .field("otherwise", &self.otherwise)
            .finish()
    }
}

impl<R> From<Cases<R>> for MatchMonad<R> {
    fn from(cases: Cases<R>) -> Self {
        cases.evaluate()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// When
// ══════════════════════════════════════════════════════════════════════════════

/// A matcher waiting for its action.
#[derive(Debug, Clone)]
enum Matcher {
    Value(Value),
    ValueIn(Option<Vec<Value>>),
    Predicate(Predicate),
    Type(Type),
    TypeIn(Vec<Type>),
}

impl Matcher {
    fn bind<R>(self, action: Action<R>) -> Case<R> {
        match self {
            Matcher::Value(value) => Case::Value { value, action },
            Matcher::ValueIn(values) => Case::ValueIn { values, action },
            Matcher::Predicate(predicate) => Case::Predicate { predicate, action },
            Matcher::Type(ty) => Case::Type { ty, action },
            Matcher::TypeIn(types) => Case::TypeIn { types, action },
        }
    }
}

/// A registered matcher; one of the `then*` binders completes the case.
///
/// `N` is the type the subject is narrowed to for `then_map` and
/// `then_consume`. It is [`Value`] unless the matcher implies a narrower
/// type (`when` with a typed predicate, `when_type::<T>()`).
pub struct When<R, N = Value> {
    cases: Cases<R>,
    matcher: Matcher,
    narrow: PhantomData<fn() -> N>,
}

impl<R, N> When<R, N> {
    fn new(cases: Cases<R>, matcher: Matcher) -> Self {
        Self {
            cases,
            matcher,
            narrow: PhantomData,
        }
    }

    fn bind(self, action: Action<R>) -> Cases<R> {
        self.cases.push(self.matcher.bind(action))
    }
}

impl<R: 'static, N: FromValue + 'static> When<R, N> {
    /// Yield `value`.
    pub fn then(self, value: R) -> Cases<R>
    where
        R: Clone + Send + Sync,
    {
        self.bind(Action::constant(value))
    }

    /// Yield the result of `supplier`, computed only if the case fires.
    pub fn then_get(self, supplier: impl Fn() -> R + Send + Sync + 'static) -> Cases<R> {
        self.bind(Action::supplier(supplier))
    }

    /// Yield `f` applied to the (narrowed) subject.
    pub fn then_map<F>(self, f: F) -> Cases<R>
    where
        F: Fn(N) -> R + Send + Sync + 'static,
    {
        self.bind(Action::narrowed::<N, F>(f))
    }

    /// Run a side effect; the case yields `R::default()`.
    pub fn then_run(self, runnable: impl Fn() + Send + Sync + 'static) -> Cases<R>
    where
        R: Default,
    {
        self.bind(Action::runnable(runnable))
    }

    /// Pass the (narrowed) subject to a side effect; the case yields `R::default()`.
    pub fn then_consume<F>(self, consumer: F) -> Cases<R>
    where
        R: Default,
        F: Fn(N) + Send + Sync + 'static,
    {
        self.bind(Action::narrowed(move |n: N| {
            consumer(n);
            R::default()
        }))
    }

    /// Raise the error built by `factory` when the result is extracted.
    /// Nothing is built or raised at registration.
    pub fn then_throw<E, F>(self, factory: F) -> Cases<R>
    where
        E: StdError + Send + Sync + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.bind(Action::throw(ErrorFactory::new(factory)))
    }
}

impl<R, N> fmt::Debug for When<R, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("When")
            .field("cases", &self.cases)
            .field("matcher", &self.matcher)
            .finish()
    }
}

/// A registered partial function, completed by [`then_apply`](Self::then_apply).
pub struct WhenApplicable<R> {
    cases: Cases<R>,
    function: PartialFn<R>,
}

impl<R> WhenApplicable<R> {
    /// Register the function as the case's action.
    pub fn then_apply(self) -> Cases<R> {
        self.cases.push(Case::Function {
            function: self.function,
        })
    }
}

impl<R> fmt::Debug for WhenApplicable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhenApplicable")
            .field("cases", &self.cases)
            .field("function", &self.function)
            .finish()
    }
}
