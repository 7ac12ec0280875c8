//! Match rules.
//!
//! A [`Case`] pairs one matcher with the action that runs when it fires.
//! The set of case kinds is closed; each kind answers `matches` and `apply`.

use crate::action::{Action, ErrorFactory, Payload};
use casematch_types::{FromValue, MatchError, MatchResult, Type, Value};
use std::fmt;
use std::sync::Arc;

/// A typed predicate over the subject.
///
/// The predicate only runs when the subject lies in its parameter domain;
/// outside it the predicate simply does not hold.
#[derive(Clone)]
pub struct Predicate {
    domain: Type,
    test: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl Predicate {
    pub fn new<A, F>(predicate: F) -> Self
    where
        A: FromValue + 'static,
        F: Fn(A) -> bool + Send + Sync + 'static,
    {
        Self {
            domain: A::domain(),
            test: Arc::new(move |subject| A::from_value(subject).is_some_and(&predicate)),
        }
    }

    pub fn domain(&self) -> &Type {
        &self.domain
    }

    pub fn test(&self, subject: &Value) -> bool {
        (self.test)(subject)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self.domain)
    }
}

/// A partial function: defined only for subjects in its declared domain.
pub struct PartialFn<R> {
    domain: Type,
    applicable: fn(&Value) -> bool,
    apply: Arc<dyn Fn(&Value) -> Option<R> + Send + Sync>,
}

impl<R: 'static> PartialFn<R> {
    pub fn new<A, F>(function: F) -> Self
    where
        A: FromValue + 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self {
            domain: A::domain(),
            applicable: A::accepts,
            apply: Arc::new(move |subject| A::from_value(subject).map(&function)),
        }
    }
}

impl<R> PartialFn<R> {
    pub fn domain(&self) -> &Type {
        &self.domain
    }

    pub fn is_applicable(&self, subject: &Value) -> bool {
        (self.applicable)(subject)
    }

    /// Apply to `subject`, or `None` when the subject lies outside the domain.
    pub fn apply(&self, subject: &Value) -> Option<R> {
        (self.apply)(subject)
    }
}

impl<R> Clone for PartialFn<R> {
    fn clone(&self) -> Self {
        Self {
            domain: self.domain.clone(),
            applicable: self.applicable,
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<R> fmt::Debug for PartialFn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartialFn({})", self.domain)
    }
}

/// The kind of a case, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    Value,
    ValueIn,
    Predicate,
    Type,
    TypeIn,
    Function,
}

impl fmt::Display for CaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseKind::Value => "is",
            CaseKind::ValueIn => "is_in",
            CaseKind::Predicate => "when",
            CaseKind::Type => "type",
            CaseKind::TypeIn => "type_in",
            CaseKind::Function => "applicable",
        };
        f.write_str(s)
    }
}

/// One match rule and its bound action.
pub enum Case<R> {
    /// Subject equals the value. `Nil` is a legal target.
    Value { value: Value, action: Action<R> },
    /// Subject equals any element. `None` means the set itself was absent.
    ValueIn {
        values: Option<Vec<Value>>,
        action: Action<R>,
    },
    Predicate {
        predicate: Predicate,
        action: Action<R>,
    },
    /// Subject is non-nil and an instance of the type.
    Type { ty: Type, action: Action<R> },
    /// Subject is non-nil and an instance of any of the types.
    TypeIn { types: Vec<Type>, action: Action<R> },
    /// Subject is in the function's domain; firing applies the function.
    Function { function: PartialFn<R> },
}

impl<R> Case<R> {
    pub fn kind(&self) -> CaseKind {
        match self {
            Case::Value { .. } => CaseKind::Value,
            Case::ValueIn { .. } => CaseKind::ValueIn,
            Case::Predicate { .. } => CaseKind::Predicate,
            Case::Type { .. } => CaseKind::Type,
            Case::TypeIn { .. } => CaseKind::TypeIn,
            Case::Function { .. } => CaseKind::Function,
        }
    }

    /// Does this case fire for `subject`?
    ///
    /// Fails only for a value set that was registered absent.
    pub fn matches(&self, subject: &Value) -> MatchResult<bool> {
        let hit = match self {
            Case::Value { value, .. } => value == subject,
            Case::ValueIn { values, .. } => values
                .as_ref()
                .ok_or(MatchError::NullArgument("values"))?
                .iter()
                .any(|v| v == subject),
            Case::Predicate { predicate, .. } => predicate.test(subject),
            Case::Type { ty, .. } => !subject.is_nil() && ty.accepts(subject),
            Case::TypeIn { types, .. } => {
                !subject.is_nil() && types.iter().any(|ty| ty.accepts(subject))
            }
            Case::Function { function } => function.is_applicable(subject),
        };
        Ok(hit)
    }

    /// Run the bound action. Only meaningful after `matches` returned `true`.
    pub fn apply(&self, subject: &Value) -> Payload<R> {
        match self {
            Case::Value { action, .. }
            | Case::ValueIn { action, .. }
            | Case::Predicate { action, .. }
            | Case::Type { action, .. }
            | Case::TypeIn { action, .. } => action.run(subject),
            Case::Function { function } => match function.apply(subject) {
                Some(result) => Payload::Value(result),
                None => Payload::Raise(ErrorFactory::replay(MatchError::NoMatch(
                    subject.to_string(),
                ))),
            },
        }
    }
}

impl<R> Clone for Case<R> {
    fn clone(&self) -> Self {
        match self {
            Case::Value { value, action } => Case::Value {
                value: value.clone(),
                action: action.clone(),
            },
            Case::ValueIn { values, action } => Case::ValueIn {
                values: values.clone(),
                action: action.clone(),
            },
            Case::Predicate { predicate, action } => Case::Predicate {
                predicate: predicate.clone(),
                action: action.clone(),
            },
            Case::Type { ty, action } => Case::Type {
                ty: ty.clone(),
                action: action.clone(),
            },
            Case::TypeIn { types, action } => Case::TypeIn {
                types: types.clone(),
                action: action.clone(),
            },
            Case::Function { function } => Case::Function {
                function: function.clone(),
            },
        }
    }
}

impl<R> fmt::Debug for Case<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Case::Value { value, action } => write!(f, "is({value}) -> {action:?}"),
            Case::ValueIn { values, action } => match values {
                Some(values) => write!(f, "is_in({values:?}) -> {action:?}"),
                None => write!(f, "is_in(null) -> {action:?}"),
            },
            Case::Predicate { predicate, action } => write!(f, "{predicate:?} -> {action:?}"),
            Case::Type { ty, action } => write!(f, "type({ty}) -> {action:?}"),
            Case::TypeIn { types, action } => write!(f, "type_in({types:?}) -> {action:?}"),
            Case::Function { function } => write!(f, "{function:?}"),
        }
    }
}
