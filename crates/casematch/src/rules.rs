//! Declarative rule tables.
//!
//! A [`RuleSet`] describes value and type cases as JSON, so a match can be
//! configured without code:
//!
//! ```json
//! {
//!   "rules": [
//!     { "when": "is", "value": 0, "then": "zero" },
//!     { "when": "is_in", "values": [1, 2, 3], "then": "small" },
//!     { "when": "type", "type": "string", "then": "text" },
//!     { "when": "type_in", "types": ["list", "record"], "throw": "composite" }
//!   ],
//!   "otherwise": "other"
//! }
//! ```
//!
//! Binding a table registers its rules in order. A `type` or `type_in`
//! rule without a matcher is rejected at binding; an `is_in` rule with a
//! null value set binds and fails when forced.

use crate::builder::{Cases, Match, When};
use casematch_types::{MatchError, MatchResult, Type, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use thiserror::Error;
use tracing::debug;

/// The error raised by a rule with a `throw` message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rule violation: {0}")]
pub struct RuleViolation(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Is,
    IsIn,
    Type,
    TypeIn,
}

/// One row of a rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub when: RuleKind,
    /// Target of an `is` rule. Null matches a nil subject.
    #[serde(default)]
    pub value: Json,
    /// Targets of an `is_in` rule.
    #[serde(default)]
    pub values: Option<Vec<Json>>,
    #[serde(default, rename = "type")]
    pub ty: Option<Type>,
    #[serde(default)]
    pub types: Option<Vec<Type>>,
    /// Result when the rule fires.
    #[serde(default)]
    pub then: Json,
    /// If set, firing raises a [`RuleViolation`] instead of yielding `then`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throw: Option<String>,
}

impl Rule {
    /// Append this rule to `cases`.
    pub fn register(&self, cases: &Cases<Value>) -> MatchResult<Cases<Value>> {
        let when: When<Value> = match self.when {
            RuleKind::Is => cases.when_is(self.value.clone()),
            RuleKind::IsIn => cases.when_is_in_opt(
                self.values
                    .clone()
                    .map(|values| values.into_iter().map(Value::from).collect()),
            ),
            RuleKind::Type => cases.try_when_type(self.ty.clone())?,
            RuleKind::TypeIn => cases.try_when_type_in(self.types.clone())?,
        };
        Ok(match &self.throw {
            Some(message) => {
                let message = message.clone();
                when.then_throw(move || RuleViolation(message.clone()))
            }
            None => when.then(Value::from(self.then.clone())),
        })
    }
}

/// An ordered rule table with an optional fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
    /// Result when no rule fires. Absent or null means no fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<Json>,
    /// Raise a [`RuleViolation`] when no rule fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherwise_throw: Option<String>,
}

impl RuleSet {
    pub fn from_json(json: &str) -> MatchResult<Self> {
        let set: RuleSet =
            serde_json::from_str(json).map_err(|e| MatchError::InvalidRule(e.to_string()))?;
        if set.otherwise.is_some() && set.otherwise_throw.is_some() {
            return Err(MatchError::InvalidRule(
                "`otherwise` and `otherwise_throw` are mutually exclusive".to_string(),
            ));
        }
        Ok(set)
    }

    pub fn to_json(&self) -> MatchResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| MatchError::InvalidRule(e.to_string()))
    }

    /// Register every rule against `subject`.
    pub fn bind(&self, subject: impl Into<Value>) -> MatchResult<Cases<Value>> {
        let mut cases = Match::returning::<Value>(subject);
        for rule in &self.rules {
            cases = rule.register(&cases)?;
        }
        if let Some(fallback) = &self.otherwise {
            cases = cases.otherwise(Value::from(fallback.clone()));
        } else if let Some(message) = &self.otherwise_throw {
            let message = message.clone();
            cases = cases.otherwise_throw(move || RuleViolation(message.clone()));
        }
        debug!(rules = self.rules.len(), subject = %cases.subject(), "bound rule set");
        Ok(cases)
    }

    /// Bind and force in one step.
    pub fn evaluate(&self, subject: impl Into<Value>) -> MatchResult<Value> {
        self.bind(subject)?.get()
    }
}
