//! casematch: first-match-wins case chains over runtime values.
//!
//! A match is built by registering cases against one subject and then
//! forcing the chain. Registration is cheap and side-effect free; forcing
//! scans the cases in order and runs the action of the first one that
//! matches.
//!
//! ```
//! use casematch::{Match, MatchState};
//! use casematch_types::Number;
//!
//! let parity = Match::of(4)
//!     .when(|s: String| s.is_empty())
//!     .then("empty")
//!     .when(|i: i32| i % 2 == 0)
//!     .then_get(|| "even")
//!     .or_else("odd")
//!     .unwrap();
//! assert_eq!(parity, "even");
//!
//! let doubled = Match::of(1.5f64)
//!     .when_type::<Number>()
//!     .then_map(|n| n.as_f64())
//!     .map(|x| x * 2.0);
//! assert_eq!(doubled.state(), MatchState::Matched);
//! assert_eq!(doubled.get().unwrap(), 3.0);
//! ```
//!
//! # Results
//!
//! Forcing produces a [`MatchMonad`], which is `Matched`, `Otherwise` or
//! `Unmatched`. A matched `nil` or `false` payload is still a match;
//! only `Unmatched` makes [`MatchMonad::get`] fail with
//! [`MatchError::NoMatch`].
//!
//! # Errors
//!
//! `try_*` registration methods reject an absent matcher immediately.
//! Errors built by `then_throw` / `otherwise_throw` are raised only when
//! the result is extracted. Panics in user closures are not caught.

pub mod action;
pub mod builder;
pub mod case;
pub mod chain;
pub mod monad;
pub mod rules;

pub use action::{Action, ErrorFactory, Payload};
pub use builder::{Cases, Match, When, WhenApplicable};
pub use case::{Case, CaseKind, PartialFn, Predicate};
pub use casematch_types::{
    ErrorKind, FromValue, MatchError, MatchResult, Number, Record, Type, Value,
};
pub use chain::CaseChain;
pub use monad::{MatchMonad, MatchState};
pub use rules::{Rule, RuleKind, RuleSet, RuleViolation};
