//! Shared types for casematch.
//!
//! This crate defines the runtime value model that match subjects and
//! payloads are drawn from, the runtime type hierarchy used for type and
//! applicability checks, and the error type shared by the engine.

mod error;
mod from_value;
mod ty;
mod value;

pub use error::{ErrorKind, MatchError};
pub use from_value::FromValue;
pub use ty::Type;
pub use value::{Number, Record, Value};

/// Result type used throughout casematch.
pub type MatchResult<T> = std::result::Result<T, MatchError>;
