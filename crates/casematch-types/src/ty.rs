//! Runtime type descriptors and the assignability relation.
//!
//! ```text
//! Any ─┬─ Nil
//!      ├─ Bool
//!      ├─ Number ─┬─ Byte | Short | Int | Long | Float | Double
//!      ├─ Char
//!      ├─ String
//!      ├─ List
//!      └─ Record ─── Named(..)
//! ```

use crate::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A runtime type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Type {
    /// Top of the hierarchy; every value is an `Any`.
    Any,
    Nil,
    Bool,

    // ── Numbers ──
    Number,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,

    Char,
    String,
    List,

    /// Any record, named or anonymous.
    Record,
    /// A record carrying the given type name.
    Named(std::string::String),
}

impl Type {
    /// The direct supertype, or `None` for [`Type::Any`].
    pub fn parent(&self) -> Option<Type> {
        match self {
            Type::Any => None,
            Type::Byte | Type::Short | Type::Int | Type::Long | Type::Float | Type::Double => {
                Some(Type::Number)
            }
            Type::Named(_) => Some(Type::Record),
            _ => Some(Type::Any),
        }
    }

    /// This type followed by each of its supertypes, up to `Any`.
    pub fn ancestors(&self) -> impl Iterator<Item = Type> {
        std::iter::successors(Some(self.clone()), Type::parent)
    }

    /// `true` if a value of type `other` may be used where `self` is expected.
    pub fn is_assignable_from(&self, other: &Type) -> bool {
        other.ancestors().any(|t| &t == self)
    }

    pub fn is_subtype_of(&self, other: &Type) -> bool {
        other.is_assignable_from(self)
    }

    /// `true` if the runtime type of `value` is assignable to `self`.
    pub fn accepts(&self, value: &Value) -> bool {
        self.is_assignable_from(&value.type_of())
    }

    pub fn name(&self) -> &str {
        match self {
            Type::Any => "any",
            Type::Nil => "nil",
            Type::Bool => "bool",
            Type::Number => "number",
            Type::Byte => "byte",
            Type::Short => "short",
            Type::Int => "int",
            Type::Long => "long",
            Type::Float => "float",
            Type::Double => "double",
            Type::Char => "char",
            Type::String => "string",
            Type::List => "list",
            Type::Record => "record",
            Type::Named(name) => name,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Type {
    type Err = std::string::String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s {
            "any" => Type::Any,
            "nil" => Type::Nil,
            "bool" => Type::Bool,
            "number" => Type::Number,
            "byte" => Type::Byte,
            "short" => Type::Short,
            "int" => Type::Int,
            "long" => Type::Long,
            "float" => Type::Float,
            "double" => Type::Double,
            "char" => Type::Char,
            "string" => Type::String,
            "list" => Type::List,
            "record" => Type::Record,
            _ if is_identifier(s) => Type::Named(s.to_string()),
            _ => return Err(format!("invalid type name '{s}'")),
        };
        Ok(ty)
    }
}

impl TryFrom<std::string::String> for Type {
    type Error = std::string::String;

    fn try_from(s: std::string::String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Type> for std::string::String {
    fn from(ty: Type) -> Self {
        ty.name().to_string()
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_leaves_are_numbers() {
        assert!(Type::Number.is_assignable_from(&Type::Int));
        assert!(Type::Any.is_assignable_from(&Type::Int));
        assert!(!Type::Int.is_assignable_from(&Type::Number));
        assert!(Type::Int.is_subtype_of(&Type::Number));
    }

    #[test]
    fn named_records_are_records() {
        let point = Type::Named("Point".into());
        assert!(Type::Record.is_assignable_from(&point));
        assert!(!point.is_assignable_from(&Type::Record));
        assert!(!point.is_assignable_from(&Type::Named("Other".into())));
    }

    #[test]
    fn ancestors_end_at_any() {
        let chain: Vec<Type> = Type::Double.ancestors().collect();
        assert_eq!(chain, vec![Type::Double, Type::Number, Type::Any]);
    }

    #[test]
    fn any_accepts_nil() {
        assert!(Type::Any.accepts(&Value::Nil));
        assert!(!Type::Number.accepts(&Value::Nil));
    }

    #[test]
    fn names_round_trip() {
        for name in ["int", "number", "record", "Point"] {
            let ty: Type = name.parse().unwrap();
            assert_eq!(ty.to_string(), name);
        }
        assert!("not a type".parse::<Type>().is_err());
        assert!("".parse::<Type>().is_err());
    }

    #[test]
    fn serde_uses_names() {
        let ty: Type = serde_json::from_str("\"double\"").unwrap();
        assert_eq!(ty, Type::Double);
        assert_eq!(serde_json::to_string(&Type::Named("P".into())).unwrap(), "\"P\"");
    }
}
