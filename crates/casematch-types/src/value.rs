//! Runtime values that subjects and payloads are drawn from.
//!
//! Equality is structural and deep. Numbers of different widths never
//! compare equal, so `Int(1)` and `Long(1)` are distinct match targets.

use crate::Type;
use std::collections::BTreeMap;
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Value
// ══════════════════════════════════════════════════════════════════════════════

/// A dynamically typed runtime value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Number(Number),
    Char(char),
    String(String),
    List(Vec<Value>),
    Record(Record),
}

impl Value {
    /// The most specific runtime type of this value.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Nil => Type::Nil,
            Value::Bool(_) => Type::Bool,
            Value::Number(n) => n.type_of(),
            Value::Char(_) => Type::Char,
            Value::String(_) => Type::String,
            Value::List(_) => Type::List,
            Value::Record(r) => match &r.type_name {
                Some(name) => Type::Named(name.clone()),
                None => Type::Record,
            },
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Build a record value with the given type name.
    pub fn record<I, K, V>(type_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Record(Record::named(type_name, fields))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Number
// ══════════════════════════════════════════════════════════════════════════════

/// A numeric value, tagged with its width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Number {
    pub fn type_of(&self) -> Type {
        match self {
            Number::Byte(_) => Type::Byte,
            Number::Short(_) => Type::Short,
            Number::Int(_) => Type::Int,
            Number::Long(_) => Type::Long,
            Number::Float(_) => Type::Float,
            Number::Double(_) => Type::Double,
        }
    }

    /// Widen to `f64`.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Byte(n) => f64::from(n),
            Number::Short(n) => f64::from(n),
            Number::Int(n) => f64::from(n),
            Number::Long(n) => n as f64,
            Number::Float(n) => f64::from(n),
            Number::Double(n) => n,
        }
    }

    /// Widen to `i64`, truncating floating point values toward zero.
    pub fn as_i64(&self) -> i64 {
        match *self {
            Number::Byte(n) => i64::from(n),
            Number::Short(n) => i64::from(n),
            Number::Int(n) => i64::from(n),
            Number::Long(n) => n,
            Number::Float(n) => n as i64,
            Number::Double(n) => n as i64,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Byte(n) => write!(f, "{n}"),
            Number::Short(n) => write!(f, "{n}"),
            Number::Int(n) => write!(f, "{n}"),
            Number::Long(n) => write!(f, "{n}"),
            Number::Float(n) => write!(f, "{n:?}"),
            Number::Double(n) => write!(f, "{n:?}"),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Record
// ══════════════════════════════════════════════════════════════════════════════

/// A record with an optional nominal type name.
///
/// Named records are instances of [`Type::Named`], which is a subtype of
/// [`Type::Record`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub type_name: Option<String>,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn named<I, K, V>(type_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            type_name: Some(type_name.into()),
            fields: collect_fields(fields),
        }
    }

    pub fn anonymous<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            type_name: None,
            fields: collect_fields(fields),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

fn collect_fields<I, K, V>(fields: I) -> BTreeMap<String, Value>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    fields
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// ══════════════════════════════════════════════════════════════════════════════
// Display
// ══════════════════════════════════════════════════════════════════════════════

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Char(c) => write!(f, "{c:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Record(r) => {
                if let Some(name) = &r.type_name {
                    write!(f, "{name} ")?;
                }
                write!(f, "{{")?;
                for (i, (k, v)) in r.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {k}: {v}")?;
                }
                if r.fields.is_empty() {
                    write!(f, "}}")
                } else {
                    write!(f, " }}")
                }
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Conversions
// ══════════════════════════════════════════════════════════════════════════════

macro_rules! number_from {
    ($($prim:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$prim> for Number {
                fn from(n: $prim) -> Self {
                    Number::$variant(n)
                }
            }

            impl From<$prim> for Value {
                fn from(n: $prim) -> Self {
                    Value::Number(Number::$variant(n))
                }
            }
        )*
    };
}

number_from! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Nil, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    match i32::try_from(i) {
                        Ok(small) => Value::from(small),
                        Err(_) => Value::from(i),
                    }
                } else if let Some(f) = n.as_f64() {
                    Value::from(f)
                } else {
                    // u64 beyond i64::MAX
                    Value::from(n.as_u64().map_or(f64::NAN, |u| u as f64))
                }
            }
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Record(Record {
                type_name: None,
                fields: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_of_different_width_differ() {
        assert_ne!(Value::from(1i32), Value::from(1i64));
        assert_eq!(Value::from(1i32), Value::from(1i32));
    }

    #[test]
    fn equality_is_deep() {
        let a = Value::record("Point", [("x", 1), ("y", 2)]);
        let b = Value::record("Point", [("y", 2), ("x", 1)]);
        assert_eq!(a, b);
        assert_ne!(a, Value::record("Vec2", [("x", 1), ("y", 2)]));
        assert_eq!(Value::from(vec![1, 2]), Value::from(vec![1, 2]));
    }

    #[test]
    fn type_of_named_record() {
        let v = Value::record("Point", [("x", 1)]);
        assert_eq!(v.type_of(), Type::Named("Point".into()));
        let anon = Value::Record(Record::anonymous([("x", 1)]));
        assert_eq!(anon.type_of(), Type::Record);
    }

    #[test]
    fn none_converts_to_nil() {
        assert_eq!(Value::from(None::<i32>), Value::Nil);
        assert_eq!(Value::from(Some(3)), Value::from(3));
    }

    #[test]
    fn json_numbers_pick_narrowest_integer() {
        let v = Value::from(serde_json::json!([1, 5000000000i64, 1.5, null]));
        assert_eq!(
            v,
            Value::List(vec![
                Value::from(1i32),
                Value::from(5_000_000_000i64),
                Value::from(1.5f64),
                Value::Nil,
            ])
        );
    }

    #[test]
    fn display_renders_nested_values() {
        let v = Value::record("P", [("xs", Value::from(vec![1, 2]))]);
        assert_eq!(v.to_string(), "P { xs: [1, 2] }");
        assert_eq!(Value::from("a").to_string(), "\"a\"");
        assert_eq!(Value::from(1.0f64).to_string(), "1.0");
    }
}
