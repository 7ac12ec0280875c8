use crate::{Number, Record, Type, Value};

/// Typed extraction from a [`Value`].
///
/// `domain` is the runtime type a parameter of this Rust type stands for.
/// `from_value` returns `None` for any value outside that domain, which
/// the engine treats as "not applicable" rather than as an error.
pub trait FromValue: Sized {
    fn domain() -> Type;

    fn from_value(value: &Value) -> Option<Self>;

    fn accepts(value: &Value) -> bool {
        Self::domain().accepts(value)
    }
}

impl FromValue for Value {
    fn domain() -> Type {
        Type::Any
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for () {
    fn domain() -> Type {
        Type::Nil
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.is_nil().then_some(())
    }
}

impl FromValue for bool {
    fn domain() -> Type {
        Type::Bool
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for Number {
    fn domain() -> Type {
        Type::Number
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

macro_rules! number_from_value {
    ($($prim:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $prim {
                fn domain() -> Type {
                    Type::$variant
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Number(Number::$variant(n)) => Some(*n),
                        _ => None,
                    }
                }
            }
        )*
    };
}

number_from_value! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
}

impl FromValue for char {
    fn domain() -> Type {
        Type::Char
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn domain() -> Type {
        Type::String
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for Vec<Value> {
    fn domain() -> Type {
        Type::List
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl FromValue for Record {
    fn domain() -> Type {
        Type::Record
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Record(r) => Some(r.clone()),
            _ => None,
        }
    }
}
