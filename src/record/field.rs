//! Field conversions
//!
//! Bridges concrete member types and dynamic [`Value`]s.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

use crate::types::{Classify, Value, ValueMismatch};

use super::Shape;

/// A type that can be stored in a record member
pub trait Field: Sized {
    fn shape() -> Shape;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, ValueMismatch>;
}

macro_rules! primitive_fields {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Field for $ty {
                fn shape() -> Shape {
                    Shape::Primitive(<$ty as Classify>::TYPE_CODE)
                }

                #[allow(clippy::clone_on_copy)]
                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }

                fn from_value(value: Value) -> Result<Self, ValueMismatch> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(ValueMismatch::new(stringify!($variant), &other)),
                    }
                }
            }
        )*
    };
}

primitive_fields! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    BigInt => BigInt,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    TimeDelta => Duration,
    Uuid => Uuid,
    Url => Uri,
    String => Text,
    Vec<u8> => Bytes,
}

impl<T: Field> Field for Option<T> {
    fn shape() -> Shape {
        T::shape().into_nullable()
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
