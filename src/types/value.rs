//! Dynamic member values
//!
//! A `Value` is what member accessors hand to the codec and what the codec
//! hands back to member setters.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// A single member value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value of a nullable member
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    BigInt(BigInt),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Uuid(Uuid),
    Uri(Url),
    Text(String),
    Bytes(Vec<u8>),
    /// Enumeration constant, by canonical name
    Enum(&'static str),
    /// Nested composite, one value per member in declared order
    Composite(Vec<Value>),
    /// Ordered sequence member
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Variant name, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::BigInt(_) => "big integer",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Decimal(_) => "decimal",
            Value::DateTime(_) => "date-time",
            Value::DateTimeOffset(_) => "date-time with offset",
            Value::Duration(_) => "duration",
            Value::Uuid(_) => "uuid",
            Value::Uri(_) => "uri",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enumeration",
            Value::Composite(_) => "composite",
            Value::List(_) => "list",
        }
    }
}

/// A setter received a value of the wrong variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} value, found {found}")]
pub struct ValueMismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

impl ValueMismatch {
    pub fn new(expected: &'static str, found: &Value) -> Self {
        Self {
            expected,
            found: found.kind_name(),
        }
    }
}
