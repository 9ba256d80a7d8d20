//! Primitive formatting
//!
//! | Kind                      | Text                                     |
//! |---------------------------|------------------------------------------|
//! | f32 / f64                 | shortest round-trip text, culture aware  |
//! | decimal                   | fixed-point text, culture aware          |
//! | date-time (+offset)       | ISO-8601, fractional seconds as needed   |
//! | duration                  | tick count (100ns units)                 |
//! | uuid / uri / text         | literal                                  |
//! | bool / integers / bigint  | decimal text (`True` / `False`)          |
//! | bytes                     | UTF-8 text (lossy for non UTF-8 input)   |
//! | enum                      | constant name                            |

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

use crate::config::Locale;
use crate::types::{PrimitiveKind, Value};

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_TIME_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: i64 = 100;

/// Format a scalar value; `None` for null, composites and lists
pub fn format_value(value: &Value, locale: &Locale) -> Option<String> {
    let text = match value {
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Char(c) => c.to_string(),
        Value::I8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::U8(v) => v.to_string(),
        Value::U16(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::U64(v) => v.to_string(),
        Value::BigInt(v) => v.to_string(),
        Value::F32(v) => locale.localize(format!("{:?}", v)),
        Value::F64(v) => locale.localize(format!("{:?}", v)),
        Value::Decimal(v) => locale.localize(v.to_string()),
        Value::DateTime(v) => v.format(DATE_TIME_FORMAT).to_string(),
        Value::DateTimeOffset(v) => v.format(DATE_TIME_OFFSET_FORMAT).to_string(),
        Value::Duration(v) => duration_to_ticks(v)?.to_string(),
        Value::Uuid(v) => v.hyphenated().to_string(),
        Value::Uri(v) => v.as_str().to_string(),
        Value::Text(v) => v.clone(),
        Value::Bytes(v) => String::from_utf8_lossy(v).into_owned(),
        Value::Enum(name) => (*name).to_string(),
        Value::Null | Value::Composite(_) | Value::List(_) => return None,
    };
    Some(text)
}

/// Parse a non-empty token as `kind`
///
/// The error is a human readable reason; the caller attaches the token.
pub fn parse_value(kind: PrimitiveKind, token: &str, locale: &Locale) -> Result<Value, String> {
    let value = match kind {
        PrimitiveKind::Boolean => {
            if token.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if token.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                return Err("not a boolean".to_string());
            }
        }
        PrimitiveKind::Char => {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => return Err("expected exactly one character".to_string()),
            }
        }
        PrimitiveKind::I8 => Value::I8(parse_number(token)?),
        PrimitiveKind::I16 => Value::I16(parse_number(token)?),
        PrimitiveKind::I32 => Value::I32(parse_number(token)?),
        PrimitiveKind::I64 => Value::I64(parse_number(token)?),
        PrimitiveKind::U8 => Value::U8(parse_number(token)?),
        PrimitiveKind::U16 => Value::U16(parse_number(token)?),
        PrimitiveKind::U32 => Value::U32(parse_number(token)?),
        PrimitiveKind::U64 => Value::U64(parse_number(token)?),
        PrimitiveKind::BigInt => Value::BigInt(parse_number::<BigInt>(token)?),
        PrimitiveKind::F32 => Value::F32(parse_number(&locale.delocalize(token)?)?),
        PrimitiveKind::F64 => Value::F64(parse_number(&locale.delocalize(token)?)?),
        PrimitiveKind::Decimal => Value::Decimal(
            Decimal::from_str(&locale.delocalize(token)?).map_err(|e| e.to_string())?,
        ),
        PrimitiveKind::DateTime => Value::DateTime(
            NaiveDateTime::parse_from_str(token, DATE_TIME_FORMAT).map_err(|e| e.to_string())?,
        ),
        PrimitiveKind::DateTimeOffset => Value::DateTimeOffset(
            DateTime::parse_from_str(token, DATE_TIME_OFFSET_FORMAT).map_err(|e| e.to_string())?,
        ),
        PrimitiveKind::Duration => Value::Duration(ticks_to_duration(parse_number(token)?)?),
        PrimitiveKind::Uuid => Value::Uuid(Uuid::parse_str(token).map_err(|e| e.to_string())?),
        PrimitiveKind::Uri => Value::Uri(Url::parse(token).map_err(|e| e.to_string())?),
        PrimitiveKind::Text => Value::Text(token.to_string()),
        PrimitiveKind::Bytes => Value::Bytes(token.as_bytes().to_vec()),
        PrimitiveKind::Opaque => return Err("opaque members have no text form".to_string()),
    };
    Ok(value)
}

fn parse_number<T>(token: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    token.parse::<T>().map_err(|e| e.to_string())
}

/// Whole 100ns ticks; `None` when the duration does not fit in an i64
fn duration_to_ticks(duration: &TimeDelta) -> Option<i64> {
    duration
        .num_seconds()
        .checked_mul(TICKS_PER_SECOND)?
        .checked_add(i64::from(duration.subsec_nanos()) / NANOS_PER_TICK)
}

fn ticks_to_duration(ticks: i64) -> Result<TimeDelta, String> {
    let seconds = ticks.div_euclid(TICKS_PER_SECOND);
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK;
    TimeDelta::new(seconds, nanos as u32).ok_or_else(|| "duration out of range".to_string())
}
