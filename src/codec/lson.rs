//! Delimited row serializer
//!
//! Encodes records member by member in declared order.

use crate::config::Locale;
use crate::error::{FormatError, LsonError, Result};
use crate::record::{MemberDescription, Record, Shape};
use crate::types::{PrimitiveKind, Value};

use super::primitive::{format_value, parse_value};
use super::{RowSerializer, Separators, NULL_TOKEN};

/// The `.lson` row codec
#[derive(Debug, Clone)]
pub struct LsonSerializer {
    locale: Locale,
    separators: Separators,
}

impl LsonSerializer {
    /// Serializer with the default separators
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            separators: Separators::default(),
        }
    }

    /// Serializer with custom separators
    pub fn with_separators(locale: Locale, separators: Separators) -> Result<Self> {
        separators.validate(&locale)?;
        Ok(Self { locale, separators })
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn separators(&self) -> &Separators {
        &self.separators
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    fn encode_member<R>(&self, member: &MemberDescription<R>, value: Value) -> Result<String>
    where
        R: 'static,
    {
        match value {
            Value::Null => Ok(NULL_TOKEN.to_string()),
            Value::List(items) if member.sequence => {
                let mut elements = Vec::with_capacity(items.len());
                for item in &items {
                    elements.push(self.encode_value(member.name, &member.shape, item, false)?);
                }
                Ok(elements.join(&self.separators.field))
            }
            value => self.encode_value(member.name, &member.shape, &value, false),
        }
    }

    /// Encode one scalar or composite; `nested` is set inside a composite
    fn encode_value(&self, member: &str, shape: &Shape, value: &Value, nested: bool) -> Result<String> {
        if value.is_null() {
            return Ok(NULL_TOKEN.to_string());
        }

        match (shape, value) {
            (Shape::Composite { members, .. }, Value::Composite(values)) => {
                if nested {
                    return Err(LsonError::Validation(format!(
                        "member `{}`: composites cannot be nested inside composites",
                        member
                    )));
                }
                let mut parts = Vec::with_capacity(values.len());
                for (element, value) in members.iter().zip(values) {
                    if element.sequence {
                        return Err(LsonError::Validation(format!(
                            "member `{}.{}`: sequences cannot be nested inside composites",
                            member, element.name
                        )));
                    }
                    parts.push(self.encode_value(element.name, &element.shape, value, true)?);
                }
                Ok(parts.join(&self.separators.field_item))
            }
            (Shape::Composite { .. }, other) | (_, other @ (Value::Composite(_) | Value::List(_))) => {
                Err(LsonError::Validation(format!(
                    "member `{}`: {} value does not match its declared shape",
                    member,
                    other.kind_name()
                )))
            }
            (_, scalar) => {
                let text = format_value(scalar, &self.locale).ok_or_else(|| {
                    LsonError::Validation(format!(
                        "member `{}`: {} value has no text form",
                        member,
                        scalar.kind_name()
                    ))
                })?;
                if let Some(separator) = self.separators.find_in(&text) {
                    return Err(LsonError::Validation(format!(
                        "member `{}`: value contains the {} separator",
                        member, separator
                    )));
                }
                Ok(text)
            }
        }
    }

    // =========================================================================
    // Decoding
    // =========================================================================

    fn decode_member<R>(&self, member: &MemberDescription<R>, token: &str) -> Result<Value>
    where
        R: 'static,
    {
        if member.sequence {
            let mut items = Vec::new();
            for element in token.split(self.separators.field.as_str()) {
                items.push(self.decode_value(member.name, &member.shape, element, false)?);
            }
            return Ok(Value::List(items));
        }
        self.decode_value(member.name, &member.shape, token, false)
    }

    fn decode_value(&self, member: &str, shape: &Shape, token: &str, nested: bool) -> Result<Value> {
        if token == NULL_TOKEN {
            return Ok(Value::Null);
        }
        let fail = |reason: String| -> LsonError {
            FormatError::new(token, format!("member `{}`: {}", member, reason)).into()
        };

        match shape {
            Shape::Primitive(code) if token.is_empty() => Ok(match code.kind {
                PrimitiveKind::Text => Value::Text(String::new()),
                PrimitiveKind::Bytes => Value::Bytes(Vec::new()),
                _ => Value::Null,
            }),
            Shape::Primitive(code) => parse_value(code.kind, token, &self.locale).map_err(fail),
            Shape::Enum { .. } if token.is_empty() => Ok(Value::Null),
            Shape::Enum { variants, .. } => variants
                .iter()
                .find(|name| name.eq_ignore_ascii_case(token))
                .map(|name| Value::Enum(*name))
                .ok_or_else(|| fail("unknown enumeration constant".to_string())),
            Shape::Composite { .. } if nested => {
                Err(fail("composites cannot be nested inside composites".to_string()))
            }
            Shape::Composite { .. } if token.is_empty() => Ok(Value::Null),
            Shape::Composite { members, .. } => {
                let parts: Vec<&str> = token.split(self.separators.field_item.as_str()).collect();
                if parts.len() != members.len() {
                    return Err(fail(format!(
                        "expected {} composite items, found {}",
                        members.len(),
                        parts.len()
                    )));
                }
                let mut values = Vec::with_capacity(parts.len());
                for (element, part) in members.iter().zip(parts) {
                    if element.sequence {
                        return Err(fail(format!(
                            "sequence `{}` cannot be nested inside a composite",
                            element.name
                        )));
                    }
                    values.push(self.decode_value(element.name, &element.shape, part, true)?);
                }
                Ok(Value::Composite(values))
            }
        }
    }
}

impl RowSerializer for LsonSerializer {
    fn encode_row<R: Record>(&self, row: &R, excludes: &[&str]) -> Result<Option<String>> {
        let mut tokens = Vec::with_capacity(R::describe().len());
        for member in R::describe() {
            if excludes.contains(&member.name) {
                continue;
            }
            tokens.push(self.encode_member(member, member.get(row))?);
        }

        if tokens.is_empty() {
            return Ok(None);
        }
        Ok(Some(tokens.join(&self.separators.column)))
    }

    fn decode_row<R: Record>(&self, line: &str, excludes: &[&str]) -> Result<R> {
        let members: Vec<&MemberDescription<R>> = R::describe()
            .iter()
            .filter(|member| !excludes.contains(&member.name))
            .collect();

        let mut row = R::default();
        if members.is_empty() {
            return Ok(row);
        }

        let tokens: Vec<&str> = line.split(self.separators.column.as_str()).collect();
        if tokens.len() != members.len() {
            return Err(FormatError::new(
                line,
                format!("expected {} columns, found {}", members.len(), tokens.len()),
            )
            .into());
        }

        for (member, token) in members.into_iter().zip(tokens) {
            if token.is_empty() || token == NULL_TOKEN {
                continue;
            }
            let value = self.decode_member(member, token)?;
            member.set(&mut row, value).map_err(|e| {
                LsonError::from(FormatError::new(token, format!("member `{}`: {}", member.name, e)))
            })?;
        }

        Ok(row)
    }
}
