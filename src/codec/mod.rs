//! Codec Module
//!
//! Maps records to and from one line of delimited text.
//!
//! ## Line Format
//! ```text
//! ┌──────────┬─────┬──────────────────────────┬─────┬──────────────────┐
//! │ column 0 │ <|> │ elem <@> elem <@> elem   │ <|> │ key <#> value    │
//! └──────────┴─────┴──────────────────────────┴─────┴──────────────────┘
//!   scalar           sequence member                  composite member
//! ```
//!
//! - Columns are positional: no names, no schema, no header.
//! - `null` marks an absent value; an empty column decodes to the default.
//! - Nothing is escaped: a value containing a separator or a line-feed is
//!   rejected at encode time.
//!
//! Any [`RowSerializer`] can stand in for [`LsonSerializer`] underneath the
//! table store.

mod lson;
mod primitive;

use crate::config::Locale;
use crate::error::{LsonError, Result};
use crate::record::Record;

pub use lson::LsonSerializer;
pub use primitive::{format_value, parse_value};

/// Literal token for an absent value
pub const NULL_TOKEN: &str = "null";

/// Separates rows
pub const LINE_FEED: char = '\n';

/// Row encode/decode backend
///
/// `excludes` names members that are skipped on both sides of the wire.
pub trait RowSerializer: Send + Sync + 'static {
    /// Encode one row, or `None` when the shape has nothing to write
    fn encode_row<R: Record>(&self, row: &R, excludes: &[&str]) -> Result<Option<String>>;

    /// Decode one line
    fn decode_row<R: Record>(&self, line: &str, excludes: &[&str]) -> Result<R>;

    /// Encode rows one per line; rows that encode to nothing leave no line
    fn encode_rows<R: Record>(&self, rows: &[R], excludes: &[&str]) -> Result<String> {
        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let line = self.encode_row(row, excludes)?;
            if let Some(line) = line.filter(|line| !line.is_empty()) {
                lines.push(line);
            }
        }
        Ok(lines.join("\n"))
    }

    /// Decode every non-empty line
    ///
    /// A line that decodes to an all-default row is still returned.
    fn decode_rows<R: Record>(&self, text: &str, excludes: &[&str]) -> Result<Vec<R>> {
        let mut rows = Vec::new();
        for (index, line) in text.split(LINE_FEED).enumerate() {
            if line.is_empty() {
                continue;
            }
            let row = self
                .decode_row(line, excludes)
                .map_err(|e| e.at_line(index + 1))?;
            rows.push(row);
        }
        Ok(rows)
    }
}

// =============================================================================
// Separators
// =============================================================================

/// The three-tier delimiter hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separators {
    /// Between top-level members of a row
    pub column: String,

    /// Between elements of a sequence member
    pub field: String,

    /// Between sub-members of a composite
    pub field_item: String,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            column: "<|>".to_string(),
            field: "<@>".to_string(),
            field_item: "<#>".to_string(),
        }
    }
}

impl Separators {
    pub fn new(
        column: impl Into<String>,
        field: impl Into<String>,
        field_item: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            field: field.into(),
            field_item: field_item.into(),
        }
    }

    fn all(&self) -> [(&'static str, &str); 3] {
        [
            ("column", self.column.as_str()),
            ("field", self.field.as_str()),
            ("field-item", self.field_item.as_str()),
        ]
    }

    /// Check the separators split unambiguously under `locale`
    pub fn validate(&self, locale: &Locale) -> Result<()> {
        let all = self.all();

        for (name, token) in all {
            if token.is_empty() {
                return Err(LsonError::Config(format!("{} separator must not be empty", name)));
            }
            if token.contains(LINE_FEED) {
                return Err(LsonError::Config(format!(
                    "{} separator must not contain a line-feed",
                    name
                )));
            }
            if token.contains(locale.decimal_separator()) || token == NULL_TOKEN {
                return Err(LsonError::Config(format!(
                    "{} separator {:?} collides with number or null text",
                    name, token
                )));
            }
        }

        for (i, (name, token)) in all.iter().enumerate() {
            for (other_name, other) in all.iter().skip(i + 1) {
                if token.contains(other) || other.contains(token) {
                    return Err(LsonError::Config(format!(
                        "{} separator {:?} overlaps {} separator {:?}",
                        name, token, other_name, other
                    )));
                }
            }
        }

        Ok(())
    }

    /// Name of the first separator found inside `text`
    pub(crate) fn find_in(&self, text: &str) -> Option<&'static str> {
        if text.contains(LINE_FEED) {
            return Some("line-feed");
        }
        self.all()
            .into_iter()
            .find(|(_, token)| text.contains(token))
            .map(|(name, _)| name)
    }
}
