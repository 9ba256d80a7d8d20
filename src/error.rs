//! Error types for lsondb
//!
//! Provides a unified error type for all operations.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using LsonError
pub type Result<T> = std::result::Result<T, LsonError>;

/// Unified error type for lsondb operations
#[derive(Debug, Error)]
pub enum LsonError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Table Errors
    // -------------------------------------------------------------------------
    #[error("Table not found: {table} (path {}), please check the table already exists", .path.display())]
    NotFound { table: String, path: PathBuf },

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Format error: {0}")]
    Format(FormatError),

    #[error("Validation error: {0}")]
    Validation(String),

    // -------------------------------------------------------------------------
    // Background Task Errors
    // -------------------------------------------------------------------------
    #[error("Background task failed: {0}")]
    Task(String),
}

impl LsonError {
    /// Attach a table name to a format error (other variants pass through)
    pub fn in_table(self, table: &str) -> Self {
        match self {
            LsonError::Format(mut err) => {
                err.table = Some(table.to_string());
                LsonError::Format(err)
            }
            other => other,
        }
    }

    /// Attach a 1-based line number to a format error
    pub fn at_line(self, line: usize) -> Self {
        match self {
            LsonError::Format(mut err) => {
                err.line = line;
                LsonError::Format(err)
            }
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LsonError::NotFound { .. })
    }
}

/// A line that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// Table the line was read from (unknown inside the codec)
    pub table: Option<String>,

    /// 1-based line number within the decoded text
    pub line: usize,

    /// The offending token (or the whole line on a column count mismatch)
    pub token: String,

    /// Human readable cause
    pub reason: String,
}

impl FormatError {
    pub fn new(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            table: None,
            line: 1,
            token: token.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "table `{}`, line {}: ", table, self.line)?,
            None => write!(f, "line {}: ", self.line)?,
        }
        write!(f, "{} (token {:?})", self.reason, self.token)
    }
}

impl From<FormatError> for LsonError {
    fn from(err: FormatError) -> Self {
        LsonError::Format(err)
    }
}
