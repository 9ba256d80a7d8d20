//! Configuration for lsondb
//!
//! Centralized configuration with sensible defaults.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::codec::Separators;
use crate::error::{LsonError, Result};
use crate::sync::ErrorHook;

/// Main configuration for a table store
#[derive(Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory of the database
    /// Internal structure:
    ///   {root_dir}/
    ///     ├── People.lson
    ///     └── Orders.lson
    pub root_dir: PathBuf,

    /// When appended rows are forced to disk
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Codec Configuration
    // -------------------------------------------------------------------------
    /// Culture used for floating point and decimal text
    pub locale: Locale,

    /// Column / field / field-item separators
    pub separators: Separators,

    // -------------------------------------------------------------------------
    // Cache Configuration
    // -------------------------------------------------------------------------
    /// Rows reserved when a cache entry is created by a write
    pub initial_row_capacity: usize,

    /// Expected number of tables (pre-sizes the lock registry)
    pub table_capacity: usize,

    /// Invoked with every error raised inside a locked region
    pub error_hook: Option<ErrorHook>,
}

/// When appended rows are forced to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every append (safest, slowest)
    EveryWrite,

    /// leave flushing to the OS page cache
    OsBuffered,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./lson_data"),
            sync_strategy: SyncStrategy::OsBuffered,
            locale: Locale::invariant(),
            separators: Separators::default(),
            initial_row_capacity: 1024,
            table_capacity: 1000,
            error_hook: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("root_dir", &self.root_dir)
            .field("sync_strategy", &self.sync_strategy)
            .field("locale", &self.locale)
            .field("separators", &self.separators)
            .field("initial_row_capacity", &self.initial_row_capacity)
            .field("table_capacity", &self.table_capacity)
            .field("error_hook", &self.error_hook.is_some())
            .finish()
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Fail fast on settings that can never produce a working store
    pub fn validate(&self) -> Result<()> {
        if self.root_dir.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(LsonError::Config(
                "database root path must not be blank".to_string(),
            ));
        }
        self.separators.validate(&self.locale)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the database root directory
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_dir = path.into();
        self
    }

    /// Set the append sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the number-formatting culture
    pub fn locale(mut self, locale: Locale) -> Self {
        self.config.locale = locale;
        self
    }

    /// Set the separator tokens
    pub fn separators(mut self, separators: Separators) -> Self {
        self.config.separators = separators;
        self
    }

    /// Set the row reservation of newly created cache entries
    pub fn initial_row_capacity(mut self, rows: usize) -> Self {
        self.config.initial_row_capacity = rows;
        self
    }

    /// Set the expected number of tables
    pub fn table_capacity(mut self, tables: usize) -> Self {
        self.config.table_capacity = tables;
        self
    }

    /// Report errors raised inside locked regions to `hook`
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&LsonError) + Send + Sync + 'static,
    {
        self.config.error_hook = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

// =============================================================================
// Locale
// =============================================================================

/// Number-formatting culture
///
/// Only the decimal separator matters for the row format: floats and
/// decimals are written in round-trip form without digit grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    tag: String,
    decimal_separator: char,
}

impl Locale {
    /// Culture-independent formatting (`.` as decimal separator)
    pub fn invariant() -> Self {
        Self {
            tag: "invariant".to_string(),
            decimal_separator: '.',
        }
    }

    /// A custom culture
    pub fn new(tag: impl Into<String>, decimal_separator: char) -> Result<Self> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(LsonError::Config("locale tag must not be blank".to_string()));
        }
        if decimal_separator.is_ascii_digit()
            || decimal_separator.is_whitespace()
            || matches!(decimal_separator, '-' | '+' | 'e' | 'E')
        {
            return Err(LsonError::Config(format!(
                "{:?} cannot be used as a decimal separator",
                decimal_separator
            )));
        }
        Ok(Self {
            tag: tag.trim().to_string(),
            decimal_separator,
        })
    }

    /// Resolve a culture tag such as `en-US`, `tr-TR` or `de`
    pub fn parse(tag: &str) -> Result<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(LsonError::Config("locale tag must not be blank".to_string()));
        }
        if tag.eq_ignore_ascii_case("invariant") {
            return Ok(Self::invariant());
        }

        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        let decimal_separator = match language.as_str() {
            "en" | "ja" | "zh" | "ko" | "he" | "th" | "hi" | "ga" | "ms" => '.',
            "tr" | "de" | "fr" | "es" | "it" | "pt" | "ru" | "nl" | "pl" | "sv" | "da"
            | "fi" | "nb" | "nn" | "no" | "cs" | "sk" | "el" | "uk" | "ro" | "hu" | "bg"
            | "hr" | "sl" | "id" | "vi" => ',',
            _ => {
                return Err(LsonError::Config(format!("unsupported locale `{}`", tag)));
            }
        };

        Self::new(tag, decimal_separator)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// Rewrite invariant number text into this culture
    pub(crate) fn localize(&self, text: String) -> String {
        if self.decimal_separator == '.' {
            text
        } else {
            text.replace('.', self.decimal_separator.encode_utf8(&mut [0u8; 4]))
        }
    }

    /// Rewrite culture number text back into invariant form
    ///
    /// A `.` is only accepted when it is this culture's decimal separator.
    pub(crate) fn delocalize<'a>(
        &self,
        text: &'a str,
    ) -> std::result::Result<Cow<'a, str>, String> {
        if self.decimal_separator == '.' {
            return Ok(Cow::Borrowed(text));
        }
        if text.contains('.') {
            return Err(format!(
                "`.` is not the decimal separator of locale `{}`",
                self.tag
            ));
        }
        Ok(Cow::Owned(text.replace(self.decimal_separator, ".")))
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::invariant()
    }
}
