//! # lsondb
//!
//! A lightweight, file-backed record store with:
//! - Positional delimited text rows (`.lson`), one file per table
//! - Exclusive per-table locking with guard passing for re-entrancy
//! - Read-through / write-through row cache kept consistent with the files
//! - Blocking and async (tokio) APIs over the same tables
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TableStore                            │
//! │           create / drop / insert / bulk_insert / read        │
//! │                  (+ async variants, tokio)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  lock_for(table) ─► TableGuard
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     LockRegistry                             │
//! │               (one exclusive lock per table)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────────┐
//!          │            │                     │
//!          ▼            ▼                     ▼
//!   ┌─────────────┐ ┌─────────────┐   ┌──────────────┐
//!   │ RowSerializer│ │ TableFiles  │   │ CacheProvider │
//!   │   (codec)   │ │ (*.lson)    │   │ (MemoryCache) │
//!   └──────┬──────┘ └─────────────┘   └──────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │   Record    │
//!   │ (describe)  │
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use lsondb::{Config, TableStore};
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! lsondb::record!(Person { name, age });
//!
//! # fn main() -> lsondb::Result<()> {
//! let store = TableStore::open(Config::builder().root_dir("./people_db").build())?;
//! store.insert("People", Person { name: "Ada".into(), age: 30 })?;
//! let people: Vec<Person> = store.read("People")?;
//! assert_eq!(people.len(), 1);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod types;
pub mod record;
pub mod codec;
pub mod sync;
pub mod cache;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FormatError, LsonError, Result};
pub use config::{Config, ConfigBuilder, Locale, SyncStrategy};
pub use types::{classify, Classify, PrimitiveKind, TypeCode, Value};
pub use record::{Field, MemberDescription, Record, Shape};
pub use codec::{LsonSerializer, RowSerializer, Separators};
pub use sync::{ErrorHook, LockRegistry, TableGuard, TableLock};
pub use cache::{CacheProvider, MemoryCache};
pub use storage::{PendingCacheUpdate, TableStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of lsondb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
