//! Storage Module
//!
//! File-backed tables and the store that coordinates them with the cache.
//!
//! ## Responsibilities
//! - One `.lson` file per table under the root directory
//! - Exclusive per-table access for every file and cache mutation
//! - Read-through / write-through caching of decoded rows
//!
//! ## Table Lifecycle
//! ```text
//!            create / first write            insert / bulk_insert
//!  ┌────────┐ ─────────────────► ┌─────────┐ ───────────────► ┌───────────┐
//!  │ Absent │                    │ Created │                  │ Populated │
//!  └────────┘ ◄───────────────── └─────────┘ ◄─────────────── └───────────┘
//!                    drop                          drop
//! ```
//!
//! ## File Format
//! ```text
//! \n<row 1>\n<row 2>\n<row 3, 4 (one bulk append)>\n<row 4>
//! ```
//! Each append writes a line-feed followed by its rows; empty lines are
//! ignored when reading.

mod store;
mod table_file;

pub use store::{PendingCacheUpdate, TableStore};
pub use table_file::{TableFiles, TABLE_EXTENSION};
