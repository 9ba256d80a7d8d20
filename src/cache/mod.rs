//! Cache Module
//!
//! In-memory mirror of table contents, keyed by table name.
//!
//! ## Consistency
//! - An entry is either absent or holds every row of its table's file.
//! - Every mutation runs under the table's lock; the store passes its held
//!   guard so nested calls do not acquire again.
//! - An entry holds rows of one record type; touching it as another type is
//!   a validation error.

mod memory;

use crate::error::Result;
use crate::record::Record;
use crate::sync::TableGuard;

pub use memory::MemoryCache;

/// Backend for the table store's read-through/write-through cache
///
/// `held` is the caller's guard for the table when it already holds the
/// table lock.
pub trait CacheProvider: Send + Sync + 'static {
    /// Replace the entry of `table` with `rows`
    fn put<R: Record>(&self, table: &str, rows: Vec<R>, held: Option<&TableGuard>) -> Result<()>;

    /// A copy of the cached rows, `None` if the table is not cached
    fn read<R: Record>(&self, table: &str, held: Option<&TableGuard>) -> Result<Option<Vec<R>>>;

    /// Append one row, creating the entry if needed
    fn insert<R: Record>(&self, table: &str, row: R, held: Option<&TableGuard>) -> Result<()>;

    /// Append rows in order, creating the entry if needed
    fn bulk_insert<R: Record>(
        &self,
        table: &str,
        rows: Vec<R>,
        held: Option<&TableGuard>,
    ) -> Result<()>;

    /// Evict `table`; returns whether an entry existed
    fn drop(&self, table: &str, held: Option<&TableGuard>) -> Result<bool>;

    /// Evict every table
    fn clear(&self) -> Result<()>;

    /// Number of cached rows without copying them, `None` if not cached
    fn entry_len<R: Record>(&self, table: &str, held: Option<&TableGuard>)
        -> Result<Option<usize>>;
}
