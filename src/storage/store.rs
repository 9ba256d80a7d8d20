//! Table store
//!
//! Orchestrates codec, files and cache under per-table locks.

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::cache::{CacheProvider, MemoryCache};
use crate::codec::{LsonSerializer, RowSerializer, LINE_FEED};
use crate::config::Config;
use crate::error::{LsonError, Result};
use crate::record::Record;
use crate::sync::{locked, locked_async, ErrorHook, LockRegistry, TableGuard};

use super::TableFiles;

/// The table store
///
/// ## Concurrency Model: one exclusive lock per table
///
/// - Every operation on a table runs under that table's lock, covering both
///   the file and the cache entry. Waiters are served first come first
///   served; there is no reader/writer split.
/// - Operations on different tables never contend.
/// - The store passes its held guard into the cache, which therefore does
///   not lock again.
///
/// Cloning is cheap and shares everything.
pub struct TableStore<S = LsonSerializer, C = MemoryCache> {
    inner: Arc<StoreInner<S, C>>,
}

impl<S, C> Clone for TableStore<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct StoreInner<S, C> {
    config: Config,
    files: TableFiles,
    serializer: S,
    cache: C,
    locks: Arc<LockRegistry>,
}

/// Cache change produced by a successful file append
enum CacheUpdate<R> {
    Insert(R),
    Extend(Vec<R>),
    /// The entry was cold; rows are the backfilled file plus the new rows
    Replace(Vec<R>),
}

impl<R> CacheUpdate<R> {
    fn append(mut rows: Vec<R>) -> Self {
        if rows.len() == 1 {
            if let Some(row) = rows.pop() {
                return CacheUpdate::Insert(row);
            }
        }
        CacheUpdate::Extend(rows)
    }
}

impl TableStore {
    /// Open a store with the `.lson` codec and an in-memory cache
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let serializer =
            LsonSerializer::with_separators(config.locale.clone(), config.separators.clone())?;
        let locks = Arc::new(LockRegistry::with_capacity(config.table_capacity));
        let cache = MemoryCache::with_locks(Arc::clone(&locks), config.initial_row_capacity);
        Self::with_backends(config, serializer, cache, locks)
    }
}

impl<S, C> TableStore<S, C>
where
    S: RowSerializer,
    C: CacheProvider,
{
    /// Open a store with custom codec and cache backends
    ///
    /// `cache` must lock through `locks` for the store's guards to be
    /// recognized as already held.
    pub fn with_backends(
        config: Config,
        serializer: S,
        cache: C,
        locks: Arc<LockRegistry>,
    ) -> Result<Self> {
        config.validate()?;
        let files = TableFiles::open(&config.root_dir, config.sync_strategy)?;

        tracing::info!(
            "Opened table store at {} (locale {}, sync {:?})",
            config.root_dir.display(),
            config.locale.tag(),
            config.sync_strategy
        );

        Ok(Self {
            inner: Arc::new(StoreInner {
                config,
                files,
                serializer,
                cache,
                locks,
            }),
        })
    }

    // =========================================================================
    // Synchronous API
    // =========================================================================

    /// Create an empty table; `false` if it already existed
    pub fn create(&self, table: &str) -> Result<bool> {
        validate_table_name(table)?;
        self.with_lock(table, |guard| self.inner.create_locked(table, guard))
    }

    /// Remove the table file and its cache entry; `false` if it was absent
    pub fn drop(&self, table: &str) -> Result<bool> {
        validate_table_name(table)?;
        self.with_lock(table, |guard| self.inner.drop_locked(table, guard))
    }

    /// Append one row
    ///
    /// A row whose shape has nothing to write is silently ignored.
    pub fn insert<R: Record>(&self, table: &str, row: R) -> Result<()> {
        validate_table_name(table)?;
        self.with_lock(table, |guard| {
            let update = self.inner.write_locked(table, vec![row], guard)?;
            self.inner.apply_locked(table, update, guard)
        })
    }

    /// Append rows in one write; an empty batch is a validation error
    pub fn bulk_insert<R: Record>(&self, table: &str, rows: Vec<R>) -> Result<()> {
        validate_table_name(table)?;
        self.with_lock(table, |guard| {
            let update = self.inner.bulk_write_locked(table, rows, guard)?;
            self.inner.apply_locked(table, update, guard)
        })
    }

    /// All rows of the table, from the cache when it is warm
    pub fn read<R: Record>(&self, table: &str) -> Result<Vec<R>> {
        validate_table_name(table)?;
        self.with_lock(table, |guard| self.inner.read_locked(table, guard))
    }

    // =========================================================================
    // Asynchronous API
    // =========================================================================

    pub async fn create_async(&self, table: &str) -> Result<bool> {
        validate_table_name(table)?;
        let inner = Arc::clone(&self.inner);
        let name = table.to_string();
        let (_guard, created) = locked_async(&self.lock_for(table), self.hook(), move |guard| {
            inner.create_locked(&name, guard)
        })
        .await?;
        Ok(created)
    }

    pub async fn drop_async(&self, table: &str) -> Result<bool> {
        validate_table_name(table)?;
        let inner = Arc::clone(&self.inner);
        let name = table.to_string();
        let (_guard, dropped) = locked_async(&self.lock_for(table), self.hook(), move |guard| {
            inner.drop_locked(&name, guard)
        })
        .await?;
        Ok(dropped)
    }

    pub async fn read_async<R: Record>(&self, table: &str) -> Result<Vec<R>> {
        validate_table_name(table)?;
        let inner = Arc::clone(&self.inner);
        let name = table.to_string();
        let (_guard, rows) = locked_async(&self.lock_for(table), self.hook(), move |guard| {
            inner.read_locked::<R>(&name, guard)
        })
        .await?;
        Ok(rows)
    }

    /// Append one row; resolves once the file write is done
    ///
    /// The cache is updated in the background while the table stays locked.
    /// Await the returned [`PendingCacheUpdate`] to observe the update.
    pub async fn insert_async<R: Record>(&self, table: &str, row: R) -> Result<PendingCacheUpdate> {
        validate_table_name(table)?;
        let inner = Arc::clone(&self.inner);
        let name = table.to_string();
        let (guard, update) = locked_async(&self.lock_for(table), self.hook(), move |guard| {
            inner.write_locked(&name, vec![row], guard)
        })
        .await?;
        Ok(self.spawn_cache_update(table, update, guard))
    }

    /// Append rows in one write; resolves once the file write is done
    pub async fn bulk_insert_async<R: Record>(
        &self,
        table: &str,
        rows: Vec<R>,
    ) -> Result<PendingCacheUpdate> {
        validate_table_name(table)?;
        let inner = Arc::clone(&self.inner);
        let name = table.to_string();
        let (guard, update) = locked_async(&self.lock_for(table), self.hook(), move |guard| {
            inner.bulk_write_locked(&name, rows, guard)
        })
        .await?;
        Ok(self.spawn_cache_update(table, update, guard))
    }

    fn spawn_cache_update<R: Record>(
        &self,
        table: &str,
        update: Option<CacheUpdate<R>>,
        guard: TableGuard,
    ) -> PendingCacheUpdate {
        if update.is_none() {
            return PendingCacheUpdate::ready();
        }

        let inner = Arc::clone(&self.inner);
        let name = table.to_string();
        let handle = tokio::task::spawn_blocking(move || {
            let result = inner.apply_locked(&name, update, &guard);
            drop(guard);
            if let Err(e) = &result {
                tracing::warn!("Background cache update of {} failed: {}", name, e);
                if let Some(hook) = inner.config.error_hook.as_ref() {
                    hook(e);
                }
            }
            result
        });
        PendingCacheUpdate {
            handle: Some(handle),
        }
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Whether the table has a backing file
    pub fn exists(&self, table: &str) -> Result<bool> {
        validate_table_name(table)?;
        Ok(self.inner.files.exists(table))
    }

    /// Names of all tables on disk
    pub fn tables(&self) -> Result<Vec<String>> {
        self.inner.files.list()
    }

    /// Raw non-empty lines of the table file, without decoding
    pub fn read_lines(&self, table: &str) -> Result<Vec<String>> {
        validate_table_name(table)?;
        self.with_lock(table, |_| {
            let text = self.inner.files.read(table)?;
            Ok(text
                .split(LINE_FEED)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect())
        })
    }

    /// Evict every cache entry; the next read of each table goes to disk
    pub fn purge_cache(&self) -> Result<()> {
        tracing::debug!("Purging table cache");
        self.inner.cache.clear()
    }

    pub fn cache(&self) -> &C {
        &self.inner.cache
    }

    pub fn serializer(&self) -> &S {
        &self.inner.serializer
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn root(&self) -> &Path {
        self.inner.files.root()
    }

    /// The lock guarding `table`, shared with the cache
    pub fn lock_for(&self, table: &str) -> crate::sync::TableLock {
        self.inner.locks.lock_for(table)
    }

    fn hook(&self) -> Option<&ErrorHook> {
        self.inner.config.error_hook.as_ref()
    }

    fn with_lock<T, F>(&self, table: &str, f: F) -> Result<T>
    where
        F: FnOnce(&TableGuard) -> Result<T>,
    {
        locked(&self.lock_for(table), None, self.hook(), f)
    }
}

// =============================================================================
// Locked Operations
// =============================================================================

impl<S, C> StoreInner<S, C>
where
    S: RowSerializer,
    C: CacheProvider,
{
    fn create_locked(&self, table: &str, _guard: &TableGuard) -> Result<bool> {
        let created = self.files.create(table)?;
        if created {
            tracing::debug!("Created table {}", table);
        }
        Ok(created)
    }

    fn drop_locked(&self, table: &str, guard: &TableGuard) -> Result<bool> {
        CacheProvider::drop(&self.cache, table, Some(guard))?;
        let removed = self.files.remove(table)?;
        if removed {
            tracing::debug!("Dropped table {}", table);
        }
        Ok(removed)
    }

    fn read_locked<R: Record>(&self, table: &str, guard: &TableGuard) -> Result<Vec<R>> {
        if let Some(rows) = self.cache.read::<R>(table, Some(guard))? {
            if !rows.is_empty() {
                tracing::trace!("Read {} rows of {} from cache", rows.len(), table);
                return Ok(rows);
            }
        }

        let text = self.files.read(table)?;
        let rows: Vec<R> = self
            .serializer
            .decode_rows(&text, &[])
            .map_err(|e| e.in_table(table))
            .inspect_err(|e| tracing::warn!("Decoding {} failed: {}", table, e))?;

        if !rows.is_empty() {
            self.cache.put(table, rows.clone(), Some(guard))?;
        }
        tracing::debug!("Read {} rows of {} from disk", rows.len(), table);
        Ok(rows)
    }

    fn bulk_write_locked<R: Record>(
        &self,
        table: &str,
        rows: Vec<R>,
        guard: &TableGuard,
    ) -> Result<Option<CacheUpdate<R>>> {
        if rows.is_empty() {
            return Err(LsonError::Validation(format!(
                "bulk insert into `{}` needs at least one row",
                table
            )));
        }
        self.write_locked(table, rows, guard)
    }

    /// Encode and append `rows`; returns the cache change to apply
    ///
    /// Nothing is written when the rows encode to nothing. The cache receives
    /// each written line as it decodes back, never the caller's row, so a
    /// warm read answers exactly like a read from the file.
    fn write_locked<R: Record>(
        &self,
        table: &str,
        rows: Vec<R>,
        guard: &TableGuard,
    ) -> Result<Option<CacheUpdate<R>>> {
        let mut lines = Vec::with_capacity(rows.len());
        for row in &rows {
            let line = self.serializer.encode_row(row, &[])?;
            if let Some(line) = line.filter(|line| !line.is_empty()) {
                lines.push(line);
            }
        }
        if lines.is_empty() {
            tracing::trace!("Nothing to write to {}", table);
            return Ok(None);
        }

        let mut written = Vec::with_capacity(lines.len());
        for line in &lines {
            written.push(
                self.serializer
                    .decode_row::<R>(line, &[])
                    .map_err(|e| e.in_table(table))?,
            );
        }

        // a cold entry is filled from the file first so it never holds a
        // strict subset of the table
        let backfill = match self.cache.entry_len::<R>(table, Some(guard))? {
            Some(len) if len > 0 => None,
            _ => Some(self.load_rows::<R>(table)?).filter(|loaded| !loaded.is_empty()),
        };

        let payload = lines.join("\n");
        self.files
            .append(table, &payload)
            .inspect_err(|e| tracing::warn!("Append to {} failed: {}", table, e))?;
        tracing::debug!("Appended {} rows to {}", written.len(), table);

        let update = match backfill {
            Some(mut cached) => {
                cached.extend(written);
                CacheUpdate::Replace(cached)
            }
            None => CacheUpdate::append(written),
        };
        Ok(Some(update))
    }

    fn apply_locked<R: Record>(
        &self,
        table: &str,
        update: Option<CacheUpdate<R>>,
        guard: &TableGuard,
    ) -> Result<()> {
        match update {
            None => Ok(()),
            Some(CacheUpdate::Insert(row)) => self.cache.insert(table, row, Some(guard)),
            Some(CacheUpdate::Extend(rows)) => self.cache.bulk_insert(table, rows, Some(guard)),
            Some(CacheUpdate::Replace(rows)) => self.cache.put(table, rows, Some(guard)),
        }
    }

    fn load_rows<R: Record>(&self, table: &str) -> Result<Vec<R>> {
        match self.files.read_if_exists(table)? {
            Some(text) => self
                .serializer
                .decode_rows(&text, &[])
                .map_err(|e| e.in_table(table)),
            None => Ok(Vec::new()),
        }
    }
}

// =============================================================================
// Pending Cache Update
// =============================================================================

/// Cache update of an async write, still holding the table lock
///
/// Dropping it does not cancel the update.
#[derive(Debug)]
pub struct PendingCacheUpdate {
    handle: Option<JoinHandle<Result<()>>>,
}

impl PendingCacheUpdate {
    fn ready() -> Self {
        Self { handle: None }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the cache update and surface its error
    pub async fn wait(self) -> Result<()> {
        match self.handle {
            Some(handle) => handle.await.map_err(|e| LsonError::Task(e.to_string()))?,
            None => Ok(()),
        }
    }
}

// =============================================================================
// Table Names
// =============================================================================

fn validate_table_name(table: &str) -> Result<()> {
    if table.trim().is_empty() {
        return Err(LsonError::Validation("table name must not be blank".to_string()));
    }
    if table.contains(['/', '\\', '\0']) || table.contains("..") {
        return Err(LsonError::Validation(format!(
            "table name {:?} must not contain path separators or `..`",
            table
        )));
    }
    Ok(())
}
