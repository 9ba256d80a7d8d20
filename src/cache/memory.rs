//! Process-local cache
//!
//! Entries are type-erased `Vec<R>` behind a `parking_lot::RwLock`. The map
//! lock is only held for the duration of one map access; table-level
//! exclusion comes from the shared [`LockRegistry`].

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{LsonError, Result};
use crate::record::Record;
use crate::sync::{locked, LockRegistry, TableGuard};

use super::CacheProvider;

type Entry = Box<dyn Any + Send + Sync>;

/// In-memory [`CacheProvider`]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    locks: Arc<LockRegistry>,
    initial_capacity: usize,
}

impl MemoryCache {
    /// A cache with its own lock registry
    pub fn new() -> Self {
        Self::with_locks(Arc::new(LockRegistry::new()), 0)
    }

    /// A cache sharing `locks` with a store
    ///
    /// `initial_capacity` rows are reserved when a write creates an entry.
    pub fn with_locks(locks: Arc<LockRegistry>, initial_capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            locks,
            initial_capacity,
        }
    }

    pub fn locks(&self) -> &Arc<LockRegistry> {
        &self.locks
    }

    pub fn contains(&self, table: &str) -> bool {
        self.entries.read().contains_key(table)
    }

    /// Number of cached tables
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn with_entry_mut<R, T, F>(&self, table: &str, f: F) -> Result<T>
    where
        R: Record,
        F: FnOnce(&mut Vec<R>) -> T,
    {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(table.to_string())
            .or_insert_with(|| Box::new(Vec::<R>::with_capacity(self.initial_capacity)) as Entry);
        let rows = entry
            .downcast_mut::<Vec<R>>()
            .ok_or_else(|| type_mismatch::<R>(table))?;
        Ok(f(rows))
    }

    fn with_entry<R, T, F>(&self, table: &str, f: F) -> Result<Option<T>>
    where
        R: Record,
        F: FnOnce(&Vec<R>) -> T,
    {
        let entries = self.entries.read();
        match entries.get(table) {
            Some(entry) => {
                let rows = entry
                    .downcast_ref::<Vec<R>>()
                    .ok_or_else(|| type_mismatch::<R>(table))?;
                Ok(Some(f(rows)))
            }
            None => Ok(None),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("tables", &self.len())
            .field("initial_capacity", &self.initial_capacity)
            .finish()
    }
}

impl CacheProvider for MemoryCache {
    fn put<R: Record>(&self, table: &str, rows: Vec<R>, held: Option<&TableGuard>) -> Result<()> {
        locked(&self.locks.lock_for(table), held, None, |_| {
            self.entries.write().insert(table.to_string(), Box::new(rows));
            Ok(())
        })
    }

    fn read<R: Record>(&self, table: &str, held: Option<&TableGuard>) -> Result<Option<Vec<R>>> {
        locked(&self.locks.lock_for(table), held, None, |_| {
            self.with_entry(table, |rows: &Vec<R>| rows.clone())
        })
    }

    fn insert<R: Record>(&self, table: &str, row: R, held: Option<&TableGuard>) -> Result<()> {
        locked(&self.locks.lock_for(table), held, None, |_| {
            self.with_entry_mut(table, |rows: &mut Vec<R>| rows.push(row))
        })
    }

    fn bulk_insert<R: Record>(
        &self,
        table: &str,
        rows: Vec<R>,
        held: Option<&TableGuard>,
    ) -> Result<()> {
        locked(&self.locks.lock_for(table), held, None, |_| {
            self.with_entry_mut(table, |cached: &mut Vec<R>| cached.extend(rows))
        })
    }

    fn drop(&self, table: &str, held: Option<&TableGuard>) -> Result<bool> {
        locked(&self.locks.lock_for(table), held, None, |_| {
            Ok(self.entries.write().remove(table).is_some())
        })
    }

    fn clear(&self) -> Result<()> {
        let tables: Vec<String> = self.entries.read().keys().cloned().collect();
        for table in tables {
            CacheProvider::drop(self, &table, None)?;
        }
        Ok(())
    }

    fn entry_len<R: Record>(
        &self,
        table: &str,
        held: Option<&TableGuard>,
    ) -> Result<Option<usize>> {
        locked(&self.locks.lock_for(table), held, None, |_| {
            self.with_entry(table, |rows: &Vec<R>| rows.len())
        })
    }
}

fn type_mismatch<R>(table: &str) -> LsonError {
    LsonError::Validation(format!(
        "table `{}` is cached with a row type other than {}",
        table,
        std::any::type_name::<R>()
    ))
}
