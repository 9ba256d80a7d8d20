//! Sync Module
//!
//! Per-table exclusive locks and the locked-execution helpers built on them.
//!
//! ## Re-entrancy
//! A guard is a capability: code that already holds a table's lock passes
//! its [`TableGuard`] down, and a nested [`locked`] call on the same lock
//! runs directly instead of acquiring again.
//!
//! ```text
//! TableStore::insert ── locked(lock, None) ─────────────┐ acquire
//!     └── MemoryCache::insert ── locked(lock, Some(g)) ─┤ already held, run
//!                                                       └ release
//! ```
//!
//! Locks are released when the guard drops, on every exit path including
//! errors and panics.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{LsonError, Result};

/// Caller-supplied handler for errors raised inside a locked region
pub type ErrorHook = Arc<dyn Fn(&LsonError) + Send + Sync>;

// =============================================================================
// Table Lock
// =============================================================================

/// Exclusive lock of one table
///
/// Cloning shares the same underlying lock. Waiters are served in FIFO order.
#[derive(Clone, Default)]
pub struct TableLock(Arc<Mutex<()>>);

impl TableLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the current thread until the lock is acquired
    ///
    /// On a multi-thread runtime worker the wait happens in place, so the
    /// worker's other tasks move to another thread and the holder can still
    /// make progress. A current-thread runtime has no such escape: prefer
    /// [`TableLock::acquire_async`] there.
    pub fn acquire(&self) -> TableGuard {
        let wait = || futures::executor::block_on(Arc::clone(&self.0).lock_owned());
        let permit = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(wait)
            }
            _ => wait(),
        };
        TableGuard {
            lock: self.clone(),
            _permit: permit,
        }
    }

    pub async fn acquire_async(&self) -> TableGuard {
        let permit = Arc::clone(&self.0).lock_owned().await;
        TableGuard {
            lock: self.clone(),
            _permit: permit,
        }
    }

    /// Acquire without waiting
    pub fn try_acquire(&self) -> Option<TableGuard> {
        let permit = Arc::clone(&self.0).try_lock_owned().ok()?;
        Some(TableGuard {
            lock: self.clone(),
            _permit: permit,
        })
    }

    pub fn is_locked(&self) -> bool {
        self.0.try_lock().is_err()
    }
}

impl fmt::Debug for TableLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableLock")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// Proof that a table lock is held; releases on drop
pub struct TableGuard {
    lock: TableLock,
    _permit: OwnedMutexGuard<()>,
}

impl TableGuard {
    /// Whether this guard holds `lock`
    pub fn holds(&self, lock: &TableLock) -> bool {
        Arc::ptr_eq(&self.lock.0, &lock.0)
    }
}

impl fmt::Debug for TableGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableGuard").finish_non_exhaustive()
    }
}

// =============================================================================
// Lock Registry
// =============================================================================

/// Table name to lock map, shared by the store and its cache
///
/// Locks are created on first use and never removed, so a table keeps one
/// lock for the life of the registry even across drop and re-create.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: DashMap<String, TableLock>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(tables: usize) -> Self {
        Self {
            locks: DashMap::with_capacity(tables),
        }
    }

    /// The lock of `table`, created atomically if absent
    pub fn lock_for(&self, table: &str) -> TableLock {
        if let Some(lock) = self.locks.get(table) {
            return lock.value().clone();
        }
        self.locks.entry(table.to_string()).or_default().value().clone()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

// =============================================================================
// Locked Execution
// =============================================================================

/// Run `f` while holding `lock`
///
/// If `held` already holds `lock` the region runs directly. Errors are
/// reported to `on_error` by the call that acquired the lock, then returned.
pub fn locked<T, F>(
    lock: &TableLock,
    held: Option<&TableGuard>,
    on_error: Option<&ErrorHook>,
    f: F,
) -> Result<T>
where
    F: FnOnce(&TableGuard) -> Result<T>,
{
    if let Some(guard) = held.filter(|guard| guard.holds(lock)) {
        return f(guard);
    }

    let guard = lock.acquire();
    let result = f(&guard);
    drop(guard);
    report(result, on_error)
}

/// Await `lock`, then run the blocking `f` off the async executor
///
/// The guard is handed back so the caller can keep the table locked for
/// follow-up work.
pub async fn locked_async<T, F>(
    lock: &TableLock,
    on_error: Option<&ErrorHook>,
    f: F,
) -> Result<(TableGuard, T)>
where
    T: Send + 'static,
    F: FnOnce(&TableGuard) -> Result<T> + Send + 'static,
{
    let guard = lock.acquire_async().await;
    offload(guard, on_error, f).await
}

/// Run the blocking `f` on the blocking pool under an already held guard
///
/// The guard moves into the task and back out, so the lock is held for the
/// whole region and released if the task fails.
pub async fn offload<T, F>(
    guard: TableGuard,
    on_error: Option<&ErrorHook>,
    f: F,
) -> Result<(TableGuard, T)>
where
    T: Send + 'static,
    F: FnOnce(&TableGuard) -> Result<T> + Send + 'static,
{
    let joined = tokio::task::spawn_blocking(move || {
        let result = f(&guard);
        result.map(|value| (guard, value))
    })
    .await;

    let result = match joined {
        Ok(result) => result,
        Err(e) => Err(LsonError::Task(e.to_string())),
    };
    report(result, on_error)
}

fn report<T>(result: Result<T>, on_error: Option<&ErrorHook>) -> Result<T> {
    if let (Err(e), Some(hook)) = (&result, on_error) {
        hook(e);
    }
    result
}
