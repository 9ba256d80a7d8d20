//! Tests for MemoryCache
//!
//! These tests verify:
//! - put / read / insert / bulk_insert / drop / clear semantics
//! - Entries are created on first write
//! - Row type checks on cached entries
//! - Re-entrant calls with a held table guard
//! - Concurrent writers on the same and on different tables

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::thread;

use common::*;
use lsondb::{CacheProvider, LockRegistry, LsonError, MemoryCache};

// =============================================================================
// Basic Operations
// =============================================================================

#[test]
fn test_read_absent_table() {
    let cache = MemoryCache::new();

    let rows = cache.read::<Person>("People", None).unwrap();
    assert_eq!(rows, None);
    assert_eq!(cache.entry_len::<Person>("People", None).unwrap(), None);
}

#[test]
fn test_put_replaces_entry() {
    let cache = MemoryCache::new();

    cache.put("People", vec![person("Ada", 30)], None).unwrap();
    cache
        .put("People", vec![person("Bob", 41), person("Eve", 25)], None)
        .unwrap();

    let rows = cache.read::<Person>("People", None).unwrap().unwrap();
    assert_eq!(rows, vec![person("Bob", 41), person("Eve", 25)]);
}

#[test]
fn test_insert_creates_then_appends() {
    let cache = MemoryCache::new();

    cache.insert("People", person("Ada", 30), None).unwrap();
    cache.insert("People", person("Bob", 41), None).unwrap();

    let rows = cache.read::<Person>("People", None).unwrap().unwrap();
    assert_eq!(rows, vec![person("Ada", 30), person("Bob", 41)]);
    assert!(cache.contains("People"));
}

#[test]
fn test_bulk_insert_keeps_order() {
    let cache = MemoryCache::new();

    cache.insert("People", person("Ada", 30), None).unwrap();
    cache
        .bulk_insert("People", vec![person("Bob", 41), person("Eve", 25)], None)
        .unwrap();

    let rows = cache.read::<Person>("People", None).unwrap().unwrap();
    let names: Vec<&str> = rows.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Bob", "Eve"]);
    assert_eq!(cache.entry_len::<Person>("People", None).unwrap(), Some(3));
}

#[test]
fn test_read_returns_a_copy() {
    let cache = MemoryCache::new();
    cache.insert("People", person("Ada", 30), None).unwrap();

    let mut rows = cache.read::<Person>("People", None).unwrap().unwrap();
    rows[0].age = 99;

    let again = cache.read::<Person>("People", None).unwrap().unwrap();
    assert_eq!(again[0].age, 30);
}

#[test]
fn test_drop_and_clear() {
    let cache = MemoryCache::new();
    cache.insert("People", person("Ada", 30), None).unwrap();
    cache.insert("Orders", person("Bob", 41), None).unwrap();

    assert!(cache.drop("People", None).unwrap());
    assert!(!cache.drop("People", None).unwrap());
    assert_eq!(cache.read::<Person>("People", None).unwrap(), None);
    assert_eq!(cache.len(), 1);

    cache.clear().unwrap();
    assert!(cache.is_empty());
}

#[test]
fn test_row_type_mismatch() {
    let cache = MemoryCache::new();
    cache.insert("People", person("Ada", 30), None).unwrap();

    let read = cache.read::<Scored>("People", None);
    assert!(matches!(read, Err(LsonError::Validation(_))));

    let insert = cache.insert("People", Scored::default(), None);
    assert!(matches!(insert, Err(LsonError::Validation(_))));

    // The original entry is untouched
    assert_eq!(cache.entry_len::<Person>("People", None).unwrap(), Some(1));
}

// =============================================================================
// Re-entrancy
// =============================================================================

#[test]
fn test_operations_with_held_guard() {
    let locks = Arc::new(LockRegistry::new());
    let cache = MemoryCache::with_locks(Arc::clone(&locks), 16);

    let lock = locks.lock_for("People");
    let guard = lock.acquire();

    // Every call would block forever if it tried to take the lock again
    cache.insert("People", person("Ada", 30), Some(&guard)).unwrap();
    cache
        .bulk_insert("People", vec![person("Bob", 41)], Some(&guard))
        .unwrap();
    let rows = cache.read::<Person>("People", Some(&guard)).unwrap().unwrap();
    assert_eq!(rows.len(), 2);
    cache.put("People", rows, Some(&guard)).unwrap();
    assert!(cache.drop("People", Some(&guard)).unwrap());

    drop(guard);
    assert!(!lock.is_locked());
}

#[test]
fn test_cache_waits_for_held_table_lock() {
    let locks = Arc::new(LockRegistry::new());
    let cache = Arc::new(MemoryCache::with_locks(Arc::clone(&locks), 0));

    let guard = locks.lock_for("People").acquire();

    let writer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || cache.insert("People", person("Ada", 30), None).unwrap())
    };

    thread::sleep(std::time::Duration::from_millis(50));
    assert!(!cache.contains("People"));

    drop(guard);
    writer.join().unwrap();
    assert!(cache.contains("People"));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_inserts_same_table() {
    let cache = Arc::new(MemoryCache::new());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..100 {
                    cache
                        .insert("People", person(&format!("p{}-{}", t, i), i), None)
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(cache.entry_len::<Person>("People", None).unwrap(), Some(800));
}

#[test]
fn test_concurrent_inserts_different_tables() {
    let cache = Arc::new(MemoryCache::new());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let table = format!("Table{}", t);
                let rows: Vec<Person> = (0..50).map(|i| person("x", i)).collect();
                cache.bulk_insert(&table, rows, None).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(cache.len(), 4);
    for t in 0..4 {
        let table = format!("Table{}", t);
        assert_eq!(cache.entry_len::<Person>(&table, None).unwrap(), Some(50));
    }
}
