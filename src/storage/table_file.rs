//! Table files
//!
//! One UTF-8 text file per table, `{root}/{table}.lson`. Every append is
//! framed with a leading line-feed, so a file that has seen writes starts
//! with `\n` and consecutive appends never merge lines.
//!
//! `TableFiles` does no locking of its own; callers hold the table lock.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::codec::LINE_FEED;
use crate::config::SyncStrategy;
use crate::error::{LsonError, Result};

/// File extension of table files
pub const TABLE_EXTENSION: &str = "lson";

/// File-level operations on the tables under one root directory
#[derive(Debug, Clone)]
pub struct TableFiles {
    root: PathBuf,
    sync_strategy: SyncStrategy,
}

impl TableFiles {
    /// Open the root directory, creating it if needed
    pub fn open(root: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            sync_strategy,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.{}", table, TABLE_EXTENSION))
    }

    pub fn exists(&self, table: &str) -> bool {
        self.path(table).is_file()
    }

    /// Create an empty file; `false` if the table already exists
    pub fn create(&self, table: &str) -> Result<bool> {
        match OpenOptions::new().write(true).create_new(true).open(self.path(table)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the file; `false` if there was none
    pub fn remove(&self, table: &str) -> Result<bool> {
        match fs::remove_file(self.path(table)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Whole file content
    pub fn read(&self, table: &str) -> Result<String> {
        self.read_if_exists(table)?.ok_or_else(|| LsonError::NotFound {
            table: table.to_string(),
            path: self.path(table),
        })
    }

    pub fn read_if_exists(&self, table: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(table)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Append `payload` as new line(s), creating the file if needed
    ///
    /// A failed write is rolled back by truncating to the previous length.
    pub fn append(&self, table: &str, payload: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(table))?;
        let previous_len = file.metadata()?.len();

        let mut framed = String::with_capacity(payload.len() + 1);
        framed.push(LINE_FEED);
        framed.push_str(payload);

        if let Err(e) = Self::write_framed(&mut file, framed.as_bytes(), self.sync_strategy) {
            if let Err(rollback) = file.set_len(previous_len) {
                tracing::warn!(
                    "Rollback of {} to {} bytes failed: {}",
                    table,
                    previous_len,
                    rollback
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn write_framed(file: &mut File, bytes: &[u8], sync_strategy: SyncStrategy) -> io::Result<()> {
        file.write_all(bytes)?;
        file.flush()?;
        if sync_strategy == SyncStrategy::EveryWrite {
            file.sync_data()?;
        }
        Ok(())
    }

    /// Names of all tables under the root, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(TABLE_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
                tables.push(name.to_string());
            }
        }
        tables.sort();
        Ok(tables)
    }

    /// File size in bytes, `None` if the table does not exist
    pub fn size(&self, table: &str) -> Result<Option<u64>> {
        match fs::metadata(self.path(table)) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
