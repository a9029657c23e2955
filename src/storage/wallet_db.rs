// Wallet key-value database session using sled

use crate::error::{Result, WalletError};
use sled::{Batch, Db};
use std::collections::BTreeMap;
use std::path::Path;

/// How a session opens the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Rejects writes in this session only. sled still opens the files
    /// read-write and holds its exclusive lock, so two processes cannot
    /// read the same wallet at once.
    ReadOnly,
    ReadWriteCreate,
}

/// One open session on the wallet database.
///
/// Writes are staged in memory (and visible to `get` in the same session)
/// until `flush`, which applies them as a single atomic batch and syncs
/// to disk. Dropping the session closes the database; unflushed writes
/// are discarded.
pub struct WalletDb {
    db: Db,
    mode: OpenMode,
    pending: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl WalletDb {
    /// Open the database at `path`
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref();
        if mode == OpenMode::ReadOnly && !path.exists() {
            return Err(WalletError::NotInitialized);
        }

        // Flushing is explicit, so no background flusher thread
        let db = sled::Config::new()
            .path(path)
            .flush_every_ms(None)
            .open()
            .map_err(|e| {
                WalletError::StoreIo(format!("failed to open {}: {}", path.display(), e))
            })?;

        log::debug!("Opened wallet database {} ({:?})", path.display(), mode);
        Ok(Self {
            db,
            mode,
            pending: BTreeMap::new(),
        })
    }

    /// Get a value, including writes staged in this session
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(value) = self.pending.get(key.as_bytes()) {
            return Ok(Some(value.clone()));
        }
        Ok(self.db.get(key)?.map(|value| value.to_vec()))
    }

    /// Check if a key exists
    pub fn contains(&self, key: &str) -> Result<bool> {
        if self.pending.contains_key(key.as_bytes()) {
            return Ok(true);
        }
        Ok(self.db.contains_key(key)?)
    }

    /// Stage a write
    pub fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        if self.mode == OpenMode::ReadOnly {
            return Err(WalletError::StoreIo(format!(
                "cannot write {:?}: database opened read-only",
                key
            )));
        }
        self.pending.insert(key.as_bytes().to_vec(), value);
        Ok(())
    }

    /// Apply staged writes atomically and sync to disk
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let mut batch = Batch::default();
        let count = self.pending.len();
        for (key, value) in std::mem::take(&mut self.pending) {
            batch.insert(key, value);
        }
        self.db.apply_batch(batch)?;
        self.db.flush()?;

        log::debug!("Flushed {} write(s)", count);
        Ok(())
    }

    /// Close the session. Staged writes that were not flushed are dropped.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for WalletDb {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            log::warn!("Discarding {} unflushed write(s)", self.pending.len());
        }
    }
}
