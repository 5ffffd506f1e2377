//! File-backed checkpoint store

use crate::state::{CrawlCheckpoint, PriceWindow, WindowCursor};
use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use crate::storage::write_atomically;
use std::path::{Path, PathBuf};

/// Checkpoint kept in a two-line text file
///
/// Every save is a read-modify-write of the whole file, replaced atomically.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    /// Opens the checkpoint at `path`, creating it at `initial` when missing
    ///
    /// # Returns
    ///
    /// * `Ok(FileCheckpointStore)` - The file exists and parses
    /// * `Err(StorageError)` - The file could not be created or is corrupt
    pub fn open(path: &Path, initial: PriceWindow) -> StorageResult<Self> {
        let store = Self {
            path: path.to_path_buf(),
        };

        if !path.exists() {
            tracing::info!(
                "No checkpoint at {}, starting discovery at {}",
                path.display(),
                initial
            );
            store.write(&CrawlCheckpoint::starting_at(initial))?;
        }

        let checkpoint = store.read()?;
        tracing::debug!(
            "Checkpoint loaded: window {}, {} items processed",
            checkpoint.cursor,
            checkpoint.items_processed
        );

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads both fields
    pub fn read(&self) -> StorageResult<CrawlCheckpoint> {
        let text = std::fs::read_to_string(&self.path)?;
        CrawlCheckpoint::parse(&text).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            line: e.line,
            message: e.message,
        })
    }

    fn write(&self, checkpoint: &CrawlCheckpoint) -> StorageResult<()> {
        write_atomically(&self.path, checkpoint.render().as_bytes())?;
        Ok(())
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load_window(&self) -> StorageResult<WindowCursor> {
        Ok(self.read()?.cursor)
    }

    fn save_window(&mut self, cursor: WindowCursor) -> StorageResult<()> {
        let mut checkpoint = self.read()?;
        checkpoint.cursor = cursor;
        self.write(&checkpoint)
    }

    fn load_items_processed(&self) -> StorageResult<u64> {
        Ok(self.read()?.items_processed)
    }

    fn save_items_processed(&mut self, items: u64) -> StorageResult<()> {
        let mut checkpoint = self.read()?;
        checkpoint.items_processed = items;
        self.write(&checkpoint)
    }
}
