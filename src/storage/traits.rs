//! Storage traits and error types

use crate::state::WindowCursor;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// These are the only failures allowed to stop a run: without a working
/// checkpoint or store there is no safe way to continue.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store {path}, line {line}: {message}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable progress record with two independently updated fields
///
/// Saving one field must leave the other untouched. The fields are never
/// updated in the same logical step, so no multi-field transaction is needed.
pub trait CheckpointStore: Send {
    /// Next window for discovery (or `Terminal` when the walk is done)
    fn load_window(&self) -> StorageResult<WindowCursor>;

    /// Records the next window; called only between whole windows
    fn save_window(&mut self, cursor: WindowCursor) -> StorageResult<()>;

    /// Number of records durably appended to the dataset
    fn load_items_processed(&self) -> StorageResult<u64>;

    /// Records the item count; called only after a record was appended
    fn save_items_processed(&mut self, items: u64) -> StorageResult<()>;
}
