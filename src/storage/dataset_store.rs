//! Append-only raw dataset

use crate::storage::traits::{StorageError, StorageResult};
use crate::storage::{to_pretty_json, FeatureRecord};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Separator written after every record
const RECORD_SEPARATOR: &[u8] = b",\n";

/// The raw dataset: independently serialized records, each followed by `,\n`
///
/// The file is not a valid JSON document until it goes through the
/// normalizer.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record and syncs it to disk
    ///
    /// The record and its separator go out in a single write.
    pub fn append(&self, record: &FeatureRecord) -> StorageResult<()> {
        let mut bytes =
            to_pretty_json(record).map_err(|e| StorageError::Serialization(e.to_string()))?;
        bytes.extend_from_slice(RECORD_SEPARATOR);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&bytes)?;
        file.sync_data()?;

        Ok(())
    }

    /// Reads the raw text; a missing file reads as empty
    pub fn read_raw(&self) -> StorageResult<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}
