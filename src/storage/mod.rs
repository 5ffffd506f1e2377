//! Storage module for persisting crawl progress and results
//!
//! This module handles every file the pipeline writes:
//! - The two-line checkpoint shared by discovery and extraction
//! - The raw and deduplicated URL stores (one URL per line)
//! - The append-only raw dataset

mod checkpoint_file;
mod dataset_store;
mod traits;
mod url_store;

pub use checkpoint_file::FileCheckpointStore;
pub use dataset_store::DatasetStore;
pub use traits::{CheckpointStore, StorageError, StorageResult};
pub use url_store::UrlStore;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Feature name to feature value, in page order
pub type FeatureRecord = IndexMap<String, String>;

/// Serializes `value` as JSON indented with four spaces
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Replaces `path` with `contents` through a synced sibling temp file
///
/// Readers see either the old or the new contents, never a torn write.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp_path = temp_sibling(path);
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
