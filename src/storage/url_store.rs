//! Line-oriented URL stores

use crate::storage::traits::StorageResult;
use crate::storage::write_atomically;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// A file holding one URL per line
///
/// Discovery appends to the raw store; deduplication rewrites the
/// deduplicated store in one step.
#[derive(Debug, Clone)]
pub struct UrlStore {
    path: PathBuf,
}

impl UrlStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Appends `urls`, one per line, and syncs the file
    pub fn append(&self, urls: &[String]) -> StorageResult<()> {
        if urls.is_empty() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for url in urls {
            writeln!(writer, "{}", url)?;
        }
        writer.flush()?;
        writer.get_ref().sync_data()?;

        Ok(())
    }

    /// Reads every non-blank line, trimmed; a missing file reads as empty
    pub fn load(&self) -> StorageResult<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Replaces the whole store with `urls`
    pub fn replace(&self, urls: &[String]) -> StorageResult<()> {
        let mut content = String::new();
        for url in urls {
            content.push_str(url);
            content.push('\n');
        }
        write_atomically(&self.path, content.as_bytes())?;
        Ok(())
    }
}
