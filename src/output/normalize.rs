//! Raw dataset repair
//!
//! The raw dataset is a run of independently serialized records, normally
//! separated by `,\n` but possibly glued together (`}{`). Normalization reads
//! the records one after another, skipping separators, and re-serializes them
//! as a single array.

use crate::storage::{to_pretty_json, FeatureRecord};
use serde_json::Deserializer;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while normalizing the dataset
#[derive(Debug, Error)]
pub enum FormatError {
    /// The repaired text does not parse, typically a record torn by a crash
    #[error("Malformed record at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("Failed to serialize dataset: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for normalization
pub type FormatResult<T> = Result<T, FormatError>;

/// Parses raw dataset text into its records
///
/// Accepts records separated by commas and/or whitespace or not separated at
/// all, and also an already-normalized array.
///
/// # Examples
///
/// ```
/// use immo_harvest::output::normalize;
///
/// let records = normalize(r#"{"a":"1"}{"b":"2"}"#).unwrap();
/// assert_eq!(records.len(), 2);
/// assert!(normalize(r#"{"a":"1"}{"c":"#).is_err());
/// ```
pub fn normalize(raw: &str) -> FormatResult<Vec<FeatureRecord>> {
    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(raw).map_err(|e| FormatError::Parse {
            offset: 0,
            message: e.to_string(),
        });
    }

    let mut records = Vec::new();
    let mut offset = 0;

    loop {
        offset += skip_separators(&raw[offset..]);
        if offset >= raw.len() {
            break;
        }

        let mut stream = Deserializer::from_str(&raw[offset..]).into_iter::<FeatureRecord>();
        match stream.next() {
            Some(Ok(record)) => {
                records.push(record);
                offset += stream.byte_offset();
            }
            Some(Err(e)) => {
                return Err(FormatError::Parse {
                    offset,
                    message: e.to_string(),
                })
            }
            None => break,
        }
    }

    Ok(records)
}

/// Length of the leading run of whitespace and commas
fn skip_separators(text: &str) -> usize {
    text.len()
        - text
            .trim_start_matches(|c: char| c.is_whitespace() || c == ',')
            .len()
}

/// Normalizes the raw dataset at `input` into a pretty-printed array at `output`
///
/// `input` is never modified. Returns the number of records written.
pub fn write_normalized(input: &Path, output: &Path) -> FormatResult<usize> {
    let raw = std::fs::read_to_string(input)?;
    let records = normalize(&raw)?;

    let mut json = to_pretty_json(&records).map_err(|e| FormatError::Serialize(e.to_string()))?;
    json.push(b'\n');
    std::fs::write(output, json)?;

    tracing::info!(
        "Normalized {} records from {} into {}",
        records.len(),
        input.display(),
        output.display()
    );

    Ok(records.len())
}
