//! The persisted progress record
//!
//! The record is two lines of text: the next price window to crawl
//! (`"<low> <high>"`, or `done` once the walk is over) and the number of items
//! already saved to the dataset.

use crate::state::{PriceWindow, WindowCursor};
use thiserror::Error;

/// Line-1 marker for a finished discovery walk
const TERMINAL_MARKER: &str = "done";

/// A checkpoint line that could not be understood
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct CheckpointFormatError {
    pub line: usize,
    pub message: String,
}

/// Progress of both pipeline phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlCheckpoint {
    /// Next window for discovery; only changes between whole windows
    pub cursor: WindowCursor,

    /// Records durably appended to the dataset
    pub items_processed: u64,
}

impl CrawlCheckpoint {
    /// A fresh checkpoint starting discovery at `window`
    pub fn starting_at(window: PriceWindow) -> Self {
        Self {
            cursor: WindowCursor::Open(window),
            items_processed: 0,
        }
    }

    /// Parses the two-line text form
    ///
    /// A missing or blank second line reads as zero items processed.
    pub fn parse(text: &str) -> Result<Self, CheckpointFormatError> {
        let mut lines = text.lines();

        let cursor = parse_cursor(lines.next().unwrap_or(""))?;
        let items_processed = match lines.next().map(str::trim) {
            None | Some("") => 0,
            Some(value) => value.parse().map_err(|e| CheckpointFormatError {
                line: 2,
                message: format!("invalid items count '{}': {}", value, e),
            })?,
        };

        Ok(Self {
            cursor,
            items_processed,
        })
    }

    /// Renders the two-line text form
    pub fn render(&self) -> String {
        let first = match self.cursor {
            WindowCursor::Open(window) => format!("{} {}", window.low(), window.high()),
            WindowCursor::Terminal => TERMINAL_MARKER.to_string(),
        };
        format!("{}\n{}\n", first, self.items_processed)
    }
}

fn parse_cursor(line: &str) -> Result<WindowCursor, CheckpointFormatError> {
    let line = line.trim();
    let invalid = |message: String| CheckpointFormatError { line: 1, message };

    if line == TERMINAL_MARKER {
        return Ok(WindowCursor::Terminal);
    }

    let bounds: Vec<&str> = line.split_whitespace().collect();
    if bounds.len() != 2 {
        return Err(invalid(format!(
            "expected '<low> <high>' or '{}', got '{}'",
            TERMINAL_MARKER, line
        )));
    }

    let low: u64 = bounds[0]
        .parse()
        .map_err(|e| invalid(format!("invalid low bound '{}': {}", bounds[0], e)))?;
    let high: u64 = bounds[1]
        .parse()
        .map_err(|e| invalid(format!("invalid high bound '{}': {}", bounds[1], e)))?;

    if low > high {
        return Err(invalid(format!("low bound {} exceeds high bound {}", low, high)));
    }

    Ok(WindowCursor::Open(PriceWindow::new(low, high)))
}
