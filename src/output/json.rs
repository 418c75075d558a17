//! JSON output for folder listings.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "signature": "9f2c...",
//!   "source": "disk",
//!   "count": 1,
//!   "total_size": 1048576,
//!   "folders": [
//!     {
//!       "name": "Phoenix",
//!       "directory": "/ao2/base/characters/Phoenix",
//!       "emote_count": 12,
//!       "size_bytes": 1048576,
//!       "integrity_failed": false,
//!       "...": "..."
//!     }
//!   ]
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::cache::ProjectedFolderRecord;
use crate::visualizer::CacheOutcome;

/// JSON view of a resolved listing.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    /// Folder signature as hex
    pub signature: String,
    /// Tier that served the records
    pub source: &'static str,
    /// Number of folders
    pub count: usize,
    /// Sum of folder sizes in bytes
    pub total_size: u64,
    /// The records, in folder order
    pub folders: &'a [ProjectedFolderRecord],
}

impl<'a> JsonOutput<'a> {
    /// Borrow a resolved outcome for serialization.
    #[must_use]
    pub fn new(outcome: &'a CacheOutcome) -> Self {
        Self {
            signature: outcome.signature.to_hex(),
            source: outcome.source.label(),
            count: outcome.records.len(),
            total_size: outcome.records.iter().map(|r| r.size_bytes).sum(),
            folders: outcome.records.as_slice(),
        }
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
