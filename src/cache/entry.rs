//! Cache entry definitions.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signature::FolderSignature;
use crate::scanner::IntegrityReport;

/// Current version of the cache file format.
///
/// Bump this whenever [`ProjectedFolderRecord`] or [`CacheEntry`] changes
/// shape; older files are then discarded on load.
pub const SCHEMA_VERSION: u32 = 1;

/// Display-ready summary of one character folder.
///
/// Paths are empty when the item was absent at projection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedFolderRecord {
    /// Character name
    pub name: String,
    /// Absolute path to the character folder
    pub directory: PathBuf,
    /// Path to `char_icon.png`
    pub icon_path: PathBuf,
    /// Image shown as the folder preview
    pub preview_path: PathBuf,
    /// Path to `char.ini`
    pub config_path: PathBuf,
    /// Modification time of `char.ini`, or of the folder when it is missing
    pub last_modified: DateTime<Utc>,
    /// Number of emotes declared in `char.ini`
    pub emote_count: u32,
    /// Total size of all files in the folder, in bytes
    pub size_bytes: u64,
    /// Readme found in the folder root
    pub readme_path: Option<PathBuf>,
    /// Whether the last integrity check reported failures
    pub integrity_failed: bool,
    /// Number of failed integrity checks
    pub integrity_failure_count: u32,
    /// Failure messages joined into one line
    pub integrity_summary: String,
}

impl ProjectedFolderRecord {
    /// Record with every disk-derived field at its default.
    #[must_use]
    pub fn empty(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            icon_path: PathBuf::new(),
            preview_path: PathBuf::new(),
            config_path: PathBuf::new(),
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
            emote_count: 0,
            size_bytes: 0,
            readme_path: None,
            integrity_failed: false,
            integrity_failure_count: 0,
            integrity_summary: String::new(),
        }
    }

    /// Copy the integrity fields from a report, clearing them when `None`.
    pub fn apply_integrity(&mut self, report: Option<&IntegrityReport>) {
        match report {
            Some(report) => {
                self.integrity_failed = report.has_failures;
                self.integrity_failure_count = report.failure_count();
                self.integrity_summary = report.summary();
            }
            None => {
                self.integrity_failed = false;
                self.integrity_failure_count = 0;
                self.integrity_summary.clear();
            }
        }
    }
}

/// A versioned, signed list of projected records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Format version, see [`SCHEMA_VERSION`].
    pub version: u32,
    /// Signature of the folder list the records were built from.
    pub signature: FolderSignature,
    /// When the records were built.
    pub created_at: DateTime<Utc>,
    /// One record per folder, in folder order.
    pub records: Vec<ProjectedFolderRecord>,
}

impl CacheEntry {
    /// Create an entry at the current schema version.
    #[must_use]
    pub fn new(signature: FolderSignature, records: Vec<ProjectedFolderRecord>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            signature,
            created_at: Utc::now(),
            records,
        }
    }

    /// Whether this entry may be served for `signature`.
    #[must_use]
    pub fn is_valid_for(&self, signature: &FolderSignature) -> bool {
        self.version == SCHEMA_VERSION && self.signature == *signature
    }
}
