//! Integrity report reader.
//!
//! The folder verifier runs separately and leaves a JSON report in each
//! character folder it checked. Only the failure flag and messages are read.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ScanError;

/// File name of the per-folder integrity report.
pub const INTEGRITY_REPORT: &str = "integrity_report.json";

/// Separator between failure messages in the summary text.
const SUMMARY_SEPARATOR: &str = "; ";

/// Integrity report as persisted by the verifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// Whether any check failed.
    #[serde(default)]
    pub has_failures: bool,
    /// One message per failed check.
    #[serde(default)]
    pub failures: Vec<String>,
}

impl IntegrityReport {
    /// Load the report from a character folder.
    ///
    /// Returns `Ok(None)` when the folder has no report.
    pub fn load(dir: &Path) -> Result<Option<Self>, ScanError> {
        let path = dir.join(INTEGRITY_REPORT);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ScanError::io(path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ScanError::Malformed {
                path,
                message: e.to_string(),
            })
    }

    /// Number of failed checks.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failures.len() as u32
    }

    /// Failure messages joined into one line, empty when there are none.
    #[must_use]
    pub fn summary(&self) -> String {
        self.failures.join(SUMMARY_SEPARATOR)
    }
}
