//! JSON-backed disk cache with integrity envelope.
//!
//! The file holds `{ "checksum": "<sha256>", "entry": CacheEntry }`. A file is
//! only served when the checksum, schema version and folder signature all
//! match; anything else reads as a miss. Writes go to a temporary file in the
//! same directory which is then persisted over the target, so a failed write
//! never clobbers the previous valid file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use super::entry::{CacheEntry, ProjectedFolderRecord, SCHEMA_VERSION};
use super::signature::FolderSignature;

/// Prefix of cache file names.
const FILE_PREFIX: &str = "visualizer-";

/// Errors raised by the disk cache.
///
/// The orchestrator treats all of them as a miss or a skipped save.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while accessing the cache file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The cache file is not valid JSON for the current format.
    #[error("Failed to parse cache file {path}: {source}")]
    Parse {
        /// Cache file path
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the entry failed.
    #[error("Failed to serialize cache entry: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The stored checksum does not match the entry.
    #[error("Cache integrity check failed: checksum mismatch in {0}")]
    ChecksumMismatch(PathBuf),

    /// The file was written by a different schema version.
    #[error("Unsupported cache version {found}, expected {expected}")]
    VersionMismatch {
        /// Version found in the file
        found: u32,
        /// Version this build understands
        expected: u32,
    },

    /// The file was built for a different folder list.
    #[error("Cache signature mismatch")]
    SignatureMismatch,
}

/// Identity of an environment (config file plus base folder list).
///
/// Each environment gets its own cache file, so switching configuration
/// never serves another environment's records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvironmentId(String);

impl EnvironmentId {
    /// Derive the identity from the config path and the mounted base folders.
    #[must_use]
    pub fn derive(config_path: Option<&Path>, base_folders: &[PathBuf]) -> Self {
        let mut hasher = Sha256::new();
        let config = config_path.map_or(&[][..], |p| p.as_os_str().as_encoded_bytes());
        hasher.update((config.len() as u64).to_le_bytes());
        hasher.update(config);
        for base in base_folders {
            let base = base.as_os_str().as_encoded_bytes();
            hasher.update((base.len() as u64).to_le_bytes());
            hasher.update(base);
        }
        let digest = format!("{:x}", hasher.finalize());
        Self(digest[..16].to_string())
    }

    /// Short hex form used in file names.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cache file name for this environment.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{FILE_PREFIX}{}.json", self.0)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    checksum: String,
    entry: &'a CacheEntry,
}

#[derive(Deserialize)]
struct Envelope {
    checksum: String,
    entry: CacheEntry,
}

fn checksum_of(entry: &CacheEntry) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(entry)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Disk tier of the visualizer cache.
#[derive(Debug)]
pub struct DiskCache {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl DiskCache {
    /// Cache for an environment inside `cache_dir`.
    #[must_use]
    pub fn new(cache_dir: &Path, environment: &EnvironmentId) -> Self {
        Self::at(cache_dir.join(environment.file_name()))
    }

    /// Cache stored at an explicit file path.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored entry if it is valid for `signature`.
    ///
    /// Missing, unreadable, corrupt, outdated or mismatched files all yield
    /// `None`.
    #[must_use]
    pub fn try_load(&self, signature: &FolderSignature) -> Option<CacheEntry> {
        match self.load(signature) {
            Ok(entry) => Some(entry),
            Err(CacheError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::debug!("No disk cache at {}", self.path.display());
                None
            }
            Err(e) => {
                log::debug!("Ignoring disk cache: {}", e);
                None
            }
        }
    }

    /// Load the stored entry, reporting why it was rejected.
    pub fn load(&self, signature: &FolderSignature) -> Result<CacheEntry, CacheError> {
        let entry = self.load_unchecked()?;
        if entry.version != SCHEMA_VERSION {
            return Err(CacheError::VersionMismatch {
                found: entry.version,
                expected: SCHEMA_VERSION,
            });
        }
        if entry.signature != *signature {
            return Err(CacheError::SignatureMismatch);
        }
        Ok(entry)
    }

    /// Load the stored entry after the checksum check, ignoring version and
    /// signature.
    pub fn load_unchecked(&self) -> Result<CacheEntry, CacheError> {
        let content = fs::read_to_string(&self.path).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })?;
        let envelope: Envelope =
            serde_json::from_str(&content).map_err(|source| CacheError::Parse {
                path: self.path.clone(),
                source,
            })?;
        let calculated = checksum_of(&envelope.entry).map_err(CacheError::Serialize)?;
        if calculated != envelope.checksum {
            return Err(CacheError::ChecksumMismatch(self.path.clone()));
        }
        Ok(envelope.entry)
    }

    /// Save records for `signature`, logging and swallowing failures.
    ///
    /// Returns whether the file was written.
    pub fn save(&self, signature: &FolderSignature, records: &[ProjectedFolderRecord]) -> bool {
        let entry = CacheEntry::new(*signature, records.to_vec());
        match self.write_entry(&entry) {
            Ok(()) => {
                log::debug!(
                    "Saved {} records to disk cache {}",
                    records.len(),
                    self.path.display()
                );
                true
            }
            Err(e) => {
                log::warn!("Failed to save disk cache: {}", e);
                false
            }
        }
    }

    /// Write an entry atomically.
    pub fn write_entry(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let checksum = checksum_of(entry).map_err(CacheError::Serialize)?;
        let json = serde_json::to_vec(&EnvelopeRef { checksum, entry })
            .map_err(CacheError::Serialize)?;

        let io_err = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        // One writer at a time; the last persist wins.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        fs::create_dir_all(&parent).map_err(io_err)?;
        let mut tmp = NamedTempFile::new_in(&parent).map_err(io_err)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// Delete the cache file. Idempotent; failures are logged.
    pub fn invalidate(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed disk cache {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove disk cache {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
