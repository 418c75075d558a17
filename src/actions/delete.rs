//! Moving character folders to the system trash.
//!
//! Only folders that still look like character folders (a directory holding
//! `char.ini`) are touched. The caller invalidates the visualizer cache after
//! a successful delete, since the folder list changed.
//!
//! # Example
//!
//! ```no_run
//! use ao2vis::actions::delete::delete_character_folder;
//! use std::path::Path;
//!
//! match delete_character_folder(Path::new("/ao2/base/characters/Phoenix")) {
//!     Ok(result) => println!("Trashed {} ({} bytes)", result.path.display(), result.size),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scanner::folders::is_character_folder;
use crate::scanner::projection::directory_size;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// The folder does not exist (may have been deleted or moved).
    #[error("folder not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when inspecting the folder.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path is not a character folder.
    #[error("not a character folder (no char.ini): {0}")]
    NotCharacterFolder(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Other I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) | Self::NotCharacterFolder(path) => {
                path
            }
            Self::TrashFailed { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Folder that was moved to the trash
    pub path: PathBuf,
    /// Bytes the folder occupied
    pub size: u64,
}

/// Move a character folder to the system trash.
pub fn delete_character_folder(path: &Path) -> Result<DeleteResult, DeleteError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
        _ => DeleteError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() || !is_character_folder(path) {
        return Err(DeleteError::NotCharacterFolder(path.to_path_buf()));
    }

    let size = directory_size(path);

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
    })
}
