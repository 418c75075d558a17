//! Scanner module for AO2 character folders.
//!
//! This module provides functionality for:
//! - Enumerating character folders under the configured base folders
//! - Reading `char.ini` emote definitions
//! - Resolving preview assets and readme files with ordered policy tables
//! - Reading integrity reports left behind by the external verifier
//! - Projecting each folder into a display-ready record
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`folders`]: Folder enumeration (the source of [`FolderDescriptor`]s)
//! - [`char_ini`]: `char.ini` parsing
//! - [`assets`]: Visual asset resolution order
//! - [`readme`]: Readme candidate rules and config-likeness sniffing
//! - [`integrity`]: Integrity report reader
//! - [`projection`]: The per-folder projection builder
//!
//! # Example
//!
//! ```no_run
//! use ao2vis::scanner::{enumerate_folders, ProjectionBuilder, ProjectionConfig};
//! use std::collections::BTreeMap;
//! use std::path::PathBuf;
//!
//! let folders = enumerate_folders(&[PathBuf::from("base")], &BTreeMap::new());
//! let builder = ProjectionBuilder::new(ProjectionConfig::default());
//! for record in builder.build(&folders, None) {
//!     println!("{}: {} emotes", record.name, record.emote_count);
//! }
//! ```

pub mod assets;
pub mod char_ini;
pub mod folders;
pub mod integrity;
pub mod projection;
pub mod readme;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use assets::{resolve_emote_preview, resolve_visual, VISUAL_PREFIXES, VISUAL_SUFFIXES};
pub use char_ini::{CharIni, CHAR_INI};
pub use folders::{enumerate_folders, find_by_name, is_character_folder, CHAR_ICON};
pub use integrity::{IntegrityReport, INTEGRITY_REPORT};
pub use projection::{ProjectionBuilder, ProjectionConfig};
pub use readme::{find_readme, ReadmePolicy};

/// One character folder as supplied by the folder enumerator.
///
/// The descriptor only carries what is already known in memory; everything
/// that requires touching the disk lives in the projected record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDescriptor {
    /// Character name (the folder name)
    pub name: String,
    /// Absolute path to the character folder
    pub directory: PathBuf,
    /// Path to `char_icon.png`, empty when the folder has none
    pub icon_path: PathBuf,
    /// Emote id chosen by the user as the preview, if any
    pub preview_override: Option<u32>,
}

impl FolderDescriptor {
    /// Create a descriptor without icon or preview override.
    #[must_use]
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            icon_path: PathBuf::new(),
            preview_override: None,
        }
    }

    /// Set the icon path.
    #[must_use]
    pub fn with_icon(mut self, icon_path: impl Into<PathBuf>) -> Self {
        self.icon_path = icon_path.into();
        self
    }

    /// Set the preview override emote id.
    #[must_use]
    pub fn with_preview_override(mut self, emote_id: Option<u32>) -> Self {
        self.preview_override = emote_id;
        self
    }

    /// Path to this folder's `char.ini` (may not exist).
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        char_ini::locate(&self.directory).unwrap_or_else(|| self.directory.join(CHAR_INI))
    }
}

/// Errors that can occur while reading a single character folder.
///
/// These never escape the projection builder; they are logged and the
/// affected field falls back to its default.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// A config or report file could not be parsed.
    #[error("Malformed file {path}: {message}")]
    Malformed {
        /// File that failed to parse
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}
