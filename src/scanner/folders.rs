//! Character folder enumeration.
//!
//! AO2 mounts several base folders; characters live in
//! `<base>/characters/<name>/` and must contain a `char.ini`. When two base
//! folders define the same character, the one mounted first wins.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use super::{char_ini, FolderDescriptor};

/// Subfolder of a base folder that holds the characters.
pub const CHARACTERS_DIR: &str = "characters";

/// Icon file name inside a character folder.
pub const CHAR_ICON: &str = "char_icon.png";

/// List the character folders under the given base folders.
///
/// The result is sorted by lowercase name, then by exact name, so that the
/// folder signature only changes when the folder set does.
#[must_use]
pub fn enumerate_folders(
    base_folders: &[PathBuf],
    preview_overrides: &BTreeMap<String, u32>,
) -> Vec<FolderDescriptor> {
    let mut seen = HashSet::new();
    let mut folders = Vec::new();

    for base in base_folders {
        let characters = base.join(CHARACTERS_DIR);
        let entries = match fs::read_dir(&characters) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Skipping base folder {}: {}", characters.display(), e);
                continue;
            }
        };

        for entry in entries.filter_map(Result::ok) {
            if !entry.file_type().is_ok_and(|t| t.is_dir()) {
                continue;
            }
            let directory = entry.path();
            if char_ini::locate(&directory).is_none() {
                log::trace!("No char.ini in {}, skipping", directory.display());
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !seen.insert(name.to_lowercase()) {
                log::debug!(
                    "Character {} already provided by an earlier base folder",
                    name
                );
                continue;
            }
            folders.push(describe(name, directory, preview_overrides));
        }
    }

    folders.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    log::debug!("Enumerated {} character folders", folders.len());
    folders
}

fn describe(
    name: String,
    directory: PathBuf,
    preview_overrides: &BTreeMap<String, u32>,
) -> FolderDescriptor {
    let icon = directory.join(CHAR_ICON);
    let icon_path = if icon.is_file() { icon } else { PathBuf::new() };
    let preview_override = preview_overrides.get(&name).copied();
    FolderDescriptor {
        name,
        directory: absolute(directory),
        icon_path: absolute(icon_path),
        preview_override,
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.as_os_str().is_empty() || path.is_absolute() {
        return path;
    }
    std::path::absolute(&path).unwrap_or(path)
}

/// Find a character folder by name (case-insensitive).
#[must_use]
pub fn find_by_name<'a>(folders: &'a [FolderDescriptor], name: &str) -> Option<&'a FolderDescriptor> {
    folders
        .iter()
        .find(|folder| folder.name == name)
        .or_else(|| folders.iter().find(|folder| folder.name.eq_ignore_ascii_case(name)))
}

/// Whether a path is a character folder (contains a `char.ini`).
#[must_use]
pub fn is_character_folder(path: &Path) -> bool {
    path.is_dir() && char_ini::locate(path).is_some()
}
