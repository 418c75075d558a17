//! `char.ini` reader.
//!
//! AO2 stores emotes in the `[Emotions]` section:
//!
//! ```ini
//! [Emotions]
//! number=2
//! 1=Normal#-#normal#0#1
//! 2=Point#point_pre#point#1#1
//! ```
//!
//! Each value is `comment#preanim#anim#modifier#deskmod`. Only the emote count
//! and the idle animation names are needed here.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ini::{Ini, ParseOption};

use super::ScanError;

/// Canonical name of the character config file.
pub const CHAR_INI: &str = "char.ini";

const EMOTIONS_SECTION: &str = "Emotions";
const ANIM_FIELD: usize = 2;

/// Parsed subset of a `char.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharIni {
    /// Declared emote count (`[Emotions] number`), or the number of emote
    /// entries when the declaration is missing or unparsable.
    pub emote_count: u32,
    /// Idle animation name per emote id. Ids are taken as written, so a
    /// sparse or huge id costs one entry.
    pub emote_anims: BTreeMap<u32, String>,
}

impl CharIni {
    /// Parse `char.ini` contents.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ScanError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let opt = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, opt).map_err(|e| ScanError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let Some(section) = ini.section(Some(EMOTIONS_SECTION)) else {
            return Ok(Self::default());
        };

        let emote_anims: BTreeMap<u32, String> = section
            .iter()
            .filter_map(|(key, value)| {
                let id = key.trim().parse::<u32>().ok().filter(|id| *id >= 1)?;
                let anim = value
                    .split('#')
                    .nth(ANIM_FIELD)
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default();
                Some((id, anim))
            })
            .collect();

        let declared = section
            .get("number")
            .and_then(|n| n.trim().parse::<u32>().ok());
        let emote_count = declared.unwrap_or(emote_anims.len() as u32);

        Ok(Self {
            emote_count,
            emote_anims,
        })
    }

    /// Read and parse a `char.ini` file.
    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let bytes = fs::read(path).map_err(|e| ScanError::io(path, e))?;
        Self::parse(&String::from_utf8_lossy(&bytes), path)
    }

    /// Idle animation name for an emote id (1-based).
    #[must_use]
    pub fn anim_for(&self, emote_id: u32) -> Option<&str> {
        self.emote_anims
            .get(&emote_id)
            .map(String::as_str)
            .filter(|anim| !anim.is_empty() && *anim != "-")
    }
}

/// Find the `char.ini` in a folder, matching the name case-insensitively.
pub(crate) fn locate(dir: &Path) -> Option<PathBuf> {
    let exact = dir.join(CHAR_INI);
    if exact.is_file() {
        return Some(exact);
    }
    fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .find(|entry| {
            entry.file_name().to_string_lossy().eq_ignore_ascii_case(CHAR_INI)
                && entry.file_type().is_ok_and(|t| t.is_file())
        })
        .map(|entry| entry.path())
}
