//! Readme detection for character folders.
//!
//! Character packs often ship a readme with credits, but the folder root also
//! holds ini files and assets with similar extensions. Detection is an ordered
//! rule table evaluated top to bottom, first match wins, followed by a content
//! sniff that rejects files that look like configuration.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::integrity::INTEGRITY_REPORT;

/// File names that are never a readme, compared case-insensitively.
pub const EXCLUDED_NAMES: &[&str] = &[
    "char.ini",
    "design.ini",
    "soundlist.ini",
    "iniswap.ini",
    INTEGRITY_REPORT,
];

/// Extensions of asset files that are never a readme.
pub const EXCLUDED_EXTENSIONS: &[&str] = &[
    "png", "gif", "webp", "apng", "jpg", "jpeg", "bmp", "opus", "ogg", "wav", "mp3",
];

/// Candidate rules in priority order.
pub const README_RULES: &[ReadmeRule] = &[
    ReadmeRule::StemIsReadme,
    ReadmeRule::StemContainsReadme,
    ReadmeRule::TextExtension,
];

/// Upper bound on bytes read while sniffing a candidate.
const SNIFF_BYTES: u64 = 64 * 1024;

static SECTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]+\]$").expect("valid section regex"));
static KEY_VALUE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s=\[#;]+\s*=").expect("valid key=value regex"));

/// One readme candidate rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadmeRule {
    /// File stem is exactly `readme` (any extension).
    StemIsReadme,
    /// File stem contains `readme`, e.g. `phoenix_readme.txt`.
    StemContainsReadme,
    /// Any `.txt` or `.md` file.
    TextExtension,
}

impl ReadmeRule {
    /// Whether a file name satisfies this rule.
    #[must_use]
    pub fn matches(self, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        let path = Path::new(&lower);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match self {
            Self::StemIsReadme => stem == "readme",
            Self::StemContainsReadme => stem.contains("readme"),
            Self::TextExtension => ext == "txt" || ext == "md",
        }
    }
}

/// Tunables for the config-likeness sniff.
///
/// The ratio has no documented origin and is exposed so it can be tuned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadmePolicy {
    /// Number of non-blank lines sampled from the top of the file.
    pub sample_lines: usize,
    /// A file is config-like when more than this share of sampled lines are.
    pub config_line_ratio: f64,
}

impl Default for ReadmePolicy {
    fn default() -> Self {
        Self {
            sample_lines: 40,
            config_line_ratio: 0.5,
        }
    }
}

impl ReadmePolicy {
    /// Whether text looks like an ini/config file rather than prose.
    #[must_use]
    pub fn looks_like_config(&self, text: &str) -> bool {
        let sampled: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(self.sample_lines)
            .collect();
        if sampled.is_empty() {
            return false;
        }
        let config_like = sampled
            .iter()
            .filter(|line| SECTION_LINE.is_match(line) || KEY_VALUE_LINE.is_match(line))
            .count();
        config_like as f64 > sampled.len() as f64 * self.config_line_ratio
    }

    fn file_looks_like_config(&self, path: &Path) -> bool {
        let mut buf = Vec::new();
        let read = File::open(path).and_then(|f| f.take(SNIFF_BYTES).read_to_end(&mut buf));
        match read {
            Ok(_) => self.looks_like_config(&String::from_utf8_lossy(&buf)),
            Err(e) => {
                log::debug!("Skipping unreadable readme candidate {}: {}", path.display(), e);
                true
            }
        }
    }
}

fn is_excluded(file_name: &str) -> bool {
    if EXCLUDED_NAMES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(file_name))
    {
        return true;
    }
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            EXCLUDED_EXTENSIONS
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(ext))
        })
}

/// Find the readme in a character folder root.
///
/// Returns `None` if the folder cannot be listed or no candidate survives.
#[must_use]
pub fn find_readme(dir: &Path, policy: &ReadmePolicy) -> Option<PathBuf> {
    let mut candidates: Vec<(String, PathBuf)> = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
        .filter(|(name, _)| !is_excluded(name))
        .collect();
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    README_RULES.iter().find_map(|rule| {
        candidates
            .iter()
            .filter(|(name, _)| rule.matches(name))
            .find(|(_, path)| !policy.file_looks_like_config(path))
            .map(|(_, path)| path.clone())
    })
}
