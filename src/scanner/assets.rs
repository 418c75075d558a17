//! Visual asset resolution order.
//!
//! AO2 looks up an emote animation by trying a fixed list of prefixes and
//! suffixes. The lists below are evaluated top to bottom; the first file that
//! exists wins. Prefixes are the outer loop, so an idle `.png` beats a plain
//! `.webp`.

use std::path::{Path, PathBuf};

use super::char_ini::CharIni;

/// Prefixes tried for an emote animation: idle, talking, then bare name.
pub const VISUAL_PREFIXES: &[&str] = &["(a)", "(b)", ""];

/// Image suffixes in the order the game client prefers them.
pub const VISUAL_SUFFIXES: &[&str] = &[".webp", ".apng", ".gif", ".png"];

/// Subfolder holding emote buttons.
const EMOTIONS_DIR: &str = "emotions";

/// Resolve an animation name inside a character folder.
///
/// Returns `None` when no candidate exists on disk.
#[must_use]
pub fn resolve_visual(dir: &Path, anim: &str) -> Option<PathBuf> {
    if anim.is_empty() {
        return None;
    }
    VISUAL_PREFIXES
        .iter()
        .flat_map(|prefix| {
            VISUAL_SUFFIXES
                .iter()
                .map(move |suffix| dir.join(format!("{prefix}{anim}{suffix}")))
        })
        .find(|candidate| candidate.is_file())
}

/// Resolve the preview image for an emote id.
///
/// Tries the emote's idle animation first, then its `emotions/button<id>_off.png`.
#[must_use]
pub fn resolve_emote_preview(dir: &Path, ini: &CharIni, emote_id: u32) -> Option<PathBuf> {
    if let Some(path) = ini.anim_for(emote_id).and_then(|anim| resolve_visual(dir, anim)) {
        return Some(path);
    }
    let button = dir
        .join(EMOTIONS_DIR)
        .join(format!("button{emote_id}_off.png"));
    button.is_file().then_some(button)
}
