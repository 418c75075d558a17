//! Per-folder projection builder.
//!
//! # Overview
//!
//! Turns each [`FolderDescriptor`] into a [`ProjectedFolderRecord`]. This is
//! the expensive step of the visualizer: it stats files, walks the whole
//! folder for its size, reads `char.ini`, sniffs readme candidates and loads
//! the integrity report.
//!
//! Every field degrades independently. A missing `char.ini` gives zero emotes
//! and the folder's own mtime; an unreadable file counts as zero bytes; a
//! broken report reads as no report. The builder never drops a folder.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use walkdir::WalkDir;

use super::assets::resolve_emote_preview;
use super::char_ini::{self, CharIni};
use super::integrity::IntegrityReport;
use super::readme::{find_readme, ReadmePolicy};
use super::FolderDescriptor;
use crate::cache::ProjectedFolderRecord;
use crate::progress::{ProgressCallback, PROJECT_PHASE};

/// Emote shown as preview when the user has not picked one.
const DEFAULT_PREVIEW_EMOTE: u32 = 1;

/// Configuration for the projection builder.
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Number of folders projected in parallel.
    pub io_threads: usize,
    /// Report progress every this many folders.
    pub progress_interval: usize,
    /// Readme detection tunables.
    pub readme: ReadmePolicy,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            progress_interval: 24,
            readme: ReadmePolicy::default(),
        }
    }
}

impl ProjectionConfig {
    /// Set the number of parallel workers.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the progress reporting interval.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Set the readme policy.
    #[must_use]
    pub fn with_readme_policy(mut self, policy: ReadmePolicy) -> Self {
        self.readme = policy;
        self
    }
}

/// Builds display records for character folders.
#[derive(Debug, Default)]
pub struct ProjectionBuilder {
    config: ProjectionConfig,
    projected: AtomicUsize,
    builds: AtomicUsize,
}

impl ProjectionBuilder {
    /// Create a builder.
    #[must_use]
    pub fn new(config: ProjectionConfig) -> Self {
        Self {
            config,
            projected: AtomicUsize::new(0),
            builds: AtomicUsize::new(0),
        }
    }

    /// Builder configuration.
    #[must_use]
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Total number of folders projected by this builder so far.
    #[must_use]
    pub fn projected_count(&self) -> usize {
        self.projected.load(Ordering::SeqCst)
    }

    /// Number of full-list builds run by this builder so far.
    #[must_use]
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Project every folder, preserving input order.
    ///
    /// Returns exactly one record per folder.
    pub fn build(
        &self,
        folders: &[FolderDescriptor],
        progress: Option<&dyn ProgressCallback>,
    ) -> Vec<ProjectedFolderRecord> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let total = folders.len();
        log::info!("Projecting {} character folders", total);
        if let Some(callback) = progress {
            callback.on_phase_start(PROJECT_PHASE, total);
        }

        let done = AtomicUsize::new(0);
        let interval = self.config.progress_interval.max(1);
        let project_one = |folder: &FolderDescriptor| {
            let record = self.project(folder);
            let current = done.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(callback) = progress {
                if current % interval == 0 || current == total {
                    callback.on_progress(current, &folder.name);
                }
            }
            record
        };

        let records: Vec<ProjectedFolderRecord> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads.max(1))
            .build()
        {
            Ok(pool) => pool.install(|| folders.par_iter().map(project_one).collect()),
            Err(e) => {
                log::warn!("Failed to create projection thread pool, scanning serially: {}", e);
                folders.iter().map(project_one).collect()
            }
        };

        if let Some(callback) = progress {
            callback.on_phase_end(PROJECT_PHASE);
        }
        records
    }

    /// Project a single folder.
    pub fn project(&self, folder: &FolderDescriptor) -> ProjectedFolderRecord {
        self.projected.fetch_add(1, Ordering::SeqCst);
        let dir = folder.directory.as_path();
        let mut record = ProjectedFolderRecord::empty(&folder.name, dir);
        record.icon_path = folder.icon_path.clone();

        let config_path = char_ini::locate(dir);
        let ini = config_path.as_deref().and_then(|path| match CharIni::load(path) {
            Ok(ini) => Some(ini),
            Err(e) => {
                log::debug!("Unreadable char.ini for {}: {}", folder.name, e);
                None
            }
        });

        record.last_modified = last_modified(config_path.as_deref(), dir);
        record.config_path = config_path.unwrap_or_default();
        record.emote_count = ini.as_ref().map_or(0, |ini| ini.emote_count);
        record.size_bytes = directory_size(dir);
        record.readme_path = find_readme(dir, &self.config.readme);
        record.preview_path = preview_path(folder, ini.as_ref());

        match IntegrityReport::load(dir) {
            Ok(report) => record.apply_integrity(report.as_ref()),
            Err(e) => log::debug!("Ignoring integrity report for {}: {}", folder.name, e),
        }

        log::trace!(
            "Projected {}: {} emotes, {} bytes",
            record.name,
            record.emote_count,
            record.size_bytes
        );
        record
    }
}

/// Preview image: chosen emote, else the first emote, else the icon.
pub(crate) fn preview_path(folder: &FolderDescriptor, ini: Option<&CharIni>) -> PathBuf {
    let emote = folder.preview_override.unwrap_or(DEFAULT_PREVIEW_EMOTE);
    ini.and_then(|ini| resolve_emote_preview(&folder.directory, ini, emote))
        .unwrap_or_else(|| folder.icon_path.clone())
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn last_modified(config_path: Option<&Path>, dir: &Path) -> DateTime<Utc> {
    config_path
        .and_then(modified)
        .or_else(|| modified(dir))
        .map_or(DateTime::<Utc>::UNIX_EPOCH, DateTime::<Utc>::from)
}

/// Total size of all files under `dir`. Unreadable entries count as 0 bytes.
#[must_use]
pub fn directory_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::trace!("Skipping unreadable entry while sizing {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.metadata().map_or(0, |m| m.len()))
        .sum()
}
