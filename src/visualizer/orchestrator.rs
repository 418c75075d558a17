//! Cache orchestration: memory, then disk, then rebuild.
//!
//! # Overview
//!
//! [`CacheOrchestrator::get_or_build`] resolves the records for a folder list:
//! 1. **Signature**: fingerprint the ordered folder list
//! 2. **Memory**: serve the in-process slot if its signature matches
//! 3. **Disk**: serve the environment's cache file if valid, filling memory
//! 4. **Rebuild**: project every folder, then store to memory and disk
//!
//! Steps 2 and 3 are skipped when a rebuild is forced. Disk failures only
//! ever demote a request to the next tier.
//!
//! # Ordering
//!
//! Every request takes a ticket. Memory writes with an older ticket than the
//! slot's are dropped, and results of requests that started before the
//! latest forced request are reported as superseded, so a forced rebuild
//! always wins over a lookup that was already in flight.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::pending::PendingBuild;
use super::VisualizerError;
use crate::cache::{
    DiskCache, FolderSignature, MemoryCache, ProjectedFolderRecord, Records, SCHEMA_VERSION,
};
use crate::progress::ProgressCallback;
use crate::scanner::char_ini::{self, CharIni};
use crate::scanner::projection::preview_path;
use crate::scanner::{FolderDescriptor, IntegrityReport, ProjectionBuilder};

/// Which tier served a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// In-process slot.
    Memory,
    /// Cache file on disk.
    Disk,
    /// Freshly projected.
    Rebuilt,
}

impl CacheSource {
    /// Lowercase label used in output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Disk => "disk",
            Self::Rebuilt => "rebuilt",
        }
    }
}

/// Result of consulting the cache tiers.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    /// A tier held valid records.
    Hit {
        /// Tier that answered
        source: CacheSource,
        /// The cached records
        records: Records,
    },
    /// No tier could answer; a rebuild is needed.
    Miss,
}

/// Records resolved by the orchestrator.
#[derive(Debug, Clone)]
pub struct CacheOutcome {
    /// One record per folder, in folder order.
    pub records: Records,
    /// Tier that produced the records.
    pub source: CacheSource,
    /// Signature of the folder list.
    pub signature: FolderSignature,
    /// Ticket of the request that produced this outcome.
    pub ticket: u64,
}

/// Coordinates the memory cache, the disk cache and the projection builder.
pub struct CacheOrchestrator {
    memory: Arc<MemoryCache>,
    disk: Option<DiskCache>,
    builder: ProjectionBuilder,
    progress: Option<Arc<dyn ProgressCallback>>,
    next_ticket: AtomicU64,
    latest_forced: AtomicU64,
}

impl std::fmt::Debug for CacheOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheOrchestrator")
            .field("memory", &self.memory)
            .field("disk", &self.disk)
            .field("builder", &self.builder)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .field("next_ticket", &self.next_ticket)
            .field("latest_forced", &self.latest_forced)
            .finish()
    }
}

impl CacheOrchestrator {
    /// Create an orchestrator.
    ///
    /// Pass `None` for `disk` to run memory-only, e.g. when no cache
    /// directory could be determined.
    #[must_use]
    pub fn new(memory: Arc<MemoryCache>, disk: Option<DiskCache>, builder: ProjectionBuilder) -> Self {
        Self {
            memory,
            disk,
            builder,
            progress: None,
            next_ticket: AtomicU64::new(0),
            latest_forced: AtomicU64::new(0),
        }
    }

    /// Report rebuild progress to `callback`.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// The projection builder.
    #[must_use]
    pub fn builder(&self) -> &ProjectionBuilder {
        &self.builder
    }

    /// The memory tier.
    #[must_use]
    pub fn memory(&self) -> &MemoryCache {
        &self.memory
    }

    /// The disk tier, if enabled.
    #[must_use]
    pub fn disk(&self) -> Option<&DiskCache> {
        self.disk.as_ref()
    }

    /// Take a ticket for a new request.
    pub(crate) fn issue_ticket(&self, force_rebuild: bool) -> u64 {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        if force_rebuild {
            self.latest_forced.fetch_max(ticket, Ordering::SeqCst);
        }
        ticket
    }

    /// Whether a forced request started after `ticket`.
    #[must_use]
    pub fn is_superseded(&self, ticket: u64) -> bool {
        self.latest_forced.load(Ordering::SeqCst) > ticket
    }

    /// Consult memory, then disk, for `signature`.
    ///
    /// A disk hit is copied into memory.
    pub fn lookup(&self, signature: &FolderSignature) -> CacheLookup {
        let ticket = self.issue_ticket(false);
        self.lookup_ticketed(signature, ticket)
    }

    fn lookup_ticketed(&self, signature: &FolderSignature, ticket: u64) -> CacheLookup {
        if let Some(records) = self.memory.get(signature) {
            log::debug!("Memory cache hit ({} records)", records.len());
            return CacheLookup::Hit {
                source: CacheSource::Memory,
                records,
            };
        }

        if let Some(entry) = self.disk.as_ref().and_then(|disk| disk.try_load(signature)) {
            log::debug!("Disk cache hit ({} records)", entry.records.len());
            let records = Arc::new(entry.records);
            self.memory
                .set_if_newer(ticket, *signature, Arc::clone(&records));
            return CacheLookup::Hit {
                source: CacheSource::Disk,
                records,
            };
        }

        CacheLookup::Miss
    }

    /// Resolve records for `folders`, rebuilding on a miss or when forced.
    ///
    /// Runs on the calling thread. See [`Self::spawn_get_or_build`] for the
    /// background variant.
    pub fn get_or_build(&self, folders: &[FolderDescriptor], force_rebuild: bool) -> CacheOutcome {
        let ticket = self.issue_ticket(force_rebuild);
        self.resolve(folders, force_rebuild, ticket)
    }

    pub(crate) fn resolve(
        &self,
        folders: &[FolderDescriptor],
        force_rebuild: bool,
        ticket: u64,
    ) -> CacheOutcome {
        let signature = FolderSignature::compute(folders);

        if !force_rebuild {
            if let CacheLookup::Hit { source, records } = self.lookup_ticketed(&signature, ticket) {
                return CacheOutcome {
                    records,
                    source,
                    signature,
                    ticket,
                };
            }
        }

        let records = Arc::new(self.builder.build(folders, self.progress.as_deref()));
        if self
            .memory
            .set_if_newer(ticket, signature, Arc::clone(&records))
        {
            if let Some(disk) = &self.disk {
                disk.save(&signature, &records);
            }
        }
        log::info!("Rebuilt visualizer cache ({} folders)", records.len());

        CacheOutcome {
            records,
            source: CacheSource::Rebuilt,
            signature,
            ticket,
        }
    }

    /// Resolve records on a background thread.
    ///
    /// The calling thread keeps running and collects the result from the
    /// returned [`PendingBuild`].
    pub fn spawn_get_or_build(
        self: &Arc<Self>,
        folders: Vec<FolderDescriptor>,
        force_rebuild: bool,
    ) -> Result<PendingBuild, VisualizerError> {
        let ticket = self.issue_ticket(force_rebuild);
        let orchestrator = Arc::clone(self);
        let handle = std::thread::Builder::new()
            .name("ao2vis-rebuild".to_string())
            .spawn(move || orchestrator.resolve(&folders, force_rebuild, ticket))
            .map_err(VisualizerError::Spawn)?;
        Ok(PendingBuild::new(Arc::clone(self), ticket, handle))
    }

    /// Drop both cache tiers.
    pub fn invalidate(&self) {
        log::info!("Invalidating visualizer cache");
        self.memory.clear();
        if let Some(disk) = &self.disk {
            disk.invalidate();
        }
    }

    /// Recompute one folder's preview after its override changed.
    ///
    /// `folders` is the folder list *after* the change. The cached records are
    /// re-keyed under the new signature instead of being rebuilt. Returns the
    /// patched record, or `None` when nothing cached matches the folder list.
    pub fn patch_preview(
        &self,
        folders: &[FolderDescriptor],
        name: &str,
    ) -> Option<ProjectedFolderRecord> {
        let folder = folders.iter().find(|f| f.name == name)?;
        let ini = char_ini::locate(&folder.directory).and_then(|path| CharIni::load(&path).ok());
        let preview: PathBuf = preview_path(folder, ini.as_ref());
        self.patch_record(folders, name, |record| record.preview_path = preview)
    }

    /// Re-read one folder's integrity report into the cached records.
    pub fn patch_integrity(
        &self,
        folders: &[FolderDescriptor],
        name: &str,
    ) -> Option<ProjectedFolderRecord> {
        let folder = folders.iter().find(|f| f.name == name)?;
        let report = match IntegrityReport::load(&folder.directory) {
            Ok(report) => report,
            Err(e) => {
                log::debug!("Ignoring integrity report for {}: {}", name, e);
                None
            }
        };
        self.patch_record(folders, name, |record| record.apply_integrity(report.as_ref()))
    }

    /// Cached records laid out exactly like `folders`: memory first, then disk.
    fn cached_records(&self, folders: &[FolderDescriptor]) -> Option<Vec<ProjectedFolderRecord>> {
        if let Some((_, records)) = self.memory.current() {
            if aligned(&records, folders) {
                return Some(records.as_ref().clone());
            }
        }
        let entry = self.disk.as_ref()?.load_unchecked().ok()?;
        (entry.version == SCHEMA_VERSION && aligned(&entry.records, folders))
            .then_some(entry.records)
    }

    fn patch_record<F>(
        &self,
        folders: &[FolderDescriptor],
        name: &str,
        patch: F,
    ) -> Option<ProjectedFolderRecord>
    where
        F: FnOnce(&mut ProjectedFolderRecord),
    {
        let Some(mut records) = self.cached_records(folders) else {
            log::debug!("No cached records match the folder list, not patching {}", name);
            return None;
        };

        let record = records.iter_mut().find(|record| record.name == name)?;
        patch(record);
        let patched = record.clone();

        let signature = FolderSignature::compute(folders);
        let ticket = self.issue_ticket(false);
        let records = Arc::new(records);
        self.memory
            .set_if_newer(ticket, signature, Arc::clone(&records));
        if let Some(disk) = &self.disk {
            disk.save(&signature, &records);
        }
        log::debug!("Patched cached record for {}", name);
        Some(patched)
    }
}

/// Records line up one-to-one with the folder list.
fn aligned(records: &[ProjectedFolderRecord], folders: &[FolderDescriptor]) -> bool {
    records.len() == folders.len()
        && records.iter().zip(folders).all(|(record, folder)| {
            record.name == folder.name
                && record.directory == folder.directory
                && record.icon_path == folder.icon_path
        })
}
