//! Folder visualizer: cached projection of a character library.
//!
//! This module ties the [`crate::cache`] tiers to the
//! [`crate::scanner::ProjectionBuilder`]:
//!
//! - [`orchestrator`]: memory → disk → rebuild, invalidation, record patching
//! - [`pending`]: background requests and liveness-guarded delivery
//!
//! # Example
//!
//! ```no_run
//! use ao2vis::cache::{DiskCache, MemoryCache};
//! use ao2vis::scanner::{FolderDescriptor, ProjectionBuilder, ProjectionConfig};
//! use ao2vis::visualizer::CacheOrchestrator;
//! use std::sync::Arc;
//!
//! let orchestrator = CacheOrchestrator::new(
//!     Arc::new(MemoryCache::new()),
//!     Some(DiskCache::at("/tmp/ao2vis/visualizer.json")),
//!     ProjectionBuilder::new(ProjectionConfig::default()),
//! );
//! let folders = vec![FolderDescriptor::new("Phoenix", "/ao2/base/characters/Phoenix")];
//! let outcome = orchestrator.get_or_build(&folders, false);
//! println!("{} records from {:?}", outcome.records.len(), outcome.source);
//! ```

pub mod orchestrator;
pub mod pending;

pub use orchestrator::{CacheLookup, CacheOrchestrator, CacheOutcome, CacheSource};
pub use pending::{Delivery, PendingBuild};

/// Errors surfaced by background visualizer requests.
///
/// Cache and per-folder failures never show up here; they degrade to a
/// slower load or to default field values.
#[derive(Debug, thiserror::Error)]
pub enum VisualizerError {
    /// The projection panicked. This is a bug, not a file-system condition.
    #[error("Folder projection panicked: {0}")]
    BuildPanicked(String),

    /// The background thread could not be started.
    #[error("Failed to start background rebuild: {0}")]
    Spawn(#[source] std::io::Error),

    /// The outcome was already taken from this handle.
    #[error("Result of this request was already taken")]
    AlreadyTaken,
}
