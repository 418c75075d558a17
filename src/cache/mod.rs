//! Two-tier cache for projected character folders.
//!
//! Projecting a character library touches every folder on disk, so results
//! are kept in memory for the life of the process and in a JSON file between
//! runs.
//!
//! # Architecture
//!
//! * [`signature`]: Structural fingerprint of the folder list.
//! * [`entry`]: Projected records and the versioned entry that holds them.
//! * [`disk`]: Checksummed, atomically written cache file per environment.
//! * [`memory`]: Single-slot in-process cache.
//!
//! # Cache Invalidation
//!
//! An entry is served only when:
//! * Its schema version equals [`SCHEMA_VERSION`]
//! * Its signature equals the signature of the current folder list
//! * (Disk only) its checksum matches its contents
//!
//! Anything else is discarded wholesale and the folders are projected again.

pub mod disk;
pub mod entry;
pub mod memory;
pub mod signature;

pub use disk::{CacheError, DiskCache, EnvironmentId};
pub use entry::{CacheEntry, ProjectedFolderRecord, SCHEMA_VERSION};
pub use memory::{MemoryCache, Records};
pub use signature::FolderSignature;
