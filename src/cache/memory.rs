//! Process-lifetime memory tier.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::entry::ProjectedFolderRecord;
use super::signature::FolderSignature;

/// Shared, immutable list of records handed out by the caches.
pub type Records = Arc<Vec<ProjectedFolderRecord>>;

#[derive(Debug)]
struct Slot {
    ticket: u64,
    signature: FolderSignature,
    records: Records,
}

/// Single-slot cache of the last projection.
///
/// Each write carries the ticket of the request that produced it. A write
/// with an older ticket than the one in the slot is rejected, so a slow
/// lookup can never overwrite the result of a newer forced rebuild.
#[derive(Debug, Default)]
pub struct MemoryCache {
    slot: Mutex<Option<Slot>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Slot>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records for `signature`, if the slot holds them.
    #[must_use]
    pub fn get(&self, signature: &FolderSignature) -> Option<Records> {
        self.lock()
            .as_ref()
            .filter(|slot| slot.signature == *signature)
            .map(|slot| Arc::clone(&slot.records))
    }

    /// Store records unconditionally.
    pub fn set(&self, signature: FolderSignature, records: Records) {
        let mut slot = self.lock();
        let ticket = slot.as_ref().map_or(0, |s| s.ticket);
        *slot = Some(Slot {
            ticket,
            signature,
            records,
        });
    }

    /// Store records if `ticket` is not older than the current occupant.
    ///
    /// Returns whether the slot was updated.
    pub fn set_if_newer(&self, ticket: u64, signature: FolderSignature, records: Records) -> bool {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|s| s.ticket > ticket) {
            log::debug!("Dropping stale memory cache write (ticket {})", ticket);
            return false;
        }
        *slot = Some(Slot {
            ticket,
            signature,
            records,
        });
        true
    }

    /// Whatever the slot holds, regardless of signature.
    #[must_use]
    pub fn current(&self) -> Option<(FolderSignature, Records)> {
        self.lock()
            .as_ref()
            .map(|slot| (slot.signature, Arc::clone(&slot.records)))
    }

    /// Signature of the cached records, if any.
    #[must_use]
    pub fn signature(&self) -> Option<FolderSignature> {
        self.lock().as_ref().map(|slot| slot.signature)
    }

    /// Empty the slot.
    pub fn clear(&self) {
        *self.lock() = None;
    }
}
