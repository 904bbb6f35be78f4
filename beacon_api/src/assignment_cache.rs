use core::{future::Future, num::NonZeroUsize};
use std::sync::Arc;

use anyhow::Result;
use futures::lock::Mutex;
use log::{debug, warn};
use lru::LruCache;
use types::{assignments::EpochAssignments, primitives::Epoch};

/// Memoizes [`EpochAssignments`] by epoch.
///
/// A single lock covers lookup, computation and insertion.
/// Concurrent misses are serialized even when they are for different epochs,
/// so an epoch is never computed twice.
pub struct AssignmentCache {
    entries: Mutex<LruCache<Epoch, Arc<EpochAssignments>>>,
}

impl AssignmentCache {
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns cached assignments for `epoch` or computes them with `compute`.
    ///
    /// Errors are returned as is and nothing is cached.
    /// Assignments with an empty proposer or attester map are returned but not cached.
    pub async fn get_or_compute<F, Fut>(
        &self,
        epoch: Epoch,
        compute: F,
    ) -> Result<Arc<EpochAssignments>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<EpochAssignments>> + Send,
    {
        let mut entries = self.entries.lock().await;

        if let Some(assignments) = entries.get(&epoch) {
            return Ok(Arc::clone(assignments));
        }

        let assignments = Arc::new(compute().await?);

        if assignments.is_complete() {
            debug!("caching assignments for epoch {epoch}");
            entries.put(epoch, Arc::clone(&assignments));
        } else {
            warn!(
                "not caching incomplete assignments for epoch {epoch} \
                 ({} proposers, {} attesters)",
                assignments.proposer_assignments.len(),
                assignments.attester_assignments.len(),
            );
        }

        Ok(assignments)
    }

    #[cfg(test)]
    async fn contains(&self, epoch: Epoch) -> bool {
        self.entries.lock().await.contains(&epoch)
    }
}
