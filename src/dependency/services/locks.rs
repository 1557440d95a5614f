//! Per-project commit locks.

use crate::dependency::domain::ProjectId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = Arc<Mutex<HashMap<ProjectId, Arc<AsyncMutex<()>>>>>;

/// Serialises the read-validate-write sequence of edge insertions per
/// project.
///
/// Holds no graph state: each entry is an empty async mutex that lives only
/// while some caller holds or awaits it. Clones share the same lock table.
#[derive(Debug, Clone, Default)]
pub struct ProjectLocks {
    locks: LockTable,
}

impl ProjectLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the project's edge set.
    ///
    /// The returned guard releases the lock when dropped.
    pub async fn acquire(&self, project_id: ProjectId) -> ProjectLockGuard {
        let lock = {
            // Entries are only inserted or pruned whole, so a poisoned table is still usable.
            let mut table = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(table.entry(project_id).or_default())
        };
        let guard = lock.lock_owned().await;
        ProjectLockGuard {
            guard: Some(guard),
            table: Arc::clone(&self.locks),
        }
    }

    /// Returns the number of projects currently locked or awaited.
    #[must_use]
    pub fn tracked_projects(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Exclusive hold on one project's commit lock.
///
/// Dropping the guard releases the lock and prunes every table entry that no
/// caller still holds or awaits.
#[derive(Debug)]
pub struct ProjectLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    table: LockTable,
}

impl Drop for ProjectLockGuard {
    fn drop(&mut self) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // Released under the table lock so no acquirer can clone the entry in between.
        drop(self.guard.take());
        // The table's own reference is the last one once nobody holds or awaits a lock.
        table.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}
