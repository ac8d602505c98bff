use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use worktrack_core::Work;

/// Handle returned by `track`, passed back to `untrack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkId(u64);

/// In-flight work: `id -> work`.
///
/// Many workers insert/remove concurrently; the sampler copies the current
/// members out with [`OutstandingSet::snapshot`] so no shard lock is held while
/// user code runs.
pub struct OutstandingSet<W> {
    items: DashMap<WorkId, Arc<W>>,
    seq: AtomicU64,
}

impl<W: Work> OutstandingSet<W> {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn insert(&self, work: Arc<W>) -> WorkId {
        let id = WorkId(self.seq.fetch_add(1, Ordering::Relaxed));
        self.items.insert(id, work);
        id
    }

    pub fn remove(&self, id: WorkId) -> Option<Arc<W>> {
        self.items.remove(&id).map(|(_, w)| w)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Copy of the current members, oldest first.
    pub fn snapshot(&self) -> Vec<Arc<W>> {
        let mut entries: Vec<(WorkId, Arc<W>)> = self
            .items
            .iter()
            .map(|e| (*e.key(), Arc::clone(e.value())))
            .collect();
        entries.sort_by_key(|(id, _)| *id);
        entries.into_iter().map(|(_, w)| w).collect()
    }
}

impl<W: Work> Default for OutstandingSet<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracked work that leaves the outstanding set when dropped.
///
/// Dropping covers early returns and unwinding, so a scoped track is always
/// matched by exactly one untrack.
pub struct Tracked<W: Work> {
    id: WorkId,
    work: Arc<W>,
    set: Arc<OutstandingSet<W>>,
}

impl<W: Work> Tracked<W> {
    pub(crate) fn new(id: WorkId, work: Arc<W>, set: Arc<OutstandingSet<W>>) -> Self {
        Self { id, work, set }
    }

    pub fn id(&self) -> WorkId {
        self.id
    }

    pub fn work(&self) -> &Arc<W> {
        &self.work
    }
}

impl<W: Work> Deref for Tracked<W> {
    type Target = W;

    fn deref(&self) -> &W {
        &self.work
    }
}

impl<W: Work> Drop for Tracked<W> {
    fn drop(&mut self) {
        self.set.remove(self.id);
    }
}
