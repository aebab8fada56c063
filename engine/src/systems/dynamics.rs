//! Per-tick dynamics for a slice of projectiles.
//!
//! Runs on worker threads. A job only touches its own slice and, once at the
//! end, the shared [`VisitedChunks`] set; it never queries the world, which is
//! not thread-safe. Loaded-ness of the visited chunks is checked later on the
//! primary thread when the hitbox index is built.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::physics::ballistics::ProjectileRecord;
use crate::physics::types::ChunkCoord;

/// Default padding, in blocks, around each projectile's swept segment when
/// collecting chunks to gather hitboxes from.
pub const DEFAULT_HITBOX_SEARCH_MARGIN: f32 = 8.0;

/// Chunks near any projectile path this tick, shared by all dynamics jobs.
#[derive(Debug, Default)]
pub struct VisitedChunks {
    chunks: Mutex<HashSet<ChunkCoord>>,
}

impl VisitedChunks {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chunks: Mutex::new(HashSet::with_capacity(capacity)),
        }
    }

    /// Merge a job's local set. The set is only ever extended, so a poisoned
    /// lock is recovered.
    pub fn merge(&self, local: HashSet<ChunkCoord>) {
        let mut chunks = self.chunks.lock().unwrap_or_else(PoisonError::into_inner);
        if chunks.is_empty() {
            *chunks = local;
        } else {
            chunks.extend(local);
        }
    }

    pub fn insert(&self, chunk: ChunkCoord) {
        self.chunks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(chunk);
    }

    /// Copy of the current contents, for when a late job still holds a handle.
    pub fn snapshot(&self) -> HashSet<ChunkCoord> {
        self.chunks.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn into_inner(self) -> HashSet<ChunkCoord> {
        self.chunks.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.chunks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Advance each record by one tick and collect the chunks its segment sweeps,
/// padded by `margin` blocks.
pub fn integrate_slice(records: &mut [ProjectileRecord], margin: f32, visited: &mut HashSet<ChunkCoord>) {
    for record in records.iter_mut() {
        record.integrate_tick();
        visited.extend(record.swept_chunks(margin));
    }
}

/// Slice length used when splitting `count` projectiles over `workers`
/// threads: `1 + count / workers`, so every projectile is covered.
pub fn slice_len(count: usize, workers: usize) -> usize {
    1 + count / workers.max(1)
}
