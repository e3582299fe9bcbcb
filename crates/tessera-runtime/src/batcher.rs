use std::collections::VecDeque;

use hashbrown::HashSet;
use tessera_chunk::ChunkCoord;

/// Work handed back by [`MutationBatcher::take_commit`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitPlan {
    /// Chunks to relight from scratch this commit (neighbors follow).
    pub relight: Vec<ChunkCoord>,
    /// Chunks written during the batch, in first-write order.
    pub modified: Vec<ChunkCoord>,
}

impl CommitPlan {
    pub fn is_empty(&self) -> bool {
        self.relight.is_empty() && self.modified.is_empty()
    }
}

/// Groups writes between `start_batch` and a commit.
///
/// The modified set belongs to one batch. The lighting-dirty queue outlives
/// batches: each commit takes at most `per_commit` chunks from its front.
#[derive(Debug)]
pub struct MutationBatcher {
    open: bool,
    per_commit: usize,
    modified: Vec<ChunkCoord>,
    modified_set: HashSet<ChunkCoord>,
    dirty: VecDeque<ChunkCoord>,
    dirty_set: HashSet<ChunkCoord>,
}

impl MutationBatcher {
    pub fn new(per_commit: usize) -> Self {
        Self {
            open: false,
            per_commit: per_commit.max(1),
            modified: Vec::new(),
            modified_set: HashSet::new(),
            dirty: VecDeque::new(),
            dirty_set: HashSet::new(),
        }
    }

    pub fn start_batch(&mut self) {
        self.open = true;
        self.modified.clear();
        self.modified_set.clear();
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mark_modified(&mut self, coord: ChunkCoord) -> bool {
        if !self.modified_set.insert(coord) {
            return false;
        }
        self.modified.push(coord);
        true
    }

    pub fn mark_lighting_dirty(&mut self, coord: ChunkCoord) -> bool {
        if !self.dirty_set.insert(coord) {
            return false;
        }
        self.dirty.push_back(coord);
        true
    }

    #[inline]
    pub fn is_lighting_dirty(&self, coord: ChunkCoord) -> bool {
        self.dirty_set.contains(&coord)
    }

    #[inline]
    pub fn pending_lighting(&self) -> usize {
        self.dirty.len()
    }

    #[inline]
    pub fn modified_count(&self) -> usize {
        self.modified.len()
    }

    /// Closes the batch. The plan carries every modified chunk and the next
    /// `per_commit` lighting-dirty chunks; the rest stay queued.
    pub fn take_commit(&mut self) -> CommitPlan {
        self.open = false;
        let n = self.per_commit.min(self.dirty.len());
        let relight: Vec<ChunkCoord> = self.dirty.drain(..n).collect();
        for c in &relight {
            self.dirty_set.remove(c);
        }
        self.modified_set.clear();
        CommitPlan { relight, modified: std::mem::take(&mut self.modified) }
    }

    /// Removes every trace of an evicted chunk.
    pub fn forget(&mut self, coord: ChunkCoord) {
        if self.modified_set.remove(&coord) {
            self.modified.retain(|c| *c != coord);
        }
        if self.dirty_set.remove(&coord) {
            self.dirty.retain(|c| *c != coord);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(cx: i32, cz: i32) -> ChunkCoord {
        ChunkCoord::new(cx, cz)
    }

    #[test]
    fn lighting_is_amortized_across_commits() {
        let mut b = MutationBatcher::new(1);
        b.start_batch();
        for i in 0..3 {
            b.mark_modified(c(i, 0));
            b.mark_lighting_dirty(c(i, 0));
        }
        let plan = b.take_commit();
        assert_eq!(plan.relight, vec![c(0, 0)]);
        assert_eq!(plan.modified, vec![c(0, 0), c(1, 0), c(2, 0)]);
        assert_eq!(b.pending_lighting(), 2);

        b.start_batch();
        assert_eq!(b.modified_count(), 0);
        let plan = b.take_commit();
        assert_eq!(plan.relight, vec![c(1, 0)]);
        assert!(plan.modified.is_empty());
        assert!(b.is_lighting_dirty(c(2, 0)));
    }

    #[test]
    fn marks_are_deduplicated() {
        let mut b = MutationBatcher::new(4);
        b.start_batch();
        assert!(b.mark_modified(c(1, 1)));
        assert!(!b.mark_modified(c(1, 1)));
        assert!(b.mark_lighting_dirty(c(1, 1)));
        assert!(!b.mark_lighting_dirty(c(1, 1)));
        assert_eq!(b.take_commit().relight.len(), 1);
        assert!(!b.is_open());
    }

    #[test]
    fn forget_drops_evicted_chunks() {
        let mut b = MutationBatcher::new(1);
        b.mark_lighting_dirty(c(0, 0));
        b.mark_lighting_dirty(c(5, 5));
        b.forget(c(0, 0));
        assert_eq!(b.take_commit().relight, vec![c(5, 5)]);
        assert_eq!(b.pending_lighting(), 0);
    }

    #[test]
    fn zero_per_commit_still_progresses() {
        let mut b = MutationBatcher::new(0);
        b.mark_lighting_dirty(c(0, 0));
        assert_eq!(b.take_commit().relight.len(), 1);
    }
}
