use std::collections::VecDeque;

use hashbrown::HashSet;
use tessera_chunk::BlockPos;

/// Insertion-ordered set of cells. Pushing a cell already present is a no-op.
#[derive(Clone, Debug, Default)]
pub struct Worklist {
    order: VecDeque<BlockPos>,
    members: HashSet<BlockPos>,
}

impl Worklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, p: BlockPos) -> bool {
        if self.members.insert(p) {
            self.order.push_back(p);
            true
        } else {
            false
        }
    }

    pub fn pop(&mut self) -> Option<BlockPos> {
        let p = self.order.pop_front()?;
        self.members.remove(&p);
        Some(p)
    }

    #[inline]
    pub fn contains(&self, p: BlockPos) -> bool {
        self.members.contains(&p)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Puts `self` ahead of everything in `later`, keeping first occurrences.
    pub fn append(&mut self, later: Worklist) {
        for p in later.order {
            self.push(p);
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&BlockPos) -> bool) {
        let members = &mut self.members;
        self.order.retain(|p| {
            let k = keep(p);
            if !k {
                members.remove(p);
            }
            k
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockPos> {
        self.order.iter()
    }
}
