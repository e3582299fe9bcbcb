use std::time::{Duration, Instant};

use hashbrown::HashSet;
use tessera_chunk::ChunkCoord;

/// Chunks whose visible state changed since the last delivered notification.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub chunks: Vec<ChunkCoord>,
    /// Set when a direct edit asked to skip the debounce window.
    pub immediate: bool,
}

/// Coalesces change notifications. Ordinary notifications fire once `debounce`
/// has passed without a new one; immediate ones fire on the next poll.
#[derive(Debug)]
pub struct ChangeNotifier {
    debounce: Duration,
    pending: Vec<ChunkCoord>,
    seen: HashSet<ChunkCoord>,
    last: Option<Instant>,
    immediate: bool,
}

impl ChangeNotifier {
    pub fn new(debounce: Duration) -> Self {
        Self { debounce, pending: Vec::new(), seen: HashSet::new(), last: None, immediate: false }
    }

    fn push(&mut self, chunks: impl IntoIterator<Item = ChunkCoord>) {
        for c in chunks {
            if self.seen.insert(c) {
                self.pending.push(c);
            }
        }
    }

    pub fn notify(&mut self, chunks: impl IntoIterator<Item = ChunkCoord>, now: Instant) {
        self.push(chunks);
        self.last = Some(now);
    }

    pub fn notify_immediate(&mut self, chunks: impl IntoIterator<Item = ChunkCoord>, now: Instant) {
        self.notify(chunks, now);
        self.immediate = true;
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn poll(&mut self, now: Instant) -> Option<ChangeSet> {
        if self.pending.is_empty() {
            return None;
        }
        let quiet = self.last.is_none_or(|t| now.saturating_duration_since(t) >= self.debounce);
        if !self.immediate && !quiet {
            return None;
        }
        self.seen.clear();
        self.last = None;
        let immediate = std::mem::take(&mut self.immediate);
        Some(ChangeSet { chunks: std::mem::take(&mut self.pending), immediate })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn bursts_coalesce_until_quiet() {
        let t0 = Instant::now();
        let mut n = ChangeNotifier::new(50 * MS);
        n.notify([ChunkCoord::new(0, 0)], t0);
        n.notify([ChunkCoord::new(1, 0), ChunkCoord::new(0, 0)], t0 + 30 * MS);
        assert!(n.poll(t0 + 60 * MS).is_none());
        let set = n.poll(t0 + 80 * MS).unwrap();
        assert_eq!(set.chunks, vec![ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]);
        assert!(!set.immediate);
        assert!(n.poll(t0 + 200 * MS).is_none());
    }

    #[test]
    fn immediate_skips_the_window() {
        let t0 = Instant::now();
        let mut n = ChangeNotifier::new(50 * MS);
        n.notify([ChunkCoord::new(2, 2)], t0);
        n.notify_immediate([ChunkCoord::new(3, 3)], t0 + MS);
        let set = n.poll(t0 + MS).unwrap();
        assert!(set.immediate);
        assert_eq!(set.chunks.len(), 2);
        assert!(!n.has_pending());
    }
}
