//! Closest-peer set: discovered peers ordered by distance to a lookup target.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::domain::{Distance, Peer};

/// A peer waiting to be queried, keyed by its distance to the target.
///
/// `seq` is the insertion counter of the owning [`ClosestPeers`]; on equal
/// distances the earlier insertion is popped first.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub distance: Distance,
    pub seq: u64,
    pub peer: Peer,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.seq == other.seq
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of candidates by ascending distance.
///
/// No size bound is enforced here; the lookup's contacted-set decides what
/// gets pushed.
#[derive(Debug, Default)]
pub struct ClosestPeers {
    heap: BinaryHeap<Reverse<Candidate>>,
    next_seq: u64,
}

impl ClosestPeers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a peer at `distance`. O(log n).
    pub fn push(&mut self, distance: Distance, peer: Peer) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Candidate {
            distance,
            seq,
            peer,
        }));
    }

    /// Remove and return up to `count` nearest candidates, nearest first.
    ///
    /// An empty result means the set is exhausted.
    pub fn pop_nearest(&mut self, count: usize) -> Vec<Candidate> {
        let mut out = Vec::with_capacity(count.min(self.heap.len()));
        while out.len() < count {
            match self.heap.pop() {
                Some(Reverse(candidate)) => out.push(candidate),
                None => break,
            }
        }
        out
    }

    /// Distance of the nearest remaining candidate.
    pub fn peek_distance(&self) -> Option<&Distance> {
        self.heap.peek().map(|Reverse(c)| &c.distance)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
