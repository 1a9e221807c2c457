//! Iterative lookup state machine.
//!
//! A [`Finder`] does no I/O. The caller asks it for the next batch of peers
//! to query ([`Finder::find_peer`]), contacts them however it likes, and
//! feeds whatever comes back into [`Finder::add_peer`]. The lookup is over
//! when `find_peer` returns an empty batch.
//!
//! ```rust
//! use kad_discovery::{Finder, Peer, PeerId};
//!
//! let addr = "127.0.0.1:7000".parse().unwrap();
//! let target = PeerId::from([0x00u8]);
//! let a = Peer::new(PeerId::from([0x09u8]), addr);
//! let b = Peer::new(PeerId::from([0x03u8]), addr);
//! let c = Peer::new(PeerId::from([0x07u8]), addr);
//!
//! let mut finder = Finder::new(target, vec![a.clone(), b.clone(), c.clone()], 2).unwrap();
//! assert_eq!(finder.find_peer(), vec![b.clone(), c]);
//!
//! let d = Peer::new(PeerId::from([0x01u8]), addr);
//! assert_eq!(finder.add_peer(vec![d.clone(), b]).unwrap(), 1);
//! assert_eq!(finder.find_peer(), vec![d, a]);
//! ```

use tracing::trace;

use crate::domain::{
    ensure_same_width, xor_distance, Candidate, ClosestPeers, ContactedSet, DiscoveryError, Peer,
    PeerId,
};

/// Lifecycle of one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupState {
    /// Seeded, no batch handed out yet.
    Initialized,
    /// Batches are being handed out.
    Active,
    /// Every known candidate has been handed out.
    Exhausted,
    /// Cancelled by the caller. Terminal.
    Stopped,
}

/// Per-lookup state: target, fan-out, candidates and dedup set.
///
/// Not meant to be shared between tasks; one task drives one `Finder`.
#[derive(Debug)]
pub struct Finder {
    target: PeerId,
    alpha: usize,
    closest: ClosestPeers,
    contacted: ContactedSet,
    queried: Vec<Candidate>,
    state: LookupState,
}

impl Finder {
    /// Seed a lookup for `target` with `initial_peers`.
    ///
    /// Fails with `InvalidAlpha` for `alpha == 0` and with `InvalidIdWidth`
    /// if any initial peer's id width differs from the target's.
    pub fn new(
        target: PeerId,
        initial_peers: Vec<Peer>,
        alpha: usize,
    ) -> Result<Self, DiscoveryError> {
        if alpha == 0 {
            return Err(DiscoveryError::InvalidAlpha);
        }
        let mut finder = Self {
            target,
            alpha,
            closest: ClosestPeers::new(),
            contacted: ContactedSet::new(),
            queried: Vec::new(),
            state: LookupState::Initialized,
        };
        finder.admit(initial_peers)?;
        Ok(finder)
    }

    /// Pop up to `alpha` nearest candidates not yet handed out.
    ///
    /// Returns an empty batch when nothing is left to query, and always after
    /// [`stop`](Self::stop).
    pub fn find_peer(&mut self) -> Vec<Peer> {
        if self.state == LookupState::Stopped {
            return Vec::new();
        }

        let batch = self.closest.pop_nearest(self.alpha);
        if batch.is_empty() {
            self.state = LookupState::Exhausted;
            trace!(target_id = %self.target, queried = self.queried.len(), "lookup exhausted");
            return Vec::new();
        }

        self.state = LookupState::Active;
        let peers = batch.iter().map(|c| c.peer.clone()).collect();
        self.queried.extend(batch);
        peers
    }

    /// Merge peers learned from a response. Returns how many were new.
    ///
    /// Peers already seen in this lookup are ignored. The whole batch is
    /// width-checked before anything is admitted. After `stop()` responses
    /// are dropped.
    pub fn add_peer(&mut self, peers: Vec<Peer>) -> Result<usize, DiscoveryError> {
        if self.state == LookupState::Stopped {
            trace!(target_id = %self.target, dropped = peers.len(), "response after stop");
            return Ok(0);
        }
        let admitted = self.admit(peers)?;
        if admitted > 0 && self.state == LookupState::Exhausted {
            self.state = LookupState::Active;
        }
        Ok(admitted)
    }

    /// Cancel the lookup and release its state. Idempotent.
    pub fn stop(&mut self) {
        if self.state == LookupState::Stopped {
            return;
        }
        self.closest.clear();
        self.contacted.clear();
        self.queried.clear();
        self.state = LookupState::Stopped;
    }

    fn admit(&mut self, peers: Vec<Peer>) -> Result<usize, DiscoveryError> {
        for peer in &peers {
            ensure_same_width(&self.target, &peer.id)?;
        }

        let mut admitted = 0;
        for peer in peers {
            if !self.contacted.mark_and_check(&peer.id) {
                continue;
            }
            let distance = xor_distance(&peer.id, &self.target)?;
            self.closest.push(distance, peer);
            admitted += 1;
        }
        Ok(admitted)
    }

    pub fn target(&self) -> &PeerId {
        &self.target
    }

    pub fn alpha(&self) -> usize {
        self.alpha
    }

    pub fn state(&self) -> LookupState {
        self.state
    }

    /// Candidates not yet handed out.
    pub fn pending(&self) -> usize {
        self.closest.len()
    }

    pub fn contacted_count(&self) -> usize {
        self.contacted.len()
    }

    /// Peers handed out so far, nearest first, at most `count`.
    pub fn closest_queried(&self, count: usize) -> Vec<Peer> {
        let mut queried: Vec<&Candidate> = self.queried.iter().collect();
        queried.sort();
        queried
            .into_iter()
            .take(count)
            .map(|c| c.peer.clone())
            .collect()
    }
}
