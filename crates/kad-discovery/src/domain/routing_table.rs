//! Known-peer table: one k-bucket per id bit.
//!
//! Buckets are ordered least-recently-seen first. A full bucket keeps its
//! existing peers and turns the newcomer away; long-lived peers are the ones
//! most likely to stay online.

use std::net::SocketAddr;

use crate::domain::{bucket_index, ensure_same_width, xor_distance, DiscoveryError, Peer, PeerId};

/// What happened to a peer offered to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// New peer stored.
    Inserted,
    /// Already known; moved to the most-recently-seen end (address refreshed).
    Updated,
    /// Bucket at capacity; peer not stored.
    BucketFull,
    /// The local node itself; never stored.
    SelfPeer,
}

/// A k-bucket storing up to k peers at a specific distance range
#[derive(Debug, Clone, Default)]
pub struct KBucket {
    peers: Vec<Peer>,
}

impl KBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn is_full(&self, k: usize) -> bool {
        self.peers.len() >= k
    }

    /// Least recently seen peer.
    pub fn oldest_peer(&self) -> Option<&Peer> {
        self.peers.first()
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    fn position(&self, id: &PeerId) -> Option<usize> {
        self.peers.iter().position(|p| &p.id == id)
    }
}

/// Routing table of known peers for the local node.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    local_id: PeerId,
    k: usize,
    buckets: Vec<KBucket>,
}

impl RoutingTable {
    pub fn new(local_id: PeerId, k: usize) -> Self {
        let buckets = vec![KBucket::new(); local_id.width() * 8];
        Self {
            local_id,
            k,
            buckets,
        }
    }

    pub fn local_id(&self) -> &PeerId {
        &self.local_id
    }

    /// Offer a peer that was just heard from.
    pub fn insert(&mut self, peer: Peer) -> Result<InsertOutcome, DiscoveryError> {
        let index = match bucket_index(&self.local_id, &peer.id)? {
            Some(index) => index,
            None => return Ok(InsertOutcome::SelfPeer),
        };
        let k = self.k;
        let bucket = &mut self.buckets[index];

        if let Some(pos) = bucket.position(&peer.id) {
            bucket.peers.remove(pos);
            bucket.peers.push(peer);
            return Ok(InsertOutcome::Updated);
        }
        if bucket.is_full(k) {
            return Ok(InsertOutcome::BucketFull);
        }
        bucket.peers.push(peer);
        Ok(InsertOutcome::Inserted)
    }

    pub fn remove(&mut self, id: &PeerId) -> Option<Peer> {
        let index = bucket_index(&self.local_id, id).ok().flatten()?;
        let bucket = &mut self.buckets[index];
        bucket.position(id).map(|pos| bucket.peers.remove(pos))
    }

    /// Remove `id` only if it is stored at `address`.
    ///
    /// A failure to reach some other address claiming the same id says
    /// nothing about the entry we hold.
    pub fn remove_if_address(&mut self, id: &PeerId, address: SocketAddr) -> Option<Peer> {
        let index = bucket_index(&self.local_id, id).ok().flatten()?;
        let bucket = &mut self.buckets[index];
        let pos = bucket.position(id)?;
        if bucket.peers[pos].address != address {
            return None;
        }
        Some(bucket.peers.remove(pos))
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &PeerId) -> Option<&Peer> {
        let index = bucket_index(&self.local_id, id).ok().flatten()?;
        let bucket = &self.buckets[index];
        bucket.position(id).map(|pos| &bucket.peers[pos])
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(KBucket::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(KBucket::is_empty)
    }

    pub fn peers(&self) -> Vec<Peer> {
        self.buckets
            .iter()
            .flat_map(|b| b.peers().iter().cloned())
            .collect()
    }

    pub fn bucket(&self, index: usize) -> Option<&KBucket> {
        self.buckets.get(index)
    }

    /// Up to `count` known peers nearest to `target`, nearest first.
    pub fn closest(&self, target: &PeerId, count: usize) -> Result<Vec<Peer>, DiscoveryError> {
        ensure_same_width(&self.local_id, target)?;
        let mut all: Vec<_> = self
            .buckets
            .iter()
            .flat_map(|b| b.peers().iter())
            .map(|p| xor_distance(&p.id, target).map(|d| (d, p)))
            .collect::<Result<_, _>>()?;

        all.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(all.into_iter().take(count).map(|(_, p)| p.clone()).collect())
    }
}
