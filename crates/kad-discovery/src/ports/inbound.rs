//! # Driving Ports (Inbound API)
//!
//! The API this subsystem exposes to the application node.

use async_trait::async_trait;

use crate::domain::{DiscoveryError, InsertOutcome, Peer, PeerId};

/// Primary API for interacting with peer discovery.
///
/// # Example
///
/// ```rust,ignore
/// use kad_discovery::ports::PeerDiscoveryApi;
///
/// async fn closest<T: PeerDiscoveryApi>(api: &T, target: PeerId) {
///     let peers = api.lookup(target).await?;
///     println!("Found {} peers", peers.len());
/// }
/// ```
#[async_trait]
pub trait PeerDiscoveryApi {
    /// Run an iterative lookup and return up to k peers nearest `target`.
    ///
    /// Unresponsive peers are skipped, not reported.
    async fn lookup(&self, target: PeerId) -> Result<Vec<Peer>, DiscoveryError>;

    /// Contact the bootstrap addresses and look ourselves up.
    ///
    /// Returns the number of known peers afterwards.
    async fn bootstrap(&self) -> Result<usize, DiscoveryError>;

    /// Snapshot of the routing table.
    fn known_peers(&self) -> Vec<Peer>;

    /// Offer a peer learned out of band.
    fn add_known_peer(&self, peer: Peer) -> Result<InsertOutcome, DiscoveryError>;

    /// Our own identity and address.
    fn local_peer(&self) -> &Peer;
}
