use async_trait::async_trait;

use crate::domain::{DiscoveryError, InsertOutcome, Peer, PeerId};
use crate::ports::{PeerDiscoveryApi, Transport};
use crate::service::KademliaDiscovery;

#[async_trait]
impl<T: Transport + 'static> PeerDiscoveryApi for KademliaDiscovery<T> {
    async fn lookup(&self, target: PeerId) -> Result<Vec<Peer>, DiscoveryError> {
        KademliaDiscovery::lookup(self, target).await
    }

    async fn bootstrap(&self) -> Result<usize, DiscoveryError> {
        KademliaDiscovery::bootstrap(self).await
    }

    fn known_peers(&self) -> Vec<Peer> {
        self.routing_table.read().peers()
    }

    fn add_known_peer(&self, peer: Peer) -> Result<InsertOutcome, DiscoveryError> {
        self.routing_table.write().insert(peer)
    }

    fn local_peer(&self) -> &Peer {
        &self.local
    }
}
