use std::collections::HashSet;
use std::net::SocketAddr;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::adapters::codec::MessageBody;
use crate::domain::{ensure_same_width, DiscoveryError, Finder, Peer, PeerId};
use crate::ports::Transport;
use crate::service::KademliaDiscovery;

impl<T: Transport> KademliaDiscovery<T> {
    /// Iterative lookup: the k responsive peers nearest `target`.
    ///
    /// Each round queries the `alpha` nearest unqueried candidates in
    /// parallel. A peer that times out or fails contributes nothing, and is
    /// dropped from the routing table if we know it at that same address.
    /// The lookup carries on with whatever answered. Ends when no candidates
    /// remain or after `max_lookup_rounds`.
    pub async fn lookup(&self, target: PeerId) -> Result<Vec<Peer>, DiscoveryError> {
        ensure_same_width(&self.local.id, &target)?;

        let seeds = self.routing_table.read().closest(&target, self.config.k)?;
        let mut finder = Finder::new(target.clone(), seeds, self.config.alpha)?;
        let mut responded: HashSet<PeerId> = HashSet::new();
        let mut rounds = 0;

        while rounds < self.config.max_lookup_rounds {
            let batch = finder.find_peer();
            if batch.is_empty() {
                break;
            }
            rounds += 1;

            let replies = join_all(batch.iter().map(|peer| self.find_node(peer, &target))).await;

            for (peer, reply) in batch.into_iter().zip(replies) {
                match reply {
                    Ok(learned) => {
                        responded.insert(peer.id);
                        let learned: Vec<Peer> = learned
                            .into_iter()
                            .filter(|p| p.id != self.local.id)
                            .collect();
                        finder.add_peer(learned)?;
                    }
                    Err(e) => {
                        debug!(peer = %peer.id, address = %peer.address, error = %e, "lookup query failed");
                        self.routing_table
                            .write()
                            .remove_if_address(&peer.id, peer.address);
                    }
                }
            }
        }

        if rounds == self.config.max_lookup_rounds && finder.pending() > 0 {
            warn!(target_id = %target, rounds, pending = finder.pending(), "lookup hit round limit");
        }

        let closest: Vec<Peer> = finder
            .closest_queried(usize::MAX)
            .into_iter()
            .filter(|p| responded.contains(&p.id))
            .take(self.config.k)
            .collect();
        debug!(
            target_id = %target,
            rounds,
            contacted = finder.contacted_count(),
            found = closest.len(),
            "lookup completed"
        );
        finder.stop();
        Ok(closest)
    }

    /// Ask `peer` for the peers it knows nearest `target`.
    async fn find_node(&self, peer: &Peer, target: &PeerId) -> Result<Vec<Peer>, DiscoveryError> {
        let reply = self
            .request(
                peer.address,
                MessageBody::FindNode {
                    target: target.clone(),
                },
            )
            .await?;

        match reply.body {
            MessageBody::Nodes { peers } => Ok(peers),
            other => {
                debug!(peer = %peer.id, kind = ?other.message_type(), "unexpected answer to FIND_NODE");
                Ok(Vec::new())
            }
        }
    }

    /// Ping `addr`; on success the responder is in the routing table.
    pub async fn ping(&self, addr: SocketAddr) -> Result<PeerId, DiscoveryError> {
        let reply = self.request(addr, MessageBody::Ping).await?;
        Ok(reply.sender)
    }

    /// Join the network through the configured bootstrap addresses.
    ///
    /// Pings every bootstrap address, then looks up our own id so nearby
    /// peers learn about us. Unreachable bootstrap peers are skipped.
    /// Returns the routing table size afterwards.
    pub async fn bootstrap(&self) -> Result<usize, DiscoveryError> {
        if self.bootstrap_nodes.is_empty() && self.routing_table.read().is_empty() {
            return Err(DiscoveryError::NoBootstrapPeers);
        }

        let pings = join_all(self.bootstrap_nodes.iter().map(|addr| self.ping(*addr))).await;
        let mut reached = 0;
        for (addr, result) in self.bootstrap_nodes.iter().zip(pings) {
            match result {
                Ok(id) => {
                    reached += 1;
                    debug!(%addr, peer = %id, "bootstrap peer answered");
                }
                Err(e) => warn!(%addr, error = %e, "bootstrap peer unreachable"),
            }
        }

        let found = self.lookup(self.local.id.clone()).await?;
        let known = self.routing_table.read().len();
        info!(
            reached,
            configured = self.bootstrap_nodes.len(),
            found = found.len(),
            known,
            "bootstrap complete"
        );
        Ok(known)
    }
}
