use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::{DiscoveryError, NetworkError, PeerId};
use crate::ports::Transport;
use crate::service::KademliaDiscovery;

impl<T: Transport> KademliaDiscovery<T> {
    /// Keep the routing table healthy.
    ///
    /// Looks up our own id (neighbours) and a random id (a far bucket).
    /// Returns how many distinct responsive peers the two lookups found.
    pub async fn refresh(&self) -> Result<usize, DiscoveryError> {
        let near = self.lookup(self.local.id.clone()).await?;
        let random = PeerId::random(self.config.id_width);
        let far = self.lookup(random.clone()).await?;

        let mut found: Vec<PeerId> = near.into_iter().chain(far).map(|p| p.id).collect();
        found.sort();
        found.dedup();
        debug!(
            random = %random,
            found = found.len(),
            known = self.routing_table.read().len(),
            "routing table refreshed"
        );
        Ok(found.len())
    }
}

impl<T: Transport + 'static> KademliaDiscovery<T> {
    /// Serve the node until `shutdown` flips to `true` or the transport closes.
    ///
    /// Every received datagram is decoded and handled in turn; malformed
    /// datagrams are logged and skipped. A background task refreshes the
    /// routing table every `refresh_interval`. On exit the refresher is
    /// stopped and in-flight requests fail with `NetworkError::Closed`.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let refresher = tokio::spawn(Arc::clone(&self).refresh_loop(shutdown.clone()));
        info!(
            local = %self.local.id,
            address = %self.local.address,
            known = self.routing_table.read().len(),
            "discovery running"
        );

        if !*shutdown.borrow() {
            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    received = self.transport.recv() => match received {
                        Ok((from, bytes)) => {
                            if let Err(e) = self.handle_datagram(from, &bytes).await {
                                debug!(%from, len = bytes.len(), error = %e, "dropping datagram");
                            }
                        }
                        Err(NetworkError::Closed) => break,
                        Err(e) => warn!(error = %e, "receive failed"),
                    },
                }
            }
        }

        refresher.abort();
        self.fail_pending();
        info!(local = %self.local.id, "discovery stopped");
    }

    async fn refresh_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let period = self.config.refresh_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh().await {
                        warn!(error = %e, "refresh failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}
