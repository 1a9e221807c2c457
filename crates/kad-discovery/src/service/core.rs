use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;
use tracing::trace;

use crate::adapters::codec::{Message, MessageBody};
use crate::domain::{DiscoveryError, KademliaConfig, NetworkError, Peer, PeerId, RoutingTable};
use crate::ports::{ConfigProvider, Transport};

/// A request waiting for its PONG / NODES.
pub(crate) struct PendingRequest {
    /// Address the request went to; answers from elsewhere are ignored.
    pub(crate) to: SocketAddr,
    pub(crate) reply: oneshot::Sender<Message>,
}

/// Removes a request's pending entry when dropped.
struct PendingGuard<'a> {
    pending: &'a Mutex<HashMap<u64, PendingRequest>>,
    request_id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.request_id);
    }
}

/// Kademlia discovery node.
///
/// Owns the routing table of known peers and the bootstrap list, and drives
/// one [`Finder`](crate::domain::Finder) per lookup over the transport `T`.
///
/// Shared behind an `Arc`: [`run`](Self::run) services incoming datagrams
/// while any number of tasks call [`lookup`](Self::lookup) concurrently.
/// Each lookup owns its own `Finder`.
///
/// # Example
///
/// ```rust,ignore
/// let transport = UdpTransport::bind("0.0.0.0:30303").await?;
/// let node = Arc::new(KademliaDiscovery::from_provider(
///     PeerId::random(32),
///     transport,
///     &TomlConfigProvider::load("discovery.toml")?,
/// )?);
/// let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
/// tokio::spawn(Arc::clone(&node).run(shutdown_rx));
/// node.bootstrap().await?;
/// ```
pub struct KademliaDiscovery<T: Transport> {
    pub(crate) local: Peer,
    pub(crate) config: KademliaConfig,
    pub(crate) bootstrap_nodes: Vec<SocketAddr>,
    pub(crate) routing_table: RwLock<RoutingTable>,
    pub(crate) pending: Mutex<HashMap<u64, PendingRequest>>,
    next_request_id: AtomicU64,
    pub(crate) transport: T,
}

impl<T: Transport> KademliaDiscovery<T> {
    /// Create a discovery node.
    ///
    /// # Errors
    ///
    /// Fails if `config` is invalid or `local_id` does not have
    /// `config.id_width` bytes.
    pub fn new(
        local_id: PeerId,
        transport: T,
        config: KademliaConfig,
        bootstrap_nodes: Vec<SocketAddr>,
    ) -> Result<Self, DiscoveryError> {
        config.validate()?;
        if local_id.width() != config.id_width {
            return Err(DiscoveryError::InvalidIdWidth {
                expected: config.id_width,
                actual: local_id.width(),
            });
        }

        let local = Peer::new(local_id.clone(), transport.local_addr());
        Ok(Self {
            local,
            routing_table: RwLock::new(RoutingTable::new(local_id, config.k)),
            config,
            bootstrap_nodes,
            pending: Mutex::new(HashMap::new()),
            next_request_id: AtomicU64::new(1),
            transport,
        })
    }

    /// Create a discovery node configured by `provider`.
    pub fn from_provider(
        local_id: PeerId,
        transport: T,
        provider: &dyn ConfigProvider,
    ) -> Result<Self, DiscoveryError> {
        Self::new(
            local_id,
            transport,
            provider.get_kademlia_config(),
            provider.get_bootstrap_nodes(),
        )
    }

    pub fn config(&self) -> &KademliaConfig {
        &self.config
    }

    pub fn bootstrap_nodes(&self) -> &[SocketAddr] {
        &self.bootstrap_nodes
    }

    /// Number of requests still waiting for an answer.
    pub fn pending_requests(&self) -> usize {
        self.pending.lock().len()
    }

    /// Encode and send without waiting for anything back.
    pub(crate) async fn send_message(
        &self,
        to: SocketAddr,
        request_id: u64,
        body: MessageBody,
    ) -> Result<(), DiscoveryError> {
        let message = Message::new(request_id, self.local.id.clone(), body);
        let bytes = message.encode()?;
        trace!(%to, request_id, kind = ?message.body.message_type(), "send");
        self.transport.send(to, &bytes).await?;
        Ok(())
    }

    /// Send a request and wait up to `request_timeout` for its answer.
    ///
    /// The pending entry is released however this future ends, including
    /// when the caller drops it mid-flight.
    pub(crate) async fn request(
        &self,
        to: SocketAddr,
        body: MessageBody,
    ) -> Result<Message, DiscoveryError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = oneshot::channel();
        self.pending
            .lock()
            .insert(request_id, PendingRequest { to, reply });
        let _guard = PendingGuard {
            pending: &self.pending,
            request_id,
        };

        self.send_message(to, request_id, body).await?;

        match tokio::time::timeout(self.config.request_timeout(), rx).await {
            Ok(Ok(message)) => Ok(message),
            // sender dropped: the node shut down
            Ok(Err(_)) => Err(NetworkError::Closed.into()),
            Err(_) => Err(NetworkError::Timeout.into()),
        }
    }
}
