//! Test utilities for peer discovery.
//!
//! An in-memory datagram network: every [`MemoryTransport`] handed out by a
//! [`MemoryNetwork`] gets a distinct loopback address and can reach every
//! other endpoint on the same network. Enable with the `test-utils` feature
//! flag.
//!
//! # Example
//!
//! ```rust
//! use kad_discovery::test_utils::MemoryNetwork;
//! use kad_discovery::Transport;
//!
//! # tokio_test_block_on(async {
//! let network = MemoryNetwork::new();
//! let a = network.endpoint();
//! let b = network.endpoint();
//!
//! a.send(b.local_addr(), b"hello").await.unwrap();
//! let (from, bytes) = b.recv().await.unwrap();
//! assert_eq!(from, a.local_addr());
//! assert_eq!(bytes, b"hello");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::trace;

use crate::domain::NetworkError;
use crate::ports::Transport;

type Datagram = (SocketAddr, Vec<u8>);

const FIRST_PORT: u16 = 10_000;

#[derive(Debug, Default)]
struct Registry {
    endpoints: HashMap<SocketAddr, mpsc::UnboundedSender<Datagram>>,
    unreachable: HashSet<SocketAddr>,
    next_port: u16,
}

/// Shared registry of in-memory endpoints.
///
/// Cloning yields another handle to the same network.
#[derive(Debug, Clone, Default)]
pub struct MemoryNetwork {
    registry: Arc<Mutex<Registry>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new endpoint on the next free `127.0.0.1` port.
    pub fn endpoint(&self) -> MemoryTransport {
        let addr = {
            let mut registry = self.registry.lock();
            let port = FIRST_PORT.wrapping_add(registry.next_port);
            registry.next_port = registry.next_port.wrapping_add(1);
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
        };
        self.endpoint_at(addr)
    }

    /// Register an endpoint at `addr`, replacing any earlier one there.
    pub fn endpoint_at(&self, addr: SocketAddr) -> MemoryTransport {
        let (tx, rx) = mpsc::unbounded_channel();
        self.registry.lock().endpoints.insert(addr, tx);
        MemoryTransport {
            addr,
            registry: Arc::clone(&self.registry),
            inbox: tokio::sync::Mutex::new(rx),
        }
    }

    /// Make `addr` silently drop everything it sends or would receive.
    ///
    /// Simulates a peer that never answers.
    pub fn set_unreachable(&self, addr: SocketAddr, unreachable: bool) {
        let mut registry = self.registry.lock();
        if unreachable {
            registry.unreachable.insert(addr);
        } else {
            registry.unreachable.remove(&addr);
        }
    }

    /// Deregister `addr`. Its pending `recv` ends with `NetworkError::Closed`
    /// once queued datagrams are drained.
    pub fn close(&self, addr: SocketAddr) {
        self.registry.lock().endpoints.remove(&addr);
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.registry.lock().endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One endpoint on a [`MemoryNetwork`].
///
/// Delivery is in order and lossless unless either side is unreachable.
/// Datagrams to unknown addresses vanish, as with UDP.
#[derive(Debug)]
pub struct MemoryTransport {
    addr: SocketAddr,
    registry: Arc<Mutex<Registry>>,
    inbox: tokio::sync::Mutex<mpsc::UnboundedReceiver<Datagram>>,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, to: SocketAddr, payload: &[u8]) -> Result<(), NetworkError> {
        let registry = self.registry.lock();
        if !registry.endpoints.contains_key(&self.addr) {
            return Err(NetworkError::Closed);
        }
        if registry.unreachable.contains(&self.addr) || registry.unreachable.contains(&to) {
            trace!(from = %self.addr, %to, len = payload.len(), "memory datagram dropped");
            return Ok(());
        }
        match registry.endpoints.get(&to) {
            Some(tx) => {
                // receiver gone behaves like a closed port
                let _ = tx.send((self.addr, payload.to_vec()));
            }
            None => trace!(from = %self.addr, %to, "no endpoint at address"),
        }
        Ok(())
    }

    async fn recv(&self) -> Result<(SocketAddr, Vec<u8>), NetworkError> {
        self.inbox.lock().await.recv().await.ok_or(NetworkError::Closed)
    }

    fn local_addr(&self) -> SocketAddr {
        self.addr
    }
}
