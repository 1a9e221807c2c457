//! # Driven Ports (Outbound SPI)
//!
//! Interfaces the host application provides to the discovery service.

use std::net::SocketAddr;

use async_trait::async_trait;

use crate::domain::{KademliaConfig, NetworkError};

/// Datagram transport carrying encoded discovery messages.
///
/// Direct UDP is provided by `UdpTransport` (feature `network`). A NAT
/// traversal layer would implement this same trait and hand the service
/// already-punched paths.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the service sends from lookup tasks
/// while the receive loop is blocked in [`recv`](Transport::recv).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one datagram to `to`.
    async fn send(&self, to: SocketAddr, payload: &[u8]) -> Result<(), NetworkError>;

    /// Wait for the next datagram.
    ///
    /// Returns `NetworkError::Closed` once the transport is shut down.
    async fn recv(&self) -> Result<(SocketAddr, Vec<u8>), NetworkError>;

    /// Address other peers should use to reach us.
    fn local_addr(&self) -> SocketAddr;
}

/// Abstract interface for configuration loading.
///
/// Allows different configuration sources (file, environment, etc.)
pub trait ConfigProvider: Send + Sync {
    /// Well-known addresses used to seed the first lookup.
    fn get_bootstrap_nodes(&self) -> Vec<SocketAddr>;

    /// Lookup parameters (id width, k, alpha, timeouts).
    fn get_kademlia_config(&self) -> KademliaConfig;
}
