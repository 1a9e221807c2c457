//! Core domain entities: peer identifiers and peers.

use std::fmt;
use std::net::SocketAddr;

use rand::RngCore;

/// Fixed-width peer identifier.
///
/// The width is not encoded in the type so that identifiers of different
/// networks (160-bit, 256-bit, ...) share one representation. Distance math
/// between two ids of different widths is rejected with
/// [`DiscoveryError::InvalidIdWidth`](crate::domain::DiscoveryError::InvalidIdWidth).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(Box<[u8]>);

impl PeerId {
    /// Create a PeerId from raw bytes.
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self(bytes.into())
    }

    /// Generate a random PeerId of `width` bytes.
    pub fn random(width: usize) -> Self {
        let mut bytes = vec![0u8; width];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes.into_boxed_slice())
    }

    /// Create an all-zero PeerId of `width` bytes.
    pub fn zero(width: usize) -> Self {
        Self(vec![0u8; width].into_boxed_slice())
    }

    /// Width in bytes.
    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// Get the underlying big-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for PeerId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for PeerId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into_boxed_slice())
    }
}

impl<const N: usize> From<[u8; N]> for PeerId {
    fn from(bytes: [u8; N]) -> Self {
        Self(Box::new(bytes))
    }
}

impl fmt::Display for PeerId {
    /// Short hex prefix, enough to tell peers apart in logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter().take(8) {
            write!(f, "{:02x}", byte)?;
        }
        if self.0.len() > 8 {
            write!(f, "..")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self)
    }
}

/// A reachable peer: identifier plus network address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Peer {
    /// Kademlia identifier.
    pub id: PeerId,
    /// Address the peer answers on.
    pub address: SocketAddr,
}

impl Peer {
    pub fn new(id: PeerId, address: SocketAddr) -> Self {
        Self { id, address }
    }
}
