//! # Kademlia Peer Discovery
//!
//! Iterative Kademlia lookups over a pluggable datagram transport.
//!
//! A lookup keeps the peers it knows ordered by XOR distance to the target,
//! queries the `alpha` nearest ones it has not contacted yet, merges what
//! they answer and repeats until nothing unqueried is left. [`Finder`] is
//! that loop as a pure state machine; [`KademliaDiscovery`] drives it over
//! a [`Transport`], answers other nodes' requests and keeps a k-bucket
//! [`RoutingTable`] of live peers.
//!
//! ## Features
//!
//! - `network` - UDP transport and TOML config loading (tokio net, toml)
//! - `test-utils` - In-memory network for deterministic tests
//!
//! ## Architecture
//!
//! - **Domain Layer:** XOR distance, closest-peer set, `Finder`, routing table
//! - **Ports Layer:** `PeerDiscoveryApi` (inbound), `Transport` and
//!   `ConfigProvider` (outbound)
//! - **Service Layer:** `KademliaDiscovery`
//! - **Adapters Layer:** wire codec, transports, config providers
//!
//! ## Example
//!
//! ```rust
//! use kad_discovery::{Finder, Peer, PeerId, LookupState};
//!
//! let addr = "10.0.0.1:30303".parse().unwrap();
//! let peers: Vec<Peer> = (1..=12u8)
//!     .map(|i| Peer::new(PeerId::from([i, 0]), addr))
//!     .collect();
//!
//! let mut finder = Finder::new(PeerId::from([0u8, 0]), peers, 5).unwrap();
//! assert_eq!(finder.find_peer().len(), 5);
//! assert_eq!(finder.find_peer().len(), 5);
//! assert_eq!(finder.find_peer().len(), 2);
//! assert!(finder.find_peer().is_empty());
//! assert_eq!(finder.state(), LookupState::Exhausted);
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// In-memory network (MemoryNetwork, MemoryTransport)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Domain
pub use domain::{
    bucket_index, ensure_same_width, xor_distance, Candidate, ClosestPeers, CodecError,
    ContactedSet, DiscoveryError, Distance, Finder, InsertOutcome, KBucket, KademliaConfig,
    LookupState, NetworkError, Peer, PeerId, RoutingTable,
};

// Ports
pub use ports::{ConfigProvider, PeerDiscoveryApi, Transport};

// Service
pub use service::KademliaDiscovery;

// Adapters
pub use adapters::{Message, MessageBody, MessageType, StaticConfigProvider};

#[cfg(feature = "network")]
pub use adapters::{ConfigError, TomlConfigProvider, UdpTransport};
