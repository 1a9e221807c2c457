//! # Adapters
//!
//! - `codec` - Binary wire format for PING / PONG / FIND_NODE / NODES
//! - `StaticConfigProvider` - Hardcoded configuration
//! - `UdpTransport` - tokio UDP transport (requires "network" feature)
//! - `TomlConfigProvider` - Config file loading (requires "network" feature)

pub mod codec;
pub mod config;
pub mod transport;

pub use codec::{Message, MessageBody, MessageType, MAGIC, MAX_NODES_PER_MESSAGE};
pub use config::StaticConfigProvider;

#[cfg(feature = "network")]
pub use config::{ConfigError, TomlConfigProvider};

#[cfg(feature = "network")]
pub use transport::{UdpTransport, MAX_DATAGRAM_SIZE};
