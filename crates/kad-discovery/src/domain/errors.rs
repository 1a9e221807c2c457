//! Domain errors for peer discovery.

use thiserror::Error;

/// Errors that can occur during peer discovery operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// Two peer ids of different byte widths were compared.
    #[error("peer id width mismatch: expected {expected} bytes, got {actual}")]
    InvalidIdWidth { expected: usize, actual: usize },

    /// Lookup fan-out must be at least one.
    #[error("alpha must be a positive integer")]
    InvalidAlpha,

    /// A received datagram could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The transport failed to send or receive.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Bootstrap was requested with no bootstrap addresses and no known peers.
    #[error("no bootstrap peers configured")]
    NoBootstrapPeers,

    /// Configuration values are unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Errors from network operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Operation timed out waiting for response
    #[error("network operation timed out")]
    Timeout,
    /// Remote peer refused connection
    #[error("connection refused by peer")]
    ConnectionRefused,
    /// Invalid socket address
    #[error("invalid socket address")]
    InvalidAddress,
    /// Message exceeds maximum allowed size
    #[error("message exceeds maximum size")]
    MessageTooLarge,
    /// The transport has been shut down.
    #[error("transport closed")]
    Closed,
    /// Any other I/O failure.
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for NetworkError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => Self::Timeout,
            std::io::ErrorKind::ConnectionRefused => Self::ConnectionRefused,
            std::io::ErrorKind::InvalidInput => Self::InvalidAddress,
            _ => Self::Io(e.to_string()),
        }
    }
}

/// Errors raised while decoding wire messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("bad magic bytes")]
    BadMagic,
    #[error("unknown message type 0x{0:02x}")]
    UnknownType(u8),
    #[error("message truncated: needed {needed} bytes, had {available}")]
    Truncated { needed: usize, available: usize },
    #[error("unsupported address family {0}")]
    BadAddressFamily(u8),
    #[error("peer id width {actual} does not match network width {expected}")]
    WidthMismatch { expected: usize, actual: usize },
    #[error("too many peers in one message: {0}")]
    TooManyPeers(usize),
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),
}
