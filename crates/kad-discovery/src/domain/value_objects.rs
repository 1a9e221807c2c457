//! Value objects for peer discovery.

use std::time::Duration;

use crate::domain::DiscoveryError;

/// Configuration constants for Kademlia discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KademliaConfig {
    /// Peer id width in bytes (default: 32, i.e. 256-bit ids)
    pub id_width: usize,
    /// Bucket size and lookup result size (default: 20)
    pub k: usize,
    /// Parallelism factor for lookups (default: 3)
    pub alpha: usize,
    /// How long one FIND_NODE / PING waits for its answer (default: 2000ms).
    /// An unanswered request is treated as "nothing closer".
    pub request_timeout_ms: u64,
    /// Interval between self-lookups that keep the table fresh (default: 600s)
    pub refresh_interval_secs: u64,
    /// Hard cap on rounds per lookup (default: 20)
    pub max_lookup_rounds: usize,
}

impl Default for KademliaConfig {
    fn default() -> Self {
        Self {
            id_width: 32,
            k: 20,
            alpha: 3,
            request_timeout_ms: 2_000,
            refresh_interval_secs: 600,
            max_lookup_rounds: 20,
        }
    }
}

impl KademliaConfig {
    /// Create a config suitable for testing (smaller values)
    pub fn for_testing() -> Self {
        Self {
            id_width: 32,
            k: 4,
            alpha: 2,
            request_timeout_ms: 100,
            refresh_interval_secs: 1,
            max_lookup_rounds: 10,
        }
    }

    /// Reject values that would make lookups meaningless.
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if self.alpha == 0 {
            return Err(DiscoveryError::InvalidAlpha);
        }
        if self.k == 0 {
            return Err(DiscoveryError::Config("k must be positive".into()));
        }
        // a NODES reply carries at most 255 peers
        if self.k > usize::from(u8::MAX) {
            return Err(DiscoveryError::Config("k must be at most 255".into()));
        }
        if self.id_width == 0 {
            return Err(DiscoveryError::Config("id_width must be positive".into()));
        }
        if self.max_lookup_rounds == 0 {
            return Err(DiscoveryError::Config(
                "max_lookup_rounds must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
