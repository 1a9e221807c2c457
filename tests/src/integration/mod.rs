//! # Integration Flows
//!
//! Several `KademliaDiscovery` nodes talking to each other, over the
//! in-memory network and over real UDP sockets.
//!
//! Set `RUST_LOG` (e.g. `kad_discovery=debug`) to see the nodes' logs.

pub mod cluster;
pub mod udp;

/// Install a test-writer subscriber once per test binary.
#[cfg(test)]
pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
