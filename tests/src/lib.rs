//! # kad-discovery Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # criterion benchmarks for the lookup primitives
//! │   └── lookup.rs
//! │
//! └── integration/      # multi-node flows
//!     ├── cluster.rs    # in-memory network clusters
//!     └── udp.rs        # real sockets on loopback
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p kad-tests
//!
//! # With logs
//! RUST_LOG=kad_discovery=debug cargo test -p kad-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p kad-tests
//! ```

pub mod benchmarks;
pub mod integration;
