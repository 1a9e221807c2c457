//! # Benchmarks
//!
//! Lookup primitives under realistic table sizes.

pub mod lookup;
