//! # kad-discovery Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | XOR distance (256-bit) | < 100ns |
//! | Closest 20 of 5000 known peers | < 1ms |
//! | Finder drain of 2000 candidates | < 1ms |

use criterion::{criterion_group, criterion_main};
use kad_tests::benchmarks::lookup::register_benchmarks;

criterion_group!(benches, register_benchmarks);
criterion_main!(benches);
