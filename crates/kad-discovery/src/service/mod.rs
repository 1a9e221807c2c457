//! # Discovery Service
//!
//! `KademliaDiscovery` wires the domain `Finder` and `RoutingTable` to a
//! `Transport`: it answers PING / FIND_NODE, runs iterative lookups,
//! bootstraps from configured addresses and keeps the table fresh.
//!
//! Shared state sits behind `parking_lot` locks that are never held across
//! an `.await`; in-flight requests resolve through `oneshot` channels.

mod api;
mod core;
mod events;
mod lookup;
mod maintenance;

pub use core::KademliaDiscovery;
