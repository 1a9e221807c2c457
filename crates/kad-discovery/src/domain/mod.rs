//! Domain Layer - Pure lookup logic with no I/O
//!
//! - Peer identifiers and XOR distance
//! - Closest-peer set and contacted-set for one lookup
//! - The iterative lookup state machine (`Finder`)
//! - Routing table of known peers

pub mod candidates;
pub mod contacted;
pub mod distance;
pub mod entities;
pub mod errors;
pub mod finder;
pub mod routing_table;
pub mod value_objects;

pub use candidates::*;
pub use contacted::*;
pub use distance::*;
pub use entities::*;
pub use errors::*;
pub use finder::*;
pub use routing_table::*;
pub use value_objects::*;
