//! Routing table built on the interval layer.
//!
//! - [`Hop`] and [`NextHop`] - forwarding decisions, stored as interval payloads
//! - [`AddressTable`] - longest prefix match table with a separate default route
//! - [`MatchResult`] - matched and unmatched fragments of a lookup
//!
//! Recursive next hops are resolved by [`AddressTable::resolve_recursion`].

mod hop;
mod recursion;
mod result;
mod table;

// Re-export public types
pub use hop::{next_hop_registry, Hop, NextHop, NEXT_HOP_TAG};
pub use result::{MatchResult, RouteRow};
pub use table::{AddressTable, AddressTableRecord, BucketRecord};
