//! Address objects and collections of them.
//!
//! - [`address`] helpers project addresses onto integers and apply masks
//! - [`IpNet`] - block with a prefix or an arbitrary mask
//! - [`IpRange`] - contiguous `start-end` range
//! - [`Network`] - either of the two, behind the [`AddressSet`] trait
//! - [`NetworkList`] and [`NetworkGroup`] - single-family and mixed-family collections

mod address;
mod ipnet;
mod iprange;
mod network;
mod network_group;
mod network_list;

// Re-export public types
pub use address::{
    apply_mask, from_integer, mask_from_prefix, max_value, parse_address, prefix_of_mask,
    to_integer, width, AddressType, IpFamily, IPV4_WIDTH, IPV6_WIDTH,
};
pub use ipnet::IpNet;
pub use iprange::{Hosts, IpRange};
pub use network::{in_same_network, AddressSet, Network};
pub use network_group::{MatchOptions, NetworkGroup};
pub use network_list::{Aggregated, NetworkList, NetworkListCmp};
