//! Algorithms built on the interval layer.
//!
//! - [`cidr`] - range to CIDR decomposition and supernets
//! - [`compare`] - three-way comparison of mixed-family groups
//! - [`translate`] - NAT style address substitution

mod cidr;
mod compare;
mod translate;

// Re-export public functions
pub use cidr::{cidr_to_range, range_to_cidrs, supernet};
pub use compare::{compare_groups, GroupCmp};
pub use translate::translate;

pub(crate) use cidr::{cidrs_of_bits, supernet_of_bits};
