//! Interval algebra over IPv4 and IPv6 address space.
//!
//! - [`flexrange`] - integer intervals, range sets and payload records
//! - [`models`] - addresses, blocks, ranges, lists and dual-family groups
//! - [`processing`] - range to CIDR conversion, group compare and translation
//! - [`route`] - longest prefix match tables with recursive next hops
//! - [`input`] / [`output`] - route files and CSV/terminal rendering for the binary

pub mod config;
pub mod error;
pub mod flexrange;
pub mod input;
pub mod models;
pub mod output;
pub mod processing;
pub mod route;

pub use error::{AlgebraError, Result};
