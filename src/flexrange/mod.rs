//! Interval algebra over arbitrary-precision integers.
//!
//! This module contains the integer layer everything else is built on:
//! - [`Relation`] - geometric relation between two intervals
//! - [`Entry`] - closed interval with optional payload, and its split/match primitives
//! - [`DataRange`] - sorted set of disjoint, non-adjacent intervals
//! - [`EntryList`] - non-merging interval list for match results
//! - [`DataRangePair`] - product of two sets with three-way comparison
//! - [`Payload`] and [`PayloadRegistry`] - tagged payload records

mod data_range;
mod entry;
mod entry_list;
mod pair;
mod payload;
mod relation;

pub use data_range::{DataRange, DataRangeSeed};
pub use entry::{Entry, Split};
pub use entry_list::EntryList;
pub use pair::{compare_pairs, DataRangePair, PairCmp};
pub use payload::{DataRangeRecord, Decoder, EntryRecord, ExtendData, Payload, PayloadRegistry};
pub use relation::{MatchState, Relation};
