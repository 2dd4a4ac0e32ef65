//! Plain ordered interval list, used where intervals must not merge.
//!
//! Routing matches produce fragments that carry different payloads side by side; an
//! [`EntryList`] keeps them as they are, in the order they were produced.

use super::data_range::DataRange;
use super::entry::Entry;
use crate::error::{AlgebraError, Result};
use itertools::Itertools;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryList<P = ()> {
    list: Vec<Entry<P>>,
    size: u32,
    base: BigUint,
}

impl<P: Clone> EntryList<P> {
    pub fn new(size: u32) -> Self {
        EntryList {
            list: Vec::new(),
            size,
            base: BigUint::zero(),
        }
    }

    /// Wrap already validated intervals without checking or merging them.
    pub fn from_entries(size: u32, entries: Vec<Entry<P>>) -> Self {
        EntryList {
            list: entries,
            size,
            base: BigUint::zero(),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn max_value(&self) -> BigUint {
        (BigUint::one() << self.size) - 1u32
    }

    /// Append one interval.
    pub fn push(&mut self, entry: Entry<P>) -> Result<()> {
        if entry.low() < &self.base || entry.high() > &self.max_value() {
            return Err(AlgebraError::invalid_range(
                entry.low(),
                entry.high(),
                "outside list domain",
            ));
        }
        self.list.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn entries(&self) -> &[Entry<P>] {
        &self.list
    }

    pub fn entries_mut(&mut self) -> &mut [Entry<P>] {
        &mut self.list
    }

    pub fn into_entries(self) -> Vec<Entry<P>> {
        self.list
    }

    pub fn count(&self) -> BigUint {
        self.list
            .iter()
            .fold(BigUint::zero(), |acc, e| acc + e.count())
    }

    /// Drop the first interval with exactly the bounds of `target`.
    pub fn remove<Q>(&mut self, target: &Entry<Q>) -> bool {
        match self
            .list
            .iter()
            .position(|e| e.low() == target.low() && e.high() == target.high())
        {
            Some(i) => {
                self.list.remove(i);
                true
            }
            None => false,
        }
    }

    /// Match every interval of this list against `other`.
    ///
    /// # Returns
    /// `(matched, unmatched)` lists, in the order the fragments were produced.
    pub fn match_result(&self, other: &DataRange<P>) -> Result<(EntryList<P>, EntryList<P>)> {
        if self.size != other.size() || &self.base != other.base() {
            return Err(AlgebraError::FamilyMismatch(
                format!("size={}", self.size),
                format!("size={}", other.size()),
            ));
        }
        let mut matched = EntryList::new(self.size);
        let mut unmatched = EntryList::new(self.size);
        for e in &self.list {
            let (m, u) = other.match_entry(e);
            matched.list.extend(m);
            unmatched.list.extend(u);
        }
        Ok((matched, unmatched))
    }

    /// Merge into a set. Payloads of merged fragments follow [`DataRange::push`].
    pub fn to_data_range(&self) -> Result<DataRange<P>> {
        DataRange::from_entries(self.size, self.base.clone(), &self.list)
    }
}

impl<P> fmt::Display for EntryList<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.list.iter().join(", "))
    }
}
