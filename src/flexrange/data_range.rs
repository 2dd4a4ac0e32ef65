//! Ordered set of disjoint, non-adjacent intervals over `[base, 2^size - 1]`.
//!
//! Every mutation keeps the list sorted by `low` with a gap of at least one integer between
//! neighbours. Touching or overlapping inserts are merged into one interval; removals split.

use super::entry::{parse_decimal, Entry};
use super::payload::{DataRangeRecord, Payload, PayloadRegistry};
use super::relation::Relation;
use crate::error::{AlgebraError, Result};
use itertools::Itertools;
use log::trace;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::de::DeserializeSeed;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Interval set with an optional payload per interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRange<P = ()> {
    list: Vec<Entry<P>>,
    size: u32,
    base: BigUint,
}

impl<P> DataRange<P> {
    /// Empty set over `[0, 2^size - 1]`.
    pub fn new(size: u32) -> Self {
        DataRange {
            list: Vec::new(),
            size,
            base: BigUint::zero(),
        }
    }

    /// Empty set over `[base, 2^size - 1]`.
    pub fn with_base(size: u32, base: BigUint) -> Self {
        DataRange {
            list: Vec::new(),
            size,
            base,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn base(&self) -> &BigUint {
        &self.base
    }

    /// Largest value the set can hold, `2^size - 1`.
    pub fn max_value(&self) -> BigUint {
        (BigUint::one() << self.size) - 1u32
    }

    pub fn entries(&self) -> &[Entry<P>] {
        &self.list
    }

    /// Mutable view of the intervals. Bounds stay private, so only payloads can change.
    pub fn entries_mut(&mut self) -> &mut [Entry<P>] {
        &mut self.list
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Total number of integers covered.
    pub fn count(&self) -> BigUint {
        self.list
            .iter()
            .fold(BigUint::zero(), |acc, e| acc + e.count())
    }

    /// True if `other` is defined over the same domain.
    pub fn is_compatible<Q>(&self, other: &DataRange<Q>) -> bool {
        self.size == other.size && self.base == other.base
    }

    /// Coverage test: every interval of `other` lies inside a single interval of `self`.
    pub fn matches<Q>(&self, other: &DataRange<Q>) -> bool {
        other.list.iter().all(|o| {
            self.list.iter().any(|t| {
                matches!(o.relation(t), Relation::Equal | Relation::RightContainsLeft)
            })
        })
    }

    /// Set equality regardless of how either side is fragmented.
    pub fn same<Q>(&self, other: &DataRange<Q>) -> bool {
        self.matches(other) && other.matches(self)
    }

    fn check_bounds(&self, low: &BigUint, high: &BigUint) -> Result<()> {
        if low > high {
            return Err(AlgebraError::invalid_range(low, high, "low > high"));
        }
        if low < &self.base {
            return Err(AlgebraError::invalid_range(low, high, "below base"));
        }
        if high > &self.max_value() {
            return Err(AlgebraError::invalid_range(low, high, "above max value"));
        }
        Ok(())
    }

    fn check_compatible<Q>(&self, other: &DataRange<Q>) -> Result<()> {
        if !self.is_compatible(other) {
            return Err(AlgebraError::FamilyMismatch(
                format!("size={} base={}", self.size, self.base),
                format!("size={} base={}", other.size, other.base),
            ));
        }
        Ok(())
    }

    /// Merge neighbours that touch. The list is sorted and disjoint when this runs.
    fn coalesce(&mut self) {
        let list = std::mem::take(&mut self.list);
        let mut out: Vec<Entry<P>> = Vec::with_capacity(list.len());
        for cur in list {
            let touches = out
                .last()
                .map_or(false, |prev| prev.relation(&cur) == Relation::LeftAdjacentRight);
            match out.pop() {
                Some(prev) if touches => {
                    let low = prev.low().clone();
                    out.push(Entry::piece(low, cur.high().clone(), prev.into_data()));
                }
                Some(prev) => {
                    out.push(prev);
                    out.push(cur);
                }
                None => out.push(cur),
            }
        }
        self.list = out;
    }
}

impl<P: Clone> DataRange<P> {
    /// Insert `[low, high]`, merging with every interval it overlaps or touches.
    ///
    /// An interval that merges with existing ones keeps the payload of the first existing
    /// interval it touched; a standalone interval keeps `data`.
    ///
    /// # Returns
    /// * `Err(InvalidRange)` - if `low > high` or the interval is outside `[base, max_value]`
    pub fn push(&mut self, low: BigUint, high: BigUint, data: Option<P>) -> Result<()> {
        self.check_bounds(&low, &high)?;
        trace!("push [{}, {}] into {} intervals", low, high, self.list.len());

        let incoming = Entry::piece(low, high, data);
        let list = std::mem::take(&mut self.list);
        let mut out: Vec<Entry<P>> = Vec::with_capacity(list.len() + 1);
        let mut span: Option<Entry<P>> = None;
        let mut placed = false;

        for cur in list {
            if placed {
                out.push(cur);
                continue;
            }
            let probe = span.as_ref().unwrap_or(&incoming);
            match probe.relation(&cur) {
                Relation::Right => out.push(cur),
                Relation::Left => {
                    out.push(span.take().unwrap_or_else(|| incoming.clone()));
                    out.push(cur);
                    placed = true;
                }
                _ => {
                    let low = probe.low().min(cur.low()).clone();
                    let high = probe.high().max(cur.high()).clone();
                    let data = match span.take() {
                        Some(s) => s.into_data(),
                        None => cur.into_data(),
                    };
                    span = Some(Entry::piece(low, high, data));
                }
            }
        }
        if !placed {
            out.push(span.unwrap_or(incoming));
        }

        self.list = out;
        self.coalesce();
        Ok(())
    }

    pub fn push_entry(&mut self, entry: &Entry<P>) -> Result<()> {
        self.push(
            entry.low().clone(),
            entry.high().clone(),
            entry.data().cloned(),
        )
    }

    /// Remove `[low, high]`, splitting partially covered intervals.
    ///
    /// # Returns
    /// A new set holding exactly the pieces that were removed, with their payloads.
    pub fn remove(&mut self, low: BigUint, high: BigUint) -> Result<DataRange<P>> {
        self.check_bounds(&low, &high)?;
        let mut removed = DataRange::with_base(self.size, self.base.clone());

        let list = std::mem::take(&mut self.list);
        let mut kept = Vec::with_capacity(list.len() + 1);
        for cur in list {
            let target = Entry::piece(low.clone(), high.clone(), cur.data().cloned());
            let split = cur.split(&target);
            kept.extend(split.left);
            removed.list.extend(split.shared);
        }
        self.list = kept;
        Ok(removed)
    }

    /// Add every interval of `other` to `self`.
    ///
    /// Nothing is changed if the domains differ.
    pub fn add(&mut self, other: &DataRange<P>) -> Result<()> {
        self.check_compatible(other)?;
        let mut staged = self.clone();
        for e in &other.list {
            staged.push_entry(e)?;
        }
        *self = staged;
        Ok(())
    }

    /// Union into a new set.
    pub fn union(&self, other: &DataRange<P>) -> Result<DataRange<P>> {
        let mut result = self.clone();
        result.add(other)?;
        Ok(result)
    }

    /// Remove every interval of `other` from `self`.
    ///
    /// # Returns
    /// Everything that was actually deleted from `self`, with `self`'s payloads.
    pub fn difference<Q>(&mut self, other: &DataRange<Q>) -> Result<DataRange<P>> {
        self.check_compatible(other)?;
        let mut staged = self.clone();
        let mut removed = DataRange::with_base(self.size, self.base.clone());
        for e in &other.list {
            let gone = staged.remove(e.low().clone(), e.high().clone())?;
            for r in &gone.list {
                removed.push_entry(r)?;
            }
        }
        *self = staged;
        Ok(removed)
    }

    /// Three-way split of two sets.
    ///
    /// # Returns
    /// `(left, mid, right)`: only in `this`, in both, only in `other`. Empty parts are `None`.
    /// Sets over different domains are returned untouched as `(this, None, other)`.
    pub fn compare(
        this: &DataRange<P>,
        other: &DataRange<P>,
    ) -> (Option<DataRange<P>>, Option<DataRange<P>>, Option<DataRange<P>>) {
        if !this.is_compatible(other) {
            return (Some(this.clone()), None, Some(other.clone()));
        }
        let mut left = this.clone();
        let mut right = other.clone();
        let (mid, _) = match (left.difference(other), right.difference(this)) {
            (Ok(m), Ok(r)) => (m, r),
            _ => return (Some(this.clone()), None, Some(other.clone())),
        };
        let some = |d: DataRange<P>| if d.is_empty() { None } else { Some(d) };
        (some(left), some(mid), some(right))
    }

    /// Partition one query interval against this set, see [`Entry::match_result`].
    pub fn match_entry(&self, query: &Entry<P>) -> (Vec<Entry<P>>, Vec<Entry<P>>) {
        query.match_result(&self.list)
    }

    /// Build a set from arbitrary intervals, merging as needed.
    pub fn from_entries<'a, I>(size: u32, base: BigUint, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Entry<P>>,
        P: 'a,
    {
        let mut dr = DataRange::with_base(size, base);
        for e in entries {
            dr.push_entry(e)?;
        }
        Ok(dr)
    }
}

impl<P: Payload> DataRange<P> {
    pub fn to_record(&self) -> Result<DataRangeRecord> {
        Ok(DataRangeRecord {
            size: self.size,
            base: self.base.to_str_radix(10),
            list: self
                .list
                .iter()
                .map(|e| e.to_record())
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// Rebuild from a record. Intervals are pushed one by one, so unsorted or touching input
    /// comes back normalized.
    pub fn from_record(record: &DataRangeRecord, registry: &PayloadRegistry<P>) -> Result<Self> {
        let mut dr = DataRange::with_base(record.size, parse_decimal(&record.base)?);
        for r in &record.list {
            let e = Entry::from_record(r, registry)?;
            dr.push_entry(&e)?;
        }
        Ok(dr)
    }
}

impl<P: Payload> Serialize for DataRange<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_record()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

/// Deserializer for payload-carrying sets, parameterized by the decoder registry.
pub struct DataRangeSeed<'a, P> {
    pub registry: &'a PayloadRegistry<P>,
}

impl<'de, 'a, P: Payload> DeserializeSeed<'de> for DataRangeSeed<'a, P> {
    type Value = DataRange<P>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error> {
        let record = DataRangeRecord::deserialize(deserializer)?;
        DataRange::from_record(&record, self.registry).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for DataRange<()> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let registry = PayloadRegistry::new().with("Unit", |_| Ok(()));
        DataRangeSeed { registry: &registry }.deserialize(deserializer)
    }
}

impl<P> fmt::Display for DataRange<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "List:[{}], Size:{}, Base:{}",
            self.list.iter().join(", "),
            self.size,
            self.base
        )
    }
}
