//! Closed integer interval with an optional payload.
//!
//! [`Entry::split`] is the single place where interval boundary arithmetic happens; push, remove
//! and table matching are all expressed through it.

use super::payload::{EntryRecord, Payload, PayloadRegistry};
use super::relation::{MatchState, Relation};
use crate::error::{AlgebraError, Result};
use num_bigint::BigUint;
use std::fmt;

/// Interval `[low, high]` carrying an optional payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<P = ()> {
    low: BigUint,
    high: BigUint,
    data: Option<P>,
}

/// Result of splitting interval `e` against interval `o`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split<P> {
    pub state: MatchState,
    /// Parts of `e` not covered by `o`, with `e`'s payload.
    pub left: Vec<Entry<P>>,
    /// The overlap, with `o`'s payload.
    pub shared: Vec<Entry<P>>,
    /// Parts of `o` not covered by `e`, with `o`'s payload.
    pub remainder: Vec<Entry<P>>,
}

impl<P> Split<P> {
    fn new(state: MatchState) -> Self {
        Split {
            state,
            left: Vec::new(),
            shared: Vec::new(),
            remainder: Vec::new(),
        }
    }
}

impl<P> Entry<P> {
    pub fn low(&self) -> &BigUint {
        &self.low
    }

    pub fn high(&self) -> &BigUint {
        &self.high
    }

    pub fn data(&self) -> Option<&P> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut P> {
        self.data.as_mut()
    }

    pub fn set_data(&mut self, data: Option<P>) {
        self.data = data;
    }

    pub fn into_data(self) -> Option<P> {
        self.data
    }

    /// Number of integers in the interval.
    pub fn count(&self) -> BigUint {
        &self.high - &self.low + 1u32
    }

    /// Relation of `self` (A) to `other` (B).
    pub fn relation<Q>(&self, other: &Entry<Q>) -> Relation {
        Relation::classify(&self.low, &self.high, &other.low, &other.high)
    }

    /// Same bounds, different payload.
    pub fn with_data<Q>(&self, data: Option<Q>) -> Entry<Q> {
        Entry {
            low: self.low.clone(),
            high: self.high.clone(),
            data,
        }
    }

    /// Bounds are already known to be ordered.
    pub(crate) fn piece(low: BigUint, high: BigUint, data: Option<P>) -> Self {
        Entry { low, high, data }
    }
}

impl<P: Clone> Entry<P> {
    /// Create an interval.
    ///
    /// # Returns
    /// * `Err(InvalidRange)` - if `high < low`
    pub fn new(low: BigUint, high: BigUint, data: Option<P>) -> Result<Self> {
        if high < low {
            return Err(AlgebraError::invalid_range(&low, &high, "low > high"));
        }
        Ok(Entry { low, high, data })
    }

    /// Split `self` against `other` into the uncovered part of `self`, the shared part and the
    /// uncovered part of `other`.
    pub fn split(&self, other: &Entry<P>) -> Split<P> {
        let e = self;
        let o = other;

        match e.relation(o) {
            Relation::Equal => {
                let mut s = Split::new(MatchState::Full);
                s.shared.push(o.clone());
                s
            }
            Relation::Left
            | Relation::Right
            | Relation::LeftAdjacentRight
            | Relation::RightAdjacentLeft
            | Relation::Incomparable => {
                let mut s = Split::new(MatchState::None);
                s.left.push(e.clone());
                s.remainder.push(o.clone());
                s
            }
            Relation::LeftContainsRight => {
                let mut s = Split::new(MatchState::Part);
                if e.low < o.low {
                    s.left
                        .push(Entry::piece(e.low.clone(), &o.low - 1u32, e.data.clone()));
                }
                if o.high < e.high {
                    s.left
                        .push(Entry::piece(&o.high + 1u32, e.high.clone(), e.data.clone()));
                }
                s.shared.push(o.clone());
                s
            }
            Relation::RightContainsLeft => {
                let mut s = Split::new(MatchState::Full);
                s.shared.push(e.with_data(o.data.clone()));
                if o.low < e.low {
                    s.remainder
                        .push(Entry::piece(o.low.clone(), &e.low - 1u32, o.data.clone()));
                }
                if e.high < o.high {
                    s.remainder
                        .push(Entry::piece(&e.high + 1u32, o.high.clone(), o.data.clone()));
                }
                s
            }
            // o.low < e.low <= o.high < e.high
            Relation::LeftOverlapsRight => {
                let mut s = Split::new(MatchState::Part);
                s.left
                    .push(Entry::piece(&o.high + 1u32, e.high.clone(), e.data.clone()));
                s.shared
                    .push(Entry::piece(e.low.clone(), o.high.clone(), o.data.clone()));
                s.remainder
                    .push(Entry::piece(o.low.clone(), &e.low - 1u32, o.data.clone()));
                s
            }
            // e.low < o.low <= e.high < o.high
            Relation::RightOverlapsLeft => {
                let mut s = Split::new(MatchState::Part);
                s.left
                    .push(Entry::piece(e.low.clone(), &o.low - 1u32, e.data.clone()));
                s.shared
                    .push(Entry::piece(o.low.clone(), e.high.clone(), o.data.clone()));
                s.remainder
                    .push(Entry::piece(&e.high + 1u32, o.high.clone(), o.data.clone()));
                s
            }
        }
    }

    /// Partition `self` against an ordered list of intervals.
    ///
    /// Walks `others` in order; the first interval sharing anything with `self` claims the
    /// shared part, and every leftover piece is matched again against the full list.
    ///
    /// # Returns
    /// `(matched, unmatched)` - matched pieces carry the payload of the interval they hit,
    /// unmatched pieces keep `self`'s payload.
    pub fn match_result(&self, others: &[Entry<P>]) -> (Vec<Entry<P>>, Vec<Entry<P>>) {
        let mut matched = Vec::new();

        for o in others {
            let split = self.split(o);
            matched.extend(split.shared);
            if split.left.is_empty() {
                return (matched, Vec::new());
            }
            if split.state != MatchState::None {
                let mut unmatched = Vec::new();
                for piece in &split.left {
                    let (m, u) = piece.match_result(others);
                    matched.extend(m);
                    unmatched.extend(u);
                }
                return (matched, unmatched);
            }
        }

        (matched, vec![self.clone()])
    }
}

impl<P: Payload> Entry<P> {
    /// Serializable record of this interval.
    pub fn to_record(&self) -> Result<EntryRecord> {
        let data = match &self.data {
            Some(d) => Some(d.to_extend_data()?),
            None => None,
        };
        Ok(EntryRecord {
            low: self.low.to_str_radix(10),
            high: self.high.to_str_radix(10),
            data,
        })
    }

    /// Rebuild an interval from its record, decoding the payload through `registry`.
    pub fn from_record(record: &EntryRecord, registry: &PayloadRegistry<P>) -> Result<Self> {
        let low = parse_decimal(&record.low)?;
        let high = parse_decimal(&record.high)?;
        let data = match &record.data {
            Some(ext) => Some(registry.decode(ext)?),
            None => None,
        };
        Entry::new(low, high, data)
    }
}

pub(crate) fn parse_decimal(s: &str) -> Result<BigUint> {
    s.parse::<BigUint>()
        .map_err(|e| AlgebraError::Parse(format!("integer '{s}': {e}")))
}

impl<P> fmt::Display for Entry<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::ToPrimitive;

    fn e(low: u32, high: u32, tag: &'static str) -> Entry<&'static str> {
        Entry::new(BigUint::from(low), BigUint::from(high), Some(tag)).unwrap()
    }

    fn bounds(list: &[Entry<&'static str>]) -> Vec<(u32, u32, &'static str)> {
        list.iter()
            .map(|x| {
                (
                    x.low().to_u32().unwrap(),
                    x.high().to_u32().unwrap(),
                    *x.data().unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_new_rejects_inverted() {
        let r = Entry::<()>::new(BigUint::from(5u32), BigUint::from(1u32), None);
        assert!(matches!(r, Err(AlgebraError::InvalidRange { .. })));
    }

    #[test]
    fn test_count() {
        assert_eq!(e(10, 10, "a").count(), BigUint::from(1u32));
        assert_eq!(e(0, 255, "a").count(), BigUint::from(256u32));
    }

    #[test]
    fn test_split_contains_two_pieces() {
        let s = e(1, 10, "e").split(&e(4, 6, "o"));
        assert_eq!(s.state, MatchState::Part);
        assert_eq!(bounds(&s.left), vec![(1, 3, "e"), (7, 10, "e")]);
        assert_eq!(bounds(&s.shared), vec![(4, 6, "o")]);
        assert!(s.remainder.is_empty());
    }

    #[test]
    fn test_split_contained() {
        let s = e(4, 6, "e").split(&e(1, 10, "o"));
        assert_eq!(s.state, MatchState::Full);
        assert!(s.left.is_empty());
        assert_eq!(bounds(&s.shared), vec![(4, 6, "o")]);
        assert_eq!(bounds(&s.remainder), vec![(1, 3, "o"), (7, 10, "o")]);
    }

    #[test]
    fn test_split_overlaps() {
        let s = e(5, 10, "e").split(&e(1, 7, "o"));
        assert_eq!(s.state, MatchState::Part);
        assert_eq!(bounds(&s.left), vec![(8, 10, "e")]);
        assert_eq!(bounds(&s.shared), vec![(5, 7, "o")]);
        assert_eq!(bounds(&s.remainder), vec![(1, 4, "o")]);

        let s = e(1, 7, "e").split(&e(5, 10, "o"));
        assert_eq!(bounds(&s.left), vec![(1, 4, "e")]);
        assert_eq!(bounds(&s.shared), vec![(5, 7, "o")]);
        assert_eq!(bounds(&s.remainder), vec![(8, 10, "o")]);
    }

    #[test]
    fn test_split_mirrors() {
        let pairs = [((1, 10), (4, 6)), ((5, 10), (1, 7)), ((0, 3), (4, 8)), ((2, 2), (2, 2))];
        for (a, b) in pairs {
            let ab = e(a.0, a.1, "a").split(&e(b.0, b.1, "b"));
            let ba = e(b.0, b.1, "b").split(&e(a.0, a.1, "a"));
            let strip = |l: &[Entry<&'static str>]| -> Vec<(u32, u32)> {
                bounds(l).into_iter().map(|(x, y, _)| (x, y)).collect()
            };
            assert_eq!(strip(&ab.left), strip(&ba.remainder), "{a:?} {b:?}");
            assert_eq!(strip(&ab.remainder), strip(&ba.left), "{a:?} {b:?}");
            assert_eq!(strip(&ab.shared), strip(&ba.shared), "{a:?} {b:?}");
        }
    }

    #[test]
    fn test_split_disjoint() {
        let s = e(1, 3, "e").split(&e(4, 6, "o"));
        assert_eq!(s.state, MatchState::None);
        assert_eq!(bounds(&s.left), vec![(1, 3, "e")]);
        assert_eq!(bounds(&s.remainder), vec![(4, 6, "o")]);
    }

    #[test]
    fn test_match_result_spanning() {
        // query [0,20] against [2,4] and [10,12]
        let table = vec![e(2, 4, "A"), e(10, 12, "B")];
        let (m, u) = e(0, 20, "q").match_result(&table);
        assert_eq!(bounds(&m), vec![(2, 4, "A"), (10, 12, "B")]);
        assert_eq!(bounds(&u), vec![(0, 1, "q"), (5, 9, "q"), (13, 20, "q")]);
    }

    #[test]
    fn test_match_result_full_and_none() {
        let table = vec![e(0, 100, "A")];
        let (m, u) = e(10, 20, "q").match_result(&table);
        assert_eq!(bounds(&m), vec![(10, 20, "A")]);
        assert!(u.is_empty());

        let (m, u) = e(200, 300, "q").match_result(&table);
        assert!(m.is_empty());
        assert_eq!(bounds(&u), vec![(200, 300, "q")]);
    }
}
