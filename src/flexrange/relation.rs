//! Geometric relation between two closed integer intervals.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of interval A relative to interval B.
///
/// Swapping the operands maps every variant to its [`Relation::mirror`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// A lies entirely below B with a gap.
    Left,
    /// A lies entirely above B with a gap.
    Right,
    Equal,
    /// A reaches further up than B, B starts lower.
    LeftOverlapsRight,
    /// A starts lower, B reaches further up.
    RightOverlapsLeft,
    /// A ends exactly one below where B starts.
    LeftAdjacentRight,
    /// B ends exactly one below where A starts.
    RightAdjacentLeft,
    /// A covers B (not equal).
    LeftContainsRight,
    /// B covers A (not equal).
    RightContainsLeft,
    /// Unreachable for well-formed intervals.
    Incomparable,
}

impl Relation {
    /// Classify `[a_low, a_high]` against `[b_low, b_high]`.
    ///
    /// Checks run in a fixed order and the first match wins, so adjacency is reported before
    /// plain disjointness.
    ///
    /// # Examples
    /// ```
    /// use network_algebra::flexrange::Relation;
    /// use num_bigint::BigUint;
    ///
    /// let n = |v: u32| BigUint::from(v);
    /// assert_eq!(Relation::classify(&n(1), &n(3), &n(4), &n(6)), Relation::LeftAdjacentRight);
    /// assert_eq!(Relation::classify(&n(1), &n(9), &n(4), &n(6)), Relation::LeftContainsRight);
    /// ```
    pub fn classify(a_low: &BigUint, a_high: &BigUint, b_low: &BigUint, b_high: &BigUint) -> Relation {
        if &(a_high + 1u32) == b_low {
            return Relation::LeftAdjacentRight;
        }
        if &(b_high + 1u32) == a_low {
            return Relation::RightAdjacentLeft;
        }
        if a_low > b_high {
            return Relation::Right;
        }
        if a_high < b_low {
            return Relation::Left;
        }
        if a_low == b_low && a_high == b_high {
            return Relation::Equal;
        }
        if a_low <= b_low && a_high >= b_high {
            return Relation::LeftContainsRight;
        }
        if a_low >= b_low && a_high <= b_high {
            return Relation::RightContainsLeft;
        }
        if a_high < b_high {
            return Relation::RightOverlapsLeft;
        }
        if b_high < a_high {
            return Relation::LeftOverlapsRight;
        }
        Relation::Incomparable
    }

    /// The relation seen from the other operand.
    pub fn mirror(self) -> Relation {
        match self {
            Relation::Left => Relation::Right,
            Relation::Right => Relation::Left,
            Relation::Equal => Relation::Equal,
            Relation::LeftOverlapsRight => Relation::RightOverlapsLeft,
            Relation::RightOverlapsLeft => Relation::LeftOverlapsRight,
            Relation::LeftAdjacentRight => Relation::RightAdjacentLeft,
            Relation::RightAdjacentLeft => Relation::LeftAdjacentRight,
            Relation::LeftContainsRight => Relation::RightContainsLeft,
            Relation::RightContainsLeft => Relation::LeftContainsRight,
            Relation::Incomparable => Relation::Incomparable,
        }
    }

    /// True when the intervals share no point and do not touch.
    pub fn is_separate(self) -> bool {
        matches!(self, Relation::Left | Relation::Right)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// How much of an interval a split consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Nothing shared.
    None,
    /// Something shared and something of the left operand left over.
    Part,
    /// The left operand is fully covered.
    Full,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(a: (u32, u32), b: (u32, u32)) -> Relation {
        Relation::classify(
            &BigUint::from(a.0),
            &BigUint::from(a.1),
            &BigUint::from(b.0),
            &BigUint::from(b.1),
        )
    }

    #[test]
    fn test_classify_each_variant() {
        assert_eq!(rel((1, 3), (4, 6)), Relation::LeftAdjacentRight);
        assert_eq!(rel((4, 6), (1, 3)), Relation::RightAdjacentLeft);
        assert_eq!(rel((1, 2), (5, 6)), Relation::Left);
        assert_eq!(rel((5, 6), (1, 2)), Relation::Right);
        assert_eq!(rel((1, 6), (1, 6)), Relation::Equal);
        assert_eq!(rel((1, 9), (3, 6)), Relation::LeftContainsRight);
        assert_eq!(rel((1, 9), (1, 6)), Relation::LeftContainsRight);
        assert_eq!(rel((3, 6), (1, 9)), Relation::RightContainsLeft);
        assert_eq!(rel((1, 5), (3, 9)), Relation::RightOverlapsLeft);
        assert_eq!(rel((3, 9), (1, 5)), Relation::LeftOverlapsRight);
    }

    #[test]
    fn test_adjacent_at_zero() {
        // [0,0] against [1,5]: no underflow when the right interval starts at zero.
        assert_eq!(rel((0, 0), (1, 5)), Relation::LeftAdjacentRight);
        assert_eq!(rel((1, 5), (0, 0)), Relation::RightAdjacentLeft);
        assert_eq!(rel((0, 0), (0, 0)), Relation::Equal);
    }

    #[test]
    fn test_relation_symmetry() {
        let samples = [
            (0, 0),
            (0, 3),
            (1, 3),
            (2, 2),
            (2, 7),
            (3, 5),
            (4, 6),
            (4, 9),
            (7, 9),
            (10, 12),
        ];
        for a in samples {
            for b in samples {
                let ab = rel(a, b);
                let ba = rel(b, a);
                assert_ne!(ab, Relation::Incomparable, "{a:?} {b:?}");
                assert_eq!(ab.mirror(), ba, "a={a:?} b={b:?}");
            }
        }
    }

    #[test]
    fn test_is_separate() {
        assert!(Relation::Left.is_separate());
        assert!(!Relation::LeftAdjacentRight.is_separate());
        assert!(!Relation::Equal.is_separate());
    }
}
