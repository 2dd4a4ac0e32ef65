//! Two-dimensional products of interval sets, e.g. source x destination.

use super::data_range::DataRange;

/// Cartesian product `one x two`. Never holds an empty side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRangePair<P = ()> {
    one: DataRange<P>,
    two: DataRange<P>,
}

/// `(left, mid, right)` lists of pairs produced by [`compare_pairs`].
pub type PairCmp<P> = (Vec<DataRangePair<P>>, Vec<DataRangePair<P>>, Vec<DataRangePair<P>>);

impl<P: Clone> DataRangePair<P> {
    /// `None` when either side is empty, since the product would be empty.
    pub fn new(one: DataRange<P>, two: DataRange<P>) -> Option<Self> {
        if one.is_empty() || two.is_empty() {
            return None;
        }
        Some(DataRangePair { one, two })
    }

    pub fn one(&self) -> &DataRange<P> {
        &self.one
    }

    pub fn two(&self) -> &DataRange<P> {
        &self.two
    }
}

/// Three-way split of two products.
///
/// With `this = A1 x A2` and `other = B1 x B2`:
/// * left  = `(A1 - B1) x A2` and `(A1 & B1) x (A2 - B2)`
/// * mid   = `(A1 & B1) x (A2 & B2)`
/// * right = `(B1 - A1) x B2` and `(A1 & B1) x (B2 - A2)`
///
/// Pairs with an empty side are dropped, so each list holds at most two pairs.
pub fn compare_pairs<P: Clone>(this: &DataRangePair<P>, other: &DataRangePair<P>) -> PairCmp<P> {
    let (left1, mid1, right1) = DataRange::compare(&this.one, &other.one);
    let (left2, mid2, right2) = DataRange::compare(&this.two, &other.two);

    let empty1 = || DataRange::with_base(this.one.size(), this.one.base().clone());
    let empty2 = || DataRange::with_base(this.two.size(), this.two.base().clone());
    let left1 = left1.unwrap_or_else(empty1);
    let mid1 = mid1.unwrap_or_else(empty1);
    let right1 = right1.unwrap_or_else(empty1);
    let left2 = left2.unwrap_or_else(empty2);
    let mid2 = mid2.unwrap_or_else(empty2);
    let right2 = right2.unwrap_or_else(empty2);

    let left = [
        DataRangePair::new(left1, this.two.clone()),
        DataRangePair::new(mid1.clone(), left2),
    ];
    let right = [
        DataRangePair::new(right1, other.two.clone()),
        DataRangePair::new(mid1.clone(), right2),
    ];
    let mid = DataRangePair::new(mid1, mid2);

    (
        left.into_iter().flatten().collect(),
        mid.into_iter().collect(),
        right.into_iter().flatten().collect(),
    )
}
