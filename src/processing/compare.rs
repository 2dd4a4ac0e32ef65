//! Three-way comparison of mixed-family groups.

use crate::error::Result;
use crate::models::{IpFamily, NetworkGroup, NetworkList, NetworkListCmp};
use log::debug;

/// `(left, mid, right)` from [`compare_groups`]: only in `this`, in both, only in `other`.
pub type GroupCmp = (Option<NetworkGroup>, Option<NetworkGroup>, Option<NetworkGroup>);

fn compare_family(this: &NetworkList, other: &NetworkList) -> Result<NetworkListCmp> {
    match (this.is_empty(), other.is_empty()) {
        (true, true) => Ok((None, None, None)),
        (true, false) => Ok((None, None, Some(other.clone()))),
        (false, true) => Ok((Some(this.clone()), None, None)),
        (false, false) => NetworkList::compare(this, other),
    }
}

/// Joins the per-family parts; a part missing in one family becomes an empty list there.
fn join(v4: Option<NetworkList>, v6: Option<NetworkList>) -> Result<Option<NetworkGroup>> {
    if v4.is_none() && v6.is_none() {
        return Ok(None);
    }
    let ipv4 = v4.unwrap_or_else(|| NetworkList::new(IpFamily::V4));
    let ipv6 = v6.unwrap_or_else(|| NetworkList::new(IpFamily::V6));
    NetworkGroup::from_lists(ipv4, ipv6).map(Some)
}

/// Split two groups into the addresses only `this` has, the shared ones, and the ones only
/// `other` has, family by family. Every part is re-aggregated into CIDR blocks.
///
/// # Arguments
/// * `this` - Left group
/// * `other` - Right group
///
/// # Returns
/// Empty parts are `None`.
pub fn compare_groups(this: &NetworkGroup, other: &NetworkGroup) -> Result<GroupCmp> {
    let (l4, m4, r4) = compare_family(this.ipv4(), other.ipv4())?;
    let (l6, m6, r6) = compare_family(this.ipv6(), other.ipv6())?;
    debug!("compare '{}' with '{}'", this.to_string().replace('\n', ","), other.to_string().replace('\n', ","));
    Ok((join(l4, l6)?, join(m4, m6)?, join(r4, r6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(s: &str) -> NetworkGroup {
        NetworkGroup::parse(s).unwrap()
    }

    #[test]
    fn test_compare_both_families() {
        let a = group("10.0.0.0/24,2001:db8::/64");
        let b = group("10.0.0.128/25,10.0.1.0/24,2001:db8::/64");
        let (left, mid, right) = compare_groups(&a, &b).unwrap();

        let left = left.unwrap();
        assert!(left.same(&group("10.0.0.0/25")));
        assert!(left.ipv6().is_empty());

        let mid = mid.unwrap();
        assert!(mid.same(&group("10.0.0.128/25,2001:db8::/64")));

        let right = right.unwrap();
        assert!(right.same(&group("10.0.1.0/24")));
    }

    #[test]
    fn test_compare_one_side_empty() {
        let a = group("10.0.0.0/24");
        let b = group("2001:db8::/64");
        let (left, mid, right) = compare_groups(&a, &b).unwrap();
        assert_eq!(left.unwrap(), a);
        assert!(mid.is_none());
        assert_eq!(right.unwrap(), b);
    }

    #[test]
    fn test_compare_equal() {
        let a = group("10.0.0.0/24");
        let b = group("10.0.0.0-10.0.0.255");
        let (left, mid, right) = compare_groups(&a, &b).unwrap();
        assert!(left.is_none());
        assert!(mid.unwrap().same(&a));
        assert!(right.is_none());
    }

    #[test]
    fn test_compare_parts_cover_inputs() {
        let a = group("10.0.0.0/22,192.168.0.1-192.168.0.77");
        let b = group("10.0.2.0/23,192.168.0.50/28,172.16.0.0/12");
        let (left, mid, right) = compare_groups(&a, &b).unwrap();
        let (left, mid, right) = (left.unwrap(), mid.unwrap(), right.unwrap());

        let mut this = left.clone();
        this.add_group(&mid);
        assert!(this.same(&a));
        let mut that = right.clone();
        that.add_group(&mid);
        assert!(that.same(&b));
        assert!(!left.match_group(&mid) && !right.match_group(&mid));
    }
}
