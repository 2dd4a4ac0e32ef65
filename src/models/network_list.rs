//! Single-family list of address objects.
//!
//! The list keeps its members as given; set questions go through the merged interval
//! projection from [`NetworkList::data_range`], or through bitwise member tests when an
//! irregular mask is too wide to project.

use super::address::{AddressType, IpFamily};
use super::ipnet::IpNet;
use super::iprange::IpRange;
use super::network::{AddressSet, Network};
use crate::error::{AlgebraError, Result};
use crate::flexrange::{DataRange, EntryList};
use itertools::Itertools;
use log::debug;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::net::IpAddr;

/// Networks of one family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNetworkList")]
pub struct NetworkList {
    family: IpFamily,
    list: Vec<Network>,
}

#[derive(Deserialize)]
struct RawNetworkList {
    family: IpFamily,
    #[serde(default)]
    list: Vec<Network>,
}

impl TryFrom<RawNetworkList> for NetworkList {
    type Error = AlgebraError;

    fn try_from(raw: RawNetworkList) -> Result<Self> {
        NetworkList::from_networks(raw.family, raw.list)
    }
}

/// Outcome of [`NetworkList::aggregate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregated {
    Empty,
    /// One contiguous interval, as a block when it is one.
    Single(Network),
    /// Several intervals, each as a range.
    List(NetworkList),
}

/// `(left, mid, right)` from [`NetworkList::compare`]; empty parts are `None`.
pub type NetworkListCmp = (Option<NetworkList>, Option<NetworkList>, Option<NetworkList>);

impl NetworkList {
    pub fn new(family: IpFamily) -> Self {
        NetworkList {
            family,
            list: Vec::new(),
        }
    }

    /// # Returns
    /// * `Err(FamilyMismatch)` - if a member is not of `family`
    pub fn from_networks(family: IpFamily, list: Vec<Network>) -> Result<Self> {
        if let Some(bad) = list.iter().find(|n| n.family() != family) {
            return Err(AlgebraError::FamilyMismatch(family.to_string(), bad.to_string()));
        }
        Ok(NetworkList { family, list })
    }

    /// One block per aligned piece of every interval.
    pub fn from_data_range<P>(dr: &DataRange<P>) -> Result<Self> {
        let family = family_of_width(dr.size())?;
        let mut list = Vec::new();
        for e in dr.entries() {
            let range = IpRange::from_entry(e, family)?;
            list.extend(range.cidrs().into_iter().map(Network::IpNet));
        }
        Ok(NetworkList { family, list })
    }

    /// One object per interval, kept unmerged.
    pub fn from_entry_list<P: Clone>(el: &EntryList<P>, family: IpFamily) -> Result<Self> {
        let list = el
            .entries()
            .iter()
            .map(|e| Network::from_entry(e, family))
            .collect::<Result<Vec<_>>>()?;
        Ok(NetworkList { family, list })
    }

    pub fn push(&mut self, net: Network) -> Result<()> {
        if net.family() != self.family {
            return Err(AlgebraError::FamilyMismatch(self.family.to_string(), net.to_string()));
        }
        self.list.push(net);
        Ok(())
    }

    /// Append without the family check; callers route by family.
    pub(crate) fn push_unchecked(&mut self, net: Network) {
        self.list.push(net);
    }

    pub fn networks(&self) -> &[Network] {
        &self.list
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Lowest address of any member.
    pub fn first(&self) -> Option<IpAddr> {
        self.list.iter().map(|n| n.first()).min()
    }

    /// Highest address of any member.
    pub fn last(&self) -> Option<IpAddr> {
        self.list.iter().map(|n| n.last()).max()
    }

    /// Coverage test against a textual network.
    pub fn match_str(&self, s: &str) -> Result<bool> {
        let net = Network::parse(s)?;
        Ok(self.matches(&net))
    }

    /// The block equal to the whole list, if there is one.
    pub fn ipnet(&self) -> Option<IpNet> {
        match self.aggregate() {
            Ok(Aggregated::Single(n)) => n.ipnet(),
            _ => None,
        }
    }

    /// Fewest objects covering the same addresses.
    ///
    /// # Returns
    /// `Single` when the union is one interval, `List` of ranges otherwise.
    pub fn aggregate(&self) -> Result<Aggregated> {
        let dr = self.data_range()?;
        let aggregated = match dr.entries() {
            [] => Aggregated::Empty,
            [one] => Aggregated::Single(Network::from_entry(one, self.family)?),
            many => {
                let list = many
                    .iter()
                    .map(|e| IpRange::from_entry(e, self.family).map(Network::IpRange))
                    .collect::<Result<Vec<_>>>()?;
                Aggregated::List(NetworkList {
                    family: self.family,
                    list,
                })
            }
        };
        debug!("aggregated {} objects into {:?}", self.list.len(), aggregated_len(&aggregated));
        Ok(aggregated)
    }

    /// Three-way split: only in `this`, in both, only in `other`, each as CIDR blocks.
    ///
    /// Lists of different families are returned untouched as `(this, None, other)`.
    pub fn compare(this: &NetworkList, other: &NetworkList) -> Result<NetworkListCmp> {
        if this.family != other.family {
            return Ok((Some(this.clone()), None, Some(other.clone())));
        }
        let (left, mid, right) = DataRange::compare(&this.data_range()?, &other.data_range()?);
        let wrap = |d: Option<DataRange>| -> Result<Option<NetworkList>> {
            d.map(|d| NetworkList::from_data_range(&d)).transpose()
        };
        Ok((wrap(left)?, wrap(mid)?, wrap(right)?))
    }
}

fn aggregated_len(a: &Aggregated) -> usize {
    match a {
        Aggregated::Empty => 0,
        Aggregated::Single(_) => 1,
        Aggregated::List(l) => l.len(),
    }
}

pub(crate) fn family_of_width(size: u32) -> Result<IpFamily> {
    match size {
        32 => Ok(IpFamily::V4),
        128 => Ok(IpFamily::V6),
        other => Err(AlgebraError::FamilyMismatch(
            format!("size={}", other),
            "size=32 or size=128".to_string(),
        )),
    }
}

impl AddressSet for NetworkList {
    fn family(&self) -> IpFamily {
        self.family
    }

    /// Union of every member.
    fn data_range(&self) -> Result<DataRange> {
        let mut dr = DataRange::new(self.family.width() as u32);
        for n in &self.list {
            dr.add(&n.data_range()?)?;
        }
        Ok(dr)
    }

    /// Size of the union. Members too irregular to project are summed instead, which is exact
    /// only when no two members overlap.
    fn count(&self) -> Result<BigUint> {
        match self.data_range() {
            Ok(dr) => Ok(dr.count()),
            Err(AlgebraError::TooManyHosts(what)) => {
                if self.list.iter().tuple_combinations().any(|(a, b)| a.overlaps(b)) {
                    return Err(AlgebraError::TooManyHosts(what));
                }
                let mut total = BigUint::zero();
                for n in &self.list {
                    total += n.count()?;
                }
                Ok(total)
            }
            Err(e) => Err(e),
        }
    }

    fn members(&self) -> Vec<Network> {
        self.list.clone()
    }

    fn address_type(&self) -> AddressType {
        match self.aggregate() {
            Ok(Aggregated::Single(n)) => n.address_type(),
            Ok(Aggregated::List(_)) => AddressType::List,
            _ => AddressType::None,
        }
    }

    fn ipnet_list(&self) -> Result<Vec<IpNet>> {
        Ok(match self.aggregate()? {
            Aggregated::Empty => Vec::new(),
            Aggregated::Single(n) => n.ipnet_list()?,
            Aggregated::List(l) => {
                let mut nets = Vec::new();
                for n in &l.list {
                    nets.extend(n.ipnet_list()?);
                }
                nets
            }
        })
    }

    fn super_net(&self) -> Result<IpNet> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => IpRange::new(first, last)?.super_net(),
            _ => Err(AlgebraError::EmptyGroup(format!("empty {} list", self.family))),
        }
    }
}

impl fmt::Display for NetworkList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.list.iter().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> NetworkList {
        let nets: Vec<Network> = items.iter().map(|s| Network::parse(s).unwrap()).collect();
        NetworkList::from_networks(nets[0].family(), nets).unwrap()
    }

    #[test]
    fn test_count() {
        let nl = list(&["192.168.1.1-192.168.1.253", "10.1.1.1/24"]);
        assert_eq!(nl.count().unwrap(), BigUint::from(509u32));
        let nl = list(&["192.168.1.1-192.168.1.253", "10.1.100.1/16"]);
        assert_eq!(nl.count().unwrap(), BigUint::from(253u32 + 65536));
    }

    #[test]
    fn test_count_wide_irregular_mask() {
        // 2^18 single addresses, too many runs to project
        let nl = list(&["10.0.0.0/10.170.170.170"]);
        assert!(nl.data_range().is_err());
        assert_eq!(nl.count().unwrap(), BigUint::from(1u32 << 18));
        assert!(nl.matches(&nl));
        assert!(nl.same(&nl));

        // a disjoint range adds its own size
        let nl = list(&["10.0.0.0/10.170.170.170", "10.0.0.2-10.0.0.2"]);
        assert_eq!(nl.count().unwrap(), BigUint::from((1u32 << 18) + 1));
        assert!(nl.matches(&Network::parse("10.0.0.2").unwrap()));

        // overlapping members cannot be summed
        let nl = list(&["10.0.0.0/10.170.170.170", "10.0.0.0/24"]);
        assert!(matches!(nl.count(), Err(AlgebraError::TooManyHosts(_))));
    }

    #[test]
    fn test_first_last() {
        let nl = list(&["192.168.1.1-192.168.1.253", "10.1.1.1/24"]);
        assert_eq!(nl.first().unwrap().to_string(), "10.1.1.0");
        assert_eq!(nl.last().unwrap().to_string(), "192.168.1.253");
        assert!(NetworkList::new(IpFamily::V4).first().is_none());
    }

    #[test]
    fn test_family_check() {
        let nets = vec![Network::parse("10.0.0.0/8").unwrap(), Network::parse("::1").unwrap()];
        assert!(matches!(
            NetworkList::from_networks(IpFamily::V4, nets),
            Err(AlgebraError::FamilyMismatch(_, _))
        ));
    }

    #[test]
    fn test_aggregate_single_range() {
        let nl = list(&["192.168.1.0-192.168.1.253", "192.168.0.0/24"]);
        match nl.aggregate().unwrap() {
            Aggregated::Single(n) => assert_eq!(n.to_string(), "192.168.0.0-192.168.1.253"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_aggregate_single_block() {
        let nl = list(&["192.168.1.0/24", "192.168.0.0/24"]);
        match nl.aggregate().unwrap() {
            Aggregated::Single(n) => assert_eq!(n.to_string(), "192.168.0.0/23"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(nl.ipnet().unwrap().to_string(), "192.168.0.0/23");
    }

    #[test]
    fn test_aggregate_list() {
        let nl = list(&["192.168.1.0-192.168.3.255", "10.1.0.0/16", "192.168.0.0/24"]);
        match nl.aggregate().unwrap() {
            Aggregated::List(l) => {
                assert_eq!(l.to_string(), "10.1.0.0-10.1.255.255,192.168.0.0-192.168.3.255");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(nl.address_type(), AddressType::List);
        assert_eq!(NetworkList::new(IpFamily::V4).aggregate().unwrap(), Aggregated::Empty);
    }

    #[test]
    fn test_compare() {
        let a = list(&["192.168.1.0/24", "192.168.3.0/24"]);
        let b = list(&["192.168.1.200-192.168.3.200"]);
        let (left, mid, right) = NetworkList::compare(&a, &b).unwrap();
        assert!(left.unwrap().same(&list(&["192.168.1.0-192.168.1.199", "192.168.3.201-192.168.3.255"])));
        assert!(mid.unwrap().same(&list(&["192.168.1.200-192.168.1.255", "192.168.3.0-192.168.3.200"])));
        assert!(right.unwrap().same(&list(&["192.168.2.0/24"])));
    }

    #[test]
    fn test_compare_mismatch() {
        let a = list(&["192.168.1.0/24"]);
        let b = list(&["2001:db8::/32"]);
        let (left, mid, right) = NetworkList::compare(&a, &b).unwrap();
        assert_eq!(left.unwrap(), a);
        assert!(mid.is_none());
        assert_eq!(right.unwrap(), b);
    }

    #[test]
    fn test_match_str() {
        let nl = list(&["10.0.0.0/8", "192.168.0.0/16"]);
        assert!(nl.match_str("10.1.1.1").unwrap());
        assert!(nl.match_str("192.168.3.0-192.168.3.9").unwrap());
        assert!(!nl.match_str("172.16.0.1").unwrap());
        assert!(nl.match_str("junk").is_err());
    }

    #[test]
    fn test_super_net() {
        let nl = list(&["192.168.1.0/24", "192.168.3.0/24"]);
        assert_eq!(nl.super_net().unwrap().to_string(), "192.168.0.0/22");
        assert!(NetworkList::new(IpFamily::V4).super_net().is_err());
    }

    #[test]
    fn test_from_data_range() {
        let dr = Network::parse("1.1.1.1-1.1.1.7").unwrap().data_range().unwrap();
        let nl = NetworkList::from_data_range(&dr).unwrap();
        assert_eq!(nl.to_string(), "1.1.1.1/32,1.1.1.2/31,1.1.1.4/30");
        assert_eq!(nl.ipnet_list().unwrap().len(), 3);
    }

    #[test]
    fn test_serde_validates_family() {
        let nl = list(&["10.0.0.0/8"]);
        let s = serde_json::to_string(&nl).unwrap();
        let back: NetworkList = serde_json::from_str(&s).unwrap();
        assert_eq!(back, nl);
        let bad = r#"{"family":"IPv6","list":[{"type":"IpNet","data":"10.0.0.0/8"}]}"#;
        assert!(serde_json::from_str::<NetworkList>(bad).is_err());
    }
}
