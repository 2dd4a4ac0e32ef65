//! Mixed-family address group: one [`NetworkList`] per family.

use super::address::{AddressType, IpFamily};
use super::ipnet::IpNet;
use super::network::{AddressSet, Network};
use super::network_list::{Aggregated, NetworkList};
use crate::error::{AlgebraError, Result};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// IPv4 and IPv6 members side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNetworkGroup")]
pub struct NetworkGroup {
    #[serde(rename = "IPv4")]
    ipv4: NetworkList,
    #[serde(rename = "IPv6")]
    ipv6: NetworkList,
}

#[derive(Deserialize)]
struct RawNetworkGroup {
    #[serde(rename = "IPv4")]
    ipv4: NetworkList,
    #[serde(rename = "IPv6")]
    ipv6: NetworkList,
}

impl TryFrom<RawNetworkGroup> for NetworkGroup {
    type Error = AlgebraError;

    fn try_from(raw: RawNetworkGroup) -> Result<Self> {
        NetworkGroup::from_lists(raw.ipv4, raw.ipv6)
    }
}

/// Which directions [`NetworkGroup::match_with_option`] accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// `one` covers `two`.
    pub one_match_two: bool,
    /// `two` covers `one`.
    pub two_match_one: bool,
    /// Equal as address sets.
    pub same: bool,
    /// When false, a group that is "any" never matches.
    pub include_any: bool,
}

impl NetworkGroup {
    pub fn new() -> Self {
        NetworkGroup {
            ipv4: NetworkList::new(IpFamily::V4),
            ipv6: NetworkList::new(IpFamily::V6),
        }
    }

    /// # Returns
    /// * `Err(FamilyMismatch)` - if the lists are not IPv4 and IPv6 in that order
    pub fn from_lists(ipv4: NetworkList, ipv6: NetworkList) -> Result<Self> {
        if ipv4.family() != IpFamily::V4 || ipv6.family() != IpFamily::V6 {
            return Err(AlgebraError::FamilyMismatch(
                ipv4.family().to_string(),
                ipv6.family().to_string(),
            ));
        }
        Ok(NetworkGroup { ipv4, ipv6 })
    }

    fn any_of(family: IpFamily) -> Network {
        Network::IpNet(IpNet::any(family))
    }

    /// `0.0.0.0/0`
    pub fn any4() -> Self {
        let mut g = NetworkGroup::new();
        g.add(NetworkGroup::any_of(IpFamily::V4));
        g
    }

    /// `::/0`
    pub fn any6() -> Self {
        let mut g = NetworkGroup::new();
        g.add(NetworkGroup::any_of(IpFamily::V6));
        g
    }

    /// `0.0.0.0/0` and `::/0`
    pub fn any46() -> Self {
        let mut g = NetworkGroup::any4();
        g.add(NetworkGroup::any_of(IpFamily::V6));
        g
    }

    /// Parse a comma separated list of networks of either family.
    ///
    /// # Examples
    /// ```
    /// use network_algebra::models::NetworkGroup;
    ///
    /// let g = NetworkGroup::parse("10.0.0.0/8,2001:db8::/32,192.168.1.1-192.168.1.9").unwrap();
    /// assert_eq!(g.ipv4().len(), 2);
    /// assert_eq!(g.ipv6().len(), 1);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(AlgebraError::Parse("empty network group".to_string()));
        }
        let mut g = NetworkGroup::new();
        for item in s.split(',') {
            g.add(Network::parse(item)?);
        }
        Ok(g)
    }

    pub fn ipv4(&self) -> &NetworkList {
        &self.ipv4
    }

    pub fn ipv6(&self) -> &NetworkList {
        &self.ipv6
    }

    pub fn network_list(&self, family: IpFamily) -> &NetworkList {
        match family {
            IpFamily::V4 => &self.ipv4,
            IpFamily::V6 => &self.ipv6,
        }
    }

    fn network_list_mut(&mut self, family: IpFamily) -> &mut NetworkList {
        match family {
            IpFamily::V4 => &mut self.ipv4,
            IpFamily::V6 => &mut self.ipv6,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }

    pub fn has_ipv4(&self) -> bool {
        !self.ipv4.is_empty()
    }

    pub fn has_ipv6(&self) -> bool {
        !self.ipv6.is_empty()
    }

    /// Only IPv4 members.
    pub fn is_ipv4(&self) -> bool {
        self.has_ipv4() && !self.has_ipv6()
    }

    /// Only IPv6 members.
    pub fn is_ipv6(&self) -> bool {
        self.has_ipv6() && !self.has_ipv4()
    }

    /// True for an empty group or one covering the whole space of its families.
    pub fn is_any(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        if self.is_ipv4() {
            self.same(&NetworkGroup::any4())
        } else if self.is_ipv6() {
            self.same(&NetworkGroup::any6())
        } else {
            self.same(&NetworkGroup::any46())
        }
    }

    /// Per-family halves; a half is `None` when that family has no members.
    pub fn split(&self) -> (Option<NetworkGroup>, Option<NetworkGroup>) {
        let v4 = self.has_ipv4().then(|| NetworkGroup {
            ipv4: self.ipv4.clone(),
            ipv6: NetworkList::new(IpFamily::V6),
        });
        let v6 = self.has_ipv6().then(|| NetworkGroup {
            ipv4: NetworkList::new(IpFamily::V4),
            ipv6: self.ipv6.clone(),
        });
        (v4, v6)
    }

    /// The one non-empty family list.
    ///
    /// # Returns
    /// * `Err(EmptyGroup)` - if the group is empty or holds both families
    pub fn must_one(&self) -> Result<&NetworkList> {
        match (self.has_ipv4(), self.has_ipv6()) {
            (true, false) => Ok(&self.ipv4),
            (false, true) => Ok(&self.ipv6),
            (true, true) => Err(AlgebraError::EmptyGroup("group holds both families".to_string())),
            (false, false) => Err(AlgebraError::EmptyGroup("group is empty".to_string())),
        }
    }

    /// Append one network to the list of its family.
    pub fn add(&mut self, net: Network) {
        self.network_list_mut(net.family()).push_unchecked(net);
    }

    pub fn add_list(&mut self, list: &NetworkList) {
        for n in list.networks() {
            self.add(*n);
        }
    }

    pub fn add_group(&mut self, other: &NetworkGroup) {
        self.add_list(&other.ipv4);
        self.add_list(&other.ipv6);
    }

    /// Coverage test for one network.
    pub fn matches(&self, net: &dyn AddressSet) -> bool {
        self.network_list(net.family()).matches(net)
    }

    /// True if every member of `other` is covered.
    pub fn match_group(&self, other: &NetworkGroup) -> bool {
        other
            .ipv4
            .networks()
            .iter()
            .chain(other.ipv6.networks())
            .all(|n| self.matches(n))
    }

    pub fn same(&self, other: &NetworkGroup) -> bool {
        self.match_group(other) && other.match_group(self)
    }

    pub fn count(&self) -> Result<BigUint> {
        Ok(self.ipv4.count()? + self.ipv6.count()?)
    }

    /// Both families rewritten as minimal CIDR block lists.
    pub fn aggregate(&self) -> Result<NetworkGroup> {
        Ok(NetworkGroup {
            ipv4: NetworkList::from_data_range(&self.ipv4.data_range()?)?,
            ipv6: NetworkList::from_data_range(&self.ipv6.data_range()?)?,
        })
    }

    pub fn address_type(&self) -> AddressType {
        match (self.has_ipv4(), self.has_ipv6()) {
            (true, true) => AddressType::Mixed,
            (true, false) => self.ipv4.address_type(),
            (false, true) => self.ipv6.address_type(),
            (false, false) => AddressType::None,
        }
    }

    /// The group as one block or range.
    ///
    /// # Returns
    /// * `Err(EmptyGroup)` - if the group is empty, mixed, or not one contiguous interval
    pub fn generate_network(&self) -> Result<Network> {
        match self.must_one()?.aggregate()? {
            Aggregated::Single(n) => Ok(n),
            _ => Err(AlgebraError::EmptyGroup(format!("'{}' is not contiguous", self))),
        }
    }

    /// Every member as text, IPv4 first.
    pub fn string_list(&self) -> Vec<String> {
        self.ipv4
            .networks()
            .iter()
            .chain(self.ipv6.networks())
            .map(|n| n.to_string())
            .collect()
    }

    fn single_per_family(&self) -> Vec<Network> {
        [&self.ipv4, &self.ipv6]
            .iter()
            .filter_map(|nl| match nl.aggregate() {
                Ok(Aggregated::Single(n)) => Some(n),
                _ => None,
            })
            .collect()
    }

    /// Families whose members aggregate to one host, as bare addresses.
    pub fn host_list(&self) -> Vec<String> {
        self.single_per_family()
            .into_iter()
            .filter(|n| n.address_type() == AddressType::Host)
            .map(|n| n.first().to_string())
            .collect()
    }

    /// Families whose members aggregate to one block, rendered by `format(address, suffix)`.
    ///
    /// The suffix is the dotted mask for IPv4 when `mask` is set and the prefix length
    /// otherwise; IPv6 always uses the prefix length.
    pub fn subnet_list<F>(&self, mask: bool, format: F) -> Vec<String>
    where
        F: Fn(&str, &str) -> String,
    {
        self.single_per_family()
            .into_iter()
            .filter(|n| n.address_type() == AddressType::Subnet)
            .filter_map(|n| n.ipnet())
            .map(|net| {
                let addr = net.first().to_string();
                let prefix = net.prefix().unwrap_or_default();
                if mask && net.family() == IpFamily::V4 {
                    format(&addr, &net.mask().to_string())
                } else {
                    format(&addr, &prefix.to_string())
                }
            })
            .collect()
    }

    /// Families whose members aggregate to one non-block range, rendered by
    /// `format(start, end)`.
    pub fn range_list<F>(&self, format: F) -> Vec<String>
    where
        F: Fn(&str, &str) -> String,
    {
        self.single_per_family()
            .into_iter()
            .filter_map(|n| match n {
                Network::IpRange(r) if r.address_type() == AddressType::Range => {
                    Some(format(&r.start().to_string(), &r.end().to_string()))
                }
                _ => None,
            })
            .collect()
    }

    /// Flexible comparison used by policy lookups.
    pub fn match_with_option(&self, other: &NetworkGroup, options: MatchOptions) -> bool {
        if !options.include_any && self.is_any() {
            return false;
        }
        (options.one_match_two && self.match_group(other))
            || (options.two_match_one && other.match_group(self))
            || (options.same && self.same(other))
    }
}

impl Default for NetworkGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NetworkGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = [&self.ipv4, &self.ipv6]
            .iter()
            .filter(|nl| !nl.is_empty())
            .map(|nl| nl.to_string())
            .collect();
        write!(f, "{}", parts.join("\n"))
    }
}
