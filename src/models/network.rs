//! A single address object: a CIDR block or a contiguous range.

use super::address::{AddressType, IpFamily};
use super::ipnet::IpNet;
use super::iprange::IpRange;
use crate::error::Result;
use crate::flexrange::{DataRange, Entry};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Capabilities shared by every address object and collection of them.
///
/// Coverage and equality go through the interval projection, so a block and a range spanning
/// the same addresses compare equal.
pub trait AddressSet {
    fn family(&self) -> IpFamily;

    /// Interval projection of the addresses.
    fn data_range(&self) -> Result<DataRange>;

    /// Number of addresses.
    ///
    /// # Returns
    /// * `Err(TooManyHosts)` - if the union of overlapping irregular members cannot be built
    fn count(&self) -> Result<BigUint>;

    fn address_type(&self) -> AddressType;

    /// The address objects this set is made of.
    fn members(&self) -> Vec<Network>;

    /// The addresses as CIDR blocks.
    fn ipnet_list(&self) -> Result<Vec<IpNet>>;

    /// Smallest block holding every address.
    fn super_net(&self) -> Result<IpNet>;

    /// True if every address of `other` is also in `self`. Never fails.
    ///
    /// When a projection cannot be built (an irregular mask with too many runs), each member of
    /// `other` must lie inside a single member of `self`, tested bitwise.
    fn matches(&self, other: &dyn AddressSet) -> bool {
        match (self.data_range(), other.data_range()) {
            (Ok(a), Ok(b)) => a.is_compatible(&b) && a.matches(&b),
            _ => members_cover(&self.members(), &other.members()),
        }
    }

    fn same(&self, other: &dyn AddressSet) -> bool {
        match (self.data_range(), other.data_range()) {
            (Ok(a), Ok(b)) => a.is_compatible(&b) && a.same(&b),
            _ => {
                members_cover(&self.members(), &other.members())
                    && members_cover(&other.members(), &self.members())
            }
        }
    }
}

fn members_cover(outer: &[Network], inner: &[Network]) -> bool {
    !inner.is_empty() && inner.iter().all(|i| outer.iter().any(|o| o.covers(i)))
}

impl AddressSet for IpNet {
    fn family(&self) -> IpFamily {
        IpNet::family(self)
    }

    fn data_range(&self) -> Result<DataRange> {
        IpNet::data_range(self)
    }

    fn count(&self) -> Result<BigUint> {
        Ok(IpNet::count(self))
    }

    fn address_type(&self) -> AddressType {
        IpNet::address_type(self)
    }

    fn members(&self) -> Vec<Network> {
        vec![Network::IpNet(*self)]
    }

    fn ipnet_list(&self) -> Result<Vec<IpNet>> {
        Ok(IpNet::ipnet_list(self))
    }

    fn super_net(&self) -> Result<IpNet> {
        IpNet::super_net(self)
    }
}

impl AddressSet for IpRange {
    fn family(&self) -> IpFamily {
        IpRange::family(self)
    }

    fn data_range(&self) -> Result<DataRange> {
        IpRange::data_range(self)
    }

    fn count(&self) -> Result<BigUint> {
        Ok(IpRange::count(self))
    }

    fn address_type(&self) -> AddressType {
        IpRange::address_type(self)
    }

    fn members(&self) -> Vec<Network> {
        vec![Network::IpRange(*self)]
    }

    fn ipnet_list(&self) -> Result<Vec<IpNet>> {
        Ok(IpRange::ipnet_list(self))
    }

    fn super_net(&self) -> Result<IpNet> {
        IpRange::super_net(self)
    }
}

/// Either kind of address object. Serialized as `{"type": "IpNet", "data": "10.0.0.0/8"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Network {
    IpNet(IpNet),
    IpRange(IpRange),
}

impl Network {
    /// A range if the text contains a dash, a block otherwise.
    ///
    /// # Examples
    /// ```
    /// use network_algebra::models::Network;
    ///
    /// assert!(matches!(Network::parse("10.0.0.1-10.0.0.9").unwrap(), Network::IpRange(_)));
    /// assert!(matches!(Network::parse("10.0.0.0/8").unwrap(), Network::IpNet(_)));
    /// ```
    pub fn parse(s: &str) -> Result<Network> {
        if s.contains('-') {
            Ok(Network::IpRange(IpRange::parse(s)?))
        } else {
            Ok(Network::IpNet(IpNet::parse(s)?))
        }
    }

    /// A block when the interval is exactly one aligned block, a range otherwise.
    pub fn from_entry<P>(entry: &Entry<P>, family: IpFamily) -> Result<Network> {
        let range = IpRange::from_entry(entry, family)?;
        Ok(match range.ipnet() {
            Some(net) => Network::IpNet(net),
            None => Network::IpRange(range),
        })
    }

    pub fn first(&self) -> IpAddr {
        match self {
            Network::IpNet(n) => n.first(),
            Network::IpRange(r) => r.first(),
        }
    }

    pub fn last(&self) -> IpAddr {
        match self {
            Network::IpNet(n) => n.last(),
            Network::IpRange(r) => r.last(),
        }
    }

    pub fn match_ip(&self, ip: &IpAddr) -> bool {
        match self {
            Network::IpNet(n) => n.match_ip(ip),
            Network::IpRange(r) => r.match_ip(ip),
        }
    }

    /// The block equal to this object, if there is one.
    pub fn ipnet(&self) -> Option<IpNet> {
        match self {
            Network::IpNet(n) => Some(*n),
            Network::IpRange(r) => r.ipnet(),
        }
    }

    /// True if every address of `other` lies inside this object. Irregular masks are compared
    /// bitwise, without enumerating their runs.
    pub fn covers(&self, other: &Network) -> bool {
        if self.family() != other.family() {
            return false;
        }
        match (self, other) {
            (Network::IpNet(a), Network::IpNet(b)) => a.match_ipnet(b),
            (Network::IpNet(a), Network::IpRange(r)) => a.match_iprange(r),
            (Network::IpRange(r), o) => r.match_ip(&o.first()) && r.match_ip(&o.last()),
        }
    }

    /// True if the two objects share at least one address.
    pub fn overlaps(&self, other: &Network) -> bool {
        if self.family() != other.family() {
            return false;
        }
        match (self, other) {
            (Network::IpNet(a), Network::IpNet(b)) => a.overlaps(b),
            (Network::IpNet(n), Network::IpRange(r)) | (Network::IpRange(r), Network::IpNet(n)) => {
                r.cidrs().iter().any(|c| n.overlaps(c))
            }
            (Network::IpRange(a), Network::IpRange(b)) => {
                a.start_bits() <= b.end_bits() && b.start_bits() <= a.end_bits()
            }
        }
    }

    fn inner(&self) -> &dyn AddressSet {
        match self {
            Network::IpNet(n) => n,
            Network::IpRange(r) => r,
        }
    }
}

impl AddressSet for Network {
    fn family(&self) -> IpFamily {
        self.inner().family()
    }

    fn data_range(&self) -> Result<DataRange> {
        self.inner().data_range()
    }

    fn count(&self) -> Result<BigUint> {
        self.inner().count()
    }

    fn address_type(&self) -> AddressType {
        self.inner().address_type()
    }

    fn members(&self) -> Vec<Network> {
        vec![*self]
    }

    fn ipnet_list(&self) -> Result<Vec<IpNet>> {
        self.inner().ipnet_list()
    }

    fn super_net(&self) -> Result<IpNet> {
        self.inner().super_net()
    }
}

impl From<IpNet> for Network {
    fn from(n: IpNet) -> Self {
        Network::IpNet(n)
    }
}

impl From<IpRange> for Network {
    fn from(r: IpRange) -> Self {
        Network::IpRange(r)
    }
}

impl FromStr for Network {
    type Err = crate::error::AlgebraError;

    fn from_str(s: &str) -> Result<Network> {
        Network::parse(s)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Network::IpNet(n) => write!(f, "{}", n),
            Network::IpRange(r) => write!(f, "{}", r),
        }
    }
}

/// True if `two` lies inside the block `one`.
pub fn in_same_network(one: &str, two: &str) -> Result<bool> {
    let one = IpNet::parse(one)?;
    let two = IpNet::parse(two)?;
    Ok(one.match_ipnet(&two))
}
