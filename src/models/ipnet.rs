//! Address plus mask. The mask is usually a prefix but may have holes.

use super::address::{
    first_zero_bit, from_bits, mask_bits, parse_address, parse_mask, prefix_of_mask, to_bits,
    AddressType, IpFamily, RE_NET,
};
use super::iprange::IpRange;
use crate::config::{MAX_HOSTS, MAX_IRREGULAR_RUNS};
use crate::error::{AlgebraError, Result};
use crate::flexrange::DataRange;
use num_bigint::BigUint;
use num_traits::One;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// IPv4 or IPv6 network. `ip` is kept as given; [`IpNet::first`] is the masked address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpNet {
    ip: IpAddr,
    mask: IpAddr,
}

impl IpNet {
    /// Network from an address and a prefix length.
    pub fn new(ip: IpAddr, prefix: u8) -> Result<IpNet> {
        let family = IpFamily::of(&ip);
        if prefix > family.width() {
            return Err(AlgebraError::Parse(format!("{}/{}", ip, prefix)));
        }
        Ok(IpNet {
            ip,
            mask: from_bits(mask_bits(prefix, family), family)?,
        })
    }

    /// Network from an address and an arbitrary mask of the same family.
    pub fn with_mask(ip: IpAddr, mask: IpAddr) -> Result<IpNet> {
        if IpFamily::of(&ip) != IpFamily::of(&mask) {
            return Err(AlgebraError::FamilyMismatch(ip.to_string(), mask.to_string()));
        }
        Ok(IpNet { ip, mask })
    }

    /// Host network (`/32` or `/128`) for one address.
    pub fn host(ip: IpAddr) -> IpNet {
        let family = IpFamily::of(&ip);
        IpNet {
            ip,
            mask: addr(family.max_bits(), family),
        }
    }

    /// The whole address space, `0.0.0.0/0` or `::/0`.
    pub fn any(family: IpFamily) -> IpNet {
        IpNet {
            ip: addr(0, family),
            mask: addr(0, family),
        }
    }

    /// Parse `a.b.c.d`, `a.b.c.d/len`, `a.b.c.d/m.m.m.m` or the IPv6 equivalents.
    ///
    /// # Examples
    /// ```
    /// use network_algebra::models::IpNet;
    ///
    /// let net = IpNet::parse("10.1.1.1/24").unwrap();
    /// assert_eq!(net.first().to_string(), "10.1.1.0");
    /// assert_eq!(net.prefix(), Some(24));
    /// ```
    pub fn parse(s: &str) -> Result<IpNet> {
        let caps = RE_NET
            .captures(s)
            .ok_or_else(|| AlgebraError::Parse(format!("'{}' is not a network", s)))?;
        let ip = parse_address(caps.get(1).map_or("", |m| m.as_str()))?;
        match caps.get(2) {
            Some(m) => IpNet::with_mask(ip, parse_mask(m.as_str(), IpFamily::of(&ip))?),
            None => Ok(IpNet::host(ip)),
        }
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn mask(&self) -> IpAddr {
        self.mask
    }

    pub fn family(&self) -> IpFamily {
        IpFamily::of(&self.ip)
    }

    /// Prefix length, `None` for an irregular mask.
    pub fn prefix(&self) -> Option<u8> {
        prefix_of_mask(&self.mask)
    }

    pub fn is_regular(&self) -> bool {
        self.prefix().is_some()
    }

    fn mask_bits(&self) -> u128 {
        to_bits(&self.mask)
    }

    pub(crate) fn first_bits(&self) -> u128 {
        to_bits(&self.ip) & self.mask_bits()
    }

    pub(crate) fn last_bits(&self) -> u128 {
        self.first_bits() | (!self.mask_bits() & self.family().max_bits())
    }

    /// Masked address.
    pub fn first(&self) -> IpAddr {
        addr(self.first_bits(), self.family())
    }

    /// Highest address with the network bits of `first`.
    pub fn last(&self) -> IpAddr {
        addr(self.last_bits(), self.family())
    }

    /// Number of addresses, `2^(zero bits of the mask)`.
    pub fn count(&self) -> BigUint {
        let family = self.family();
        let zeros = (!self.mask_bits() & family.max_bits()).count_ones();
        BigUint::one() << zeros
    }

    /// Contiguous range of a regular network; `None` when the mask has holes.
    pub fn to_range(&self) -> Option<IpRange> {
        if !self.is_regular() {
            return None;
        }
        IpRange::new(self.first(), self.last()).ok()
    }

    /// Next shorter prefix covering this network.
    ///
    /// An irregular mask is cut back to the prefix just above its first zero bit.
    ///
    /// # Returns
    /// * `Err(NoSupernet)` - for `/0`, or for an irregular mask whose first bit is zero
    pub fn super_net(&self) -> Result<IpNet> {
        let prefix = match self.prefix() {
            Some(0) => return Err(AlgebraError::NoSupernet(self.to_string())),
            Some(p) => p - 1,
            None => match first_zero_bit(&self.mask) {
                Some(0) | None => return Err(AlgebraError::NoSupernet(self.to_string())),
                Some(l) => l - 1,
            },
        };
        let family = self.family();
        let mask = mask_bits(prefix, family);
        Ok(IpNet {
            ip: addr(to_bits(&self.ip) & mask, family),
            mask: addr(mask, family),
        })
    }

    /// True if `ip` carries the network bits of this network.
    pub fn match_ip(&self, ip: &IpAddr) -> bool {
        IpFamily::of(ip) == self.family() && to_bits(ip) & self.mask_bits() == self.first_bits()
    }

    /// True if every address of `other` belongs to this network.
    ///
    /// Works bitwise, so irregular masks on either side need no enumeration: `other`'s free bits
    /// must all be free here too, and its base must carry this network's bits.
    pub fn match_ipnet(&self, other: &IpNet) -> bool {
        if other.family() != self.family() {
            return false;
        }
        let free = !other.mask_bits() & other.family().max_bits();
        other.first_bits() & self.mask_bits() == self.first_bits() && free & self.mask_bits() == 0
    }

    /// True if the two networks share an address: their bases agree on every bit both masks fix.
    pub fn overlaps(&self, other: &IpNet) -> bool {
        other.family() == self.family()
            && (self.first_bits() ^ other.first_bits()) & self.mask_bits() & other.mask_bits() == 0
    }

    /// True if every address of `range` belongs to this network.
    pub fn match_iprange(&self, range: &IpRange) -> bool {
        if range.family() != self.family() {
            return false;
        }
        if self.is_regular() {
            return self.first_bits() <= range.start_bits() && range.end_bits() <= self.last_bits();
        }
        range.cidrs().iter().all(|n| self.match_ipnet(n))
    }

    /// Contiguous runs of an irregular mask, lowest first.
    ///
    /// The low block of zero bits gives the run length; every other zero bit doubles the number
    /// of runs.
    fn runs(&self) -> Result<Vec<(u128, u128)>> {
        let family = self.family();
        let mask = self.mask_bits();
        let run_bits = mask.trailing_zeros().min(family.width() as u32);
        let run_len = if run_bits >= 128 {
            u128::MAX
        } else {
            (1u128 << run_bits) - 1
        };
        let free: Vec<u32> = (run_bits..family.width() as u32)
            .filter(|b| mask & (1u128 << b) == 0)
            .collect();
        if free.len() >= usize::BITS as usize || (1usize << free.len()) > MAX_IRREGULAR_RUNS {
            return Err(AlgebraError::TooManyHosts(self.to_string()));
        }
        let base = self.first_bits();
        Ok((0..(1usize << free.len()))
            .map(|k| {
                let low = free
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| k & (1 << i) != 0)
                    .fold(base, |acc, (_, b)| acc | (1u128 << b));
                (low, low | run_len)
            })
            .collect())
    }

    /// Every address of the network, lowest first.
    ///
    /// # Returns
    /// * `Err(TooManyHosts)` - above 65536 addresses
    pub fn hosts(&self) -> Result<Vec<IpAddr>> {
        if self.count() > BigUint::from(MAX_HOSTS) {
            return Err(AlgebraError::TooManyHosts(self.to_string()));
        }
        let family = self.family();
        let mut hosts = Vec::new();
        for (low, high) in self.runs()? {
            let mut cur = low;
            loop {
                hosts.push(addr(cur, family));
                if cur == high {
                    break;
                }
                cur += 1;
            }
        }
        Ok(hosts)
    }

    /// Interval set of the network. Irregular masks yield one interval per run.
    pub fn data_range(&self) -> Result<DataRange> {
        let mut dr = DataRange::new(self.family().width() as u32);
        if self.is_regular() {
            dr.push(BigUint::from(self.first_bits()), BigUint::from(self.last_bits()), None)?;
            return Ok(dr);
        }
        for (low, high) in self.runs()? {
            dr.push(BigUint::from(low), BigUint::from(high), None)?;
        }
        Ok(dr)
    }

    pub fn address_type(&self) -> AddressType {
        if self.prefix() == Some(self.family().width()) {
            AddressType::Host
        } else {
            AddressType::Subnet
        }
    }

    pub fn ipnet_list(&self) -> Vec<IpNet> {
        vec![*self]
    }
}

/// Bits that come from a valid address or mask always fit the family.
fn addr(bits: u128, family: IpFamily) -> IpAddr {
    match family {
        IpFamily::V4 => IpAddr::V4(Ipv4Addr::from(bits as u32)),
        IpFamily::V6 => IpAddr::V6(Ipv6Addr::from(bits)),
    }
}

impl fmt::Display for IpNet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.prefix() {
            Some(p) => write!(f, "{}/{}", self.ip, p),
            None => write!(f, "{}/{}", self.ip, self.mask),
        }
    }
}

impl FromStr for IpNet {
    type Err = AlgebraError;

    fn from_str(s: &str) -> Result<IpNet> {
        IpNet::parse(s)
    }
}

impl Serialize for IpNet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for IpNet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<IpNet, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        IpNet::parse(&s).map_err(de::Error::custom)
    }
}
