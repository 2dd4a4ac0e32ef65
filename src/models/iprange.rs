//! Contiguous address range `start-end`.

use super::address::{from_integer, parse_address, to_bits, to_integer, AddressType, IpFamily, RE_RANGE};
use super::ipnet::IpNet;
use crate::error::{AlgebraError, Result};
use crate::flexrange::{DataRange, Entry};
use crate::processing::{cidrs_of_bits, supernet_of_bits};
use num_bigint::{BigInt, BigUint};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Closed address range, `start <= end`, both of one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpRange {
    start: IpAddr,
    end: IpAddr,
}

impl IpRange {
    pub fn new(start: IpAddr, end: IpAddr) -> Result<IpRange> {
        if IpFamily::of(&start) != IpFamily::of(&end) {
            return Err(AlgebraError::FamilyMismatch(start.to_string(), end.to_string()));
        }
        if to_bits(&start) > to_bits(&end) {
            return Err(AlgebraError::invalid_range(
                &to_integer(&start),
                &to_integer(&end),
                "start > end",
            ));
        }
        Ok(IpRange { start, end })
    }

    /// Parse `a.b.c.d-e.f.g.h` or the IPv6 equivalent.
    pub fn parse(s: &str) -> Result<IpRange> {
        let caps = RE_RANGE
            .captures(s)
            .ok_or_else(|| AlgebraError::Parse(format!("'{}' is not a range", s)))?;
        let start = parse_address(caps.get(1).map_or("", |m| m.as_str()))?;
        let end = parse_address(caps.get(2).map_or("", |m| m.as_str()))?;
        IpRange::new(start, end)
    }

    pub fn from_integers(low: &BigUint, high: &BigUint, family: IpFamily) -> Result<IpRange> {
        IpRange::new(from_integer(low, family)?, from_integer(high, family)?)
    }

    pub fn from_entry<P>(entry: &Entry<P>, family: IpFamily) -> Result<IpRange> {
        IpRange::from_integers(entry.low(), entry.high(), family)
    }

    pub fn start(&self) -> IpAddr {
        self.start
    }

    pub fn end(&self) -> IpAddr {
        self.end
    }

    pub fn first(&self) -> IpAddr {
        self.start
    }

    pub fn last(&self) -> IpAddr {
        self.end
    }

    pub fn family(&self) -> IpFamily {
        IpFamily::of(&self.start)
    }

    pub(crate) fn start_bits(&self) -> u128 {
        to_bits(&self.start)
    }

    pub(crate) fn end_bits(&self) -> u128 {
        to_bits(&self.end)
    }

    pub fn count(&self) -> BigUint {
        to_integer(&self.end) - to_integer(&self.start) + 1u32
    }

    pub fn match_ip(&self, ip: &IpAddr) -> bool {
        IpFamily::of(ip) == self.family()
            && self.start_bits() <= to_bits(ip)
            && to_bits(ip) <= self.end_bits()
    }

    /// True if `[first, last]` of `net` lies inside the range.
    pub fn match_ipnet(&self, net: &IpNet) -> bool {
        net.family() == self.family()
            && self.start_bits() <= net.first_bits()
            && net.last_bits() <= self.end_bits()
    }

    pub fn match_iprange(&self, other: &IpRange) -> bool {
        other.family() == self.family()
            && self.start_bits() <= other.start_bits()
            && other.end_bits() <= self.end_bits()
    }

    /// Move the start by `delta`, which may be negative.
    ///
    /// # Returns
    /// * `Err(InvalidRange)` - if the new start would pass the end or leave the family
    pub fn start_shift(&self, delta: &BigInt) -> Result<IpRange> {
        let start = shifted(&self.start, delta)?;
        IpRange::new(start, self.end)
    }

    /// Move the end by `delta`, which may be negative.
    pub fn end_shift(&self, delta: &BigInt) -> Result<IpRange> {
        let end = shifted(&self.end, delta)?;
        IpRange::new(self.start, end)
    }

    /// Lazy walk over every address of the range.
    pub fn hosts(&self) -> Hosts {
        Hosts {
            next: Some(self.start_bits()),
            end: self.end_bits(),
            family: self.family(),
        }
    }

    /// Minimal list of aligned blocks covering the range exactly.
    ///
    /// # Examples
    /// ```
    /// use network_algebra::models::IpRange;
    ///
    /// let r = IpRange::parse("1.1.1.1-1.1.1.7").unwrap();
    /// let cidrs: Vec<String> = r.cidrs().iter().map(|n| n.to_string()).collect();
    /// assert_eq!(cidrs, vec!["1.1.1.1/32", "1.1.1.2/31", "1.1.1.4/30"]);
    /// ```
    pub fn cidrs(&self) -> Vec<IpNet> {
        cidrs_of_bits(self.start_bits(), self.end_bits(), self.family())
    }

    /// The block equal to this range, if there is one.
    pub fn ipnet(&self) -> Option<IpNet> {
        let mut cidrs = self.cidrs();
        if cidrs.len() == 1 {
            cidrs.pop()
        } else {
            None
        }
    }

    pub fn ipnet_list(&self) -> Vec<IpNet> {
        self.cidrs()
    }

    /// Smallest block holding both ends.
    pub fn super_net(&self) -> Result<IpNet> {
        supernet_of_bits(self.start_bits(), self.end_bits(), self.family())
    }

    pub fn data_range(&self) -> Result<DataRange> {
        let mut dr = DataRange::new(self.family().width() as u32);
        dr.push(to_integer(&self.start), to_integer(&self.end), None)?;
        Ok(dr)
    }

    pub fn address_type(&self) -> AddressType {
        if self.start == self.end {
            AddressType::Host
        } else if self.cidrs().len() == 1 {
            AddressType::Subnet
        } else {
            AddressType::Range
        }
    }
}

fn shifted(ip: &IpAddr, delta: &BigInt) -> Result<IpAddr> {
    let moved = BigInt::from(to_integer(ip)) + delta;
    match moved.to_biguint() {
        Some(v) => from_integer(&v, IpFamily::of(ip)),
        None => Err(AlgebraError::Parse(format!("{} shifted by {} is negative", ip, delta))),
    }
}

/// Iterator returned by [`IpRange::hosts`].
pub struct Hosts {
    next: Option<u128>,
    end: u128,
    family: IpFamily,
}

impl Iterator for Hosts {
    type Item = IpAddr;

    fn next(&mut self) -> Option<IpAddr> {
        let cur = self.next?;
        self.next = if cur < self.end { Some(cur + 1) } else { None };
        match self.family {
            IpFamily::V4 => Some(IpAddr::V4((cur as u32).into())),
            IpFamily::V6 => Some(IpAddr::V6(cur.into())),
        }
    }
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for IpRange {
    type Err = AlgebraError;

    fn from_str(s: &str) -> Result<IpRange> {
        IpRange::parse(s)
    }
}

impl Serialize for IpRange {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for IpRange {
    fn deserialize<D>(deserializer: D) -> std::result::Result<IpRange, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        IpRange::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(s: &str) -> IpRange {
        IpRange::parse(s).unwrap()
    }

    fn strs(nets: &[IpNet]) -> Vec<String> {
        nets.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parse() {
        let r = range("192.168.1.1 - 192.168.1.3");
        assert_eq!(r.count(), BigUint::from(3u32));
        assert!(IpRange::parse("192.168.1.3-192.168.1.1").is_err());
        assert!(IpRange::parse("192.168.1.1-::1").is_err());
        assert!(IpRange::parse("192.168.1.1").is_err());
    }

    #[test]
    fn test_cidrs() {
        assert_eq!(
            strs(&range("1.1.1.1-1.1.1.16").cidrs()),
            vec!["1.1.1.1/32", "1.1.1.2/31", "1.1.1.4/30", "1.1.1.8/29", "1.1.1.16/32"]
        );
        assert_eq!(strs(&range("0.0.0.0-255.255.255.255").cidrs()), vec!["0.0.0.0/0"]);
        assert_eq!(
            strs(&range("127.0.0.0-127.0.1.128").cidrs()),
            vec!["127.0.0.0/24", "127.0.1.0/25", "127.0.1.128/32"]
        );
    }

    #[test]
    fn test_cidrs_reunion() {
        let r = range("1.1.1.1-1.1.1.7");
        let mut dr = DataRange::new(32);
        for n in r.cidrs() {
            dr.add(&n.data_range().unwrap()).unwrap();
        }
        assert_eq!(dr, r.data_range().unwrap());
    }

    #[test]
    fn test_super_net() {
        assert_eq!(range("192.168.1.1-192.168.1.3").super_net().unwrap().to_string(), "192.168.1.0/30");
        assert_eq!(range("192.168.1.0-192.168.1.200").super_net().unwrap().to_string(), "192.168.1.0/24");
        assert_eq!(range("1.168.1.0-192.168.1.200").super_net().unwrap().to_string(), "0.0.0.0/0");
    }

    #[test]
    fn test_shift() {
        let r = range("10.0.0.10-10.0.0.20");
        assert_eq!(r.start_shift(&BigInt::from(5)).unwrap().to_string(), "10.0.0.15-10.0.0.20");
        assert_eq!(r.end_shift(&BigInt::from(-5)).unwrap().to_string(), "10.0.0.10-10.0.0.15");
        assert!(r.start_shift(&BigInt::from(11)).is_err());
        assert!(range("0.0.0.0-0.0.0.1").start_shift(&BigInt::from(-1)).is_err());
        assert!(range("255.255.255.0-255.255.255.255").end_shift(&BigInt::from(1)).is_err());
    }

    #[test]
    fn test_hosts_iter() {
        let hosts: Vec<String> = range("10.0.0.254-10.0.1.1").hosts().map(|h| h.to_string()).collect();
        assert_eq!(hosts, vec!["10.0.0.254", "10.0.0.255", "10.0.1.0", "10.0.1.1"]);
        let all: Vec<IpAddr> = range("255.255.255.255-255.255.255.255").hosts().collect();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_address_type() {
        assert_eq!(range("10.0.0.1-10.0.0.1").address_type(), AddressType::Host);
        assert_eq!(range("10.0.0.0-10.0.0.255").address_type(), AddressType::Subnet);
        assert_eq!(range("10.0.0.1-10.0.0.255").address_type(), AddressType::Range);
        assert_eq!(range("10.0.0.0-10.0.0.255").ipnet().unwrap().to_string(), "10.0.0.0/24");
    }

    #[test]
    fn test_match() {
        let r = range("10.0.0.0-10.0.1.255");
        assert!(r.match_ipnet(&IpNet::parse("10.0.1.0/24").unwrap()));
        assert!(!r.match_ipnet(&IpNet::parse("10.0.0.0/22").unwrap()));
        assert!(r.match_iprange(&range("10.0.0.5-10.0.0.9")));
        assert!(r.match_ip(&parse_address("10.0.1.7").unwrap()));
        assert!(!r.match_ip(&parse_address("::1").unwrap()));
    }
}
