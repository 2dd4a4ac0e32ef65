//! Address family projections.
//!
//! Addresses are plain [`IpAddr`] values. Everything above this module sees them as unsigned
//! integers in `[0, 2^width - 1]`; bit arithmetic happens on `u128` and set arithmetic on
//! [`BigUint`].

use crate::error::{AlgebraError, Result};
use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Bit width of an IPv4 address.
pub const IPV4_WIDTH: u8 = 32;
/// Bit width of an IPv6 address.
pub const IPV6_WIDTH: u8 = 128;

lazy_static! {
    /// `address` or `address/prefix` or `address/mask`.
    pub(crate) static ref RE_NET: Regex =
        Regex::new(r"^\s*([0-9A-Fa-f:.]+)\s*(?:/\s*([0-9A-Fa-f:.]+))?\s*$").expect("Invalid Regex?");
    /// `address-address`, blanks allowed around the dash.
    pub(crate) static ref RE_RANGE: Regex =
        Regex::new(r"^\s*([0-9A-Fa-f:.]+)\s*-\s*([0-9A-Fa-f:.]+)\s*$").expect("Invalid Regex?");
    static ref RE_PREFIX: Regex = Regex::new(r"^\d{1,3}$").expect("Invalid Regex?");
}

/// Address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IpFamily {
    #[serde(rename = "IPv4")]
    V4,
    #[serde(rename = "IPv6")]
    V6,
}

impl IpFamily {
    pub fn of(ip: &IpAddr) -> IpFamily {
        match ip {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        }
    }

    /// Bit width, 32 or 128.
    pub fn width(self) -> u8 {
        match self {
            IpFamily::V4 => IPV4_WIDTH,
            IpFamily::V6 => IPV6_WIDTH,
        }
    }

    /// All-ones value of the family as bits.
    pub fn max_bits(self) -> u128 {
        match self {
            IpFamily::V4 => u32::MAX as u128,
            IpFamily::V6 => u128::MAX,
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IpFamily::V4 => write!(f, "IPv4"),
            IpFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// Shape of an address object or group after aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressType {
    None,
    Host,
    Subnet,
    Range,
    List,
    Mixed,
}

/// Parse one IPv4 or IPv6 address.
pub fn parse_address(s: &str) -> Result<IpAddr> {
    s.trim()
        .parse::<IpAddr>()
        .map_err(|_| AlgebraError::Parse(format!("'{}' is not a valid ip address", s)))
}

pub(crate) fn to_bits(ip: &IpAddr) -> u128 {
    match ip {
        IpAddr::V4(v4) => u32::from(*v4) as u128,
        IpAddr::V6(v6) => u128::from(*v6),
    }
}

pub(crate) fn from_bits(bits: u128, family: IpFamily) -> Result<IpAddr> {
    match family {
        IpFamily::V4 => {
            let v = u32::try_from(bits).map_err(|_| {
                AlgebraError::invalid_range(&BigUint::from(bits), &BigUint::from(bits), "above IPv4 max")
            })?;
            Ok(IpAddr::V4(Ipv4Addr::from(v)))
        }
        IpFamily::V6 => Ok(IpAddr::V6(Ipv6Addr::from(bits))),
    }
}

/// Integer projection of an address.
///
/// # Examples
/// ```
/// use network_algebra::models::{parse_address, to_integer};
/// use num_bigint::BigUint;
///
/// let ip = parse_address("0.0.1.1").unwrap();
/// assert_eq!(to_integer(&ip), BigUint::from(257u32));
/// ```
pub fn to_integer(ip: &IpAddr) -> BigUint {
    BigUint::from(to_bits(ip))
}

/// Inverse of [`to_integer`].
///
/// # Returns
/// * `Err(InvalidRange)` - if `value` does not fit the family
pub fn from_integer(value: &BigUint, family: IpFamily) -> Result<IpAddr> {
    if value > &max_value(family) {
        return Err(AlgebraError::invalid_range(value, value, "above family max"));
    }
    let bits = value
        .to_u128()
        .ok_or_else(|| AlgebraError::invalid_range(value, value, "above family max"))?;
    from_bits(bits, family)
}

/// `2^width - 1` for the family.
pub fn max_value(family: IpFamily) -> BigUint {
    BigUint::from(family.max_bits())
}

pub fn width(family: IpFamily) -> u8 {
    family.width()
}

pub(crate) fn mask_bits(prefix: u8, family: IpFamily) -> u128 {
    let max = family.max_bits();
    max & !max.checked_shr(prefix as u32).unwrap_or(0)
}

/// Contiguous mask of `prefix` leading ones.
pub fn mask_from_prefix(prefix: u8, family: IpFamily) -> Result<IpAddr> {
    if prefix > family.width() {
        return Err(AlgebraError::Parse(format!(
            "prefix {} too long for {}",
            prefix, family
        )));
    }
    from_bits(mask_bits(prefix, family), family)
}

/// Mask bits shifted so the family's most significant bit is bit 127.
fn aligned(bits: u128, family: IpFamily) -> u128 {
    bits << (128 - family.width() as u32)
}

/// Prefix length of a contiguous mask; `None` when the ones have holes.
///
/// # Examples
/// ```
/// use network_algebra::models::{parse_address, prefix_of_mask};
///
/// assert_eq!(prefix_of_mask(&parse_address("255.128.0.0").unwrap()), Some(9));
/// assert_eq!(prefix_of_mask(&parse_address("255.253.0.0").unwrap()), None);
/// ```
pub fn prefix_of_mask(mask: &IpAddr) -> Option<u8> {
    let family = IpFamily::of(mask);
    let a = aligned(to_bits(mask), family);
    let ones = a.leading_ones();
    if a.checked_shl(ones).unwrap_or(0) == 0 {
        Some(ones as u8)
    } else {
        None
    }
}

/// Index, counted from the most significant bit, of the first zero in the mask.
pub(crate) fn first_zero_bit(mask: &IpAddr) -> Option<u8> {
    let family = IpFamily::of(mask);
    let ones = aligned(to_bits(mask), family).leading_ones();
    if ones >= family.width() as u32 {
        None
    } else {
        Some(ones as u8)
    }
}

/// Bitwise AND of an address with a mask of the same family.
pub fn apply_mask(ip: &IpAddr, mask: &IpAddr) -> Result<IpAddr> {
    let family = IpFamily::of(ip);
    if family != IpFamily::of(mask) {
        return Err(AlgebraError::FamilyMismatch(ip.to_string(), mask.to_string()));
    }
    from_bits(to_bits(ip) & to_bits(mask), family)
}

/// Parse a mask given either as a prefix length or as an address.
pub(crate) fn parse_mask(s: &str, family: IpFamily) -> Result<IpAddr> {
    if RE_PREFIX.is_match(s) {
        let prefix: u8 = s
            .parse()
            .map_err(|_| AlgebraError::Parse(format!("prefix '{}'", s)))?;
        return mask_from_prefix(prefix, family);
    }
    let mask = parse_address(s)?;
    if IpFamily::of(&mask) != family {
        return Err(AlgebraError::FamilyMismatch(family.to_string(), mask.to_string()));
    }
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        parse_address(s).unwrap()
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(IpFamily::of(&ip("10.1.1.1")), IpFamily::V4);
        assert_eq!(IpFamily::of(&ip("2001:db8::1")), IpFamily::V6);
        assert!(parse_address("10.1.1").is_err());
        assert!(parse_address("10.1.1.256").is_err());
    }

    #[test]
    fn test_integer_projection() {
        let v = to_integer(&ip("255.255.255.255"));
        assert_eq!(v, max_value(IpFamily::V4));
        assert_eq!(from_integer(&v, IpFamily::V4).unwrap(), ip("255.255.255.255"));
        assert!(from_integer(&(v + 1u32), IpFamily::V4).is_err());

        let v6 = max_value(IpFamily::V6);
        assert_eq!(from_integer(&v6, IpFamily::V6).unwrap(), ip("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"));
    }

    #[test]
    fn test_mask_from_prefix() {
        assert_eq!(mask_from_prefix(24, IpFamily::V4).unwrap(), ip("255.255.255.0"));
        assert_eq!(mask_from_prefix(0, IpFamily::V4).unwrap(), ip("0.0.0.0"));
        assert_eq!(mask_from_prefix(32, IpFamily::V4).unwrap(), ip("255.255.255.255"));
        assert_eq!(mask_from_prefix(128, IpFamily::V6).unwrap(), ip("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"));
        assert!(mask_from_prefix(33, IpFamily::V4).is_err());
    }

    #[test]
    fn test_prefix_of_mask() {
        assert_eq!(prefix_of_mask(&ip("255.128.0.0")), Some(9));
        assert_eq!(prefix_of_mask(&ip("255.253.0.0")), None);
        assert_eq!(prefix_of_mask(&ip("0.0.0.0")), Some(0));
        assert_eq!(prefix_of_mask(&ip("255.255.255.255")), Some(32));
        assert_eq!(prefix_of_mask(&ip("FFFF:FFFF:FF00::")), Some(40));
        assert_eq!(prefix_of_mask(&ip("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff")), Some(128));
    }

    #[test]
    fn test_first_zero_bit() {
        assert_eq!(first_zero_bit(&ip("128.255.0.255")), Some(1));
        assert_eq!(first_zero_bit(&ip("0.255.0.255")), Some(0));
        assert_eq!(first_zero_bit(&ip("255.255.255.255")), None);
    }

    #[test]
    fn test_apply_mask() {
        let m = apply_mask(&ip("192.168.1.77"), &ip("255.255.255.0")).unwrap();
        assert_eq!(m, ip("192.168.1.0"));
        assert!(apply_mask(&ip("192.168.1.77"), &ip("ffff::")).is_err());
    }

    #[test]
    fn test_parse_mask() {
        assert_eq!(parse_mask("16", IpFamily::V4).unwrap(), ip("255.255.0.0"));
        assert_eq!(parse_mask("255.0.0.0", IpFamily::V4).unwrap(), ip("255.0.0.0"));
        assert!(parse_mask("255.0.0.0", IpFamily::V6).is_err());
    }

    #[test]
    fn test_family_display() {
        assert_eq!(IpFamily::V4.to_string(), "IPv4");
        assert_eq!(serde_json::to_string(&IpFamily::V6).unwrap(), "\"IPv6\"");
    }
}
