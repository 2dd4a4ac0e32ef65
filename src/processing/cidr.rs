//! Conversion between address ranges and CIDR blocks.
//!
//! Block alignment is read off the trailing zero bits of the current address: a block of
//! `2^k` addresses can start at `a` only if the low `k` bits of `a` are zero.

use crate::error::{AlgebraError, Result};
use crate::models::{IpFamily, IpNet, IpRange};
use log::debug;
use std::net::IpAddr;

/// `2^k - 1` without overflowing at `k = 128`.
fn block_span(k: u32) -> u128 {
    if k >= 128 {
        u128::MAX
    } else {
        (1u128 << k) - 1
    }
}

/// Largest `k` such that a block of `2^k` starting at `cur` is aligned and ends at or before
/// `end`.
fn largest_block(cur: u128, end: u128, width: u32) -> u32 {
    let mut k = if cur == 0 {
        width
    } else {
        cur.trailing_zeros().min(width)
    };
    while k > 0 && cur + block_span(k) > end {
        k -= 1;
    }
    k
}

pub(crate) fn cidrs_of_bits(start: u128, end: u128, family: IpFamily) -> Vec<IpNet> {
    let width = family.width() as u32;
    let mut result = Vec::new();
    let mut cur = start;
    loop {
        let k = largest_block(cur, end, width);
        let last = cur + block_span(k);
        if let Some(net) = block(cur, (width - k) as u8, family) {
            result.push(net);
        }
        if last >= end {
            break;
        }
        cur = last + 1;
    }
    result
}

pub(crate) fn supernet_of_bits(start: u128, end: u128, family: IpFamily) -> Result<IpNet> {
    let width = family.width();
    for prefix in (0..=width).rev() {
        let mask = family.max_bits() & !family.max_bits().checked_shr(prefix as u32).unwrap_or(0);
        if start & mask == end & mask {
            if let Some(net) = block(start & mask, prefix, family) {
                return Ok(net);
            }
        }
    }
    Err(AlgebraError::NoSupernet(format!("{}-{}", start, end)))
}

fn block(base: u128, prefix: u8, family: IpFamily) -> Option<IpNet> {
    let ip = match family {
        IpFamily::V4 => IpAddr::V4(u32::try_from(base).ok()?.into()),
        IpFamily::V6 => IpAddr::V6(base.into()),
    };
    IpNet::new(ip, prefix).ok()
}

/// Decompose `[start, end]` into the minimal ordered list of aligned blocks.
///
/// # Arguments
/// * `start` - First address of the range
/// * `end` - Last address of the range, same family as `start`
///
/// # Returns
/// * `Err` - if the ends are of different families or inverted
pub fn range_to_cidrs(start: &IpAddr, end: &IpAddr) -> Result<Vec<IpNet>> {
    let range = IpRange::new(*start, *end)?;
    let cidrs = range.cidrs();
    debug!("{} splits into {} blocks", range, cidrs.len());
    Ok(cidrs)
}

/// Smallest aligned block that contains both ends of `range`.
///
/// Starts from the host block at `range.start` and drops one prefix bit at a time.
pub fn supernet(range: &IpRange) -> Result<IpNet> {
    range.super_net()
}

/// First and last address of `net` as a range.
///
/// # Returns
/// * `Err(IrregularMask)` - if the mask is not a contiguous prefix
pub fn cidr_to_range(net: &IpNet) -> Result<IpRange> {
    net.to_range()
        .ok_or_else(|| AlgebraError::IrregularMask(net.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_address;

    fn cidrs(a: &str, b: &str) -> Vec<String> {
        range_to_cidrs(&parse_address(a).unwrap(), &parse_address(b).unwrap())
            .unwrap()
            .iter()
            .map(|n| n.to_string())
            .collect()
    }

    #[test]
    fn test_range_to_cidrs() {
        assert_eq!(cidrs("1.1.1.1", "1.1.1.7"), vec!["1.1.1.1/32", "1.1.1.2/31", "1.1.1.4/30"]);
        assert_eq!(cidrs("10.0.0.0", "10.0.0.0"), vec!["10.0.0.0/32"]);
        assert_eq!(cidrs("255.255.255.255", "255.255.255.255"), vec!["255.255.255.255/32"]);
        assert_eq!(cidrs("255.255.255.0", "255.255.255.255"), vec!["255.255.255.0/24"]);
    }

    #[test]
    fn test_range_to_cidrs_v6() {
        assert_eq!(cidrs("::", "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"), vec!["::/0"]);
        assert_eq!(cidrs("2001:db8::", "2001:db8::ff"), vec!["2001:db8::/120"]);
        assert_eq!(cidrs("2001:db8::1", "2001:db8::2"), vec!["2001:db8::1/128", "2001:db8::2/128"]);
    }

    #[test]
    fn test_range_to_cidrs_rejects() {
        let a = parse_address("10.0.0.9").unwrap();
        let b = parse_address("10.0.0.1").unwrap();
        assert!(range_to_cidrs(&a, &b).is_err());
    }

    #[test]
    fn test_supernet_minimal() {
        let r = IpRange::parse("192.168.1.1-192.168.1.3").unwrap();
        let net = supernet(&r).unwrap();
        assert_eq!(net.to_string(), "192.168.1.0/30");
        // the next longer prefix no longer holds both ends
        let smaller = IpNet::new(net.first(), 31).unwrap();
        assert!(!(smaller.match_ip(&r.start()) && smaller.match_ip(&r.end())));
    }

    #[test]
    fn test_cidr_to_range() {
        let net = IpNet::parse("10.1.1.0/24").unwrap();
        assert_eq!(cidr_to_range(&net).unwrap().to_string(), "10.1.1.0-10.1.1.255");
        let back: Vec<IpNet> = range_to_cidrs(&net.first(), &net.last()).unwrap();
        assert_eq!(back, vec![net]);
        let irregular = IpNet::parse("10.0.0.0/255.0.255.0").unwrap();
        assert!(matches!(cidr_to_range(&irregular), Err(AlgebraError::IrregularMask(_))));
    }

    #[test]
    fn test_supernet_v6() {
        let r = IpRange::parse("2001:db8::1-2001:db8::1:0").unwrap();
        assert_eq!(supernet(&r).unwrap().to_string(), "2001:db8::/111");
    }
}
