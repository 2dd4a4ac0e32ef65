//! Outcome of a routing table lookup.

use super::hop::NextHop;
use crate::error::Result;
use crate::flexrange::{Entry, EntryList};
use crate::models::{from_integer, IpFamily, IpRange, Network};
use serde::Serialize;
use std::fmt;

/// One hop of one matched fragment, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRow {
    pub net: String,
    pub interface: String,
    pub ip: String,
    pub connected: bool,
    pub default_gw: bool,
}

/// Explode each interval into one row per hop.
pub(crate) fn rows_of(entries: &[Entry<NextHop>], family: IpFamily) -> Result<Vec<RouteRow>> {
    let mut rows = Vec::new();
    for e in entries {
        let net = Network::from_entry(e, family)?.to_string();
        let hops = e.data().map(|nh| nh.hops()).unwrap_or_default();
        rows.extend(hops.iter().map(|h| RouteRow {
            net: net.clone(),
            interface: h.interface().to_string(),
            ip: h.ip().to_string(),
            connected: h.connected(),
            default_gw: h.default_gw(),
        }));
    }
    Ok(rows)
}

/// Fragments of a query that found a route, each with that route's hops, and the fragments
/// that found none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    family: IpFamily,
    matched: EntryList<NextHop>,
    unmatched: EntryList<NextHop>,
}

impl MatchResult {
    pub fn new(family: IpFamily, matched: EntryList<NextHop>, unmatched: EntryList<NextHop>) -> Self {
        MatchResult {
            family,
            matched,
            unmatched,
        }
    }

    pub fn family(&self) -> IpFamily {
        self.family
    }

    pub fn matched(&self) -> &EntryList<NextHop> {
        &self.matched
    }

    pub fn unmatched(&self) -> &EntryList<NextHop> {
        &self.unmatched
    }

    /// Every address of the query found a route.
    pub fn is_match(&self) -> bool {
        !self.matched.is_empty() && self.unmatched.is_empty()
    }

    /// Gateway shared by every hop of every fragment, for a full match only.
    pub fn same_ip(&self) -> Option<String> {
        self.same_by(NextHop::same_ip)
    }

    /// Interface shared by every hop of every fragment, for a full match only.
    pub fn same_interface(&self) -> Option<String> {
        self.same_by(NextHop::same_interface)
    }

    fn same_by<F>(&self, pick: F) -> Option<String>
    where
        F: Fn(&NextHop) -> Option<&str>,
    {
        if !self.is_match() {
            return None;
        }
        let mut found: Option<&str> = None;
        for e in self.matched.entries() {
            let value = pick(e.data()?)?;
            match found {
                Some(prev) if prev != value => return None,
                _ => found = Some(value),
            }
        }
        found.map(str::to_string)
    }

    /// Matched fragments, one row per hop.
    pub fn rows(&self) -> Result<Vec<RouteRow>> {
        rows_of(self.matched.entries(), self.family)
    }

    /// Unmatched fragments as ranges.
    pub fn unmatched_ranges(&self) -> Result<Vec<IpRange>> {
        self.unmatched
            .entries()
            .iter()
            .map(|e| IpRange::from_entry(e, self.family))
            .collect()
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let span = |e: &Entry<NextHop>| match (
            from_integer(e.low(), self.family),
            from_integer(e.high(), self.family),
        ) {
            (Ok(a), Ok(b)) => format!("{}-{}", a, b),
            _ => e.to_string(),
        };
        let matched: Vec<String> = self
            .matched
            .entries()
            .iter()
            .map(|e| match e.data() {
                Some(nh) => format!("{}:{}", span(e), nh),
                None => span(e),
            })
            .collect();
        let unmatched: Vec<String> = self.unmatched.entries().iter().map(|e| span(e)).collect();
        write!(
            f,
            "match: [{}]\nunmatch: [{}]",
            matched.join(","),
            unmatched.join(",")
        )
    }
}
