//! Longest prefix match table.
//!
//! Routes are kept in one bucket per prefix length. A lookup walks the buckets from the most
//! specific down, each bucket claiming what it covers of the still unmatched part of the query.
//! The default route sits in its own slot and is only consulted at the end.

use super::hop::NextHop;
use super::result::{rows_of, MatchResult, RouteRow};
use crate::error::{AlgebraError, Result};
use crate::flexrange::{Entry, EntryList, EntryRecord, PayloadRegistry, Relation};
use crate::models::{to_integer, AddressSet, IpFamily, IpNet, IpRange, Network, NetworkList};
use log::{debug, trace};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Routes of one address family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressTable {
    family: IpFamily,
    /// Index is the prefix length; index 0 stays empty.
    table: Vec<EntryList<NextHop>>,
    dgw: Option<Entry<NextHop>>,
}

/// Serialized table: only non-empty buckets are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressTableRecord {
    pub family: IpFamily,
    #[serde(default)]
    pub buckets: Vec<BucketRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_gw: Option<EntryRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRecord {
    pub prefix: u8,
    pub list: Vec<EntryRecord>,
}

fn query_entry(net: &Network) -> Result<Entry<NextHop>> {
    Entry::new(to_integer(&net.first()), to_integer(&net.last()), None)
}

impl AddressTable {
    pub fn new(family: IpFamily) -> Self {
        let width = family.width() as u32;
        AddressTable {
            family,
            table: (0..=width).map(|_| EntryList::new(width)).collect(),
            dgw: None,
        }
    }

    pub fn family(&self) -> IpFamily {
        self.family
    }

    /// Bit width, and the highest bucket index.
    pub fn size(&self) -> u8 {
        self.family.width()
    }

    /// Number of routes, default included.
    pub fn len(&self) -> usize {
        self.table.iter().map(|b| b.len()).sum::<usize>() + usize::from(self.dgw.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_family(&self, family: IpFamily, what: &dyn fmt::Display) -> Result<()> {
        if family != self.family {
            return Err(AlgebraError::FamilyMismatch(self.family.to_string(), what.to_string()));
        }
        Ok(())
    }

    /// Add a route. A `/0` route becomes the default route and its hops are marked as such.
    /// Pushing a prefix that is already present replaces its next hop.
    ///
    /// # Returns
    /// * `Err(IrregularMask)` - if `net` has no contiguous prefix
    /// * `Err(FamilyMismatch)` - if `net` is of the other family
    /// * `Err(InvalidHop)` - if `next_hop` has no hops
    pub fn push(&mut self, net: &IpNet, mut next_hop: NextHop) -> Result<()> {
        self.check_family(net.family(), net)?;
        let prefix = net
            .prefix()
            .ok_or_else(|| AlgebraError::IrregularMask(net.to_string()))?;
        if next_hop.is_empty() {
            return Err(AlgebraError::InvalidHop(format!("route {} has no next hop", net)));
        }
        let first = to_integer(&net.first());
        let last = to_integer(&net.last());

        if prefix == 0 {
            for hop in next_hop.hops_mut() {
                hop.set_default_gw(true);
            }
            debug!("default route {} via {}", net, next_hop);
            self.dgw = Some(Entry::new(first, last, Some(next_hop))?);
            return Ok(());
        }

        trace!("push {} via {}", net, next_hop);
        let bucket = &mut self.table[prefix as usize];
        let existing = bucket
            .entries()
            .iter()
            .position(|e| e.low() == &first && e.high() == &last);
        match existing {
            Some(i) => bucket.entries_mut()[i].set_data(Some(next_hop)),
            None => bucket.push(Entry::new(first, last, Some(next_hop))?)?,
        }
        Ok(())
    }

    /// Drop the route with exactly the bounds of `net`.
    pub fn remove(&mut self, net: &Network) -> bool {
        if net.family() != self.family {
            return false;
        }
        let target = match query_entry(net) {
            Ok(t) => t,
            Err(_) => return false,
        };
        if self.table.iter_mut().any(|b| b.remove(&target)) {
            debug!("removed route {}", net);
            return true;
        }
        match &self.dgw {
            Some(d) if d.relation(&target) == Relation::Equal => {
                debug!("removed default route {}", net);
                self.dgw = None;
                true
            }
            _ => false,
        }
    }

    /// Next hop of the route with exactly the bounds of `net`.
    pub fn equal(&self, net: &Network) -> Option<NextHop> {
        if net.family() != self.family {
            return None;
        }
        let target = query_entry(net).ok()?;
        self.table
            .iter()
            .flat_map(|b| b.entries())
            .chain(self.dgw.as_ref())
            .find(|e| e.relation(&target) == Relation::Equal)
            .and_then(|e| e.data().cloned())
    }

    /// Next hop of the default route.
    pub fn default_gw(&self) -> Option<&NextHop> {
        self.dgw.as_ref().and_then(|e| e.data())
    }

    /// Distinct interfaces of the route with exactly the bounds of `net`, in hop order.
    pub fn output_interfaces(&self, net: &Network) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        if let Some(nh) = self.equal(net) {
            for i in nh.out_interfaces() {
                if !seen.iter().any(|s| s == i) {
                    seen.push(i.to_string());
                }
            }
        }
        seen
    }

    /// Longest prefix match of every address of `net`.
    ///
    /// # Arguments
    /// * `net` - Query block or range
    /// * `allow_default` - Hand what no specific route covers to the default route
    /// * `ignore_default` - Never consult the default route, whatever `allow_default` says
    ///
    /// # Returns
    /// Matched fragments, each with the next hop of the route that claimed it, and the rest.
    /// A query equal to the default route's block matches the default route alone.
    pub fn match_network(
        &self,
        net: &Network,
        allow_default: bool,
        ignore_default: bool,
    ) -> Result<MatchResult> {
        self.check_family(net.family(), net)?;
        let width = self.size() as u32;
        let query = query_entry(net)?;

        let mut pending = vec![query.clone()];
        let mut matched = Vec::new();
        for bucket in self.table.iter().skip(1).rev() {
            if bucket.is_empty() || pending.is_empty() {
                continue;
            }
            let mut rest = Vec::new();
            for piece in &pending {
                let (m, u) = piece.match_result(bucket.entries());
                matched.extend(m);
                rest.extend(u);
            }
            pending = rest;
        }

        if allow_default && !ignore_default {
            if let Some(dgw) = &self.dgw {
                if query.relation(dgw) == Relation::Equal {
                    matched = vec![dgw.clone()];
                } else {
                    let data = dgw.data().cloned();
                    matched.extend(pending.iter().map(|p| p.with_data(data.clone())));
                }
                pending.clear();
            }
        }

        Ok(MatchResult::new(
            self.family,
            EntryList::from_entries(width, matched),
            EntryList::from_entries(width, pending),
        ))
    }

    /// [`AddressTable::match_network`] over every member of `list`, results concatenated.
    pub fn match_network_list(
        &self,
        list: &NetworkList,
        allow_default: bool,
        ignore_default: bool,
    ) -> Result<MatchResult> {
        let width = self.size() as u32;
        let mut matched = Vec::new();
        let mut unmatched = Vec::new();
        for n in list.networks() {
            let r = self.match_network(n, allow_default, ignore_default)?;
            matched.extend(r.matched().entries().iter().cloned());
            unmatched.extend(r.unmatched().entries().iter().cloned());
        }
        Ok(MatchResult::new(
            self.family,
            EntryList::from_entries(width, matched),
            EntryList::from_entries(width, unmatched),
        ))
    }

    /// Every stored route interval, most specific first, default last.
    pub(crate) fn route_entries(&self) -> impl Iterator<Item = &Entry<NextHop>> {
        self.table
            .iter()
            .rev()
            .flat_map(|b| b.entries())
            .chain(self.dgw.as_ref())
    }

    pub(crate) fn route_entries_mut(&mut self) -> impl Iterator<Item = &mut Entry<NextHop>> {
        self.table
            .iter_mut()
            .rev()
            .flat_map(|b| b.entries_mut().iter_mut())
            .chain(self.dgw.as_mut())
    }

    fn block_of(&self, e: &Entry<NextHop>) -> Result<IpNet> {
        IpRange::from_entry(e, self.family)?.super_net()
    }

    /// Snapshot of the routes, most specific first, default last.
    pub fn routes(&self) -> Result<Vec<(IpNet, NextHop)>> {
        self.route_entries()
            .map(|e| Ok((self.block_of(e)?, e.data().cloned().unwrap_or_default())))
            .collect()
    }

    /// One row per hop per route.
    ///
    /// # Returns
    /// `(routes, default)`: the specific routes, most specific first, and the default route rows.
    pub fn flatten(&self) -> Result<(Vec<RouteRow>, Vec<RouteRow>)> {
        let specific: Vec<Entry<NextHop>> = self
            .table
            .iter()
            .rev()
            .flat_map(|b| b.entries().iter().cloned())
            .collect();
        let nets = rows_of(&specific, self.family)?;
        let gws = match &self.dgw {
            Some(d) => rows_of(std::slice::from_ref(d), self.family)?,
            None => Vec::new(),
        };
        Ok((nets, gws))
    }

    pub fn to_record(&self) -> Result<AddressTableRecord> {
        let mut buckets = Vec::new();
        for (prefix, bucket) in self.table.iter().enumerate().rev() {
            if bucket.is_empty() {
                continue;
            }
            buckets.push(BucketRecord {
                prefix: prefix as u8,
                list: bucket
                    .entries()
                    .iter()
                    .map(|e| e.to_record())
                    .collect::<Result<Vec<_>>>()?,
            });
        }
        let default_gw = match &self.dgw {
            Some(d) => Some(d.to_record()?),
            None => None,
        };
        Ok(AddressTableRecord {
            family: self.family,
            buckets,
            default_gw,
        })
    }

    /// Rebuild a table from its record. Every interval must be the block of its bucket's
    /// prefix length.
    pub fn from_record(record: &AddressTableRecord, registry: &PayloadRegistry<NextHop>) -> Result<Self> {
        let mut at = AddressTable::new(record.family);
        for bucket in &record.buckets {
            for r in &bucket.list {
                let e = Entry::from_record(r, registry)?;
                let net = at.block_of(&e)?;
                if net.prefix() != Some(bucket.prefix) || net.count() != e.count() {
                    return Err(AlgebraError::invalid_range(
                        e.low(),
                        e.high(),
                        "not a block of its bucket's prefix",
                    ));
                }
                at.push(&net, required_hop(&net, e)?)?;
            }
        }
        if let Some(r) = &record.default_gw {
            let e = Entry::from_record(r, registry)?;
            let net = at.block_of(&e)?;
            at.push(&net, required_hop(&net, e)?)?;
        }
        Ok(at)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_record()?)?)
    }

    /// Parse a table written by [`AddressTable::to_json`].
    ///
    /// # Returns
    /// * `Err(Parse)` - naming the JSON path that failed
    pub fn from_json(json: &str, registry: &PayloadRegistry<NextHop>) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(json);
        let record: AddressTableRecord = serde_path_to_error::deserialize(&mut de)
            .map_err(|e| AlgebraError::Parse(format!("table path={} error={}", e.path(), e)))?;
        AddressTable::from_record(&record, registry)
    }
}

fn required_hop(net: &IpNet, e: Entry<NextHop>) -> Result<NextHop> {
    e.into_data()
        .ok_or_else(|| AlgebraError::InvalidHop(format!("route {} has no next hop", net)))
}

impl Serialize for AddressTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_record()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl fmt::Display for AddressTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} table:", self.family)?;
        for e in self.route_entries() {
            let net = match self.block_of(e) {
                Ok(n) => n.to_string(),
                Err(_) => e.to_string(),
            };
            match e.data() {
                Some(nh) => writeln!(f, "  {} via {}", net, nh)?,
                None => writeln!(f, "  {}", net)?,
            }
        }
        Ok(())
    }
}
