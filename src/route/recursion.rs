//! Resolution of hops that name a gateway address but no interface.
//!
//! Every lookup runs against a copy of the table taken before any hop is rewritten, so the
//! result does not depend on route order. A gateway that resolves to another recursive hop is
//! an error, which also rules out cycles.

use super::hop::NextHop;
use super::result::MatchResult;
use super::table::AddressTable;
use crate::error::{AlgebraError, Result};
use crate::models::{parse_address, IpNet, Network};
use colored::Colorize;
use log::{error, info};

impl AddressTable {
    /// Host lookup of a gateway, default route allowed.
    fn lookup_gateway(&self, ip: &str) -> Result<MatchResult> {
        let addr = parse_address(ip)?;
        self.match_network(&Network::IpNet(IpNet::host(addr)), true, false)
    }

    /// Check that every recursive hop has a route to its gateway.
    ///
    /// # Returns
    /// * `Err(RecursionUnresolved)` - naming the first gateway with no full match
    pub fn validate_recursion(&self) -> Result<()> {
        for e in self.route_entries() {
            let hops = e.data().map(|nh| nh.hops()).unwrap_or_default();
            for hop in hops.iter().filter(|h| h.is_recursive()) {
                if !self.lookup_gateway(hop.ip())?.is_match() {
                    error!("route {} next hop {} has no route", e, hop.ip().red());
                    return Err(AlgebraError::RecursionUnresolved(format!(
                        "next hop {} matches no route",
                        hop.ip()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Give every recursive hop the interface of the route to its gateway.
    ///
    /// The first hop of the gateway's route supplies the interface, and its address too unless
    /// it is directly connected. Further hops of that route are appended as extra paths.
    /// Nothing is changed if any hop fails to resolve.
    ///
    /// # Returns
    /// The number of hops that were resolved.
    pub fn resolve_recursion(&mut self) -> Result<usize> {
        self.validate_recursion()?;
        // lookups read `self`, rewrites go to `staged`
        let mut staged = self.clone();
        let mut resolved = 0;
        for entry in staged.route_entries_mut() {
            let route = match Network::from_entry(&*entry, self.family()) {
                Ok(n) => n.to_string(),
                Err(_) => entry.to_string(),
            };
            if let Some(nh) = entry.data_mut() {
                resolved += resolve_next_hop(nh, self, &route)?;
            }
        }
        info!("{} table: {} recursive hops resolved", self.family(), resolved);
        *self = staged;
        Ok(resolved)
    }
}

fn resolve_next_hop(nh: &mut NextHop, snapshot: &AddressTable, route: &str) -> Result<usize> {
    let mut extra = Vec::new();
    let mut count = 0;
    for hop in nh.hops_mut().iter_mut() {
        if !hop.is_recursive() {
            continue;
        }
        let gateway = hop.ip().to_string();
        let result = snapshot.lookup_gateway(&gateway)?;
        if !result.is_match() {
            return Err(AlgebraError::RecursionUnresolved(format!(
                "next hop {} of {} matches no route",
                gateway, route
            )));
        }
        for fragment in result.matched().entries() {
            let via_hops = fragment.data().map(|d| d.hops()).unwrap_or_default();
            if via_hops.is_empty() {
                return Err(AlgebraError::RecursionUnresolved(format!(
                    "next hop {} of {} resolves to {} which has no next hop",
                    gateway, route, fragment
                )));
            }
            for (i, via) in via_hops.iter().enumerate() {
                if via.interface().is_empty() {
                    return Err(AlgebraError::RecursionUnresolved(format!(
                        "next hop {} of {} resolves to {} which has no interface",
                        gateway, route, via
                    )));
                }
                if i == 0 {
                    hop.set_interface(via.interface());
                    if !via.connected() {
                        hop.set_ip(via.ip());
                    }
                    info!("{} next hop {} resolved to {}", route, gateway.cyan(), hop);
                } else {
                    info!("{} next hop {} adds {}", route, gateway.cyan(), via);
                    extra.push(via.clone());
                }
            }
        }
        if hop.is_recursive() {
            return Err(AlgebraError::RecursionUnresolved(format!(
                "next hop {} of {} is still unresolved",
                gateway, route
            )));
        }
        count += 1;
    }
    nh.hops_mut().extend(extra);
    Ok(count)
}
