//! Route definition file.
//!
//! ```json
//! {"routes": [{"network": "10.0.0.0/8", "next_hops": [{"interface": "Gi0/1", "ip": "192.168.0.1"}]}]}
//! ```
//!
//! A hop with an address and no interface is recursive and is resolved once every route is in.

use crate::models::{IpFamily, IpNet, Network};
use crate::route::{AddressTable, NextHop};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteFile {
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub network: String,
    #[serde(default)]
    pub next_hops: Vec<HopSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HopSpec {
    #[serde(default)]
    pub interface: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<serde_json::Value>,
}

/// Read and parse a route definition file.
///
/// # Arguments
/// * `path` - JSON file to read
///
/// # Returns
/// * `Ok(RouteFile)` - The parsed routes, not yet validated
/// * `Err` - If the file is missing or the JSON does not fit, naming the failing path
pub fn load_route_file(path: &str) -> Result<RouteFile, Box<dyn Error>> {
    if !Path::new(path).exists() {
        return Err(format!("Route file does not exist: {path}").into());
    }
    log::info!("Reading route file: {path}");
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading route file {path}: {e}"))?;
    let deserializer = &mut serde_json::Deserializer::from_str(&json);
    let file: RouteFile = serde_path_to_error::deserialize(deserializer).map_err(|e| {
        format!(
            "Error parsing route file {path} path={} error={}",
            e.path(),
            e
        )
    })?;
    log::info!("# Got route count = {}", file.routes.len());
    Ok(file)
}

fn next_hop_of(spec: &RouteSpec) -> Result<NextHop, Box<dyn Error>> {
    let mut nh = NextHop::new();
    for h in &spec.next_hops {
        nh.add_hop(&h.interface, &h.ip, h.connected, false, h.tag.clone())
            .map_err(|e| format!("Route {}: {e}", spec.network))?;
    }
    if nh.is_empty() {
        return Err(format!("Route {} has no next hop", spec.network).into());
    }
    Ok(nh)
}

/// Build the IPv4 and IPv6 tables and resolve their recursive hops.
///
/// A network listed twice keeps its last next hop.
///
/// # Returns
/// * `Ok((v4, v6))` - The resolved tables
/// * `Err` - On a bad network or hop, or a recursive hop with no route
pub fn build_tables(file: &RouteFile) -> Result<(AddressTable, AddressTable), Box<dyn Error>> {
    let mut v4 = AddressTable::new(IpFamily::V4);
    let mut v6 = AddressTable::new(IpFamily::V6);

    for spec in &file.routes {
        let net = IpNet::parse(&spec.network)
            .map_err(|e| format!("Route {}: {e}", spec.network))?;
        let nh = next_hop_of(spec)?;
        let table = match net.family() {
            IpFamily::V4 => &mut v4,
            IpFamily::V6 => &mut v6,
        };
        if table.equal(&Network::IpNet(net)).is_some() {
            log::warn!("Route {} listed twice, keeping the last", spec.network.yellow());
        }
        table
            .push(&net, nh)
            .map_err(|e| format!("Route {}: {e}", spec.network))?;
    }

    for table in [&mut v4, &mut v6] {
        if table.is_empty() {
            continue;
        }
        let resolved = table.resolve_recursion()?;
        log::info!(
            "# {} table: {} routes, {} recursive hops resolved",
            table.family(),
            table.len(),
            resolved
        );
    }
    Ok((v4, v6))
}
