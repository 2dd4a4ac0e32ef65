//! Forwarding decisions carried on routing table intervals.

use crate::error::{AlgebraError, Result};
use crate::flexrange::{Payload, PayloadRegistry};
use crate::models::parse_address;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag used for [`NextHop`] payload records.
pub const NEXT_HOP_TAG: &str = "NextHop";

/// One way out: an interface, a gateway address, or both.
///
/// An empty interface with an address set marks a recursive hop that is resolved against the
/// table it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    #[serde(default)]
    interface: String,
    #[serde(default)]
    ip: String,
    #[serde(default)]
    connected: bool,
    #[serde(default)]
    default_gw: bool,
    /// Opaque caller data, e.g. a virtual system name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<serde_json::Value>,
}

impl Hop {
    /// # Returns
    /// * `Err(InvalidHop)` - if `ip` is set but not an address, a gateway hop has no address,
    ///   or a connected hop has no interface
    pub fn new(
        interface: &str,
        ip: &str,
        connected: bool,
        default_gw: bool,
        tag: Option<serde_json::Value>,
    ) -> Result<Hop> {
        let hop = Hop {
            interface: interface.to_string(),
            ip: ip.to_string(),
            connected,
            default_gw,
            tag,
        };
        hop.validate()?;
        Ok(hop)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.ip.is_empty() && parse_address(&self.ip).is_err() {
            return Err(AlgebraError::InvalidHop(format!("{}: bad address", self)));
        }
        if !self.connected && self.ip.is_empty() {
            return Err(AlgebraError::InvalidHop(format!("{}: gateway address required", self)));
        }
        if self.connected && self.interface.is_empty() {
            return Err(AlgebraError::InvalidHop(format!("{}: interface required", self)));
        }
        Ok(())
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn default_gw(&self) -> bool {
        self.default_gw
    }

    pub fn tag(&self) -> Option<&serde_json::Value> {
        self.tag.as_ref()
    }

    /// Needs a lookup in its own table before it can forward.
    pub fn is_recursive(&self) -> bool {
        self.interface.is_empty() && !self.ip.is_empty()
    }

    pub(crate) fn set_interface(&mut self, interface: &str) {
        self.interface = interface.to_string();
    }

    pub(crate) fn set_ip(&mut self, ip: &str) {
        self.ip = ip.to_string();
    }

    pub(crate) fn set_default_gw(&mut self, default_gw: bool) {
        self.default_gw = default_gw;
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{interface:{}, ip:{}, connected:{}, default_gw:{}}}",
            self.interface, self.ip, self.connected, self.default_gw
        )
    }
}

/// Ordered hops of one route. More than one hop means equal cost paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextHop {
    #[serde(default)]
    next: Vec<Hop>,
}

impl NextHop {
    pub fn new() -> Self {
        NextHop { next: Vec::new() }
    }

    pub fn from_hops(hops: Vec<Hop>) -> Self {
        NextHop { next: hops }
    }

    /// Validate and append one hop.
    pub fn add_hop(
        &mut self,
        interface: &str,
        ip: &str,
        connected: bool,
        default_gw: bool,
        tag: Option<serde_json::Value>,
    ) -> Result<&Hop> {
        let hop = Hop::new(interface, ip, connected, default_gw, tag)?;
        self.next.push(hop);
        Ok(&self.next[self.next.len() - 1])
    }

    pub fn push(&mut self, hop: Hop) {
        self.next.push(hop);
    }

    pub fn hops(&self) -> &[Hop] {
        &self.next
    }

    pub(crate) fn hops_mut(&mut self) -> &mut Vec<Hop> {
        &mut self.next
    }

    pub fn count(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    /// Interface of every hop, in order, duplicates kept.
    pub fn out_interfaces(&self) -> Vec<&str> {
        self.next.iter().map(|h| h.interface()).collect()
    }

    /// Gateway addresses reached through `interface`.
    pub fn next_ip(&self, interface: &str) -> Vec<&str> {
        self.next
            .iter()
            .filter(|h| h.interface == interface && !h.ip.is_empty())
            .map(|h| h.ip())
            .collect()
    }

    /// True if every hop is directly connected.
    pub fn is_connected(&self) -> bool {
        !self.next.is_empty() && self.next.iter().all(|h| h.connected)
    }

    /// True if every hop belongs to the default route.
    pub fn is_default_gw(&self) -> bool {
        !self.next.is_empty() && self.next.iter().all(|h| h.default_gw)
    }

    /// The interface shared by every hop, if there is a non-empty one.
    pub fn same_interface(&self) -> Option<&str> {
        let first = self.next.first()?.interface();
        if first.is_empty() || self.next.iter().any(|h| h.interface != first) {
            return None;
        }
        Some(first)
    }

    /// The gateway address shared by every hop, if there is a non-empty one.
    pub fn same_ip(&self) -> Option<&str> {
        let first = self.next.first()?.ip();
        if first.is_empty() || self.next.iter().any(|h| h.ip != first) {
            return None;
        }
        Some(first)
    }
}

impl Payload for NextHop {
    fn tag(&self) -> &str {
        NEXT_HOP_TAG
    }

    fn to_property(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl fmt::Display for NextHop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.next.iter().join(","))
    }
}

fn decode_next_hop(value: &serde_json::Value) -> Result<NextHop> {
    let nh: NextHop = serde_json::from_value(value.clone())?;
    for h in nh.hops() {
        h.validate()?;
    }
    Ok(nh)
}

/// Registry that reads [`NextHop`] payloads back from table records.
pub fn next_hop_registry() -> PayloadRegistry<NextHop> {
    PayloadRegistry::new().with(NEXT_HOP_TAG, decode_next_hop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flexrange::ExtendData;

    #[test]
    fn test_hop_validation() {
        assert!(Hop::new("Gi0/1", "", true, false, None).is_ok());
        assert!(Hop::new("", "10.0.0.1", false, false, None).is_ok());
        assert!(Hop::new("Gi0/1", "10.0.0.1", false, false, None).is_ok());
        // gateway hop needs an address
        assert!(Hop::new("Gi0/1", "", false, false, None).is_err());
        // connected hop needs an interface
        assert!(Hop::new("", "10.0.0.1", true, false, None).is_err());
        assert!(matches!(
            Hop::new("Gi0/1", "10.0.0.300", false, false, None),
            Err(AlgebraError::InvalidHop(_))
        ));
    }

    #[test]
    fn test_next_hop_queries() {
        let mut nh = NextHop::new();
        nh.add_hop("Gi0/1", "10.0.0.1", false, false, None).unwrap();
        nh.add_hop("Gi0/1", "10.0.0.2", false, false, None).unwrap();
        nh.add_hop("Gi0/2", "10.0.1.1", false, false, None).unwrap();

        assert_eq!(nh.count(), 3);
        assert_eq!(nh.out_interfaces(), vec!["Gi0/1", "Gi0/1", "Gi0/2"]);
        assert_eq!(nh.next_ip("Gi0/1"), vec!["10.0.0.1", "10.0.0.2"]);
        assert!(nh.same_interface().is_none());
        assert!(nh.same_ip().is_none());
        assert!(!nh.is_connected());
        assert!(!nh.is_default_gw());
    }

    #[test]
    fn test_same_interface_and_ip() {
        let mut nh = NextHop::new();
        assert!(nh.same_interface().is_none());
        nh.add_hop("Gi0/1", "10.0.0.1", false, false, None).unwrap();
        nh.add_hop("Gi0/1", "10.0.0.1", false, false, None).unwrap();
        assert_eq!(nh.same_interface(), Some("Gi0/1"));
        assert_eq!(nh.same_ip(), Some("10.0.0.1"));

        let connected = NextHop::from_hops(vec![Hop::new("Gi0/3", "", true, false, None).unwrap()]);
        assert!(connected.is_connected());
        assert!(connected.same_ip().is_none());
    }

    #[test]
    fn test_payload_round_trip() {
        let mut nh = NextHop::new();
        nh.add_hop("", "20.1.1.254", false, false, Some(serde_json::json!("vsys1")))
            .unwrap();
        let ext = nh.to_extend_data().unwrap();
        assert_eq!(ext.kind, "NextHop");
        assert_eq!(ext.property["next"][0]["ip"], "20.1.1.254");

        let back = next_hop_registry().decode(&ext).unwrap();
        assert_eq!(back, nh);
        assert_eq!(back.hops()[0].tag(), Some(&serde_json::json!("vsys1")));
    }

    #[test]
    fn test_registry_rejects_bad_records() {
        let registry = next_hop_registry();
        let unknown = ExtendData {
            kind: "Other".to_string(),
            property: serde_json::Value::Null,
        };
        assert!(matches!(registry.decode(&unknown), Err(AlgebraError::UnknownVariantTag(_))));

        let invalid = ExtendData {
            kind: NEXT_HOP_TAG.to_string(),
            property: serde_json::json!({"next": [{"interface": "Gi0/1"}]}),
        };
        assert!(matches!(registry.decode(&invalid), Err(AlgebraError::InvalidHop(_))));
    }

    #[test]
    fn test_display() {
        let nh = NextHop::from_hops(vec![Hop::new("Gi0/3", "", true, true, None).unwrap()]);
        assert_eq!(
            nh.to_string(),
            "[{interface:Gi0/3, ip:, connected:true, default_gw:true}]"
        );
    }
}
