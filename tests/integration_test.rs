//! Integration tests for network-algebra
//!
//! These tests drive the public API from route files and group text to lookups and reports.

use network_algebra::{
    flexrange::DataRange,
    input::{build_tables, load_route_file},
    models::{parse_address, to_integer, AddressSet, IpFamily, IpNet, IpRange, Network, NetworkGroup},
    processing::{compare_groups, range_to_cidrs, supernet, translate},
    route::{next_hop_registry, AddressTable},
    AlgebraError,
};

#[test]
fn test_full_workflow_with_route_file() {
    let file = load_route_file("src/tests/test_data/routes_01.json")
        .expect("Failed to read route file");
    let (v4, v6) = build_tables(&file).expect("Failed to build tables");

    // a query spanning a recursive route and the default
    let q = Network::parse("172.16.0.0/11").unwrap();
    let r = v4.match_network(&q, true, false).unwrap();
    assert!(r.is_match());
    let rows = r.rows().unwrap();
    assert!(rows
        .iter()
        .any(|row| row.net == "172.16.0.0/12" && row.interface == "Gi0/1" && !row.default_gw));
    assert!(rows
        .iter()
        .any(|row| row.net == "172.0.0.0/12" && row.interface == "Gi0/0" && row.default_gw));

    // without the default the same query is only half matched
    let r = v4.match_network(&q, false, false).unwrap();
    assert!(!r.is_match());
    assert_eq!(r.unmatched_ranges().unwrap()[0].to_string(), "172.0.0.0-172.15.255.255");

    // resolved tables survive a JSON round trip
    for table in [&v4, &v6] {
        let json = table.to_json().expect("Failed to write table");
        let back = AddressTable::from_json(&json, &next_hop_registry()).expect("Failed to read table");
        assert_eq!(&back, table);
    }
}

#[test]
fn test_longest_prefix_match() {
    let file = load_route_file("src/tests/test_data/routes_01.json")
        .expect("Failed to read route file");
    let (v4, _) = build_tables(&file).expect("Failed to build tables");

    let r = v4
        .match_network(&Network::parse("10.148.254.0/23").unwrap(), true, false)
        .unwrap();
    assert!(r.is_match());
    assert_eq!(r.matched().len(), 1);
    assert_eq!(v4.output_interfaces(&Network::parse("10.148.254.0/23").unwrap()), vec!["Gi0/2", "Gi0/3"]);

    let r = v4
        .match_network(&Network::parse("10.0.0.0/8").unwrap(), true, false)
        .unwrap();
    assert!(r.is_match());
    // the /23 sits inside the /8 and splits it around itself
    let matched = r.matched().entries();
    assert_eq!(matched.len(), 3);
    let total: num_bigint::BigUint = matched.iter().map(|e| e.count()).sum();
    assert_eq!(total, num_bigint::BigUint::from(1u32 << 24));
    assert_eq!(
        matched
            .iter()
            .filter(|e| e.data().and_then(|nh| nh.same_interface()) == Some("Gi0/1"))
            .count(),
        2
    );
}

#[test]
fn test_unresolved_route_file() {
    let file = load_route_file("src/tests/test_data/routes_unresolved.json")
        .expect("Failed to read route file");
    assert!(build_tables(&file).is_err());
}

#[test]
fn test_group_compare_and_translate() {
    let this = NetworkGroup::parse("10.0.0.0/24,2001:db8::/64").unwrap();
    let other = NetworkGroup::parse("10.0.0.128/25,10.0.1.0/24").unwrap();
    let (left, mid, right) = compare_groups(&this, &other).unwrap();

    let left = left.expect("left side");
    assert_eq!(left.string_list(), vec!["10.0.0.0/25", "2001:db8::/64"]);
    assert_eq!(mid.expect("shared").string_list(), vec!["10.0.0.128/25"]);
    assert_eq!(right.expect("right side").string_list(), vec!["10.0.1.0/24"]);

    let pool = NetworkGroup::parse("192.0.2.0/24,2001:db8:ffff::/48").unwrap();
    let out = translate(&this, &pool).unwrap();
    assert_eq!(out, pool);

    assert!(matches!(
        translate(&this, &NetworkGroup::parse("192.0.2.0/24").unwrap()),
        Err(AlgebraError::TranslatorFamilyMissing(IpFamily::V6))
    ));
}

#[test]
fn test_range_to_cidrs_properties() {
    let cases = [
        ("10.0.0.1", "10.0.0.6"),
        ("0.0.0.0", "255.255.255.255"),
        ("192.168.1.255", "192.168.3.0"),
        ("2001:db8::1", "2001:db8::1:0"),
        ("::", "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"),
    ];
    for (a, b) in cases {
        let start = parse_address(a).unwrap();
        let end = parse_address(b).unwrap();
        let blocks = range_to_cidrs(&start, &end).unwrap();

        // blocks tile the range in order, without gaps
        assert_eq!(to_integer(&blocks[0].first()), to_integer(&start));
        assert_eq!(to_integer(&blocks[blocks.len() - 1].last()), to_integer(&end));
        for pair in blocks.windows(2) {
            assert_eq!(to_integer(&pair[0].last()) + 1u32, to_integer(&pair[1].first()));
        }

        // the supernet covers every block
        let sup = supernet(&IpRange::new(start, end).unwrap()).unwrap();
        assert!(blocks.iter().all(|b| sup.matches(b)));
    }
}

#[test]
fn test_aggregate_is_idempotent() {
    let g = NetworkGroup::parse("10.0.0.0/25,10.0.0.128/25,10.0.1.0-10.0.1.9,::1,::2-::3").unwrap();
    let once = g.aggregate().unwrap();
    assert_eq!(once.aggregate().unwrap(), once);
    assert_eq!(once.count().unwrap(), g.count().unwrap());
    assert!(once.same(&g));
    assert_eq!(once.ipv6().len(), 2);
}

#[test]
fn test_data_range_union_difference() {
    let net = |s: &str| IpNet::parse(s).unwrap().data_range().unwrap();
    let mut a: DataRange = net("10.0.0.0/16");
    let b = net("10.0.128.0/17");
    let removed = a.difference(&b).unwrap();
    assert!(removed.same(&b));
    assert_eq!(a.count(), num_bigint::BigUint::from(1u32 << 15));
    assert!(a.union(&removed).unwrap().same(&net("10.0.0.0/16")));
}
