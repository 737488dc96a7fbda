use super::build;
use crate::net::{HostId, RouteKey, SwitchId, Tier};
use std::collections::BTreeSet;

#[test]
fn edge_and_core_tables_for_fanout_four_depth_two() {
    let (_, tables) = build(4, 2);

    let s1: Vec<_> = tables.table(SwitchId(1)).iter().collect();
    assert_eq!(
        s1,
        vec![
            (RouteKey::Host(HostId(1)), 1),
            (RouteKey::Host(HostId(2)), 2),
            (RouteKey::InPort(1), 3),
            (RouteKey::InPort(2), 4),
        ]
    );

    let core = tables.table(SwitchId(5));
    assert_eq!(core.in_port_routes().count(), 0, "core has no default routes");
    let ports: Vec<_> = (1..=8).map(|h| core.host_route(HostId(h)).unwrap()).collect();
    assert_eq!(ports, vec![1, 1, 2, 2, 3, 3, 4, 4]);
}

#[test]
fn aggregation_and_core_tables_for_fanout_four_depth_three() {
    let (_, tables) = build(4, 3);

    let s9: Vec<_> = tables.table(SwitchId(9)).iter().collect();
    assert_eq!(
        s9,
        vec![
            (RouteKey::Host(HostId(1)), 1),
            (RouteKey::Host(HostId(2)), 1),
            (RouteKey::Host(HostId(3)), 2),
            (RouteKey::Host(HostId(4)), 2),
            (RouteKey::InPort(1), 3),
            (RouteKey::InPort(2), 4),
        ]
    );

    let s17 = tables.table(SwitchId(17));
    let ports: Vec<_> = (1..=16).map(|h| s17.host_route(HostId(h)).unwrap()).collect();
    assert_eq!(ports, vec![1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4]);
}

#[test]
fn tables_reference_only_valid_ports() {
    for (fanout, depth) in [(2, 3), (4, 2), (4, 3), (6, 3), (4, 4)] {
        let (net, tables) = build(fanout, depth);
        let p = net.p();
        for (sw, table) in tables.iter() {
            let egress: BTreeSet<usize> = table.iter().map(|(_, port)| port).collect();
            assert!(egress.len() <= 2 * p, "{sw} uses too many ports");
            assert!(
                egress.iter().all(|&port| (1..=2 * p).contains(&port)),
                "{sw} egress {egress:?} outside 1..={}",
                2 * p
            );
        }
    }
}

#[test]
fn host_entries_cover_exactly_the_descendants() {
    for (fanout, depth) in [(2, 3), (4, 2), (4, 3), (6, 3)] {
        let (net, tables) = build(fanout, depth);
        for sw in net.switches() {
            let routed: BTreeSet<HostId> = tables.table(sw.id).host_routes().map(|(h, _)| h).collect();
            assert_eq!(routed, net.hosts_below(sw.id), "{} host entries", sw.id);
        }
        for sw in net.tier(Tier::Core) {
            assert_eq!(tables.table(sw.id).host_routes().count(), net.hosts().len());
        }
    }
}

#[test]
fn non_core_switches_default_upward_by_mirrored_port() {
    let (net, tables) = build(6, 3);
    let p = net.p();
    for sw in net.switches() {
        let defaults: Vec<_> = tables.table(sw.id).in_port_routes().collect();
        if sw.tier == Tier::Core {
            assert!(defaults.is_empty());
        } else {
            let expected: Vec<_> = (1..=p).map(|k| (k, p + k)).collect();
            assert_eq!(defaults, expected, "{} defaults", sw.id);
        }
        if sw.tier == Tier::Aggregation {
            assert!(tables.table(sw.id).host_routes().all(|(_, port)| port <= p));
        }
    }
}

#[test]
fn next_port_prefers_host_entries() {
    let (_, tables) = build(4, 3);
    let s9 = tables.table(SwitchId(9));
    // h1 sits below s9: the host entry wins whatever the ingress port.
    assert_eq!(s9.next_port(HostId(1), 1), Some(1));
    assert_eq!(s9.next_port(HostId(1), 3), Some(1));
    // h16 does not: fall back to the ingress-port default.
    assert_eq!(s9.next_port(HostId(16), 2), Some(4));
    assert_eq!(s9.next_port(HostId(16), 3), None);
}

#[test]
fn routing_tables_are_reproducible() {
    let (_, a) = build(6, 3);
    let (_, b) = build(6, 3);
    assert_eq!(a, b);
}
