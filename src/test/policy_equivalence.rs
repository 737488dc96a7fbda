use super::{all_hosts, assert_delivers_exactly, build, deliveries};
use crate::net::{HostId, Network, RoutingTables};
use crate::policy::{EncodeOpts, KatKind, Program, Scope, encode};
use std::collections::BTreeSet;

fn encode_with(net: &Network, tables: &RoutingTables, kind: KatKind, scope: Scope) -> Program {
    let opts = EncodeOpts {
        kind,
        scope,
        ..EncodeOpts::default()
    };
    encode(net, tables, &opts).expect("encode")
}

// Compares delivered hosts only: `regular` ingress rules are tier-wide and
// unguarded, so an aggregation switch may also forward a packet upward.
#[test]
fn tables_and_regular_deliver_to_the_same_hosts() {
    for (fanout, depth) in [(4, 2), (4, 3)] {
        let (net, tables) = build(fanout, depth);
        let hosts = all_hosts(&net);
        let by_table = encode_with(&net, &tables, KatKind::Tables, Scope::Full);
        let regular = encode_with(&net, &tables, KatKind::Regular, Scope::Full);
        assert_delivers_exactly(&net, &by_table, &hosts);
        assert_delivers_exactly(&net, &regular, &hosts);
    }
}

#[test]
fn every_encoding_agrees_on_a_small_tree() {
    let (net, tables) = build(2, 3);
    let hosts = all_hosts(&net);
    let programs: Vec<Program> = [
        KatKind::Tables,
        KatKind::Regular,
        KatKind::Paths,
        KatKind::RealPaths,
        KatKind::RealNoIdPaths,
    ]
    .into_iter()
    .map(|kind| encode_with(&net, &tables, kind, Scope::Full))
    .collect();

    for &src in &hosts {
        for &dst in &hosts {
            if src == dst {
                continue;
            }
            let reference = deliveries(&net, &programs[0], src, dst);
            assert_eq!(reference, BTreeSet::from([dst]));
            for program in &programs[1..] {
                assert_eq!(deliveries(&net, program, src, dst), reference, "{src} -> {dst}");
            }
        }
    }
}

#[test]
fn test_tables_cover_the_first_two_pods_switches() {
    let (net, tables) = build(4, 3);
    let program = encode_with(&net, &tables, KatKind::TestTables, Scope::Full);
    let text = program.to_string();
    assert!(text.contains("filter switch = 9 and ethDst = 00:00:00:00:00:03; port := 2"));
    assert!(!text.contains("switch = 17"));
    assert_delivers_exactly(&net, &program, &[HostId(1), HostId(3), HostId(4)]);
}

#[test]
fn local_scope_drops_the_topology_relation() {
    let (net, tables) = build(4, 3);
    for kind in [KatKind::Tables, KatKind::Regular] {
        let full = encode_with(&net, &tables, kind, Scope::Full);
        let local = encode_with(&net, &tables, kind, Scope::Local);
        let Program::Flat(rules) = &local else {
            panic!("{kind} local scope is flat");
        };
        assert_eq!(rules.len(), full.rule_count());
        assert!(!local.to_string().contains("=>"));
    }
}

#[test]
fn table_rules_follow_switch_order() {
    let (net, tables) = build(4, 2);
    let local = encode_with(&net, &tables, KatKind::Tables, Scope::Local);
    let Program::Flat(rules) = &local else {
        panic!("local scope is flat");
    };
    assert_eq!(
        rules[0].to_string(),
        "filter switch = 1 and port = 1 and not ethDst = 00:00:00:00:00:01 \
         and not ethDst = 00:00:00:00:00:02; port := 3"
    );
    // The edge host entries close the rule list.
    assert_eq!(
        rules.last().unwrap().to_string(),
        "filter switch = 4 and ethDst = 00:00:00:00:00:08; port := 2"
    );
}

#[test]
fn topology_relation_is_grouped_by_source_switch() {
    let (net, tables) = build(4, 2);
    let program = encode_with(&net, &tables, KatKind::Tables, Scope::Full);
    let Program::Iterated { topo, .. } = &program else {
        panic!("full scope iterates");
    };
    let first: Vec<String> = topo.iter().take(3).map(|l| l.to_string()).collect();
    assert_eq!(first, vec!["1@3 => 5@1", "1@4 => 6@1", "2@3 => 5@2"]);
    assert_eq!(topo.len(), 16);
}

#[test]
fn regular_writes_each_tier_rule_once() {
    let (net, tables) = build(4, 3);
    let regular = encode_with(&net, &tables, KatKind::Regular, Scope::Local);
    let by_table = encode_with(&net, &tables, KatKind::Tables, Scope::Local);
    assert!(regular.rule_count() < by_table.rule_count());

    let Program::Flat(rules) = &regular else {
        panic!("local scope is flat");
    };
    assert!(rules[0].to_string().starts_with(
        "((filter switch = 17 | filter switch = 18 | filter switch = 19 | filter switch = 20); \
         (filter ethDst = 00:00:00:00:00:01; port := 1 | "
    ));
    assert_eq!(
        rules[1].to_string(),
        "((filter switch = 9 | filter switch = 10 | filter switch = 11 | filter switch = 12 | \
         filter switch = 13 | filter switch = 14 | filter switch = 15 | filter switch = 16); \
         (filter port = 1; port := 3 | filter port = 2; port := 4))"
    );
}
