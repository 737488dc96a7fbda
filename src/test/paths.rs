use super::{all_hosts, assert_delivers_exactly, build};
use crate::net::{HostId, SwitchId};
use crate::policy::{EncodeOpts, Hop, KatKind, Program, Scope, encode, trace_path};

fn encode_kind(fanout: usize, depth: usize, kind: KatKind) -> (crate::net::Network, Program) {
    let (net, tables) = build(fanout, depth);
    let opts = EncodeOpts {
        kind,
        ..EncodeOpts::default()
    };
    let program = encode(&net, &tables, &opts).expect("encode");
    (net, program)
}

#[test]
fn traces_follow_links_from_source_to_destination_edge() {
    let (net, tables) = build(4, 3);
    let levels = 2;
    for src in all_hosts(&net) {
        for dst in all_hosts(&net).into_iter().filter(|&d| d != src) {
            let path = trace_path(&net, &tables, src, dst).unwrap();
            assert!(path.hops.len() <= 2 * levels + 1, "{src} -> {dst} too long");

            let first = path.hops[0];
            assert_eq!((first.switch, first.in_port), net.attachment(src).unwrap());

            for pair in path.hops.windows(2) {
                let next = net.next_switch(pair[0].switch, pair[0].out_port).unwrap();
                assert_eq!(pair[0].next, Some(next));
                assert_eq!((pair[1].switch, pair[1].in_port), next);
            }

            let last = path.last().unwrap();
            assert_eq!(last.next, None);
            assert_eq!((last.switch, last.out_port), net.attachment(dst).unwrap());
        }
    }
}

#[test]
fn hosts_on_one_edge_switch_take_a_single_hop() {
    let (net, tables) = build(4, 3);
    let path = trace_path(&net, &tables, HostId(1), HostId(2)).unwrap();
    assert_eq!(
        path.hops,
        vec![Hop {
            switch: SwitchId(1),
            in_port: 1,
            out_port: 2,
            next: None,
        }]
    );
    assert!(path.transit().is_empty());
}

#[test]
fn cross_pod_trace_climbs_to_the_core() {
    let (net, tables) = build(4, 3);
    let path = trace_path(&net, &tables, HostId(1), HostId(16)).unwrap();
    let tiers: Vec<usize> = path.switches().map(|s| net.switch(s).level).collect();
    assert_eq!(tiers, vec![0, 1, 2, 1, 0]);
    assert_eq!(path.hops[0].out_port, 3);
}

#[test]
fn path_programs_deliver_to_the_destination_only() {
    for kind in [KatKind::Paths, KatKind::RealPaths, KatKind::RealNoIdPaths] {
        for (fanout, depth) in [(4, 2), (4, 3)] {
            let (net, program) = encode_kind(fanout, depth, kind);
            assert_delivers_exactly(&net, &program, &all_hosts(&net));
        }
    }
}

#[test]
fn path_program_shapes() {
    let (_, paths) = encode_kind(4, 2, KatKind::Paths);
    assert!(matches!(paths, Program::Iterated { .. }));
    assert!(paths.to_string().contains("))*;\n"));

    let (_, real) = encode_kind(4, 2, KatKind::RealPaths);
    assert!(matches!(&real, Program::Unrolled { policy, .. } if policy[0].to_string() == "id"));
    assert!(real.to_string().starts_with("(\nid |\n"));

    let (_, noid) = encode_kind(4, 2, KatKind::RealNoIdPaths);
    let Program::Flat(rules) = &noid else {
        panic!("realnoidpaths is a flat union");
    };
    assert_eq!(rules.len(), 8 * 7);
    assert_eq!(
        rules[0].to_string(),
        "(filter ethSrc = 00:00:00:00:00:01; filter ethDst = 00:00:00:00:00:02; \
         filter switch = 1; port := 2; 1@2 => 0@2)"
    );
}

#[test]
fn test_subsets_restrict_hosts() {
    let (net, program) = encode_kind(4, 3, KatKind::TestPaths);
    // h1 and h2 share s1, so no switch-to-switch link is needed.
    let Program::Iterated { policy, topo, edge_policy, .. } = &program else {
        panic!("testpaths iterates over the topology");
    };
    assert!(policy.is_empty());
    assert_eq!(topo.len(), 1);
    assert_eq!(topo[0].to_string(), "id");
    assert_eq!(edge_policy.len(), 2);
    assert_delivers_exactly(&net, &program, &[HostId(1), HostId(2)]);

    for kind in [KatKind::TestPaths2, KatKind::TestRealPaths2, KatKind::TestRealNoIdPaths2] {
        let (net, program) = encode_kind(4, 3, kind);
        assert_delivers_exactly(&net, &program, &[HostId(1), HostId(4)]);
    }
}

#[test]
fn local_scope_flattens_path_programs() {
    let (net, tables) = build(4, 2);
    let opts = EncodeOpts {
        kind: KatKind::Paths,
        scope: Scope::Local,
        ..EncodeOpts::default()
    };
    let program = encode(&net, &tables, &opts).unwrap();
    assert!(matches!(program, Program::Flat(_)));
    assert!(!program.to_string().contains("=>"));
}
