use crate::Error;
use crate::policy::{Failover, KatKind, Scope};
use crate::synth::{GenOpts, synthesize};
use crate::viz::GraphNode;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

fn opts(fanout: usize, depth: usize, kind: KatKind) -> GenOpts {
    GenOpts {
        fanout,
        depth,
        kind,
        ..GenOpts::default()
    }
}

#[test]
fn invalid_options_fail_before_building() {
    assert!(matches!(
        synthesize(&opts(4, 2, KatKind::TestTables)),
        Err(Error::SubsetOutOfRange {
            kind: KatKind::TestTables,
            what: "switch",
            index: 8,
            len: 6,
        })
    ));
    assert!(matches!(
        synthesize(&opts(2, 2, KatKind::TestPaths2)),
        Err(Error::SubsetOutOfRange {
            what: "host",
            index: 3,
            len: 2,
            ..
        })
    ));
    assert!(matches!(synthesize(&opts(3, 3, KatKind::Tables)), Err(Error::OddFanout(3))));

    let fail_paths = GenOpts {
        failover: Failover::Fail,
        ..opts(4, 3, KatKind::Paths)
    };
    assert!(matches!(
        fail_paths.validate(),
        Err(Error::UnsupportedEncodingCombination {
            kind: KatKind::Paths,
            failover: Failover::Fail,
        })
    ));
}

#[test]
fn generation_is_reproducible() {
    for kind in [KatKind::Tables, KatKind::Regular, KatKind::RealPaths] {
        let a = synthesize(&opts(4, 3, kind)).unwrap();
        let b = synthesize(&opts(4, 3, kind)).unwrap();
        assert_eq!(a.policy_text(), b.policy_text(), "{kind}");
        assert_eq!(a.topology_json().unwrap(), b.topology_json().unwrap());
    }
}

#[test]
fn graph_lists_switches_then_hosts() {
    let generated = synthesize(&opts(4, 2, KatKind::Tables)).unwrap();
    let graph = &generated.graph;
    assert_eq!(graph.nodes.len(), 6 + 8);
    assert_eq!(graph.switch_count(), 6);
    assert_eq!(graph.links.len(), generated.network.links().len());
    assert_eq!(graph.links.len(), 32);

    match &graph.nodes[6] {
        GraphNode::Host { name, mac, ip, .. } => {
            assert_eq!(name, "h1");
            assert_eq!(mac, "00:00:00:00:00:01");
            assert_eq!(ip, "10.0.0.1");
        }
        other => panic!("expected h1, got {other:?}"),
    }

    let json: serde_json::Value = serde_json::from_str(&generated.topology_json().unwrap()).unwrap();
    assert_eq!(json["nodes"][0]["type"], "switch");
    assert_eq!(json["nodes"][0]["tier"], "edge");
    assert_eq!(json["nodes"][5]["tier"], "core");
    assert_eq!(json["links"][0]["src"], "h1");
    assert_eq!(json["links"][0]["capacity"], "1Gbps");
}

#[test]
fn outputs_are_written_to_files() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("abft-rs-synth-{}-{nanos}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    let generated = synthesize(&GenOpts {
        scope: Scope::Local,
        ..opts(4, 2, KatKind::Regular)
    })
    .unwrap();
    let topo = dir.join("topo.json");
    let kat = dir.join("policy.kat");
    generated.write_topology(&topo).unwrap();
    generated.write_policy(&kat).unwrap();

    assert_eq!(fs::read_to_string(&kat).unwrap(), generated.policy_text());
    let parsed: crate::viz::TopoGraph = serde_json::from_str(&fs::read_to_string(&topo).unwrap()).unwrap();
    assert_eq!(parsed, generated.graph);

    let _ = fs::remove_dir_all(&dir);
}
