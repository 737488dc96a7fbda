mod addresses;
mod paths;
mod policy_equivalence;
mod routing_table;
mod synth;

use std::collections::BTreeSet;

use crate::net::{HostId, Network, RoutingTables, build_routing_tables};
use crate::policy::{Packet, Program, delivered_hosts, eval};
use crate::topo::fat_tree::{FatTreeOpts, build_ab_fat_tree};

/// 构建拓扑与路由表
fn build(fanout: usize, depth: usize) -> (Network, RoutingTables) {
    let opts = FatTreeOpts {
        fanout,
        depth,
        ..FatTreeOpts::default()
    };
    let net = build_ab_fat_tree(&opts).expect("valid fat-tree");
    let tables = build_routing_tables(&net).expect("routing tables");
    (net, tables)
}

/// 从 `src` 的接入端口注入一个发往 `dst` 的报文，返回最终交付到的主机
fn deliveries(net: &Network, program: &Program, src: HostId, dst: HostId) -> BTreeSet<HostId> {
    let (sw, port) = net.attachment(src).expect("attached host");
    let pkt = Packet::at(sw, port, net.host(src).mac, net.host(dst).mac);
    delivered_hosts(&eval(&program.to_policy(), pkt))
}

/// 断言程序对 `hosts` 中每个有序对都恰好交付到目的主机
fn assert_delivers_exactly(net: &Network, program: &Program, hosts: &[HostId]) {
    for &src in hosts {
        for &dst in hosts.iter().filter(|&&d| d != src) {
            assert_eq!(
                deliveries(net, program, src, dst),
                BTreeSet::from([dst]),
                "{src} -> {dst}"
            );
        }
    }
}

fn all_hosts(net: &Network) -> Vec<HostId> {
    net.hosts().iter().map(|h| h.id).collect()
}
