//! 按交换机逐表编码
//!
//! 每个 (交换机, 表项) 生成一条受保护赋值。edge 层的主机表项单独放入 edge 策略，
//! 只在最后一跳（交付给主机前）使用。入端口表项额外要求目的地不在本交换机下方。

use std::collections::BTreeSet;

use tracing::debug;

use super::ast::{Policy, Pred, Program};
use super::relation;
use crate::error::Result;
use crate::net::{Network, RouteKey, RoutingTables, SwitchId};

/// 入端口默认路由的匹配条件：交换机、入端口、目的地不在本交换机下方
pub(crate) fn in_port_guard(net: &Network, sw: SwitchId, in_port: usize) -> Pred {
    net.hosts_below(sw)
        .into_iter()
        .fold(Pred::switch(sw).and(Pred::port(in_port)), |acc, h| {
            acc.and(Pred::eth_dst(net.host(h).mac).negate())
        })
}

pub(crate) fn encode_tables(
    net: &Network,
    tables: &RoutingTables,
    switches: &[SwitchId],
    with_topo: bool,
) -> Result<Program> {
    let mut policy = Vec::new();
    let mut edge_policy = Vec::new();

    for &sw in switches {
        let at_edge = net.switch(sw).level == 0;
        for (key, port) in tables.table(sw).iter() {
            match key {
                RouteKey::Host(h) => {
                    let rule =
                        Policy::guarded(Pred::switch(sw).and(Pred::eth_dst(net.host(h).mac)), port);
                    if at_edge {
                        edge_policy.push(rule);
                    } else {
                        policy.push(rule);
                    }
                }
                RouteKey::InPort(k) => policy.push(Policy::guarded(in_port_guard(net, sw, k), port)),
            }
        }
    }
    debug!(rules = policy.len(), edge_rules = edge_policy.len(), "逐表编码");

    finish(net, switches, policy, edge_policy, with_topo)
}

/// 按需拼接拓扑关系：链路至少一端在 `switches` 中，主机接入在 `switches` 中
pub(crate) fn finish(
    net: &Network,
    switches: &[SwitchId],
    mut policy: Vec<Policy>,
    edge_policy: Vec<Policy>,
    with_topo: bool,
) -> Result<Program> {
    if !with_topo {
        policy.extend(edge_policy);
        return Ok(Program::Flat(policy));
    }
    let members: BTreeSet<SwitchId> = switches.iter().copied().collect();
    let topo = relation::switch_links(net, |a, b| members.contains(&a) || members.contains(&b));
    let edge_topo = relation::host_links(net, |sw| members.contains(&sw))?;
    Ok(Program::Iterated {
        policy,
        topo,
        edge_policy,
        edge_topo,
    })
}
