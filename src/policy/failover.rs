//! 带故障切换的逐表编码
//!
//! 每条规则的出端口变成主端口与备份端口之间的非确定选择 `(port := v + port := b)`，
//! 备份端口为 `((v - base) mod width) + 1 + base`：
//!
//! | 表项                  | base | width |
//! |-----------------------|------|-------|
//! | 入端口默认路由（上行） | p    | p     |
//! | aggregation 主机表项  | 0    | p     |
//! | core 主机表项          | 0    | 2p    |
//!
//! 下行备份会把报文送到另一台下层交换机 `r`，因此还要在 `r` 上补一条规则：
//! 从本交换机进入、去往同一主机的报文转发给 `r` 在本层的另一个邻居，
//! 由它按正常表项继续向下。

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::ast::{Policy, Pred, Program};
use super::tables::{finish, in_port_guard};
use crate::error::{Error, Result};
use crate::net::{HostId, Network, NodeId, Port, RoutingTables, SwitchId, Tier};

/// 主端口 `primary` 在 `base+1..=base+width` 中循环取下一个
pub fn backup_port(primary: Port, base: Port, width: Port) -> Port {
    ((primary - base) % width) + 1 + base
}

pub(crate) fn encode_tables_failover(
    net: &Network,
    tables: &RoutingTables,
    switches: &[SwitchId],
    with_topo: bool,
    specialize_in_port: bool,
) -> Result<Program> {
    let p = net.p();
    let members: BTreeSet<SwitchId> = switches.iter().copied().collect();
    let mut policy = Vec::new();
    let mut edge_policy = Vec::new();

    for tier in [Tier::Edge, Tier::Aggregation, Tier::Core] {
        for sw in net.tier(tier).iter().filter(|s| members.contains(&s.id)) {
            let table = tables.table(sw.id);

            for (k, v) in table.in_port_routes() {
                let rule = Policy::Seq(vec![
                    Policy::filter(in_port_guard(net, sw.id, k)),
                    choice(v, backup_port(v, p, p)),
                ]);
                policy.push(rule.group());
            }

            let width = match tier {
                Tier::Edge => {
                    for (h, v) in table.host_routes() {
                        let rule =
                            Policy::guarded(Pred::switch(sw.id).and(Pred::eth_dst(net.host(h).mac)), v);
                        edge_policy.push(rule);
                    }
                    continue;
                }
                Tier::Aggregation => p,
                Tier::Core => 2 * p,
            };

            for (h, v) in table.host_routes() {
                if tier == Tier::Aggregation && v > p {
                    return Err(Error::PortOutOfRange {
                        switch: sw.id,
                        port: v,
                        max: p,
                    });
                }
                let backup = backup_port(v, 0, width);
                host_choices(net, sw.id, h, v, backup, specialize_in_port, &mut policy);
                policy.push(detour(net, sw.id, h, backup)?.group());
            }
        }
        debug!(tier = %tier, rules = policy.len(), "故障切换编码");
    }

    finish(net, switches, policy, edge_policy, with_topo)
}

fn choice(primary: Port, backup: Port) -> Policy {
    Policy::Choice(vec![Policy::set_port(primary), Policy::set_port(backup)])
}

/// 主机表项的主/备选择；细粒度模式下为每个非主端口的入端口各生成一条
fn host_choices(
    net: &Network,
    sw: SwitchId,
    host: HostId,
    primary: Port,
    backup: Port,
    specialize_in_port: bool,
    out: &mut Vec<Policy>,
) {
    let dst = Pred::eth_dst(net.host(host).mac);
    if specialize_in_port {
        for in_port in (1..=net.ports_per_switch()).filter(|&port| port != primary) {
            let pred = Pred::switch(sw).and(Pred::port(in_port)).and(dst.clone());
            out.push(Policy::Seq(vec![Policy::filter(pred), choice(primary, backup)]).group());
        }
    } else {
        let pred = Pred::switch(sw).and(dst);
        out.push(Policy::Seq(vec![Policy::filter(pred), choice(primary, backup)]).group());
    }
}

/// 备份端口对端交换机上的接续规则：转给它在 `sw` 这一层的另一个邻居
fn detour(net: &Network, sw: SwitchId, host: HostId, backup: Port) -> Result<Policy> {
    let (reroute, in_port) = net.next_switch(sw, backup)?;
    let peer = net.sibling(reroute, sw)?;
    let out_port = net
        .link(reroute.into(), NodeId::Switch(peer))
        .map(|l| l.sport)
        .ok_or(Error::MissingSibling { switch: reroute, of: sw })?;
    trace!(switch = %sw, host = %host, %reroute, %peer, in_port, out_port, "备份路径");

    let pred = Pred::switch(reroute)
        .and(Pred::port(in_port))
        .and(Pred::eth_dst(net.host(host).mac));
    Ok(Policy::guarded(pred, out_port))
}
