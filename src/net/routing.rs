//! 路由表构建
//!
//! 每台交换机的路由表把“目的主机”或“入端口”映射到出端口：
//!
//! - 向下路由：从每台主机出发，沿着父节点逐层向上走，
//!   在经过的交换机上记录“指回该主机方向的下行端口”。
//! - 向上默认路由：非 core 交换机的下行端口 `k` 默认转发到上行端口 `p + k`，
//!   只在没有主机表项命中时使用。
//!
//! 同一 (交换机, 主机) 可能被多条向上路径写入，后写者生效；
//! 父节点总按出边插入顺序（即父节点编号升序）访问，结果可复现。

use std::collections::BTreeMap;

use tracing::{debug, info, trace};

use super::id::{HostId, NodeId, Port, SwitchId};
use super::link::Link;
use super::network::Network;
use super::node::Tier;
use crate::error::{Error, Result};

/// 路由表键
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RouteKey {
    /// 按目的主机匹配（向下路由）
    Host(HostId),
    /// 按入端口匹配（向上默认路由）
    InPort(Port),
}

/// 单台交换机的路由表
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    entries: BTreeMap<RouteKey, Port>,
}

impl RoutingTable {
    pub fn get(&self, key: RouteKey) -> Option<Port> {
        self.entries.get(&key).copied()
    }

    pub fn host_route(&self, host: HostId) -> Option<Port> {
        self.get(RouteKey::Host(host))
    }

    pub fn in_port_route(&self, port: Port) -> Option<Port> {
        self.get(RouteKey::InPort(port))
    }

    /// 转发决策：优先主机表项，否则按入端口走默认路由
    pub fn next_port(&self, dst: HostId, in_port: Port) -> Option<Port> {
        self.host_route(dst).or_else(|| self.in_port_route(in_port))
    }

    /// 全部表项：主机表项按主机编号在前，入端口表项按端口号在后
    pub fn iter(&self) -> impl Iterator<Item = (RouteKey, Port)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    pub fn host_routes(&self) -> impl Iterator<Item = (HostId, Port)> + '_ {
        self.iter().filter_map(|(k, v)| match k {
            RouteKey::Host(h) => Some((h, v)),
            RouteKey::InPort(_) => None,
        })
    }

    pub fn in_port_routes(&self) -> impl Iterator<Item = (Port, Port)> + '_ {
        self.iter().filter_map(|(k, v)| match k {
            RouteKey::InPort(p) => Some((p, v)),
            RouteKey::Host(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: RouteKey, port: Port) {
        self.entries.insert(key, port);
    }
}

/// 全网路由表：交换机 → 路由表。构建完成后只读。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTables {
    tables: Vec<RoutingTable>,
}

impl RoutingTables {
    pub fn table(&self, switch: SwitchId) -> &RoutingTable {
        &self.tables[switch.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SwitchId, &RoutingTable)> + '_ {
        self.tables
            .iter()
            .enumerate()
            .map(|(idx, t)| (SwitchId(idx + 1), t))
    }
}

/// 为每台交换机构建路由表
#[tracing::instrument(skip(net), fields(p = net.p(), levels = net.levels()))]
pub fn build_routing_tables(net: &Network) -> Result<RoutingTables> {
    let mut tables = vec![RoutingTable::default(); net.switches().len()];

    for host in net.hosts() {
        propagate_downward(net, &mut tables, host.id);
    }

    let p = net.p();
    for sw in net.switches().iter().filter(|s| s.tier != Tier::Core) {
        let table = &mut tables[sw.id.index()];
        for port in 1..=p {
            table.insert(RouteKey::InPort(port), p + port);
        }
    }

    let max = net.ports_per_switch();
    for sw in net.switches() {
        let table = &tables[sw.id.index()];
        for (key, port) in table.iter() {
            let in_port = match key {
                RouteKey::InPort(k) => k,
                RouteKey::Host(_) => port,
            };
            for port in [in_port, port] {
                if port == 0 || port > max {
                    return Err(Error::PortOutOfRange {
                        switch: sw.id,
                        port,
                        max,
                    });
                }
            }
        }
        debug!(switch = %sw.id, tier = %sw.tier, entries = table.len(), "路由表");
    }

    info!(switches = tables.len(), "🧭 路由表构建完成");
    Ok(RoutingTables { tables })
}

/// 从主机出发逐层向上，记录每台经过交换机上指向该主机的下行端口
fn propagate_downward(net: &Network, tables: &mut [RoutingTable], host: HostId) {
    // 显式栈上的先序遍历，写入顺序与递归版本一致
    let mut stack: Vec<(&Link, usize)> = Vec::new();
    push_parents(net, &mut stack, host.into(), 0);

    while let Some((link, level)) = stack.pop() {
        let NodeId::Switch(up) = link.to else {
            continue;
        };
        trace!(host = %host, switch = %up, port = link.dport, "向下路由");
        tables[up.index()].insert(RouteKey::Host(host), link.dport);
        if level < net.levels() {
            push_parents(net, &mut stack, link.to, level + 1);
        }
    }
}

/// 把 `node` 通往 `level` 层交换机的出边逆序压栈，使其按插入顺序弹出
fn push_parents<'a>(
    net: &'a Network,
    stack: &mut Vec<(&'a Link, usize)>,
    node: NodeId,
    level: usize,
) {
    let ups: Vec<&Link> = net
        .out_links(node)
        .filter(|l| matches!(l.to, NodeId::Switch(s) if net.switch(s).level == level))
        .collect();
    stack.extend(ups.into_iter().rev().map(|l| (l, level)));
}
