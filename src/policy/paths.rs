//! 按主机对展开路径的编码
//!
//! 对每个有序主机对，从源主机的接入交换机出发逐跳查表，直到目的主机的接入交换机：
//!
//! - `paths`：中间各跳的 `filter switch; port :=` 取并，最后一跳放入 edge 策略，配合拓扑迭代
//! - `realpaths`：各跳连同链路项 `a@p => b@q` 顺序展开，无需迭代
//! - `realnoidpaths`：与 `realpaths` 相同，但连最后的主机接入项也展开，整体为扁平并集

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::ast::{Location, Policy, Pred, Program};
use super::relation;
use crate::error::{Error, Result};
use crate::net::{HostId, Network, Port, RoutingTables, SwitchId, Tier};

/// 路径上的一跳
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub switch: SwitchId,
    pub in_port: Port,
    pub out_port: Port,
    /// 下一台交换机及其入端口；最后一跳为 `None`（出端口直连目的主机）
    pub next: Option<(SwitchId, Port)>,
}

/// 一条主机到主机的转发路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTrace {
    pub src: HostId,
    pub dst: HostId,
    pub hops: Vec<Hop>,
}

impl PathTrace {
    pub fn switches(&self) -> impl Iterator<Item = SwitchId> + '_ {
        self.hops.iter().map(|h| h.switch)
    }

    /// 除最后一跳外的各跳
    pub fn transit(&self) -> &[Hop] {
        &self.hops[..self.hops.len().saturating_sub(1)]
    }

    pub fn last(&self) -> Option<&Hop> {
        self.hops.last()
    }
}

/// 按路由表追踪 `src -> dst` 的路径
pub fn trace_path(
    net: &Network,
    tables: &RoutingTables,
    src: HostId,
    dst: HostId,
) -> Result<PathTrace> {
    let (mut sw, mut in_port) = net.attachment(src)?;
    let (dst_sw, _) = net.attachment(dst)?;
    let limit = net.switches().len();
    let mut hops = Vec::new();

    loop {
        let table = tables.table(sw);
        let route = if sw == dst_sw {
            table.host_route(dst)
        } else {
            table.next_port(dst, in_port)
        };
        let out_port = route.ok_or(Error::MissingRoute {
            switch: sw,
            host: dst,
            in_port,
        })?;

        if sw == dst_sw {
            hops.push(Hop {
                switch: sw,
                in_port,
                out_port,
                next: None,
            });
            break;
        }
        if hops.len() >= limit {
            return Err(Error::RoutingLoop {
                src,
                dst,
                hops: hops.len(),
            });
        }

        let next = net.next_switch(sw, out_port)?;
        trace!(%src, %dst, switch = %sw, in_port, out_port, next = %next.0, "逐跳");
        hops.push(Hop {
            switch: sw,
            in_port,
            out_port,
            next: Some(next),
        });
        (sw, in_port) = next;
    }

    Ok(PathTrace { src, dst, hops })
}

/// 所有有序主机对的路径，以及路径经过的交换机
fn trace_all(
    net: &Network,
    tables: &RoutingTables,
    hosts: &[HostId],
) -> Result<(Vec<PathTrace>, BTreeSet<SwitchId>)> {
    let mut paths = Vec::new();
    let mut visited = BTreeSet::new();
    for &src in hosts {
        for &dst in hosts.iter().filter(|&&d| d != src) {
            let path = trace_path(net, tables, src, dst)?;
            visited.extend(path.switches());
            paths.push(path);
        }
    }
    debug!(paths = paths.len(), switches = visited.len(), "路径追踪完成");
    Ok((paths, visited))
}

/// `filter ethSrc = s; filter ethDst = d`
fn pair_filter(net: &Network, path: &PathTrace) -> Vec<Policy> {
    vec![
        Policy::filter(Pred::eth_src(net.host(path.src).mac)),
        Policy::filter(Pred::eth_dst(net.host(path.dst).mac)),
    ]
}

fn hop_rule(hop: &Hop) -> Policy {
    Policy::guarded(Pred::switch(hop.switch), hop.out_port)
}

/// `filter switch = s; port := v; s@v => next@q`
fn linked_hop(hop: &Hop, to: Location) -> Vec<Policy> {
    vec![
        Policy::filter(Pred::switch(hop.switch)),
        Policy::set_port(hop.out_port),
        Policy::link(Location::switch(hop.switch, hop.out_port), to),
    ]
}

pub(crate) fn encode_paths(
    net: &Network,
    tables: &RoutingTables,
    hosts: &[HostId],
    with_topo: bool,
) -> Result<Program> {
    let (paths, visited) = trace_all(net, tables, hosts)?;
    let mut policy = Vec::new();
    let mut edge_policy = Vec::new();

    for path in &paths {
        let Some(last) = path.last() else { continue };
        let transit: Vec<Policy> = path.transit().iter().map(hop_rule).collect();
        if !transit.is_empty() {
            let mut seq = pair_filter(net, path);
            seq.push(Policy::Union(transit).group());
            policy.push(Policy::Seq(seq).group());
        }
        let mut seq = pair_filter(net, path);
        seq.push(hop_rule(last));
        edge_policy.push(Policy::Seq(seq).group());
    }

    if !with_topo {
        policy.extend(edge_policy);
        return Ok(Program::Flat(policy));
    }
    let mut topo = relation::switch_links(net, |a, b| visited.contains(&a) && visited.contains(&b));
    if topo.is_empty() {
        topo.push(Policy::Id);
    }
    let edge_topo = relation::host_links(net, |sw| visited.contains(&sw))?;
    Ok(Program::Iterated {
        policy,
        topo,
        edge_policy,
        edge_topo,
    })
}

pub(crate) fn encode_real_paths(
    net: &Network,
    tables: &RoutingTables,
    hosts: &[HostId],
    with_topo: bool,
) -> Result<Program> {
    let (paths, visited) = trace_all(net, tables, hosts)?;
    let mut policy = vec![Policy::Id];

    for path in &paths {
        let mut seq = pair_filter(net, path);
        for hop in path.transit() {
            if let Some((next, port)) = hop.next {
                seq.extend(linked_hop(hop, Location::switch(next, port)));
            }
        }
        if seq.len() > 2 {
            policy.push(Policy::Seq(seq).group());
        }
    }

    let mut edge_policy = Vec::new();
    for sw in net.tier(Tier::Edge) {
        for (h, v) in tables.table(sw.id).host_routes() {
            edge_policy.push(Policy::Seq(vec![
                Policy::filter(Pred::switch(sw.id)),
                Policy::filter(Pred::eth_dst(net.host(h).mac)),
                Policy::set_port(v),
            ]));
        }
    }

    if !with_topo {
        policy.extend(edge_policy);
        return Ok(Program::Flat(policy));
    }
    let edge_topo = relation::host_links(net, |sw| visited.contains(&sw))?;
    Ok(Program::Unrolled {
        policy,
        edge_policy,
        edge_topo,
    })
}

pub(crate) fn encode_realnoid_paths(
    net: &Network,
    tables: &RoutingTables,
    hosts: &[HostId],
) -> Result<Program> {
    let (paths, _) = trace_all(net, tables, hosts)?;
    let mut policy = Vec::new();

    for path in &paths {
        let mut seq = pair_filter(net, path);
        for hop in &path.hops {
            let to = match hop.next {
                Some((next, port)) => Location::switch(next, port),
                None => Location::host(path.dst),
            };
            seq.extend(linked_hop(hop, to));
        }
        policy.push(Policy::Seq(seq).group());
    }
    Ok(Program::Flat(policy))
}
