//! AB Fat-tree 拓扑构建
//!
//! 由扇出 `fanout = 2p` 与深度 `depth = L + 1` 生成：
//!
//! - 交换机 `(2L+1)·p^L` 台，编号 1 起；前 `2p^L` 台为 edge，后 `p^L` 台为 core，其余为 aggregation
//! - 主机 `2·p^(L+1)` 台，每 `p` 台接到同一 edge 交换机的端口 `1..=p`
//! - 第 i 层的交换机分为 `2·p^(L-i)` 组，A 型（偶数组）的父节点是连续的一段，
//!   B 型（奇数组）的父节点按 `p^i` 跨步选取
//!
//! 所有交换机端口 `1..=p` 朝下，`p+1..=2p` 朝上（core 的 `1..=2p` 全部朝下）。

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::net::{Host, HostId, Link, MAX_HOSTS, Network, Port, Switch, SwitchId, Tier};

/// 交换机数量上限
pub const MAX_SWITCHES: usize = 1 << 24;

#[derive(Debug, Clone)]
pub struct FatTreeOpts {
    /// 每台交换机的端口数，必须为正偶数
    pub fanout: usize,
    /// 树高（含 edge 层），至少为 2
    pub depth: usize,
    pub link_gbps: u64,
    pub link_cost: u32,
}

impl Default for FatTreeOpts {
    fn default() -> Self {
        Self {
            fanout: 4,
            depth: 3,
            link_gbps: 1,
            link_cost: 1,
        }
    }
}

impl FatTreeOpts {
    /// 半扇出 p
    pub fn half(&self) -> usize {
        self.fanout / 2
    }

    /// core 以下的层数 L
    pub fn levels(&self) -> usize {
        self.depth.saturating_sub(1)
    }

    /// `p^L`，溢出时返回 `None`
    fn core_count(&self) -> Option<usize> {
        self.half().checked_pow(u32::try_from(self.levels()).ok()?)
    }

    pub fn switch_count(&self) -> Option<usize> {
        let tiers = self.levels().checked_mul(2)?.checked_add(1)?;
        self.core_count()?.checked_mul(tiers)
    }

    pub fn host_count(&self) -> Option<usize> {
        self.core_count()?.checked_mul(2 * self.half())
    }

    /// 在做任何拓扑工作之前校验参数
    pub fn validate(&self) -> Result<()> {
        if self.fanout == 0 {
            return Err(Error::ZeroFanout);
        }
        if self.fanout % 2 != 0 {
            return Err(Error::OddFanout(self.fanout));
        }
        if self.depth < 2 {
            return Err(Error::DepthTooSmall(self.depth));
        }
        if !self.host_count().is_some_and(|hosts| hosts <= MAX_HOSTS) {
            return Err(Error::TooManyHosts {
                fanout: self.fanout,
                depth: self.depth,
            });
        }
        if !self.switch_count().is_some_and(|switches| switches <= MAX_SWITCHES) {
            return Err(Error::TooManySwitches {
                fanout: self.fanout,
                depth: self.depth,
            });
        }
        Ok(())
    }
}

/// 交换机编号对应的层级：`(id - 1) / (2p^L)`
pub fn level_of(id: SwitchId, edge_count: usize) -> usize {
    id.index() / edge_count
}

#[tracing::instrument(skip(opts), fields(fanout = opts.fanout, depth = opts.depth))]
pub fn build_ab_fat_tree(opts: &FatTreeOpts) -> Result<Network> {
    opts.validate()?;

    let p = opts.half();
    let l = opts.levels();
    let pl = p.pow(l as u32);
    let n_switches = (2 * l + 1) * pl;
    let n_hosts = 2 * p * pl;
    let n_edge = 2 * pl;
    let n_core = pl;
    let max_port = 2 * p;
    let capacity_bps = opts.link_gbps.saturating_mul(1_000_000_000);
    let cost = opts.link_cost;

    let mut net = Network::new(p, l);

    for n in 1..=n_switches {
        let id = SwitchId(n);
        let tier = if n > n_switches - n_core {
            Tier::Core
        } else if n <= n_edge {
            Tier::Edge
        } else {
            Tier::Aggregation
        };
        net.add_switch(Switch::new(id, tier, level_of(id, n_edge)));
    }
    for n in 1..=n_hosts {
        net.add_host(Host::new(HostId(n)));
    }

    // 主机 -> edge：第 idx 台 edge 交换机接第 idx 组的 p 台主机
    for idx in 0..n_edge {
        let edge = SwitchId(idx + 1);
        for c in 1..=p {
            let host = HostId(idx * p + c);
            net.connect_pair(Link::new(host.into(), edge.into(), 1, c, capacity_bps, cost));
        }
    }

    for i in 0..l {
        let groups = 2 * p.pow((l - i) as u32);
        let width = p.pow(i as u32);
        let top = i + 1 == l;
        for g in 0..groups {
            let type_b = g % 2 == 1;
            for j in 0..width {
                let child = SwitchId(i * n_edge + g * width + j + 1);
                let parent_group = if top { 0 } else { g / p };
                let base = (i + 1) * n_edge + parent_group * width * p;
                let parents: Vec<usize> = if type_b {
                    (0..p).map(|x| base + j + x * width).collect()
                } else {
                    (base + j * p..base + j * p + p).collect()
                };
                if parents.len() != p {
                    return Err(Error::ParentCountMismatch {
                        switch: child,
                        expected: p,
                        actual: parents.len(),
                    });
                }
                debug!(switch = %child, level = i, group = g, type_b, ?parents, "父节点");

                let dport: Port = if top { g + 1 } else { g % p + 1 };
                for (c, pidx) in parents.into_iter().enumerate() {
                    let parent = SwitchId(pidx + 1);
                    let sport: Port = p + c + 1;
                    check_port(child, sport, max_port)?;
                    check_port(parent, dport, max_port)?;
                    net.connect_pair(Link::new(
                        child.into(),
                        parent.into(),
                        sport,
                        dport,
                        capacity_bps,
                        cost,
                    ));
                }
            }
        }
    }

    info!(
        switches = net.switches().len(),
        hosts = net.hosts().len(),
        links = net.links().len(),
        "🌲 AB fat-tree 构建完成"
    );
    Ok(net)
}

fn check_port(switch: SwitchId, port: Port, max: Port) -> Result<()> {
    if port == 0 || port > max {
        return Err(Error::PortOutOfRange { switch, port, max });
    }
    Ok(())
}
