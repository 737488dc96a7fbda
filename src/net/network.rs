//! 网络拓扑管理
//!
//! 保存交换机、主机与单向链路，并提供构建路由表和编码策略时需要的邻接查询。
//! 每个节点的出边按插入顺序保存，所有遍历因此是确定性的。

use std::collections::BTreeSet;

use super::id::{HostId, LinkId, NodeId, Port, SwitchId};
use super::link::Link;
use super::node::{Host, Switch, Tier};
use crate::error::{Error, Result};

/// 网络拓扑
#[derive(Debug, Clone, Default)]
pub struct Network {
    /// 半扇出 p
    p: usize,
    /// core 以下的层数 L
    levels: usize,
    switches: Vec<Switch>,
    hosts: Vec<Host>,
    links: Vec<Link>,
    switch_out: Vec<Vec<LinkId>>,
    host_out: Vec<Vec<LinkId>>,
}

impl Network {
    pub fn new(p: usize, levels: usize) -> Self {
        Self {
            p,
            levels,
            ..Self::default()
        }
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    /// 每台交换机的端口数 `2p`
    pub fn ports_per_switch(&self) -> Port {
        2 * self.p
    }

    /// 添加交换机节点；编号必须连续
    pub(crate) fn add_switch(&mut self, switch: Switch) -> SwitchId {
        debug_assert_eq!(switch.id.0, self.switches.len() + 1);
        let id = switch.id;
        self.switches.push(switch);
        self.switch_out.push(Vec::new());
        id
    }

    /// 添加主机节点；编号必须连续
    pub(crate) fn add_host(&mut self, host: Host) -> HostId {
        debug_assert_eq!(host.id.0, self.hosts.len() + 1);
        let id = host.id;
        self.hosts.push(host);
        self.host_out.push(Vec::new());
        id
    }

    /// 连接两个节点（创建单向链路）
    pub(crate) fn connect(&mut self, link: Link) -> LinkId {
        let id = LinkId(self.links.len());
        match link.from {
            NodeId::Switch(s) => self.switch_out[s.index()].push(id),
            NodeId::Host(h) => self.host_out[h.index()].push(id),
        }
        self.links.push(link);
        id
    }

    /// 创建一条物理链路：正向链路与端口互换的反向链路
    pub(crate) fn connect_pair(&mut self, link: Link) -> (LinkId, LinkId) {
        let back = link.reversed();
        (self.connect(link), self.connect(back))
    }

    pub fn switches(&self) -> &[Switch] {
        &self.switches
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// 所有单向链路（按创建顺序）
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn switch(&self, id: SwitchId) -> &Switch {
        &self.switches[id.index()]
    }

    pub fn host(&self, id: HostId) -> &Host {
        &self.hosts[id.index()]
    }

    /// 某一层的交换机（编号连续，按编号升序）
    pub fn tier(&self, tier: Tier) -> &[Switch] {
        let n = self.switches.len();
        let n_core = self.p.pow(self.levels as u32).min(n);
        let n_edge = (2 * self.p.pow(self.levels as u32)).min(n - n_core);
        match tier {
            Tier::Edge => &self.switches[..n_edge],
            Tier::Aggregation => &self.switches[n_edge..n - n_core],
            Tier::Core => &self.switches[n - n_core..],
        }
    }

    /// 节点的出边（按插入顺序）
    pub fn out_links(&self, node: NodeId) -> impl Iterator<Item = &Link> + '_ {
        let ids = match node {
            NodeId::Switch(s) => &self.switch_out[s.index()],
            NodeId::Host(h) => &self.host_out[h.index()],
        };
        ids.iter().map(move |id| &self.links[id.0])
    }

    /// `from -> to` 的单向链路
    pub fn link(&self, from: NodeId, to: NodeId) -> Option<&Link> {
        self.out_links(from).find(|l| l.to == to)
    }

    /// 从 `switch` 的 `port` 发出后到达的交换机及其入端口
    pub fn next_switch(&self, switch: SwitchId, port: Port) -> Result<(SwitchId, Port)> {
        self.out_links(switch.into())
            .find_map(|l| match l.to {
                NodeId::Switch(next) if l.sport == port => Some((next, l.dport)),
                _ => None,
            })
            .ok_or(Error::MissingNeighbor { switch, port })
    }

    /// 主机接入的 edge 交换机及交换机一侧的端口
    pub fn attachment(&self, host: HostId) -> Result<(SwitchId, Port)> {
        self.out_links(host.into())
            .find_map(|l| match l.to {
                NodeId::Switch(s) => Some((s, l.dport)),
                NodeId::Host(_) => None,
            })
            .ok_or(Error::DetachedHost(host))
    }

    /// `via` 的邻居中与 `of` 同层、且不是 `of` 本身的第一台交换机
    pub fn sibling(&self, via: SwitchId, of: SwitchId) -> Result<SwitchId> {
        let level = self.switch(of).level;
        self.out_links(via.into())
            .find_map(|l| match l.to {
                NodeId::Switch(s) if s != of && self.switch(s).level == level => Some(s),
                _ => None,
            })
            .ok_or(Error::MissingSibling { switch: via, of })
    }

    /// 只向下遍历（经过层级更低的交换机）能到达的所有主机
    pub fn hosts_below(&self, switch: SwitchId) -> BTreeSet<HostId> {
        let mut found = BTreeSet::new();
        let mut seen = BTreeSet::new();
        let mut stack = vec![switch];
        while let Some(cur) = stack.pop() {
            if !seen.insert(cur) {
                continue;
            }
            let level = self.switch(cur).level;
            for l in self.out_links(cur.into()) {
                match l.to {
                    NodeId::Host(h) => {
                        found.insert(h);
                    }
                    NodeId::Switch(s) if self.switch(s).level < level => stack.push(s),
                    NodeId::Switch(_) => {}
                }
            }
        }
        found
    }
}
