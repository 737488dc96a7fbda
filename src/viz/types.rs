use serde::{Deserialize, Serialize};

use crate::net::{Network, NodeId, Tier};

/// 图节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphNode {
    Switch {
        name: String,
        id: usize,
        tier: Tier,
        level: usize,
    },
    Host {
        name: String,
        id: usize,
        mac: String,
        ip: String,
    },
}

/// 图中的单向边
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub src: String,
    pub dst: String,
    pub sport: usize,
    pub dport: usize,
    /// 带宽标签，例如 `1Gbps`
    pub capacity: String,
    pub cost: u32,
}

/// 拓扑图（JSON）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopoGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl TopoGraph {
    /// 先交换机后主机，边按创建顺序
    pub fn from_network(net: &Network) -> Self {
        let switches = net.switches().iter().map(|sw| GraphNode::Switch {
            name: sw.name(),
            id: sw.id.0,
            tier: sw.tier,
            level: sw.level,
        });
        let hosts = net.hosts().iter().map(|h| GraphNode::Host {
            name: h.name(),
            id: h.id.0,
            mac: h.mac.to_string(),
            ip: h.ip.to_string(),
        });
        let links = net
            .links()
            .iter()
            .map(|l| GraphLink {
                src: node_name(l.from),
                dst: node_name(l.to),
                sport: l.sport,
                dport: l.dport,
                capacity: l.capacity_label(),
                cost: l.cost,
            })
            .collect();
        Self {
            nodes: switches.chain(hosts).collect(),
            links,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn switch_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, GraphNode::Switch { .. }))
            .count()
    }
}

fn node_name(id: NodeId) -> String {
    id.to_string()
}
