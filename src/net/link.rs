//! 链路
//!
//! 定义单向链路。每条物理链路由两条方向相反、端口互换的单向链路表示。

use super::id::{NodeId, Port};

/// 单向链路
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    /// `from` 一侧的端口
    pub sport: Port,
    /// `to` 一侧的端口
    pub dport: Port,
    /// 标称带宽（bps）
    pub capacity_bps: u64,
    pub cost: u32,
}

impl Link {
    pub fn new(
        from: NodeId,
        to: NodeId,
        sport: Port,
        dport: Port,
        capacity_bps: u64,
        cost: u32,
    ) -> Self {
        Self {
            from,
            to,
            sport,
            dport,
            capacity_bps,
            cost,
        }
    }

    /// 反方向的链路（端口互换，带宽与开销不变）
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            sport: self.dport,
            dport: self.sport,
            capacity_bps: self.capacity_bps,
            cost: self.cost,
        }
    }

    /// 带宽标签，例如 `1Gbps`
    pub fn capacity_label(&self) -> String {
        const UNITS: [(u64, &str); 3] = [(1_000_000_000, "Gbps"), (1_000_000, "Mbps"), (1_000, "Kbps")];
        for (scale, unit) in UNITS {
            if self.capacity_bps >= scale && self.capacity_bps % scale == 0 {
                return format!("{}{}", self.capacity_bps / scale, unit);
            }
        }
        format!("{}bps", self.capacity_bps)
    }
}
