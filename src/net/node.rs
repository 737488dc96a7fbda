//! 节点类型
//!
//! 定义网络节点：交换机（带层级与所在 tier）和主机（带派生地址）。

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::addr::{self, MacAddr};
use super::id::{HostId, SwitchId};

/// 交换机所在的层
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Edge,
    Aggregation,
    Core,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Edge => "edge",
            Tier::Aggregation => "aggregation",
            Tier::Core => "core",
        };
        f.write_str(name)
    }
}

/// 交换机节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    pub id: SwitchId,
    pub tier: Tier,
    /// 0 为 edge 层，向 core 方向递增
    pub level: usize,
}

impl Switch {
    pub fn new(id: SwitchId, tier: Tier, level: usize) -> Self {
        Self { id, tier, level }
    }

    pub fn name(&self) -> String {
        self.id.to_string()
    }
}

/// 主机节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub id: HostId,
    pub mac: MacAddr,
    pub ip: Ipv4Addr,
}

impl Host {
    /// 创建主机，地址由编号派生
    pub fn new(id: HostId) -> Self {
        Self {
            id,
            mac: addr::mac(id),
            ip: addr::ip(id),
        }
    }

    pub fn name(&self) -> String {
        self.id.to_string()
    }
}
