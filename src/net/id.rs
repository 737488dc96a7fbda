//! 标识符类型
//!
//! 交换机、主机和端口都从 1 开始编号，与生成的策略文本保持一致。

use std::fmt;

/// 交换机标识符（1-based）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SwitchId(pub usize);

/// 主机标识符（1-based）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostId(pub usize);

/// 端口号；交换机端口范围为 `1..=2p`，主机只有端口 1
pub type Port = usize;

/// 链路标识符（在 `Network::links` 中的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub usize);

/// 图中的一个节点
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    Switch(SwitchId),
    Host(HostId),
}

impl SwitchId {
    /// 在按编号排列的交换机数组中的下标
    pub fn index(self) -> usize {
        self.0 - 1
    }
}

impl HostId {
    pub fn index(self) -> usize {
        self.0 - 1
    }
}

impl From<SwitchId> for NodeId {
    fn from(id: SwitchId) -> Self {
        NodeId::Switch(id)
    }
}

impl From<HostId> for NodeId {
    fn from(id: HostId) -> Self {
        NodeId::Host(id)
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Switch(s) => s.fmt(f),
            NodeId::Host(h) => h.fmt(f),
        }
    }
}
