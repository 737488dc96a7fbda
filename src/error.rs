//! 错误类型
//!
//! 输入错误在任何拓扑工作开始之前返回；一致性错误说明拓扑构建或路由算法本身有缺陷，
//! 生成过程直接中止，不会产出不完整的拓扑或策略。

use thiserror::Error;

use crate::net::{HostId, Port, SwitchId, Tier};
use crate::policy::{Failover, KatKind};
use crate::topo::fat_tree::MAX_SWITCHES;

#[derive(Debug, Error)]
pub enum Error {
    // ---- 输入错误 ----
    #[error("fan-out must be positive")]
    ZeroFanout,
    #[error("fan-out must be even, got {0}")]
    OddFanout(usize),
    #[error("depth must be at least 2, got {0}")]
    DepthTooSmall(usize),
    #[error("fan-out {fanout} with depth {depth} needs more hosts than 10.0.0.0/8 can address")]
    TooManyHosts { fanout: usize, depth: usize },
    #[error("fan-out {fanout} with depth {depth} needs more than {max} switches", max = MAX_SWITCHES)]
    TooManySwitches { fanout: usize, depth: usize },
    #[error("policy type `{kind}` is not supported with failover mode `{failover}`")]
    UnsupportedEncodingCombination { kind: KatKind, failover: Failover },
    #[error("failover needs an alternate port, fan-out {fanout} has none (use at least 4)")]
    NoBackupPort { fanout: usize },
    #[error("policy type `{kind}` uses {what} #{index}, but the topology only has {len}")]
    SubsetOutOfRange {
        kind: KatKind,
        what: &'static str,
        index: usize,
        len: usize,
    },

    // ---- 一致性错误 ----
    #[error("{switch}: expected {expected} parents, computed {actual}")]
    ParentCountMismatch {
        switch: SwitchId,
        expected: usize,
        actual: usize,
    },
    #[error("{switch}: port {port} is outside 1..={max}")]
    PortOutOfRange {
        switch: SwitchId,
        port: Port,
        max: Port,
    },
    #[error("{switch}: no switch neighbor on port {port}")]
    MissingNeighbor { switch: SwitchId, port: Port },
    #[error("{switch}: no neighbor at the level of {of} other than {of}")]
    MissingSibling { switch: SwitchId, of: SwitchId },
    #[error("{switch}: no route towards {host} (arrived on port {in_port})")]
    MissingRoute {
        switch: SwitchId,
        host: HostId,
        in_port: Port,
    },
    #[error("{0} is not attached to any switch")]
    DetachedHost(HostId),
    #[error("{tier} tier is not uniform: {switch} differs from {reference}")]
    NonUniformTier {
        tier: Tier,
        switch: SwitchId,
        reference: SwitchId,
    },
    #[error("path from {src} to {dst} did not terminate within {hops} hops")]
    RoutingLoop {
        src: HostId,
        dst: HostId,
        hops: usize,
    },

    // ---- 输出 ----
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
