//! 策略编码
//!
//! 把拓扑与路由表编码为声明式网络策略。几种编码互相独立、语义等价：
//! 逐表（`tables`）、逐主机对路径（`paths` / `realpaths` / `realnoidpaths`）、
//! 按层压缩（`regular`），以及在逐表编码上加备份端口的故障切换版本。
//! `test*` 变体只对一小部分交换机或主机编码，便于单独检查。

mod ast;
mod eval;
mod failover;
mod paths;
mod regular;
mod relation;
mod tables;

use std::fmt;

use clap::ValueEnum;
use tracing::info;

pub use ast::{Field, Location, Policy, Pred, Program, Value};
pub use eval::{Packet, delivered_hosts, eval, matches};
pub use failover::backup_port;
pub use paths::{Hop, PathTrace, trace_path};

use crate::error::{Error, Result};
use crate::net::{HostId, Network, RoutingTables, SwitchId};

/// 策略类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum KatKind {
    #[value(name = "tables")]
    Tables,
    #[value(name = "testtables")]
    TestTables,
    #[value(name = "paths")]
    Paths,
    #[value(name = "testpaths")]
    TestPaths,
    #[value(name = "testpaths2")]
    TestPaths2,
    #[value(name = "regular")]
    Regular,
    #[value(name = "realpaths")]
    RealPaths,
    #[value(name = "testrealpaths")]
    TestRealPaths,
    #[value(name = "testrealpaths2")]
    TestRealPaths2,
    #[value(name = "realnoidpaths")]
    RealNoIdPaths,
    #[value(name = "testnoidrealpaths")]
    TestRealNoIdPaths,
    #[value(name = "testnoidrealpaths2")]
    TestRealNoIdPaths2,
}

/// 只编码部分交换机/主机时使用的下标（0-based）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subset {
    All,
    Switches(&'static [usize]),
    Hosts(&'static [usize]),
}

const TEST_SWITCHES: &[usize] = &[0, 1, 8, 9];
const TEST_HOSTS: &[usize] = &[0, 1];
const TEST_HOSTS2: &[usize] = &[0, 3];

impl KatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            KatKind::Tables => "tables",
            KatKind::TestTables => "testtables",
            KatKind::Paths => "paths",
            KatKind::TestPaths => "testpaths",
            KatKind::TestPaths2 => "testpaths2",
            KatKind::Regular => "regular",
            KatKind::RealPaths => "realpaths",
            KatKind::TestRealPaths => "testrealpaths",
            KatKind::TestRealPaths2 => "testrealpaths2",
            KatKind::RealNoIdPaths => "realnoidpaths",
            KatKind::TestRealNoIdPaths => "testnoidrealpaths",
            KatKind::TestRealNoIdPaths2 => "testnoidrealpaths2",
        }
    }

    pub fn subset(self) -> Subset {
        match self {
            KatKind::Tables | KatKind::Paths | KatKind::Regular | KatKind::RealPaths | KatKind::RealNoIdPaths => {
                Subset::All
            }
            KatKind::TestTables => Subset::Switches(TEST_SWITCHES),
            KatKind::TestPaths | KatKind::TestRealPaths | KatKind::TestRealNoIdPaths => {
                Subset::Hosts(TEST_HOSTS)
            }
            KatKind::TestPaths2 | KatKind::TestRealPaths2 | KatKind::TestRealNoIdPaths2 => {
                Subset::Hosts(TEST_HOSTS2)
            }
        }
    }

    /// 是否有故障切换版本
    pub fn supports_failover(self) -> bool {
        matches!(self, KatKind::Tables | KatKind::TestTables)
    }
}

impl fmt::Display for KatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 是否输出备份端口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Failover {
    #[default]
    #[value(name = "nofail")]
    NoFail,
    #[value(name = "fail")]
    Fail,
}

impl fmt::Display for Failover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Failover::NoFail => "nofail",
            Failover::Fail => "fail",
        })
    }
}

/// 是否把拓扑关系一并编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Scope {
    /// 转发规则与拓扑迭代组合成完整程序
    #[default]
    #[value(name = "full")]
    Full,
    /// 只输出转发规则
    #[value(name = "local")]
    Local,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::Full => "full",
            Scope::Local => "local",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOpts {
    pub kind: KatKind,
    pub failover: Failover,
    pub scope: Scope,
    /// 故障切换时是否按入端口细分主机规则
    pub specialize_in_port: bool,
}

impl Default for EncodeOpts {
    fn default() -> Self {
        Self {
            kind: KatKind::Tables,
            failover: Failover::NoFail,
            scope: Scope::Full,
            specialize_in_port: true,
        }
    }
}

impl EncodeOpts {
    /// 按给定的交换机/主机数量检查选项组合
    pub fn validate(&self, fanout: usize, switches: usize, hosts: usize) -> Result<()> {
        if self.failover == Failover::Fail {
            if !self.kind.supports_failover() {
                return Err(Error::UnsupportedEncodingCombination {
                    kind: self.kind,
                    failover: self.failover,
                });
            }
            if fanout < 4 {
                return Err(Error::NoBackupPort { fanout });
            }
        }
        let (what, indices, len) = match self.kind.subset() {
            Subset::All => return Ok(()),
            Subset::Switches(idx) => ("switch", idx, switches),
            Subset::Hosts(idx) => ("host", idx, hosts),
        };
        match indices.iter().find(|&&i| i >= len) {
            Some(&index) => Err(Error::SubsetOutOfRange {
                kind: self.kind,
                what,
                index,
                len,
            }),
            None => Ok(()),
        }
    }
}

/// 按选项编码策略
#[tracing::instrument(skip(net, tables), fields(kind = %opts.kind, failover = %opts.failover, scope = %opts.scope))]
pub fn encode(net: &Network, tables: &RoutingTables, opts: &EncodeOpts) -> Result<Program> {
    opts.validate(net.ports_per_switch(), net.switches().len(), net.hosts().len())?;
    let with_topo = opts.scope == Scope::Full;

    let switches: Vec<SwitchId> = match opts.kind.subset() {
        Subset::Switches(idx) => idx.iter().map(|&i| SwitchId(i + 1)).collect(),
        _ => net.switches().iter().map(|s| s.id).collect(),
    };
    let hosts: Vec<HostId> = match opts.kind.subset() {
        Subset::Hosts(idx) => idx.iter().map(|&i| HostId(i + 1)).collect(),
        _ => net.hosts().iter().map(|h| h.id).collect(),
    };

    let program = match (opts.kind, opts.failover) {
        (KatKind::Tables | KatKind::TestTables, Failover::NoFail) => {
            tables::encode_tables(net, tables, &switches, with_topo)?
        }
        (KatKind::Tables | KatKind::TestTables, Failover::Fail) => {
            failover::encode_tables_failover(net, tables, &switches, with_topo, opts.specialize_in_port)?
        }
        (KatKind::Paths | KatKind::TestPaths | KatKind::TestPaths2, Failover::NoFail) => {
            paths::encode_paths(net, tables, &hosts, with_topo)?
        }
        (KatKind::Regular, Failover::NoFail) => regular::encode_regular(net, tables, with_topo)?,
        (KatKind::RealPaths | KatKind::TestRealPaths | KatKind::TestRealPaths2, Failover::NoFail) => {
            paths::encode_real_paths(net, tables, &hosts, with_topo)?
        }
        (
            KatKind::RealNoIdPaths | KatKind::TestRealNoIdPaths | KatKind::TestRealNoIdPaths2,
            Failover::NoFail,
        ) => paths::encode_realnoid_paths(net, tables, &hosts)?,
        (kind, failover) => return Err(Error::UnsupportedEncodingCombination { kind, failover }),
    };

    info!(rules = program.rule_count(), "📜 策略编码完成");
    Ok(program)
}
