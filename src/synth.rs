//! 生成流程
//!
//! 校验参数 → 构建拓扑 → 构建路由表 → 编码策略。整个过程是 `(fanout, depth, 编码选项)`
//! 的纯函数；只有 `Generated::write_*` 做文件输出。

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::net::{Network, RoutingTables, build_routing_tables};
use crate::policy::{self, EncodeOpts, Failover, KatKind, Program, Scope};
use crate::topo::fat_tree::{FatTreeOpts, build_ab_fat_tree};
use crate::viz::TopoGraph;

/// 生成选项
#[derive(Debug, Clone)]
pub struct GenOpts {
    pub fanout: usize,
    pub depth: usize,
    pub kind: KatKind,
    pub failover: Failover,
    pub scope: Scope,
    pub specialize_in_port: bool,
}

impl Default for GenOpts {
    fn default() -> Self {
        Self {
            fanout: 4,
            depth: 3,
            kind: KatKind::Tables,
            failover: Failover::NoFail,
            scope: Scope::Full,
            specialize_in_port: true,
        }
    }
}

impl GenOpts {
    pub fn topo_opts(&self) -> FatTreeOpts {
        FatTreeOpts {
            fanout: self.fanout,
            depth: self.depth,
            ..FatTreeOpts::default()
        }
    }

    pub fn encode_opts(&self) -> EncodeOpts {
        EncodeOpts {
            kind: self.kind,
            failover: self.failover,
            scope: self.scope,
            specialize_in_port: self.specialize_in_port,
        }
    }

    /// 在任何拓扑工作之前检查全部输入
    pub fn validate(&self) -> Result<()> {
        let topo = self.topo_opts();
        topo.validate()?;
        let switches = topo.switch_count().ok_or(Error::TooManySwitches {
            fanout: self.fanout,
            depth: self.depth,
        })?;
        let hosts = topo.host_count().ok_or(Error::TooManyHosts {
            fanout: self.fanout,
            depth: self.depth,
        })?;
        self.encode_opts().validate(self.fanout, switches, hosts)
    }
}

/// 一次生成的全部结果
#[derive(Debug, Clone)]
pub struct Generated {
    pub network: Network,
    pub tables: RoutingTables,
    pub graph: TopoGraph,
    pub policy: Program,
}

impl Generated {
    pub fn policy_text(&self) -> String {
        self.policy.to_string()
    }

    pub fn topology_json(&self) -> Result<String> {
        Ok(self.graph.to_json_pretty()?)
    }

    pub fn write_topology(&self, path: &Path) -> Result<()> {
        fs::write(path, self.topology_json()?)?;
        info!(path = %path.display(), "💾 拓扑已写入");
        Ok(())
    }

    pub fn write_policy(&self, path: &Path) -> Result<()> {
        fs::write(path, self.policy_text())?;
        info!(path = %path.display(), "💾 策略已写入");
        Ok(())
    }
}

#[tracing::instrument(skip(opts), fields(fanout = opts.fanout, depth = opts.depth, kind = %opts.kind))]
pub fn synthesize(opts: &GenOpts) -> Result<Generated> {
    opts.validate()?;
    let network = build_ab_fat_tree(&opts.topo_opts())?;
    let tables = build_routing_tables(&network)?;
    let policy = policy::encode(&network, &tables, &opts.encode_opts())?;
    let graph = TopoGraph::from_network(&network);
    Ok(Generated {
        network,
        tables,
        graph,
        policy,
    })
}
