//! 拓扑关系项
//!
//! 交换机之间的链路 `a@p => b@q` 与主机接入 `sw@port => 0@host`。

use super::ast::{Location, Policy};
use crate::error::Result;
use crate::net::{Network, NodeId, SwitchId};

/// 两端都是交换机、且满足 `keep(src, dst)` 的所有单向链路：按源交换机编号分组，组内按出边插入顺序
pub(crate) fn switch_links<F>(net: &Network, keep: F) -> Vec<Policy>
where
    F: Fn(SwitchId, SwitchId) -> bool,
{
    net.switches()
        .iter()
        .flat_map(|sw| net.out_links(sw.id.into()))
        .filter_map(|l| match (l.from, l.to) {
            (NodeId::Switch(a), NodeId::Switch(b)) if keep(a, b) => Some(Policy::link(
                Location::switch(a, l.sport),
                Location::switch(b, l.dport),
            )),
            _ => None,
        })
        .collect()
}

/// 接入交换机满足 `keep` 的所有主机的接入项
pub(crate) fn host_links<F>(net: &Network, keep: F) -> Result<Vec<Policy>>
where
    F: Fn(SwitchId) -> bool,
{
    let mut out = Vec::new();
    for host in net.hosts() {
        let (sw, port) = net.attachment(host.id)?;
        if keep(sw) {
            out.push(Policy::link(Location::switch(sw, port), Location::host(host.id)));
        }
    }
    Ok(out)
}
