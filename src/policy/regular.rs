//! 利用层内对称性的紧凑编码
//!
//! 同一层的交换机入端口表项完全相同，core 交换机的主机表项也完全相同，
//! 因此这些规则每层只写一次，并用“交换机属于该层”作为条件：
//!
//! ```text
//! ((filter switch = a | filter switch = b | ...); (rule | rule | ...))
//! ```
//!
//! aggregation 与 edge 的主机表项随交换机不同，仍逐台列出；edge 的主机表项只在最后一跳使用。
//! 层内规则一致性在编码前检查，不一致时报 `NonUniformTier`。

use tracing::debug;

use super::ast::{Policy, Pred, Program};
use super::relation;
use crate::error::{Error, Result};
use crate::net::{Network, Port, RoutingTables, Switch, Tier};

pub(crate) fn encode_regular(
    net: &Network,
    tables: &RoutingTables,
    with_topo: bool,
) -> Result<Program> {
    let mut policy = Vec::new();

    let core = net.tier(Tier::Core);
    let core_rules = uniform(core, Tier::Core, |sw| {
        tables.table(sw.id).host_routes().collect::<Vec<_>>()
    })?
    .into_iter()
    .map(|(h, v)| Policy::guarded(Pred::eth_dst(net.host(h).mac), v))
    .collect();
    policy.extend(tier_rule(core, core_rules));

    for tier in [Tier::Aggregation, Tier::Edge] {
        let members = net.tier(tier);
        let rules = uniform(members, tier, |sw| {
            tables.table(sw.id).in_port_routes().collect::<Vec<(Port, Port)>>()
        })?
        .into_iter()
        .map(|(k, v)| Policy::guarded(Pred::port(k), v))
        .collect();
        policy.extend(tier_rule(members, rules));
    }
    let tier_rules = policy.len();

    policy.extend(per_switch_host_rules(net, tables, Tier::Aggregation));
    let edge_policy = per_switch_host_rules(net, tables, Tier::Edge);
    debug!(
        tier_rules,
        agg_rules = policy.len() - tier_rules,
        edge_rules = edge_policy.len(),
        "紧凑编码"
    );

    if !with_topo {
        policy.extend(edge_policy);
        return Ok(Program::Flat(policy));
    }
    let topo = relation::switch_links(net, |_, _| true);
    let edge_topo = relation::host_links(net, |_| true)?;
    Ok(Program::Iterated {
        policy,
        topo,
        edge_policy,
        edge_topo,
    })
}

/// 取层内第一台交换机的规则，并确认其余交换机与之相同；空层返回空规则
fn uniform<T, F>(members: &[Switch], tier: Tier, rules_of: F) -> Result<Vec<T>>
where
    T: PartialEq,
    F: Fn(&Switch) -> Vec<T>,
{
    let Some(reference) = members.first() else {
        return Ok(Vec::new());
    };
    let rules = rules_of(reference);
    if let Some(other) = members[1..].iter().find(|sw| rules_of(sw) != rules) {
        return Err(Error::NonUniformTier {
            tier,
            switch: other.id,
            reference: reference.id,
        });
    }
    Ok(rules)
}

/// `((filter switch = a | ...); (rule | ...))`
fn tier_rule(members: &[Switch], rules: Vec<Policy>) -> Option<Policy> {
    if members.is_empty() || rules.is_empty() {
        return None;
    }
    let at_tier = members
        .iter()
        .map(|sw| Policy::filter(Pred::switch(sw.id)))
        .collect();
    Some(
        Policy::Seq(vec![
            Policy::Union(at_tier).group(),
            Policy::Union(rules).group(),
        ])
        .group(),
    )
}

fn per_switch_host_rules(net: &Network, tables: &RoutingTables, tier: Tier) -> Vec<Policy> {
    net.tier(tier)
        .iter()
        .flat_map(|sw| {
            tables.table(sw.id).host_routes().map(move |(h, v)| {
                Policy::Seq(vec![
                    Policy::filter(Pred::switch(sw.id)),
                    Policy::filter(Pred::eth_dst(net.host(h).mac)),
                    Policy::set_port(v),
                ])
                .group()
            })
        })
        .collect()
}
