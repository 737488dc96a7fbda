//! 策略语法树
//!
//! 编码器只构造语法树，文本在最后一步由 `Display` 统一输出：
//!
//! - 谓词：`filter <field> = <value>`，可用 `and` / `not` 组合
//! - 动作：`port := <n>`
//! - 拓扑项：`a@p => b@q`（`b = 0` 表示主机 `q`）
//! - 组合：顺序 `;`、并 `|`、故障切换选择 `(a + b)`、迭代 `*`

use std::fmt;

use crate::net::{HostId, MacAddr, Port, SwitchId};

/// 可匹配/可修改的报文字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Switch,
    Port,
    EthSrc,
    EthDst,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Switch => "switch",
            Field::Port => "port",
            Field::EthSrc => "ethSrc",
            Field::EthDst => "ethDst",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    Num(usize),
    Mac(MacAddr),
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Num(n)
    }
}

impl From<SwitchId> for Value {
    fn from(id: SwitchId) -> Self {
        Value::Num(id.0)
    }
}

impl From<MacAddr> for Value {
    fn from(mac: MacAddr) -> Self {
        Value::Mac(mac)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{n}"),
            Value::Mac(m) => write!(f, "{m}"),
        }
    }
}

/// 谓词
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pred {
    Test(Field, Value),
    Not(Box<Pred>),
    And(Vec<Pred>),
}

impl Pred {
    pub fn test(field: Field, value: impl Into<Value>) -> Self {
        Pred::Test(field, value.into())
    }

    pub fn switch(id: SwitchId) -> Self {
        Self::test(Field::Switch, id)
    }

    pub fn port(port: Port) -> Self {
        Self::test(Field::Port, port)
    }

    pub fn eth_dst(mac: MacAddr) -> Self {
        Self::test(Field::EthDst, mac)
    }

    pub fn eth_src(mac: MacAddr) -> Self {
        Self::test(Field::EthSrc, mac)
    }

    pub fn negate(self) -> Self {
        Pred::Not(Box::new(self))
    }

    /// 合取，嵌套的 `And` 会被展开
    pub fn and(self, other: Pred) -> Self {
        let mut terms = match self {
            Pred::And(ts) => ts,
            p => vec![p],
        };
        match other {
            Pred::And(ts) => terms.extend(ts),
            p => terms.push(p),
        }
        Pred::And(terms)
    }
}

impl fmt::Display for Pred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pred::Test(field, value) => write!(f, "{field} = {value}"),
            Pred::Not(p) => write!(f, "not {p}"),
            Pred::And(ts) if ts.is_empty() => f.write_str("true"),
            Pred::And(ts) => write_joined(f, ts, " and "),
        }
    }
}

/// 拓扑位置 `switch@port`；`switch = 0` 表示主机
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub switch: usize,
    pub port: Port,
}

impl Location {
    pub fn switch(id: SwitchId, port: Port) -> Self {
        Self { switch: id.0, port }
    }

    /// 主机 `host` 的位置 `0@host`
    pub fn host(host: HostId) -> Self {
        Self {
            switch: 0,
            port: host.0,
        }
    }

    pub fn as_host(self) -> Option<HostId> {
        (self.switch == 0).then_some(HostId(self.port))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.switch, self.port)
    }
}

/// 策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    Id,
    Filter(Pred),
    Assign(Field, Value),
    Link(Location, Location),
    Seq(Vec<Policy>),
    Union(Vec<Policy>),
    /// 故障切换的非确定选择 `(a + b)`
    Choice(Vec<Policy>),
    Star(Box<Policy>),
    Group(Box<Policy>),
}

impl Policy {
    pub fn filter(pred: Pred) -> Self {
        Policy::Filter(pred)
    }

    pub fn set_port(port: Port) -> Self {
        Policy::Assign(Field::Port, Value::Num(port))
    }

    pub fn link(src: Location, dst: Location) -> Self {
        Policy::Link(src, dst)
    }

    /// 受保护赋值 `filter pred; port := port`
    pub fn guarded(pred: Pred, port: Port) -> Self {
        Policy::Seq(vec![Policy::Filter(pred), Policy::set_port(port)])
    }

    pub fn group(self) -> Self {
        Policy::Group(Box::new(self))
    }

    pub fn star(self) -> Self {
        Policy::Star(Box::new(self))
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Id => f.write_str("id"),
            Policy::Filter(p) => write!(f, "filter {p}"),
            Policy::Assign(field, value) => write!(f, "{field} := {value}"),
            Policy::Link(a, b) => write!(f, "{a} => {b}"),
            Policy::Seq(ps) if ps.is_empty() => f.write_str("id"),
            Policy::Seq(ps) => write_joined(f, ps, "; "),
            Policy::Union(ps) if ps.is_empty() => f.write_str("drop"),
            Policy::Union(ps) => write_joined(f, ps, " | "),
            Policy::Choice(ps) => {
                f.write_str("(")?;
                write_joined(f, ps, " + ")?;
                f.write_str(")")
            }
            Policy::Star(p) => write!(f, "{p}*"),
            Policy::Group(p) => write!(f, "({p})"),
        }
    }
}

/// 顶层程序：规则列表逐行输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Program {
    /// 规则的扁平并集
    Flat(Vec<Policy>),
    /// `(policy; topo)*; (edge_policy; edge_topo)`
    Iterated {
        policy: Vec<Policy>,
        topo: Vec<Policy>,
        edge_policy: Vec<Policy>,
        edge_topo: Vec<Policy>,
    },
    /// `(policy); (edge_policy; edge_topo)`，路径已展开，无需迭代
    Unrolled {
        policy: Vec<Policy>,
        edge_policy: Vec<Policy>,
        edge_topo: Vec<Policy>,
    },
}

impl Program {
    /// 等价的单个策略表达式（供求值使用）
    pub fn to_policy(&self) -> Policy {
        let union = |rules: &[Policy]| Policy::Union(rules.to_vec());
        match self {
            Program::Flat(rules) => union(rules),
            Program::Iterated {
                policy,
                topo,
                edge_policy,
                edge_topo,
            } => Policy::Seq(vec![
                Policy::Seq(vec![union(policy), union(topo)]).star(),
                union(edge_policy),
                union(edge_topo),
            ]),
            Program::Unrolled {
                policy,
                edge_policy,
                edge_topo,
            } => Policy::Seq(vec![union(policy), union(edge_policy), union(edge_topo)]),
        }
    }

    /// 不含拓扑关系的规则条数
    pub fn rule_count(&self) -> usize {
        match self {
            Program::Flat(rules) => rules.len(),
            Program::Iterated {
                policy,
                edge_policy,
                ..
            }
            | Program::Unrolled {
                policy,
                edge_policy,
                ..
            } => policy.len() + edge_policy.len(),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Program::Flat(rules) => {
                write_rules(f, rules)?;
                f.write_str("\n")
            }
            Program::Iterated {
                policy,
                topo,
                edge_policy,
                edge_topo,
            } => {
                f.write_str("((\n")?;
                write_rules(f, policy)?;
                f.write_str("\n);\n(\n")?;
                write_rules(f, topo)?;
                f.write_str("\n))*;\n((\n")?;
                write_rules(f, edge_policy)?;
                f.write_str("\n);\n(\n")?;
                write_rules(f, edge_topo)?;
                f.write_str("\n))\n")
            }
            Program::Unrolled {
                policy,
                edge_policy,
                edge_topo,
            } => {
                f.write_str("(\n")?;
                write_rules(f, policy)?;
                f.write_str("\n);\n((\n")?;
                write_rules(f, edge_policy)?;
                f.write_str("\n);\n(\n")?;
                write_rules(f, edge_topo)?;
                f.write_str("\n))\n")
            }
        }
    }
}

fn write_rules(f: &mut fmt::Formatter<'_>, rules: &[Policy]) -> fmt::Result {
    if rules.is_empty() {
        return f.write_str("drop");
    }
    write_joined(f, rules, " |\n")
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
