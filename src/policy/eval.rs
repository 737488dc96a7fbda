//! 策略求值
//!
//! 报文只携带 `switch`、`port`、`ethSrc`、`ethDst` 四个字段，策略把一个报文映射为报文集合：
//! `filter` 过滤，`:=` 改写，`a@p => b@q` 把位于 `a@p` 的报文移到 `b@q`，
//! `;` 为复合，`|` 与 `+` 为并，`*` 为可达不动点。
//! 报文位于 `0@h` 即表示已交付给主机 `h`。

use std::collections::BTreeSet;

use super::ast::{Field, Location, Policy, Pred, Value};
use crate::net::{HostId, MacAddr, Port, SwitchId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Packet {
    pub switch: usize,
    pub port: Port,
    pub eth_src: MacAddr,
    pub eth_dst: MacAddr,
}

impl Packet {
    /// 位于 `switch@port`、从 `src` 发往 `dst` 的报文
    pub fn at(switch: SwitchId, port: Port, src: MacAddr, dst: MacAddr) -> Self {
        Self {
            switch: switch.0,
            port,
            eth_src: src,
            eth_dst: dst,
        }
    }

    pub fn location(&self) -> Location {
        Location {
            switch: self.switch,
            port: self.port,
        }
    }

    fn get(&self, field: Field) -> Value {
        match field {
            Field::Switch => Value::Num(self.switch),
            Field::Port => Value::Num(self.port),
            Field::EthSrc => Value::Mac(self.eth_src),
            Field::EthDst => Value::Mac(self.eth_dst),
        }
    }

    /// 字段与取值类型不符时返回 `None`
    fn set(mut self, field: Field, value: Value) -> Option<Self> {
        match (field, value) {
            (Field::Switch, Value::Num(n)) => self.switch = n,
            (Field::Port, Value::Num(n)) => self.port = n,
            (Field::EthSrc, Value::Mac(m)) => self.eth_src = m,
            (Field::EthDst, Value::Mac(m)) => self.eth_dst = m,
            _ => return None,
        }
        Some(self)
    }
}

pub fn matches(pred: &Pred, pkt: &Packet) -> bool {
    match pred {
        Pred::Test(field, value) => pkt.get(*field) == *value,
        Pred::Not(p) => !matches(p, pkt),
        Pred::And(ps) => ps.iter().all(|p| matches(p, pkt)),
    }
}

pub fn eval(policy: &Policy, pkt: Packet) -> BTreeSet<Packet> {
    match policy {
        Policy::Id => BTreeSet::from([pkt]),
        Policy::Filter(pred) => {
            if matches(pred, &pkt) {
                BTreeSet::from([pkt])
            } else {
                BTreeSet::new()
            }
        }
        Policy::Assign(field, value) => pkt.set(*field, *value).into_iter().collect(),
        Policy::Link(src, dst) => {
            if pkt.location() == *src {
                BTreeSet::from([Packet {
                    switch: dst.switch,
                    port: dst.port,
                    ..pkt
                }])
            } else {
                BTreeSet::new()
            }
        }
        Policy::Seq(ps) => ps.iter().fold(BTreeSet::from([pkt]), |cur, p| {
            cur.into_iter().flat_map(|x| eval(p, x)).collect()
        }),
        Policy::Union(ps) | Policy::Choice(ps) => ps.iter().flat_map(|p| eval(p, pkt)).collect(),
        Policy::Star(p) => {
            let mut seen = BTreeSet::from([pkt]);
            let mut work = vec![pkt];
            while let Some(x) = work.pop() {
                for y in eval(p, x) {
                    if seen.insert(y) {
                        work.push(y);
                    }
                }
            }
            seen
        }
        Policy::Group(p) => eval(p, pkt),
    }
}

/// 输出报文中已交付的主机
pub fn delivered_hosts(out: &BTreeSet<Packet>) -> BTreeSet<HostId> {
    out.iter().filter_map(|p| p.location().as_host()).collect()
}
