//! 网络模型
//!
//! 此模块包含拓扑的核心数据结构：标识符、地址、节点、链路、拓扑与路由表。

// 子模块声明
mod addr;
mod id;
mod link;
mod network;
mod node;
mod routing;

// 重新导出公共接口
pub use addr::{MAX_HOSTS, MacAddr, ip, mac};
pub use id::{HostId, LinkId, NodeId, Port, SwitchId};
pub use link::Link;
pub use network::Network;
pub use node::{Host, Switch, Tier};
pub use routing::{RouteKey, RoutingTable, RoutingTables, build_routing_tables};
