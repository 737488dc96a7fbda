//! 拓扑图导出
//!
//! 把生成的拓扑写成 JSON 图：节点带类型、编号（主机另带 MAC/IP），
//! 边带两端端口、带宽与开销，便于外部工具可视化或导入。

mod types;

pub use types::{GraphLink, GraphNode, TopoGraph};
