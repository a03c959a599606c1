/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Graph 模块：符号图的搭建与查询
 *
 * 公开 API：
 * - `GraphBuilder` / `Var`: 以符号张量句柄逐层搭建任意 DAG
 * - `Sequential`: 有序的层规格列表
 * - `ModelGraph`: 搭建完成（已剪枝）的不可变图
 * - `GraphError`: 错误类型
 */

mod builder;
mod describe;
mod error;
mod model_graph;
mod sequential;
mod types;

pub use builder::GraphBuilder;
pub use error::GraphError;
pub use model_graph::ModelGraph;
pub use sequential::Sequential;
pub use types::{Node, NodeId, Var};
