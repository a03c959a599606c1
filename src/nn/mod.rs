/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 负责神经网络（neural network）的构建：
 *                 层规格（layer）→ 符号图（graph）→ 实例化模型（model）
 */

mod descriptor;
mod graph;
mod init;
pub mod layer;
mod model;
mod shape;

pub use descriptor::{GraphDescriptor, NodeDescriptor};
pub use graph::{GraphBuilder, GraphError, ModelGraph, Node, NodeId, Sequential, Var};
pub use init::Init;
pub use layer::{ActivationKind, ForwardContext, ForwardMode, LayerOp, ParamSpec, TraitLayer};
pub use model::Model;
pub use shape::{FeatureShape, Padding};

#[cfg(test)]
mod tests;
