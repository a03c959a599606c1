/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Graph 模块的基础类型：节点 ID、符号张量句柄 Var、节点
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::nn::layer::{LayerOp, ParamSpec, TraitLayer};
use crate::nn::FeatureShape;

/// 节点 ID（在同一个图内唯一，按创建顺序递增，因此也是一个拓扑序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 符号张量句柄：某个节点的输出 + 其单样本形状
///
/// 句柄是 `Copy` 的，对它应用一个层总会得到一个新的句柄，原句柄保持不变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Var {
    pub(super) id: NodeId,
    pub(super) shape: FeatureShape,
}

impl Var {
    pub const fn id(&self) -> NodeId {
        self.id
    }

    pub const fn shape(&self) -> FeatureShape {
        self.shape
    }

    /// 最后一维的大小（特征图的通道数）
    pub const fn channels(&self) -> usize {
        self.shape.channels()
    }
}

/// 图中的一个节点
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(super) id: NodeId,
    pub(super) name: String,
    pub(super) op: LayerOp,
    pub(super) parents: Vec<NodeId>,
    pub(super) input_shapes: Vec<FeatureShape>,
    pub(super) output_shape: FeatureShape,
}

impl Node {
    pub const fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn op(&self) -> &LayerOp {
        &self.op
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub const fn output_shape(&self) -> FeatureShape {
        self.output_shape
    }

    pub fn type_name(&self) -> &'static str {
        self.op.type_name()
    }

    /// 本节点需要实例化的参数
    pub fn param_specs(&self) -> Vec<ParamSpec> {
        self.op.param_specs(&self.input_shapes)
    }

    pub fn param_count(&self) -> usize {
        self.param_specs().iter().map(ParamSpec::num_elements).sum()
    }

    pub fn trainable_param_count(&self) -> usize {
        self.param_specs()
            .iter()
            .filter(|spec| spec.trainable)
            .map(ParamSpec::num_elements)
            .sum()
    }
}
