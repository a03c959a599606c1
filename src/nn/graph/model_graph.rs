/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : ModelGraph：搭建完成（已剪枝）的不可变计算图
 */

use super::{GraphError, Node, NodeId};
use crate::nn::FeatureShape;

/// 从唯一输入到唯一输出的有向无环图，节点按拓扑序（ID 递增）存放
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGraph {
    name: String,
    nodes: Vec<Node>,
    input: NodeId,
    output: NodeId,
    pruned_count: usize,
}

impl ModelGraph {
    pub(super) const fn from_parts(
        name: String,
        nodes: Vec<Node>,
        input: NodeId,
        output: NodeId,
        pruned_count: usize,
    ) -> Self {
        Self {
            name,
            nodes,
            input,
            output,
            pruned_count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub const fn input_id(&self) -> NodeId {
        self.input
    }

    pub const fn output_id(&self) -> NodeId {
        self.output
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    /// 节点在 `nodes()` 中的下标
    pub fn index_of(&self, id: NodeId) -> Result<usize, GraphError> {
        self.nodes
            .binary_search_by_key(&id, Node::id)
            .map_err(|_| GraphError::NodeNotFound(id))
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn parents(&self, id: NodeId) -> Result<&[NodeId], GraphError> {
        Ok(self.node(id)?.parents())
    }

    /// 单样本输入形状 `(H, W, C)`
    pub fn input_shape(&self) -> FeatureShape {
        self.shape_of(self.input)
    }

    /// 单样本输出形状
    pub fn output_shape(&self) -> FeatureShape {
        self.shape_of(self.output)
    }

    fn shape_of(&self, id: NodeId) -> FeatureShape {
        // input/output 在构造时已校验存在
        self.node(id)
            .map_or(FeatureShape::flat(0), Node::output_shape)
    }

    /// 指定类型（`type_name`，如 "Conv2d"、"ReLU"）的节点个数
    pub fn count_layers(&self, type_name: &str) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.type_name() == type_name)
            .count()
    }

    pub fn param_count(&self) -> usize {
        self.nodes.iter().map(Node::param_count).sum()
    }

    pub fn trainable_param_count(&self) -> usize {
        self.nodes.iter().map(Node::trainable_param_count).sum()
    }

    /// `finish` 时因从输出不可达而被剪除的节点数
    pub const fn pruned_count(&self) -> usize {
        self.pruned_count
    }
}
