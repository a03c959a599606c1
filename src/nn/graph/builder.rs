/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : GraphBuilder：以符号张量句柄（Var）逐层搭建有向无环图
 *
 * 每次添加层时立即做形状推断，形状不合法的拓扑在搭建时就会报错，
 * 而不是等到第一次前向计算。`finish` 时会剪除所有从输出不可达的节点。
 */

use std::collections::{HashMap, HashSet};

use super::{GraphError, ModelGraph, Node, NodeId, Var};
use crate::nn::layer::{
    Activation, ActivationKind, AvgPool2d, BatchNorm, Concatenate, Conv2d, Dense, Dropout,
    Flatten, GlobalAvgPool2d, Input, LayerOp, MaxPool2d, TraitLayer,
};
use crate::nn::FeatureShape;

pub struct GraphBuilder {
    name: String,
    nodes: Vec<Node>,
    names: HashSet<String>,
    type_counters: HashMap<&'static str, usize>,
    next_id: u64,
    input: Option<NodeId>,
}

impl GraphBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
            names: HashSet::new(),
            type_counters: HashMap::new(),
            next_id: 0,
            input: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 当前已添加的节点数（含之后可能被剪除的节点）
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 声明图的输入（每个图只能有一个输入）
    pub fn input(&mut self, shape: impl Into<FeatureShape>) -> Result<Var, GraphError> {
        self.input_named(shape, "input")
    }

    pub(super) fn input_named(
        &mut self,
        shape: impl Into<FeatureShape>,
        name: &str,
    ) -> Result<Var, GraphError> {
        if let Some(existing) = self.input {
            return Err(GraphError::InvalidOperation(format!(
                "图 {} 已有输入节点 {existing}，只支持单输入",
                self.name
            )));
        }
        let shape = shape.into();
        if shape.dims().contains(&0) {
            return Err(GraphError::InvalidOperation(format!(
                "输入形状的各维必须大于 0，得到 {shape}"
            )));
        }
        let var = self.push(LayerOp::from(Input::new(shape)), &[], Some(name))?;
        self.input = Some(var.id);
        Ok(var)
    }

    /// 对 `parents` 应用一个层，返回新的句柄
    ///
    /// `name` 为 None 时自动命名为 `{类型名小写}_{序号}`（如 `conv2d_3`）
    pub fn add(
        &mut self,
        op: impl Into<LayerOp>,
        parents: &[Var],
        name: Option<&str>,
    ) -> Result<Var, GraphError> {
        let op = op.into();
        if matches!(op, LayerOp::Input(_)) {
            return Err(GraphError::InvalidOperation(
                "Input 节点请通过 GraphBuilder::input 创建".to_string(),
            ));
        }
        self.push(op, parents, name)
    }

    fn push(&mut self, op: LayerOp, parents: &[Var], name: Option<&str>) -> Result<Var, GraphError> {
        let mut input_shapes = Vec::with_capacity(parents.len());
        for parent in parents {
            let node = self.find(parent.id)?;
            input_shapes.push(node.output_shape);
        }
        let output_shape = op.output_shape(&input_shapes)?;

        let name = match name {
            Some(name) if self.names.contains(name) => {
                return Err(GraphError::DuplicateNodeName(name.to_string()));
            }
            Some(name) => name.to_string(),
            None => self.auto_name(op.type_name()),
        };

        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.names.insert(name.clone());
        self.nodes.push(Node {
            id,
            name,
            op,
            parents: parents.iter().map(Var::id).collect(),
            input_shapes,
            output_shape,
        });
        Ok(Var {
            id,
            shape: output_shape,
        })
    }

    fn auto_name(&mut self, type_name: &'static str) -> String {
        let prefix = type_name.to_ascii_lowercase();
        let counter = self.type_counters.entry(type_name).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{prefix}_{counter}");
            if !self.names.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn find(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes
            .binary_search_by_key(&id, |node| node.id)
            .map(|index| &self.nodes[index])
            .map_err(|_| GraphError::NodeNotFound(id))
    }

    // ==================== 各层的便捷方法 ====================

    pub fn conv2d(&mut self, x: Var, layer: Conv2d) -> Result<Var, GraphError> {
        self.add(layer, &[x], None)
    }

    pub fn max_pool2d(&mut self, x: Var, layer: MaxPool2d) -> Result<Var, GraphError> {
        self.add(layer, &[x], None)
    }

    pub fn avg_pool2d(&mut self, x: Var, layer: AvgPool2d) -> Result<Var, GraphError> {
        self.add(layer, &[x], None)
    }

    pub fn global_avg_pool2d(&mut self, x: Var) -> Result<Var, GraphError> {
        self.add(GlobalAvgPool2d {}, &[x], None)
    }

    pub fn batch_norm(&mut self, x: Var) -> Result<Var, GraphError> {
        self.add(BatchNorm::default(), &[x], None)
    }

    pub fn activation(&mut self, x: Var, kind: ActivationKind) -> Result<Var, GraphError> {
        self.add(Activation::new(kind), &[x], None)
    }

    pub fn relu(&mut self, x: Var) -> Result<Var, GraphError> {
        self.activation(x, ActivationKind::Relu)
    }

    pub fn dropout(&mut self, x: Var, rate: f32) -> Result<Var, GraphError> {
        self.add(Dropout::new(rate), &[x], None)
    }

    pub fn flatten(&mut self, x: Var) -> Result<Var, GraphError> {
        self.add(Flatten {}, &[x], None)
    }

    pub fn dense(&mut self, x: Var, units: usize, activation: ActivationKind) -> Result<Var, GraphError> {
        self.add(Dense::new(units, activation), &[x], None)
    }

    /// 沿通道维拼接
    pub fn concatenate(&mut self, xs: &[Var]) -> Result<Var, GraphError> {
        self.add(Concatenate {}, xs, None)
    }

    /// 以 `output` 为输出结束搭建
    ///
    /// 只保留从 `output` 反向可达的节点，其余节点（死计算）被剪除，数量记录在
    /// `ModelGraph::pruned_count` 中。
    pub fn finish(self, output: Var) -> Result<ModelGraph, GraphError> {
        let input = self.input.ok_or_else(|| {
            GraphError::InvalidOperation(format!("图 {} 没有输入节点", self.name))
        })?;
        self.find(output.id)?;

        let mut reachable = HashSet::new();
        let mut stack = vec![output.id];
        while let Some(id) = stack.pop() {
            if reachable.insert(id) {
                stack.extend_from_slice(&self.find(id)?.parents);
            }
        }

        let total = self.nodes.len();
        let nodes: Vec<Node> = self
            .nodes
            .into_iter()
            .filter(|node| reachable.contains(&node.id))
            .collect();
        let pruned_count = total - nodes.len();

        let graph = ModelGraph::from_parts(self.name, nodes, input, output.id, pruned_count);
        tracing::debug!(
            graph = graph.name(),
            nodes = graph.len(),
            pruned = pruned_count,
            params = graph.param_count(),
            "计算图搭建完成"
        );
        Ok(graph)
    }
}
