/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Model：计算图的"编译"结果
 *
 * `ModelGraph` 只描述拓扑与形状；`Model` 按每个节点的 `param_specs` 实例化参数，
 * 并提供推理/训练两种模式的前向传播，以及参数与模型的保存/加载。
 */

mod model_io;
mod serialization;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::layer::{ForwardContext, TraitLayer};
use super::{GraphError, ModelGraph, Node};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub struct Model {
    graph: ModelGraph,
    /// 与 `graph.nodes()` 一一对应，每个节点的参数按 `param_specs` 顺序排列
    params: Vec<Vec<Tensor>>,
    rng: StdRng,
}

impl Model {
    /// 使用系统熵作为随机种子实例化参数
    pub fn new(graph: ModelGraph) -> Self {
        Self::compile(graph, StdRng::from_entropy())
    }

    /// 使用固定种子实例化参数（结果可复现）
    pub fn new_with_seed(graph: ModelGraph, seed: u64) -> Self {
        Self::compile(graph, StdRng::seed_from_u64(seed))
    }

    fn compile(graph: ModelGraph, mut rng: StdRng) -> Self {
        let params = graph
            .nodes()
            .iter()
            .map(|node| {
                node.param_specs()
                    .iter()
                    .map(|spec| spec.init.generate_with_rng(&spec.shape, &mut rng))
                    .collect()
            })
            .collect();
        tracing::debug!(
            graph = graph.name(),
            params = graph.param_count(),
            "模型参数已实例化"
        );
        Self { graph, params, rng }
    }

    pub const fn graph(&self) -> &ModelGraph {
        &self.graph
    }

    pub fn param_count(&self) -> usize {
        self.params.iter().flatten().map(Tensor::size).sum()
    }

    /// 按完整名称（`{节点名}/{参数名}`，如 `conv2d_1/kernel`）获取参数
    pub fn param(&self, name: &str) -> Option<&Tensor> {
        let (node_index, param_index) = self.locate(name)?;
        self.params[node_index].get(param_index)
    }

    /// 按完整名称替换参数，形状必须与原参数一致
    pub fn set_param(&mut self, name: &str, value: Tensor) -> Result<(), GraphError> {
        let (node_index, param_index) = self.locate(name).ok_or_else(|| {
            GraphError::InvalidOperation(format!("模型 {} 中不存在参数 {name}", self.graph.name()))
        })?;
        let slot = &mut self.params[node_index][param_index];
        if slot.shape() != value.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: slot.shape().to_vec(),
                got: value.shape().to_vec(),
                message: format!("参数 {name} 的形状不匹配"),
            });
        }
        *slot = value;
        Ok(())
    }

    /// 所有参数（按拓扑序），名称形如 `{节点名}/{参数名}`
    pub fn named_params(&self) -> Vec<(String, &Tensor)> {
        self.graph
            .nodes()
            .iter()
            .zip(&self.params)
            .flat_map(|(node, params)| {
                node.param_specs()
                    .into_iter()
                    .zip(params)
                    .map(|(spec, tensor)| (format!("{}/{}", node.name(), spec.name), tensor))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn locate(&self, name: &str) -> Option<(usize, usize)> {
        let (node_name, param_name) = name.rsplit_once('/')?;
        let node = self.graph.node_by_name(node_name)?;
        let node_index = self.graph.index_of(node.id()).ok()?;
        let param_index = node
            .param_specs()
            .iter()
            .position(|spec| spec.name == param_name)?;
        Some((node_index, param_index))
    }

    /// 推理模式前向传播：Dropout 为恒等映射，BatchNorm 使用滑动统计量
    ///
    /// `x` 的形状须为 `[batch, H, W, C]`（与图的输入形状一致），返回 `[batch, num_classes]`
    pub fn forward(&self, x: &Tensor) -> Result<Tensor, GraphError> {
        let mut ctx = ForwardContext::inference();
        evaluate(&self.graph, x, |index, node, inputs| {
            node.op().forward(inputs, &self.params[index], &mut ctx)
        })
    }

    /// 训练模式前向传播：Dropout 按模型的随机数生成器丢弃，
    /// BatchNorm 使用当前 batch 的统计量并更新滑动统计量
    pub fn forward_train(&mut self, x: &Tensor) -> Result<Tensor, GraphError> {
        let Self { graph, params, rng } = self;
        let mut ctx = ForwardContext::training(rng);
        evaluate(graph, x, |index, node, inputs| {
            let output = node.op().forward(inputs, &params[index], &mut ctx)?;
            node.op().update_state(inputs, &mut params[index])?;
            Ok(output)
        })
    }
}

/// 按拓扑序逐节点求值，中间结果在最后一个使用者计算完成后立即释放
fn evaluate<F>(graph: &ModelGraph, x: &Tensor, mut step: F) -> Result<Tensor, GraphError>
where
    F: FnMut(usize, &Node, &[&Tensor]) -> Result<Tensor, GraphError>,
{
    let input_shape = graph.input_shape();
    if !input_shape.is_compatible_with_tensor(x.shape()) {
        return Err(GraphError::ShapeMismatch {
            expected: input_shape.with_batch(x.shape().first().copied().unwrap_or(1)),
            got: x.shape().to_vec(),
            message: format!("模型 {} 的输入形状应为 {input_shape}", graph.name()),
        });
    }

    let nodes = graph.nodes();
    let mut last_use: Vec<usize> = (0..nodes.len()).collect();
    let mut parent_indices = Vec::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        let parents = node
            .parents()
            .iter()
            .map(|id| graph.index_of(*id))
            .collect::<Result<Vec<_>, _>>()?;
        for &parent in &parents {
            last_use[parent] = last_use[parent].max(index);
        }
        parent_indices.push(parents);
    }
    let output_index = graph.index_of(graph.output_id())?;
    last_use[output_index] = usize::MAX;

    let mut values: Vec<Option<Tensor>> = vec![None; nodes.len()];
    for (index, node) in nodes.iter().enumerate() {
        let value = if node.id() == graph.input_id() {
            x.clone()
        } else {
            let inputs = parent_indices[index]
                .iter()
                .map(|&parent| {
                    values[parent]
                        .as_ref()
                        .ok_or(GraphError::NodeNotFound(nodes[parent].id()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            step(index, node, &inputs)?
        };
        values[index] = Some(value);
        for &parent in &parent_indices[index] {
            if last_use[parent] == index {
                values[parent] = None;
            }
        }
    }

    values[output_index]
        .take()
        .ok_or(GraphError::NodeNotFound(graph.output_id()))
}
