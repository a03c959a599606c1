/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Layer 模块 - 不可变的层规格记录
 *
 * 每个层规格只保存超参数，并提供三个纯函数：
 * - `output_shape`：根据父节点形状推断输出形状（不依赖数据）
 * - `param_specs`：根据父节点形状给出需要实例化的参数
 * - `forward`：给定输入张量与参数计算输出（NHWC 布局）
 */

mod activation;
mod avg_pool2d;
mod batch_norm;
mod concatenate;
mod conv2d;
mod dense;
mod dropout;
mod flatten;
mod input;
mod max_pool2d;

pub use activation::{Activation, ActivationKind};
pub use avg_pool2d::{AvgPool2d, GlobalAvgPool2d};
pub use batch_norm::BatchNorm;
pub use concatenate::Concatenate;
pub use conv2d::Conv2d;
pub use dense::Dense;
pub use dropout::Dropout;
pub use flatten::Flatten;
pub use input::Input;
pub use max_pool2d::MaxPool2d;

use enum_dispatch::enum_dispatch;
use ndarray::{ArrayView2, ArrayView4, Ix2, Ix4};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::{FeatureShape, GraphError, Init};
use crate::tensor::Tensor;

#[enum_dispatch]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerOp {
    Input,
    Conv2d,
    MaxPool2d,
    AvgPool2d,
    GlobalAvgPool2d,
    BatchNorm,
    Activation,
    Dropout,
    Flatten,
    Dense,
    Concatenate,
}

#[enum_dispatch(LayerOp)]
pub trait TraitLayer {
    /// 层类型名（如 "Conv2d"），用于自动命名和摘要
    fn type_name(&self) -> &'static str;

    /// 根据父节点的单样本形状推断输出形状
    fn output_shape(&self, inputs: &[FeatureShape]) -> Result<FeatureShape, GraphError>;

    /// 本层需要的参数（无参数的层返回空列表）
    fn param_specs(&self, _inputs: &[FeatureShape]) -> Vec<ParamSpec> {
        Vec::new()
    }

    /// 前向计算，`params` 的顺序与 `param_specs` 一致
    fn forward(
        &self,
        inputs: &[&Tensor],
        params: &[Tensor],
        ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError>;

    /// 训练模式下前向计算之后调用，用于更新非训练参数（如 BatchNorm 的滑动统计量）
    fn update_state(&self, _inputs: &[&Tensor], _params: &mut [Tensor]) -> Result<(), GraphError> {
        Ok(())
    }

    /// 超参数的简短描述（用于摘要表格）
    fn describe(&self) -> String {
        String::new()
    }
}

/// 一个待实例化参数的规格
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// 参数后缀名（如 "kernel"、"bias"），完整名称为 `{层名}/{后缀}`
    pub name: &'static str,
    pub shape: Vec<usize>,
    pub init: Init,
    /// 是否由优化器更新（BatchNorm 的滑动均值/方差为 false）
    pub trainable: bool,
}

impl ParamSpec {
    pub(crate) fn new(name: &'static str, shape: Vec<usize>, init: Init, trainable: bool) -> Self {
        Self {
            name,
            shape,
            init,
            trainable,
        }
    }

    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }
}

/// 前向传播模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForwardMode {
    /// 推理：Dropout 为恒等映射，BatchNorm 使用滑动统计量
    #[default]
    Inference,
    /// 训练：Dropout 随机丢弃，BatchNorm 使用当前 batch 的统计量
    Training,
}

/// 前向计算的上下文
pub struct ForwardContext<'a> {
    pub mode: ForwardMode,
    /// 训练模式下 Dropout 使用的随机数生成器
    pub rng: Option<&'a mut StdRng>,
}

impl<'a> ForwardContext<'a> {
    pub const fn inference() -> Self {
        Self {
            mode: ForwardMode::Inference,
            rng: None,
        }
    }

    pub const fn training(rng: &'a mut StdRng) -> Self {
        Self {
            mode: ForwardMode::Training,
            rng: Some(rng),
        }
    }
}

// ==================== 各层共享的辅助函数 ====================

/// 要求恰好 1 个父节点
fn single_input(inputs: &[FeatureShape], type_name: &str) -> Result<FeatureShape, GraphError> {
    match inputs {
        [shape] => Ok(*shape),
        _ => Err(GraphError::InvalidOperation(format!(
            "{type_name} 节点需要 1 个父节点，实际为 {} 个",
            inputs.len()
        ))),
    }
}

fn single_tensor<'a>(inputs: &[&'a Tensor], type_name: &str) -> Result<&'a Tensor, GraphError> {
    match inputs {
        [tensor] => Ok(*tensor),
        _ => Err(GraphError::ComputationError(format!(
            "{type_name} 需要 1 个输入张量，实际为 {} 个",
            inputs.len()
        ))),
    }
}

/// 将张量视为 `[batch, H, W, C]`
fn nhwc_view<'a>(tensor: &'a Tensor, type_name: &str) -> Result<ArrayView4<'a, f32>, GraphError> {
    tensor.expect_dimension(4)?;
    tensor
        .view()
        .into_dimensionality::<Ix4>()
        .map_err(|e| GraphError::ComputationError(format!("{type_name}: {e}")))
}

/// 将张量视为 `[batch, features]`
fn matrix_view<'a>(tensor: &'a Tensor, type_name: &str) -> Result<ArrayView2<'a, f32>, GraphError> {
    tensor.expect_dimension(2)?;
    tensor
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|e| GraphError::ComputationError(format!("{type_name}: {e}")))
}

/// 按下标取参数，缺失时报错（参数由 Model 按 `param_specs` 实例化，正常不会缺失）
fn param<'a>(params: &'a [Tensor], index: usize, type_name: &str) -> Result<&'a Tensor, GraphError> {
    params.get(index).ok_or_else(|| {
        GraphError::ComputationError(format!("{type_name} 缺少第 {index} 个参数"))
    })
}

