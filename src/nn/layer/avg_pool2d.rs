/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : AvgPool2d (2D 平均池化) 层与全局平均池化层
 *
 * - AvgPool2d：[batch, H, W, C] -> [batch, H', W', C]，same 填充时只对非填充位置求平均
 * - GlobalAvgPool2d：[batch, H, W, C] -> [batch, C]
 */

use ndarray::Axis;
use serde::{Deserialize, Serialize};

use super::max_pool2d::{pool_output_shape, pool2d};
use super::{ForwardContext, TraitLayer, nhwc_view, single_input, single_tensor};
use crate::nn::{FeatureShape, GraphError, Padding};
use crate::tensor::Tensor;

/// 2D 平均池化层（无可学习参数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvgPool2d {
    pub pool_size: (usize, usize),
    pub strides: (usize, usize),
    pub padding: Padding,
}

impl AvgPool2d {
    /// 创建池化层，`strides` 为 None 时默认等于 `pool_size`
    pub fn new(pool_size: (usize, usize), strides: Option<(usize, usize)>, padding: Padding) -> Self {
        Self {
            pool_size,
            strides: strides.unwrap_or(pool_size),
            padding,
        }
    }
}

impl TraitLayer for AvgPool2d {
    fn type_name(&self) -> &'static str {
        "AvgPool2d"
    }

    fn output_shape(&self, inputs: &[FeatureShape]) -> Result<FeatureShape, GraphError> {
        let input = single_input(inputs, self.type_name())?;
        pool_output_shape(input, self.pool_size, self.strides, self.padding, self.type_name())
    }

    fn forward(
        &self,
        inputs: &[&Tensor],
        _params: &[Tensor],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let input = single_tensor(inputs, self.type_name())?;
        pool2d(
            input,
            self.pool_size,
            self.strides,
            self.padding,
            self.type_name(),
            |window| window.iter().sum::<f32>() / window.len().max(1) as f32,
        )
    }

    fn describe(&self) -> String {
        format!(
            "{}×{}, s{}, {}",
            self.pool_size.0, self.pool_size.1, self.strides.0, self.padding
        )
    }
}

/// 全局平均池化：对每个通道在整个空间维度上求平均
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalAvgPool2d {}

impl TraitLayer for GlobalAvgPool2d {
    fn type_name(&self) -> &'static str {
        "GlobalAvgPool2d"
    }

    fn output_shape(&self, inputs: &[FeatureShape]) -> Result<FeatureShape, GraphError> {
        let (_, _, channels) =
            single_input(inputs, self.type_name())?.expect_spatial(self.type_name())?;
        Ok(FeatureShape::flat(channels))
    }

    fn forward(
        &self,
        inputs: &[&Tensor],
        _params: &[Tensor],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let x = nhwc_view(single_tensor(inputs, self.type_name())?, self.type_name())?;
        let (_, h, w, _) = x.dim();
        let pooled = x.sum_axis(Axis(1)).sum_axis(Axis(1)) / (h * w) as f32;
        Ok(Tensor::from_array(pooled.into_dyn()))
    }
}
