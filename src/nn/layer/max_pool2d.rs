/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : MaxPool2d (2D 最大池化) 层
 *
 * 输入/输出格式（NHWC）：[batch, H, W, C] -> [batch, H', W', C]
 * same 填充时，落在填充区域的位置不参与取最大值（与 TensorFlow 一致）
 */

use serde::{Deserialize, Serialize};

use super::{ForwardContext, TraitLayer, nhwc_view, single_input, single_tensor};
use crate::nn::{FeatureShape, GraphError, Padding};
use crate::tensor::Tensor;

/// 2D 最大池化层（无可学习参数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxPool2d {
    pub pool_size: (usize, usize),
    pub strides: (usize, usize),
    pub padding: Padding,
}

impl MaxPool2d {
    /// 创建池化层，`strides` 为 None 时默认等于 `pool_size`
    pub fn new(pool_size: (usize, usize), strides: Option<(usize, usize)>, padding: Padding) -> Self {
        Self {
            pool_size,
            strides: strides.unwrap_or(pool_size),
            padding,
        }
    }
}

impl TraitLayer for MaxPool2d {
    fn type_name(&self) -> &'static str {
        "MaxPool2d"
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
            |window| window.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        )
    }

    fn describe(&self) -> String {
        format!(
            "{}×{}, s{}, {}",
            self.pool_size.0, self.pool_size.1, self.strides.0, self.padding
        )
    }
}

/// 池化层的输出形状推断（最大/平均池化共用）
pub(super) fn pool_output_shape(
    input: FeatureShape,
    pool_size: (usize, usize),
    strides: (usize, usize),
    padding: Padding,
    type_name: &str,
) -> Result<FeatureShape, GraphError> {
    let (in_h, in_w, channels) = input.expect_spatial(type_name)?;
    let out_h = padding.output_dim(in_h, pool_size.0, strides.0);
    let out_w = padding.output_dim(in_w, pool_size.1, strides.1);
    match (out_h, out_w) {
        (Some(out_h), Some(out_w)) => Ok(FeatureShape::spatial(out_h, out_w, channels)),
        _ => Err(GraphError::ShapeMismatch {
            expected: vec![pool_size.0, pool_size.1],
            got: vec![in_h, in_w],
            message: format!(
                "{type_name} 池化窗口 {}x{}（步长 {strides:?}，{padding} 填充）超出输入尺寸 {in_h}x{in_w}",
                pool_size.0, pool_size.1
            ),
        }),
    }
}

/// 通用 2D 池化：对每个输出位置收集窗口内（非填充区域）的输入值，再交给 `reduce` 归约
pub(super) fn pool2d<F>(
    input: &Tensor,
    pool_size: (usize, usize),
    strides: (usize, usize),
    padding: Padding,
    type_name: &str,
    reduce: F,
) -> Result<Tensor, GraphError>
where
    F: Fn(&[f32]) -> f32,
{
    let x = nhwc_view(input, type_name)?;
    let (batch_size, in_h, in_w, channels) = x.dim();
    let out_shape = pool_output_shape(
        FeatureShape::spatial(in_h, in_w, channels),
        pool_size,
        strides,
        padding,
        type_name,
    )?;
    let (out_h, out_w) = out_shape.spatial_dims().unwrap_or((0, 0));
    let (p_h, p_w) = pool_size;
    let (s_h, s_w) = strides;
    let (pad_top, _) = padding.pads(in_h, p_h, s_h);
    let (pad_left, _) = padding.pads(in_w, p_w, s_w);

    let mut data = Vec::with_capacity(batch_size * out_h * out_w * channels);
    let mut window = Vec::with_capacity(p_h * p_w);
    for b in 0..batch_size {
        for oh in 0..out_h {
            for ow in 0..out_w {
                for c in 0..channels {
                    window.clear();
                    for ph in 0..p_h {
                        let Some(ih) = (oh * s_h + ph).checked_sub(pad_top) else {
                            continue;
                        };
                        if ih >= in_h {
                            continue;
                        }
                        for pw in 0..p_w {
                            let Some(iw) = (ow * s_w + pw).checked_sub(pad_left) else {
                                continue;
                            };
                            if iw < in_w {
                                window.push(x[[b, ih, iw, c]]);
                            }
                        }
                    }
                    data.push(reduce(&window));
                }
            }
        }
    }

    Ok(Tensor::new(&data, &[batch_size, out_h, out_w, channels])?)
}
