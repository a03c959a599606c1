/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Conv2d (2D 卷积) 层 - Keras 风格 API
 *
 * 输入/输出形状（NHWC）：
 * - 输入：[batch_size, H, W, in_channels]
 * - 输出：[batch_size, H', W', filters]
 *
 * 输出尺寸计算：
 * - valid: H' = (H - kernel_h) / stride_h + 1
 * - same:  H' = ceil(H / stride_h)
 *
 * 计算：output = activation(conv2d(x, K) + b)
 */

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{
    ActivationKind, ForwardContext, ParamSpec, TraitLayer, nhwc_view, param, single_input,
    single_tensor,
};
use crate::nn::{FeatureShape, GraphError, Init, Padding};
use crate::tensor::Tensor;

/// Conv2d (2D 卷积) 层
///
/// # 参数布局
/// - 卷积核：`[kernel_h, kernel_w, in_channels, filters]`
/// - 偏置：`[filters]`（可选）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conv2d {
    pub filters: usize,
    pub kernel_size: (usize, usize),
    pub strides: (usize, usize),
    pub padding: Padding,
    pub activation: ActivationKind,
    pub use_bias: bool,
}

impl Conv2d {
    /// 创建步长为 1、valid 填充、带偏置、无激活的卷积层
    pub const fn new(filters: usize, kernel_size: (usize, usize)) -> Self {
        Self {
            filters,
            kernel_size,
            strides: (1, 1),
            padding: Padding::Valid,
            activation: ActivationKind::Linear,
            use_bias: true,
        }
    }

    pub const fn with_strides(mut self, strides: (usize, usize)) -> Self {
        self.strides = strides;
        self
    }

    pub const fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub const fn with_activation(mut self, activation: ActivationKind) -> Self {
        self.activation = activation;
        self
    }

    /// 根据输入的 (H, W) 计算输出的 (H', W')
    fn output_hw(&self, in_h: usize, in_w: usize) -> Result<(usize, usize), GraphError> {
        let (k_h, k_w) = self.kernel_size;
        let (s_h, s_w) = self.strides;
        let out_h = self.padding.output_dim(in_h, k_h, s_h);
        let out_w = self.padding.output_dim(in_w, k_w, s_w);
        match (out_h, out_w) {
            (Some(out_h), Some(out_w)) => Ok((out_h, out_w)),
            _ => Err(GraphError::ShapeMismatch {
                expected: vec![k_h, k_w],
                got: vec![in_h, in_w],
                message: format!(
                    "Conv2d 卷积核 {k_h}x{k_w}（步长 {:?}，{} 填充）无法作用于 {in_h}x{in_w} 的输入",
                    self.strides, self.padding
                ),
            }),
        }
    }
}

impl TraitLayer for Conv2d {
    fn type_name(&self) -> &'static str {
        "Conv2d"
    }

    fn output_shape(&self, inputs: &[FeatureShape]) -> Result<FeatureShape, GraphError> {
        if self.filters == 0 {
            return Err(GraphError::InvalidOperation(
                "Conv2d 的 filters 必须大于 0".to_string(),
            ));
        }
        let (in_h, in_w, _) = single_input(inputs, self.type_name())?.expect_spatial("Conv2d")?;
        let (out_h, out_w) = self.output_hw(in_h, in_w)?;
        Ok(FeatureShape::spatial(out_h, out_w, self.filters))
    }

    fn param_specs(&self, inputs: &[FeatureShape]) -> Vec<ParamSpec> {
        let in_channels = inputs.first().map_or(0, FeatureShape::channels);
        let (k_h, k_w) = self.kernel_size;
        let mut specs = vec![ParamSpec::new(
            "kernel",
            vec![k_h, k_w, in_channels, self.filters],
            Init::Kaiming,
            true,
        )];
        if self.use_bias {
            specs.push(ParamSpec::new("bias", vec![self.filters], Init::Zeros, true));
        }
        specs
    }

    fn forward(
        &self,
        inputs: &[&Tensor],
        params: &[Tensor],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let input = nhwc_view(single_tensor(inputs, "Conv2d")?, "Conv2d")?;
        let (batch_size, in_h, in_w, in_c) = input.dim();

        let kernel = nhwc_view(param(params, 0, "Conv2d")?, "Conv2d 卷积核")?;
        let (k_h, k_w, k_in, out_c) = kernel.dim();
        if k_in != in_c || out_c != self.filters {
            return Err(GraphError::ShapeMismatch {
                expected: vec![self.kernel_size.0, self.kernel_size.1, in_c, self.filters],
                got: vec![k_h, k_w, k_in, out_c],
                message: "Conv2d 卷积核形状与输入通道数不符".to_string(),
            });
        }
        let bias = if self.use_bias {
            Some(param(params, 1, "Conv2d")?.to_vec())
        } else {
            None
        };

        let (s_h, s_w) = self.strides;
        let (out_h, out_w) = self.output_hw(in_h, in_w)?;
        let (pad_top, _) = self.padding.pads(in_h, k_h, s_h);
        let (pad_left, _) = self.padding.pads(in_w, k_w, s_w);
        let single_sample_size = out_h * out_w * out_c;

        // Rayon 并行计算每个 batch 样本
        let batch_results: Vec<Vec<f32>> = (0..batch_size)
            .into_par_iter()
            .map(|b| {
                let mut sample_data = vec![0.0f32; single_sample_size];
                for oh in 0..out_h {
                    for ow in 0..out_w {
                        let base = (oh * out_w + ow) * out_c;
                        let out_pixel = &mut sample_data[base..base + out_c];
                        if let Some(ref bias) = bias {
                            out_pixel.copy_from_slice(bias);
                        }
                        for kh in 0..k_h {
                            // 落在填充区域的位置贡献为 0，直接跳过
                            let Some(ih) = (oh * s_h + kh).checked_sub(pad_top) else {
                                continue;
                            };
                            if ih >= in_h {
                                continue;
                            }
                            for kw in 0..k_w {
                                let Some(iw) = (ow * s_w + kw).checked_sub(pad_left) else {
                                    continue;
                                };
                                if iw >= in_w {
                                    continue;
                                }
                                for ic in 0..in_c {
                                    let x = input[[b, ih, iw, ic]];
                                    if x == 0.0 {
                                        continue;
                                    }
                                    for (oc, out) in out_pixel.iter_mut().enumerate() {
                                        *out += x * kernel[[kh, kw, ic, oc]];
                                    }
                                }
                            }
                        }
                    }
                }
                sample_data
            })
            .collect();

        // 合并结果
        let all_data: Vec<f32> = batch_results.into_iter().flatten().collect();
        let output = Tensor::new(&all_data, &[batch_size, out_h, out_w, out_c])?;
        Ok(self.activation.apply(output))
    }

    fn describe(&self) -> String {
        format!(
            "{}, {}×{}, s{}, {}, {}",
            self.filters,
            self.kernel_size.0,
            self.kernel_size.1,
            self.strides.0,
            self.padding,
            self.activation
        )
    }
}
