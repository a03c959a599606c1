/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : BatchNorm (批归一化) 层
 *
 * 沿最后一维（通道/特征）归一化，适用于 [batch, H, W, C] 与 [batch, N]：
 *   y = gamma * (x - mean) / sqrt(var + epsilon) + beta
 *
 * - 推理模式：mean/var 取滑动统计量
 * - 训练模式：mean/var 取当前 batch 的统计量（有偏方差），前向之后由 `update_state`
 *   更新滑动统计量
 */

use ndarray::Axis;
use serde::{Deserialize, Serialize};

use super::{ForwardContext, ForwardMode, ParamSpec, TraitLayer, single_input, single_tensor};
use crate::nn::{FeatureShape, GraphError, Init};
use crate::tensor::Tensor;

/// 参数顺序：gamma, beta, moving_mean, moving_variance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchNorm {
    pub epsilon: f32,
    pub momentum: f32,
}

impl Default for BatchNorm {
    fn default() -> Self {
        Self {
            epsilon: 1e-3,
            momentum: 0.99,
        }
    }
}

impl TraitLayer for BatchNorm {
    fn type_name(&self) -> &'static str {
        "BatchNorm"
    }

    fn output_shape(&self, inputs: &[FeatureShape]) -> Result<FeatureShape, GraphError> {
        single_input(inputs, self.type_name())
    }

    fn param_specs(&self, inputs: &[FeatureShape]) -> Vec<ParamSpec> {
        let channels = inputs.first().map_or(0, FeatureShape::channels);
        vec![
            ParamSpec::new("gamma", vec![channels], Init::Ones, true),
            ParamSpec::new("beta", vec![channels], Init::Zeros, true),
            ParamSpec::new("moving_mean", vec![channels], Init::Zeros, false),
            ParamSpec::new("moving_variance", vec![channels], Init::Ones, false),
        ]
    }

    fn forward(
        &self,
        inputs: &[&Tensor],
        params: &[Tensor],
        ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let input = single_tensor(inputs, self.type_name())?;
        let [gamma, beta, moving_mean, moving_var] = params else {
            return Err(GraphError::ComputationError(format!(
                "BatchNorm 需要 4 个参数，实际为 {} 个",
                params.len()
            )));
        };

        let last = Axis(input.dimension().saturating_sub(1));
        let channels = input.shape().last().copied().unwrap_or(0);
        if gamma.size() != channels {
            return Err(GraphError::ShapeMismatch {
                expected: vec![channels],
                got: gamma.shape().to_vec(),
                message: "BatchNorm 参数长度与输入通道数不符".to_string(),
            });
        }

        let (mean, var) = match ctx.mode {
            ForwardMode::Inference => (moving_mean.to_vec(), moving_var.to_vec()),
            ForwardMode::Training => channel_moments(input, last, channels),
        };

        let gamma = gamma.to_vec();
        let beta = beta.to_vec();
        let scale: Vec<f32> = var
            .iter()
            .zip(&gamma)
            .map(|(v, g)| g / (v + self.epsilon).sqrt())
            .collect();

        let mut data = input.data().clone();
        for mut lane in data.lanes_mut(last) {
            for (c, x) in lane.iter_mut().enumerate() {
                *x = (*x - mean[c]) * scale[c] + beta[c];
            }
        }
        Ok(Tensor::from_array(data))
    }

    /// moving = moving * momentum + batch * (1 - momentum)
    fn update_state(&self, inputs: &[&Tensor], params: &mut [Tensor]) -> Result<(), GraphError> {
        let input = single_tensor(inputs, self.type_name())?;
        let param_count = params.len();
        let [_, _, moving_mean, moving_var] = params else {
            return Err(GraphError::ComputationError(format!(
                "BatchNorm 需要 4 个参数，实际为 {param_count} 个"
            )));
        };

        let last = Axis(input.dimension().saturating_sub(1));
        let channels = moving_mean.size();
        let (batch_mean, batch_var) = channel_moments(input, last, channels);
        let momentum = self.momentum;
        let blend = |moving: &Tensor, batch: &[f32]| -> Result<Tensor, GraphError> {
            let data: Vec<f32> = moving
                .to_vec()
                .iter()
                .zip(batch)
                .map(|(m, b)| m * momentum + b * (1.0 - momentum))
                .collect();
            Ok(Tensor::new(&data, &[channels])?)
        };
        *moving_mean = blend(&*moving_mean, &batch_mean)?;
        *moving_var = blend(&*moving_var, &batch_var)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("eps={}, momentum={}", self.epsilon, self.momentum)
    }
}

/// 计算每个通道（最后一维）在其余所有维度上的均值与有偏方差
fn channel_moments(input: &Tensor, last: Axis, channels: usize) -> (Vec<f32>, Vec<f32>) {
    let mut sum = vec![0.0f32; channels];
    let mut sum_sq = vec![0.0f32; channels];
    let mut count = 0usize;
    for lane in input.data().lanes(last) {
        for (c, &x) in lane.iter().enumerate() {
            sum[c] += x;
            sum_sq[c] += x * x;
        }
        count += 1;
    }
    let n = count.max(1) as f32;
    let mean: Vec<f32> = sum.iter().map(|s| s / n).collect();
    let var = sum_sq
        .iter()
        .zip(&mean)
        .map(|(sq, m)| (sq / n - m * m).max(0.0))
        .collect();
    (mean, var)
}
