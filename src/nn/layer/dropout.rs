/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Dropout 层（inverted dropout）
 *
 * - 推理模式：恒等映射
 * - 训练模式：以概率 rate 置零，保留的元素乘以 1 / (1 - rate)，使期望不变
 */

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{ForwardContext, ForwardMode, TraitLayer, single_input, single_tensor};
use crate::nn::{FeatureShape, GraphError};
use crate::tensor::Tensor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dropout {
    pub rate: f32,
}

impl Dropout {
    pub const fn new(rate: f32) -> Self {
        Self { rate }
    }
}

impl TraitLayer for Dropout {
    fn type_name(&self) -> &'static str {
        "Dropout"
    }

    fn output_shape(&self, inputs: &[FeatureShape]) -> Result<FeatureShape, GraphError> {
        if !(0.0..1.0).contains(&self.rate) {
            return Err(GraphError::InvalidOperation(format!(
                "Dropout 的 rate 须位于 [0, 1) 区间内，实际为 {}",
                self.rate
            )));
        }
        single_input(inputs, self.type_name())
    }

    fn forward(
        &self,
        inputs: &[&Tensor],
        _params: &[Tensor],
        ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let input = single_tensor(inputs, self.type_name())?;
        if ctx.mode == ForwardMode::Inference || self.rate == 0.0 {
            return Ok(input.clone());
        }

        let Some(rng) = ctx.rng.as_deref_mut() else {
            return Err(GraphError::ComputationError(
                "训练模式下 Dropout 需要随机数生成器".to_string(),
            ));
        };
        let keep_scale = 1.0 / (1.0 - self.rate);
        let mut data = input.data().clone();
        for x in data.iter_mut() {
            let r: f32 = rng.r#gen();
            *x = if r < self.rate { 0.0 } else { *x * keep_scale };
        }
        Ok(Tensor::from_array(data))
    }

    fn describe(&self) -> String {
        format!("rate={}", self.rate)
    }
}
