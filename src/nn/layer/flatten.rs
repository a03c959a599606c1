/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Flatten 层：[batch, H, W, C] -> [batch, H*W*C]
 *
 * 按行优先（NHWC）顺序展平，与 Keras 的 Flatten 一致
 */

use serde::{Deserialize, Serialize};

use super::{ForwardContext, TraitLayer, single_input, single_tensor};
use crate::nn::{FeatureShape, GraphError};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flatten {}

impl TraitLayer for Flatten {
    fn type_name(&self) -> &'static str {
        "Flatten"
    }

    fn output_shape(&self, inputs: &[FeatureShape]) -> Result<FeatureShape, GraphError> {
        let (h, w, c) = single_input(inputs, self.type_name())?.expect_spatial("Flatten")?;
        Ok(FeatureShape::flat(h * w * c))
    }

    fn forward(
        &self,
        inputs: &[&Tensor],
        _params: &[Tensor],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let input = single_tensor(inputs, self.type_name())?;
        let batch_size = input.shape().first().copied().unwrap_or(0);
        let features = input.shape().iter().skip(1).product::<usize>();
        Ok(Tensor::new(&input.to_vec(), &[batch_size, features])?)
    }
}
