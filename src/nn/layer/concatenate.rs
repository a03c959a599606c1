/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Concatenate 层：沿最后一维（通道维）拼接多个父节点
 *
 * 除通道维外，所有父节点的形状必须一致；只有 1 个父节点时等价于恒等映射
 */

use serde::{Deserialize, Serialize};

use super::{ForwardContext, TraitLayer};
use crate::nn::{FeatureShape, GraphError};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Concatenate {}

impl TraitLayer for Concatenate {
    fn type_name(&self) -> &'static str {
        "Concatenate"
    }

    fn output_shape(&self, inputs: &[FeatureShape]) -> Result<FeatureShape, GraphError> {
        let Some(first) = inputs.first() else {
            return Err(GraphError::InvalidOperation(
                "Concatenate 至少需要 1 个父节点".to_string(),
            ));
        };
        let mut channels = 0;
        for shape in inputs {
            if shape.with_channels(0) != first.with_channels(0) {
                return Err(GraphError::ShapeMismatch {
                    expected: first.dims(),
                    got: shape.dims(),
                    message: "Concatenate 的各输入除通道维外形状必须一致".to_string(),
                });
            }
            channels += shape.channels();
        }
        Ok(first.with_channels(channels))
    }

    fn forward(
        &self,
        inputs: &[&Tensor],
        _params: &[Tensor],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        Ok(Tensor::concat_last_axis(inputs)?)
    }

    fn describe(&self) -> String {
        String::from("axis=-1")
    }
}
