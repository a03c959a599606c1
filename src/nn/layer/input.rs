use serde::{Deserialize, Serialize};

use super::{ForwardContext, TraitLayer};
use crate::nn::{FeatureShape, GraphError};
use crate::tensor::Tensor;

/// 输入节点：声明单样本形状，值由 Model 在前向传播时直接写入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub shape: FeatureShape,
}

impl Input {
    pub const fn new(shape: FeatureShape) -> Self {
        Self { shape }
    }
}

impl TraitLayer for Input {
    fn type_name(&self) -> &'static str {
        "Input"
    }

    fn output_shape(&self, inputs: &[FeatureShape]) -> Result<FeatureShape, GraphError> {
        if !inputs.is_empty() {
            return Err(GraphError::InvalidOperation(
                "Input 节点不能有父节点".to_string(),
            ));
        }
        Ok(self.shape)
    }

    fn forward(
        &self,
        _inputs: &[&Tensor],
        _params: &[Tensor],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "Input 节点的值应由外部传入，而非计算得到".to_string(),
        ))
    }
}
