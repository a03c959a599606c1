/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Dense (全连接) 层 - Keras 风格 API
 *
 * 输入：[batch_size, in_features]，输出：[batch_size, units]
 * 计算：output = activation(x @ W + b)
 */

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::{
    ActivationKind, ForwardContext, ParamSpec, TraitLayer, matrix_view, param, single_input,
    single_tensor,
};
use crate::nn::{FeatureShape, GraphError, Init};
use crate::tensor::Tensor;

/// Dense (全连接) 层
///
/// # 参数布局
/// - 权重：`[in_features, units]`
/// - 偏置：`[units]`（可选）
///
/// ReLU 层的权重使用 Kaiming 初始化，其余激活使用 Xavier 初始化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    pub units: usize,
    pub activation: ActivationKind,
    pub use_bias: bool,
}

impl Dense {
    pub const fn new(units: usize, activation: ActivationKind) -> Self {
        Self {
            units,
            activation,
            use_bias: true,
        }
    }
}

impl TraitLayer for Dense {
    fn type_name(&self) -> &'static str {
        "Dense"
    }

    fn output_shape(&self, inputs: &[FeatureShape]) -> Result<FeatureShape, GraphError> {
        if self.units == 0 {
            return Err(GraphError::InvalidOperation(
                "Dense 的 units 必须大于 0".to_string(),
            ));
        }
        single_input(inputs, self.type_name())?.expect_flat("Dense")?;
        Ok(FeatureShape::flat(self.units))
    }

    fn param_specs(&self, inputs: &[FeatureShape]) -> Vec<ParamSpec> {
        let in_features = inputs.first().map_or(0, FeatureShape::channels);
        let init = match self.activation {
            ActivationKind::Relu => Init::Kaiming,
            _ => Init::Xavier,
        };
        let mut specs = vec![ParamSpec::new(
            "kernel",
            vec![in_features, self.units],
            init,
            true,
        )];
        if self.use_bias {
            specs.push(ParamSpec::new("bias", vec![self.units], Init::Zeros, true));
        }
        specs
    }

    fn forward(
        &self,
        inputs: &[&Tensor],
        params: &[Tensor],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let x = matrix_view(single_tensor(inputs, "Dense")?, "Dense")?;
        let weights = matrix_view(param(params, 0, "Dense")?, "Dense 权重")?;
        if weights.nrows() != x.ncols() || weights.ncols() != self.units {
            return Err(GraphError::ShapeMismatch {
                expected: vec![x.ncols(), self.units],
                got: weights.shape().to_vec(),
                message: "Dense 权重形状与输入特征数不符".to_string(),
            });
        }

        let mut output = x.dot(&weights);
        if self.use_bias {
            let bias = Array1::from(param(params, 1, "Dense")?.to_vec());
            output += &bias;
        }
        Ok(self.activation.apply(Tensor::from_array(output.into_dyn())))
    }

    fn describe(&self) -> String {
        format!("{}, {}", self.units, self.activation)
    }
}
