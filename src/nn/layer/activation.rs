/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 激活函数种类及独立的 Activation 层
 */

use ndarray::Axis;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ForwardContext, TraitLayer, single_input, single_tensor};
use crate::errors::ConfigurationError;
use crate::nn::{FeatureShape, GraphError};
use crate::tensor::Tensor;

/// 激活函数种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKind {
    /// 恒等（不激活）
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    /// 沿最后一维归一化
    Softmax,
}

impl ActivationKind {
    /// 对整个张量应用激活函数
    pub fn apply(&self, tensor: Tensor) -> Tensor {
        let mut data = tensor.into_array();
        match self {
            Self::Linear => {}
            Self::Relu => data.mapv_inplace(|x| x.max(0.0)),
            Self::Sigmoid => data.mapv_inplace(|x| 1.0 / (1.0 + (-x).exp())),
            Self::Tanh => data.mapv_inplace(f32::tanh),
            Self::Softmax => {
                if data.ndim() > 0 {
                    let last = Axis(data.ndim() - 1);
                    for mut lane in data.lanes_mut(last) {
                        let max = lane.fold(f32::NEG_INFINITY, |m, &x| m.max(x));
                        lane.mapv_inplace(|x| (x - max).exp());
                        let sum = lane.sum();
                        lane.mapv_inplace(|x| x / sum);
                    }
                }
            }
        }
        Tensor::from_array(data)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Relu => "relu",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Softmax => "softmax",
        }
    }
}

impl FromStr for ActivationKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "none" => Ok(Self::Linear),
            "relu" => Ok(Self::Relu),
            "sigmoid" => Ok(Self::Sigmoid),
            "tanh" => Ok(Self::Tanh),
            "softmax" => Ok(Self::Softmax),
            _ => Err(ConfigurationError::UnknownActivation(s.to_string())),
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 独立的激活层（形状不变）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    pub kind: ActivationKind,
}

impl Activation {
    pub const fn new(kind: ActivationKind) -> Self {
        Self { kind }
    }
}

impl TraitLayer for Activation {
    fn type_name(&self) -> &'static str {
        match self.kind {
            ActivationKind::Relu => "ReLU",
            _ => "Activation",
        }
    }

    fn output_shape(&self, inputs: &[FeatureShape]) -> Result<FeatureShape, GraphError> {
        single_input(inputs, self.type_name())
    }

    fn forward(
        &self,
        inputs: &[&Tensor],
        _params: &[Tensor],
        _ctx: &mut ForwardContext<'_>,
    ) -> Result<Tensor, GraphError> {
        let input = single_tensor(inputs, self.type_name())?;
        Ok(self.kind.apply(input.clone()))
    }

    fn describe(&self) -> String {
        self.kind.to_string()
    }
}
