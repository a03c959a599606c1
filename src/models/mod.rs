/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 五种图像分类网络结构的构建函数
 *
 * 所有构建函数的签名一致：
 *   (input_shape: (H, W, C), num_classes, &ModelConfig) -> Result<ModelGraph, BuildError>
 * 返回的图接受 [batch, H, W, C] 的输入，输出 [batch, num_classes]。
 */

mod alexnet;
mod cnn;
mod config;
mod densenet;
mod error;
mod vgg19;

pub use alexnet::{ALEXNET_INPUT_SHAPE, alexnet, alexnet_layers};
pub use cnn::{cnn, cnn_layers};
pub use config::{AlexNetConfig, CnnConfig, DenseNetConfig, ModelConfig, Vgg19Config, WiringMode};
pub use densenet::{bn_rl_conv, dense_block, densenet, densenet_multi, stem, transition_block};
pub use error::BuildError;
pub use vgg19::{vgg19, vgg19_layers};

use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigurationError;
use crate::nn::ModelGraph;

/// 可按名称选择的网络结构
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    Cnn,
    AlexNet,
    Vgg19,
    DenseNet,
    DenseNetMulti,
}

impl Architecture {
    pub const ALL: [Self; 5] = [
        Self::Cnn,
        Self::AlexNet,
        Self::Vgg19,
        Self::DenseNet,
        Self::DenseNetMulti,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cnn => "cnn",
            Self::AlexNet => "alexnet",
            Self::Vgg19 => "vgg19",
            Self::DenseNet => "densenet",
            Self::DenseNetMulti => "densenet_multi",
        }
    }

    pub fn build(
        &self,
        input_shape: (usize, usize, usize),
        num_classes: usize,
        config: &ModelConfig,
    ) -> Result<ModelGraph, BuildError> {
        match self {
            Self::Cnn => cnn(input_shape, num_classes, config),
            Self::AlexNet => alexnet(input_shape, num_classes, config),
            Self::Vgg19 => vgg19(input_shape, num_classes, config),
            Self::DenseNet => densenet(input_shape, num_classes, config),
            Self::DenseNetMulti => densenet_multi(input_shape, num_classes, config),
        }
    }
}

impl FromStr for Architecture {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|arch| arch.as_str() == name)
            .ok_or_else(|| ConfigurationError::UnknownArchitecture(s.to_string()))
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 构建前的公共校验：各维与类别数须为正，配置须合法
fn validate_request(
    input_shape: (usize, usize, usize),
    num_classes: usize,
    config: &ModelConfig,
) -> Result<(), ConfigurationError> {
    let (height, width, channels) = input_shape;
    ConfigurationError::check_positive("height", height)?;
    ConfigurationError::check_positive("width", width)?;
    ConfigurationError::check_positive("channels", channels)?;
    ConfigurationError::check_positive("num_classes", num_classes)?;
    config.validate()
}

fn log_built(architecture: Architecture, graph: &ModelGraph) {
    tracing::debug!(
        architecture = architecture.as_str(),
        input = %graph.input_shape(),
        output = %graph.output_shape(),
        nodes = graph.len(),
        pruned = graph.pruned_count(),
        params = graph.param_count(),
        "网络结构构建完成"
    );
}

#[cfg(test)]
mod tests;
