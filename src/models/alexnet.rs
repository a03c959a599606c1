/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : AlexNet：5 个卷积层（valid 填充，穿插最大池化与 BatchNorm）+ 3 个隐藏全连接层
 */

use super::{Architecture, BuildError, ModelConfig, WiringMode, log_built, validate_request};
use crate::nn::layer::{Activation, BatchNorm, Conv2d, Dense, Dropout, Flatten, MaxPool2d};
use crate::nn::{ActivationKind, ModelGraph, Padding, Sequential};

/// reference 接线下 AlexNet 第一层固定的输入形状
pub const ALEXNET_INPUT_SHAPE: (usize, usize, usize) = (224, 224, 3);

/// 每个卷积层：(通道数, 卷积核, 步长, 其后是否接最大池化)
const CONVS: [(usize, usize, usize, bool); 5] = [
    (96, 11, 4, true),
    (256, 11, 1, true),
    (384, 3, 1, false),
    (384, 3, 1, false),
    (256, 3, 1, true),
];

pub fn alexnet_layers(num_classes: usize, config: &ModelConfig) -> Sequential {
    let mut layers = Sequential::new("alexnet");
    for (filters, kernel, stride, pooled) in CONVS {
        layers.push(Conv2d::new(filters, (kernel, kernel)).with_strides((stride, stride)));
        layers.push(Activation::new(ActivationKind::Relu));
        if pooled {
            layers.push(MaxPool2d::new((2, 2), Some((2, 2)), Padding::Valid));
        }
        layers.push(BatchNorm::default());
    }

    layers.push(Flatten {});
    for &units in &config.alexnet.dense_units {
        layers.push(Dense::new(units, ActivationKind::Linear));
        layers.push(Activation::new(ActivationKind::Relu));
        layers.push(Dropout::new(config.alexnet.dropout));
        layers.push(BatchNorm::default());
    }
    layers.add(Dense::new(num_classes, config.final_activation))
}

/// `WiringMode::Reference` 下图的输入固定为 224×224×3；
/// `WiringMode::Corrected` 下使用 `input_shape`，高和宽须不小于 215
pub fn alexnet(
    input_shape: (usize, usize, usize),
    num_classes: usize,
    config: &ModelConfig,
) -> Result<ModelGraph, BuildError> {
    validate_request(input_shape, num_classes, config)?;
    let declared = match config.wiring {
        WiringMode::Reference => {
            if input_shape != ALEXNET_INPUT_SHAPE {
                tracing::warn!(
                    requested = ?input_shape,
                    declared = ?ALEXNET_INPUT_SHAPE,
                    "AlexNet 在 reference 接线下忽略 input_shape，输入固定为 224×224×3"
                );
            }
            ALEXNET_INPUT_SHAPE
        }
        WiringMode::Corrected => input_shape,
    };
    let graph = alexnet_layers(num_classes, config).build(declared)?;
    log_built(Architecture::AlexNet, &graph);
    Ok(graph)
}
