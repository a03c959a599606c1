/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : VGG19：16 个 same 填充的 3×3 卷积分 5 组，每组后接 2×2 最大池化
 */

use super::{Architecture, BuildError, ModelConfig, log_built, validate_request};
use crate::nn::layer::{Conv2d, Dense, Flatten, MaxPool2d};
use crate::nn::{ActivationKind, ModelGraph, Padding, Sequential};

/// 每组的 (卷积个数, 通道数)
const BLOCKS: [(usize, usize); 5] = [(2, 64), (2, 128), (4, 256), (4, 512), (4, 512)];

pub fn vgg19_layers(num_classes: usize, config: &ModelConfig) -> Sequential {
    let mut layers = Sequential::new("vgg19");
    for (convs, filters) in BLOCKS {
        for _ in 0..convs {
            layers.push(
                Conv2d::new(filters, (3, 3))
                    .with_padding(Padding::Same)
                    .with_activation(ActivationKind::Relu),
            );
        }
        layers.push(MaxPool2d::new((2, 2), Some((2, 2)), Padding::Valid));
    }
    let hidden = config.vgg19.hidden_units;
    layers
        .add(Flatten {})
        .add(Dense::new(hidden, ActivationKind::Relu))
        .add(Dense::new(hidden, ActivationKind::Relu))
        .add(Dense::new(num_classes, config.final_activation))
}

/// 输入的高和宽须不小于 32（经过 5 次 2×2 池化）
pub fn vgg19(
    input_shape: (usize, usize, usize),
    num_classes: usize,
    config: &ModelConfig,
) -> Result<ModelGraph, BuildError> {
    validate_request(input_shape, num_classes, config)?;
    let graph = vgg19_layers(num_classes, config).build(input_shape)?;
    log_built(Architecture::Vgg19, &graph);
    Ok(graph)
}
