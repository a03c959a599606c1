/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 普通 CNN（MNIST 风格）
 */

use super::{Architecture, BuildError, ModelConfig, log_built, validate_request};
use crate::nn::layer::{Conv2d, Dense, Dropout, Flatten, MaxPool2d};
use crate::nn::{ActivationKind, ModelGraph, Padding, Sequential};

/// 层规格列表：Conv(32) → Conv(64) → MaxPool → Dropout → Flatten → Dense(128) → Dropout → Dense(num_classes)
pub fn cnn_layers(num_classes: usize, config: &ModelConfig) -> Sequential {
    let cnn = &config.cnn;
    let kernel = (cnn.kernel_size, cnn.kernel_size);
    let mut layers = Sequential::new("cnn");
    for &filters in &cnn.conv_filters {
        layers.push(Conv2d::new(filters, kernel).with_activation(ActivationKind::Relu));
    }
    layers
        .add(MaxPool2d::new((cnn.pool_size, cnn.pool_size), None, Padding::Valid))
        .add(Dropout::new(cnn.conv_dropout))
        .add(Flatten {})
        .add(Dense::new(cnn.hidden_units, ActivationKind::Relu))
        .add(Dropout::new(cnn.hidden_dropout))
        .add(Dense::new(num_classes, config.final_activation))
}

pub fn cnn(
    input_shape: (usize, usize, usize),
    num_classes: usize,
    config: &ModelConfig,
) -> Result<ModelGraph, BuildError> {
    validate_request(input_shape, num_classes, config)?;
    let graph = cnn_layers(num_classes, config).build(input_shape)?;
    log_built(Architecture::Cnn, &graph);
    Ok(graph)
}
