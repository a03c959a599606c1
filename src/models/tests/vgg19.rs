/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : VGG19 的构建测试
 */

use super::shape_of;
use crate::models::{BuildError, ModelConfig, vgg19};
use crate::nn::{FeatureShape, GraphError};

#[test]
fn test_vgg19_imagenet() -> Result<(), BuildError> {
    let graph = vgg19((224, 224, 3), 1000, &ModelConfig::default())?;
    assert_eq!(graph.count_layers("Conv2d"), 16);
    assert_eq!(graph.count_layers("MaxPool2d"), 5);
    assert_eq!(graph.count_layers("Dense"), 3);
    assert_eq!(shape_of(&graph, "conv2d_16"), Some(FeatureShape::spatial(14, 14, 512)));
    assert_eq!(shape_of(&graph, "flatten_1"), Some(FeatureShape::flat(7 * 7 * 512)));
    assert_eq!(graph.output_shape(), FeatureShape::flat(1000));
    assert_eq!(graph.param_count(), 143_667_240);
    Ok(())
}

#[test]
fn test_vgg19_small_input() -> Result<(), BuildError> {
    let graph = vgg19((32, 32, 3), 10, &ModelConfig::default())?;
    assert_eq!(shape_of(&graph, "flatten_1"), Some(FeatureShape::flat(512)));

    // 5 次 2×2 池化之后尺寸不足
    assert!(matches!(
        vgg19((16, 16, 3), 10, &ModelConfig::default()),
        Err(BuildError::Graph(GraphError::ShapeMismatch { .. }))
    ));
    Ok(())
}
