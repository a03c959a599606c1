use crate::nn::{FeatureShape, GraphError, Padding};

#[test]
fn test_padding_output_dim() {
    assert_eq!(Padding::Valid.output_dim(28, 3, 1), Some(26));
    assert_eq!(Padding::Valid.output_dim(224, 11, 4), Some(54));
    assert_eq!(Padding::Valid.output_dim(2, 3, 1), None);
    assert_eq!(Padding::Same.output_dim(224, 7, 2), Some(112));
    assert_eq!(Padding::Same.output_dim(7, 2, 2), Some(4));
    assert_eq!(Padding::Same.output_dim(5, 3, 1), Some(5));
    assert_eq!(Padding::Same.output_dim(5, 3, 0), None);
}

#[test]
fn test_padding_pads() {
    assert_eq!(Padding::Valid.pads(5, 3, 1), (0, 0));
    // 总填充 2，前后各 1
    assert_eq!(Padding::Same.pads(5, 3, 1), (1, 1));
    // 总填充 1，多出的一格补在后面
    assert_eq!(Padding::Same.pads(4, 3, 2), (0, 1));
    assert_eq!(Padding::Same.pads(7, 2, 2), (0, 1));
    // 112 → 56：总填充 (56-1)*2+3-112 = 1
    assert_eq!(Padding::Same.pads(112, 3, 2), (0, 1));
    assert_eq!(Padding::Same.pads(8, 2, 2), (0, 0));
}

#[test]
fn test_feature_shape_helpers() {
    let shape = FeatureShape::spatial(7, 5, 3);
    assert_eq!(shape.channels(), 3);
    assert_eq!(shape.spatial_dims(), Some((7, 5)));
    assert_eq!(shape.num_elements(), 105);
    assert_eq!(shape.with_channels(8), FeatureShape::spatial(7, 5, 8));
    assert_eq!(shape.with_batch(4), vec![4, 7, 5, 3]);
    assert!(shape.is_compatible_with_tensor(&[2, 7, 5, 3]));
    assert!(!shape.is_compatible_with_tensor(&[7, 5, 3]));
    assert_eq!(shape.to_string(), "[?, 7, 5, 3]");
    assert_eq!(FeatureShape::from((1, 2, 3)), FeatureShape::spatial(1, 2, 3));

    let flat = FeatureShape::flat(10);
    assert_eq!(flat.channels(), 10);
    assert_eq!(flat.spatial_dims(), None);
    assert_eq!(flat.to_string(), "[?, 10]");
}

#[test]
fn test_feature_shape_expectations() {
    assert_eq!(FeatureShape::flat(4).expect_flat("Dense"), Ok(4));
    assert!(matches!(
        FeatureShape::flat(4).expect_spatial("Conv2d"),
        Err(GraphError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        FeatureShape::spatial(2, 2, 1).expect_flat("Dense"),
        Err(GraphError::ShapeMismatch { .. })
    ));
}
