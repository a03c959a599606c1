/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : MaxPool2d / AvgPool2d / GlobalAvgPool2d 单元测试
 */

use super::{arange, assert_tensor_eq, infer};
use crate::nn::layer::{AvgPool2d, GlobalAvgPool2d, MaxPool2d};
use crate::nn::{FeatureShape, GraphError, Padding, TraitLayer};

#[test]
fn test_pool_output_shapes() -> Result<(), GraphError> {
    let max = MaxPool2d::new((3, 3), Some((2, 2)), Padding::Same);
    assert_eq!(
        max.output_shape(&[FeatureShape::spatial(112, 112, 64)])?,
        FeatureShape::spatial(56, 56, 64)
    );

    let avg = AvgPool2d::new((2, 2), Some((2, 2)), Padding::Same);
    assert_eq!(
        avg.output_shape(&[FeatureShape::spatial(7, 7, 197)])?,
        FeatureShape::spatial(4, 4, 197)
    );

    // strides 缺省时等于 pool_size
    let pool = MaxPool2d::new((2, 2), None, Padding::Valid);
    assert_eq!(pool.strides, (2, 2));
    assert_eq!(
        pool.output_shape(&[FeatureShape::spatial(24, 24, 64)])?,
        FeatureShape::spatial(12, 12, 64)
    );
    assert!(matches!(
        pool.output_shape(&[FeatureShape::spatial(1, 1, 8)]),
        Err(GraphError::ShapeMismatch { .. })
    ));

    assert_eq!(
        GlobalAvgPool2d {}.output_shape(&[FeatureShape::spatial(7, 7, 389)])?,
        FeatureShape::flat(389)
    );
    Ok(())
}

#[test]
fn test_max_pool2d_forward_valid() -> Result<(), GraphError> {
    let x = arange(&[1, 4, 4, 1])?;
    let pool = MaxPool2d::new((2, 2), None, Padding::Valid);
    let output = infer(&pool, &[&x], &[])?;
    assert_eq!(output.shape(), &[1, 2, 2, 1]);
    assert_eq!(output.to_vec(), vec![6.0, 8.0, 14.0, 16.0]);
    Ok(())
}

#[test]
fn test_max_pool2d_forward_same_ignores_padding() -> Result<(), GraphError> {
    // 3x3 输入，2x2/s2 same：填充 (0, 1)，填充位置不参与取最大值
    let x = arange(&[1, 3, 3, 1])?;
    let pool = MaxPool2d::new((2, 2), Some((2, 2)), Padding::Same);
    let output = infer(&pool, &[&x], &[])?;
    assert_eq!(output.shape(), &[1, 2, 2, 1]);
    assert_eq!(output.to_vec(), vec![5.0, 6.0, 8.0, 9.0]);

    // 全为负数时，填充位置若按 0 参与就会得到错误的 0
    let negative = crate::tensor::Tensor::new(
        &[-1.0, -2.0, -3.0, -4.0, -5.0, -6.0, -7.0, -8.0, -9.0],
        &[1, 3, 3, 1],
    )?;
    let output = infer(&pool, &[&negative], &[])?;
    assert_eq!(output.to_vec(), vec![-1.0, -3.0, -7.0, -9.0]);
    Ok(())
}

#[test]
fn test_avg_pool2d_forward() -> Result<(), GraphError> {
    let x = arange(&[1, 4, 4, 1])?;
    let pool = AvgPool2d::new((2, 2), Some((2, 2)), Padding::Valid);
    let output = infer(&pool, &[&x], &[])?;
    assert_tensor_eq(&output, &[3.5, 5.5, 11.5, 13.5], 1e-6);

    // same 填充时只对非填充位置求平均
    let x = arange(&[1, 3, 3, 1])?;
    let pool = AvgPool2d::new((2, 2), Some((2, 2)), Padding::Same);
    let output = infer(&pool, &[&x], &[])?;
    assert_tensor_eq(&output, &[3.0, 4.5, 7.5, 9.0], 1e-6);
    Ok(())
}

#[test]
fn test_pool_keeps_channels_separate() -> Result<(), GraphError> {
    // 2 个通道：通道 0 为 1..4，通道 1 为 10..40
    let x = crate::tensor::Tensor::new(
        &[1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0],
        &[1, 2, 2, 2],
    )?;
    let max = infer(&MaxPool2d::new((2, 2), None, Padding::Valid), &[&x], &[])?;
    assert_eq!(max.to_vec(), vec![4.0, 40.0]);

    let global = infer(&GlobalAvgPool2d {}, &[&x], &[])?;
    assert_eq!(global.shape(), &[1, 2]);
    assert_tensor_eq(&global, &[2.5, 25.0], 1e-6);
    Ok(())
}
