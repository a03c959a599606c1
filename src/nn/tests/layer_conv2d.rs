/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Conv2d layer 单元测试（NHWC，手算参考值）
 */

use super::{arange, assert_tensor_eq, infer};
use crate::errors::TensorError;
use crate::nn::layer::Conv2d;
use crate::nn::{ActivationKind, FeatureShape, GraphError, Init, Padding, TraitLayer};
use crate::tensor::Tensor;

#[test]
fn test_conv2d_output_shape() -> Result<(), GraphError> {
    let conv = Conv2d::new(32, (3, 3));
    assert_eq!(
        conv.output_shape(&[FeatureShape::spatial(28, 28, 1)])?,
        FeatureShape::spatial(26, 26, 32)
    );

    let stem = Conv2d::new(64, (7, 7))
        .with_strides((2, 2))
        .with_padding(Padding::Same);
    assert_eq!(
        stem.output_shape(&[FeatureShape::spatial(224, 224, 3)])?,
        FeatureShape::spatial(112, 112, 64)
    );

    let alex = Conv2d::new(96, (11, 11)).with_strides((4, 4));
    assert_eq!(
        alex.output_shape(&[FeatureShape::spatial(224, 224, 3)])?,
        FeatureShape::spatial(54, 54, 96)
    );
    Ok(())
}

#[test]
fn test_conv2d_output_shape_errors() {
    let conv = Conv2d::new(8, (3, 3));
    assert!(matches!(
        conv.output_shape(&[FeatureShape::spatial(2, 2, 1)]),
        Err(GraphError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        conv.output_shape(&[FeatureShape::flat(16)]),
        Err(GraphError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        conv.output_shape(&[]),
        Err(GraphError::InvalidOperation(_))
    ));
    assert!(matches!(
        Conv2d::new(0, (3, 3)).output_shape(&[FeatureShape::spatial(4, 4, 1)]),
        Err(GraphError::InvalidOperation(_))
    ));
}

#[test]
fn test_conv2d_param_specs() {
    let specs = Conv2d::new(32, (3, 3)).param_specs(&[FeatureShape::spatial(28, 28, 1)]);
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].name, "kernel");
    assert_eq!(specs[0].shape, vec![3, 3, 1, 32]);
    assert_eq!(specs[0].init, Init::Kaiming);
    assert_eq!(specs[1].name, "bias");
    assert_eq!(specs[1].shape, vec![32]);
    assert_eq!(specs[1].init, Init::Zeros);
    assert_eq!(specs.iter().map(|s| s.num_elements()).sum::<usize>(), 320);
}

#[test]
fn test_conv2d_forward_valid() -> Result<(), GraphError> {
    // 输入 3x3：1..9，卷积核 2x2 全 1，偏置 0.5
    let x = arange(&[1, 3, 3, 1])?;
    let kernel = Tensor::ones(&[2, 2, 1, 1]);
    let bias = Tensor::new(&[0.5], &[1])?;

    let output = infer(&Conv2d::new(1, (2, 2)), &[&x], &[kernel, bias])?;
    assert_eq!(output.shape(), &[1, 2, 2, 1]);
    assert_tensor_eq(&output, &[12.5, 16.5, 24.5, 28.5], 1e-6);
    Ok(())
}

#[test]
fn test_conv2d_forward_multi_channel() -> Result<(), GraphError> {
    // 1x1 卷积：out[oc] = Σ x[ic] * K[0, 0, ic, oc]
    let x = Tensor::new(&[1.0, 2.0], &[1, 1, 1, 2])?;
    let kernel = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[1, 1, 2, 2])?;
    let bias = Tensor::zeros(&[2]);

    let output = infer(&Conv2d::new(2, (1, 1)), &[&x], &[kernel, bias])?;
    assert_eq!(output.to_vec(), vec![7.0, 10.0]);
    Ok(())
}

#[test]
fn test_conv2d_forward_same_padding() -> Result<(), GraphError> {
    let x = Tensor::ones(&[1, 3, 3, 1]);
    let kernel = Tensor::ones(&[3, 3, 1, 1]);
    let bias = Tensor::zeros(&[1]);
    let conv = Conv2d::new(1, (3, 3)).with_padding(Padding::Same);

    let output = infer(&conv, &[&x], &[kernel, bias])?;
    assert_eq!(output.shape(), &[1, 3, 3, 1]);
    // 角上 4 个有效位置，边上 6 个，中心 9 个
    assert_eq!(
        output.to_vec(),
        vec![4.0, 6.0, 4.0, 6.0, 9.0, 6.0, 4.0, 6.0, 4.0]
    );
    Ok(())
}

#[test]
fn test_conv2d_forward_same_padding_stride_2() -> Result<(), GraphError> {
    // 4x4 输入、3x3 核、步长 2：输出 2x2，填充 (0, 1)
    let x = Tensor::ones(&[1, 4, 4, 1]);
    let kernel = Tensor::ones(&[3, 3, 1, 1]);
    let bias = Tensor::zeros(&[1]);
    let conv = Conv2d::new(1, (3, 3))
        .with_strides((2, 2))
        .with_padding(Padding::Same);

    let output = infer(&conv, &[&x], &[kernel, bias])?;
    assert_eq!(output.shape(), &[1, 2, 2, 1]);
    assert_eq!(output.to_vec(), vec![9.0, 6.0, 6.0, 4.0]);
    Ok(())
}

#[test]
fn test_conv2d_forward_relu_and_batch() -> Result<(), GraphError> {
    // batch=2，第二个样本取负值，经 ReLU 后为 0
    let x = Tensor::new(&[1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0], &[2, 2, 2, 1])?;
    let kernel = Tensor::ones(&[2, 2, 1, 1]);
    let bias = Tensor::zeros(&[1]);
    let conv = Conv2d::new(1, (2, 2)).with_activation(ActivationKind::Relu);

    let output = infer(&conv, &[&x], &[kernel, bias])?;
    assert_eq!(output.shape(), &[2, 1, 1, 1]);
    assert_eq!(output.to_vec(), vec![4.0, 0.0]);
    Ok(())
}

#[test]
fn test_conv2d_forward_kernel_mismatch() -> Result<(), GraphError> {
    let x = Tensor::ones(&[1, 3, 3, 2]);
    let kernel = Tensor::ones(&[2, 2, 1, 1]);
    let bias = Tensor::zeros(&[1]);

    let result = infer(&Conv2d::new(1, (2, 2)), &[&x], &[kernel, bias]);
    assert!(matches!(result, Err(GraphError::ShapeMismatch { .. })));
    Ok(())
}

#[test]
fn test_conv2d_forward_requires_nhwc() {
    let kernel = Tensor::ones(&[1, 1, 1, 1]);
    let bias = Tensor::zeros(&[1]);
    let x = Tensor::ones(&[3, 3, 1]);
    assert!(matches!(
        infer(&Conv2d::new(1, (1, 1)), &[&x], &[kernel, bias.clone()]),
        Err(GraphError::Tensor(TensorError::DimensionMismatch { expected: 4, got: 3 }))
    ));

    // 卷积核同样须为 4D
    let x = Tensor::ones(&[1, 3, 3, 1]);
    assert!(matches!(
        infer(&Conv2d::new(1, (1, 1)), &[&x], &[Tensor::ones(&[1, 1]), bias]),
        Err(GraphError::Tensor(TensorError::DimensionMismatch { expected: 4, got: 2 }))
    ));
}
