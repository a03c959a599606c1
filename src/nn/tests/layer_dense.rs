/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Dense 层与激活函数单元测试
 */

use super::{assert_tensor_eq, infer};
use crate::errors::TensorError;
use crate::nn::layer::{Activation, Dense};
use crate::nn::{ActivationKind, FeatureShape, GraphError, Init, TraitLayer};
use crate::tensor::Tensor;

#[test]
fn test_dense_output_shape_and_params() -> Result<(), GraphError> {
    let dense = Dense::new(128, ActivationKind::Relu);
    assert_eq!(
        dense.output_shape(&[FeatureShape::flat(9216)])?,
        FeatureShape::flat(128)
    );
    let specs = dense.param_specs(&[FeatureShape::flat(9216)]);
    assert_eq!(specs[0].shape, vec![9216, 128]);
    assert_eq!(specs[0].init, Init::Kaiming);
    assert_eq!(specs[1].shape, vec![128]);
    assert_eq!(
        specs.iter().map(|s| s.num_elements()).sum::<usize>(),
        1_179_776
    );

    // 非 ReLU 输出层使用 Xavier 初始化
    let head = Dense::new(10, ActivationKind::Softmax);
    assert_eq!(head.param_specs(&[FeatureShape::flat(128)])[0].init, Init::Xavier);
    Ok(())
}

#[test]
fn test_dense_requires_flat_input() {
    let dense = Dense::new(4, ActivationKind::Linear);
    assert!(matches!(
        dense.output_shape(&[FeatureShape::spatial(2, 2, 1)]),
        Err(GraphError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        Dense::new(0, ActivationKind::Linear).output_shape(&[FeatureShape::flat(4)]),
        Err(GraphError::InvalidOperation(_))
    ));
}

#[test]
fn test_dense_forward() -> Result<(), GraphError> {
    let x = Tensor::new(&[1.0, 2.0, -1.0, 0.0], &[2, 2])?;
    let weights = Tensor::new(&[1.0, 0.0, 1.0, 0.0, 1.0, 1.0], &[2, 3])?;
    let bias = Tensor::new(&[0.5, 0.5, 0.5], &[3])?;

    let output = infer(
        &Dense::new(3, ActivationKind::Linear),
        &[&x],
        &[weights.clone(), bias.clone()],
    )?;
    assert_eq!(output.shape(), &[2, 3]);
    assert_tensor_eq(&output, &[1.5, 2.5, 3.5, -0.5, 0.5, -0.5], 1e-6);

    let output = infer(&Dense::new(3, ActivationKind::Relu), &[&x], &[weights, bias])?;
    assert_tensor_eq(&output, &[1.5, 2.5, 3.5, 0.0, 0.5, 0.0], 1e-6);
    Ok(())
}

#[test]
fn test_dense_forward_softmax_rows_sum_to_one() -> Result<(), GraphError> {
    let x = Tensor::new(&[1.0, 2.0, 3.0, -4.0, 0.5, 8.0], &[2, 3])?;
    let weights = Tensor::new(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0], &[3, 3])?;
    let bias = Tensor::zeros(&[3]);

    let output = infer(&Dense::new(3, ActivationKind::Softmax), &[&x], &[weights, bias])?;
    for row in 0..2 {
        let sum: f32 = (0..3).map(|col| output[[row, col]]).sum();
        approx::assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
    }
    // softmax(1, 2, 3)
    assert_tensor_eq(
        &Tensor::new(&output.to_vec()[..3], &[3])?,
        &[0.090_030_57, 0.244_728_48, 0.665_240_94],
        1e-6,
    );
    Ok(())
}

#[test]
fn test_activation_kinds() -> Result<(), GraphError> {
    let x = Tensor::new(&[-2.0, 0.0, 2.0], &[1, 3])?;

    let relu = ActivationKind::Relu.apply(x.clone());
    assert_eq!(relu.to_vec(), vec![0.0, 0.0, 2.0]);

    let sigmoid = ActivationKind::Sigmoid.apply(x.clone());
    assert_tensor_eq(&sigmoid, &[0.119_202_92, 0.5, 0.880_797_1], 1e-6);

    let tanh = ActivationKind::Tanh.apply(x.clone());
    assert_tensor_eq(&tanh, &[-0.964_027_6, 0.0, 0.964_027_6], 1e-6);

    assert_eq!(ActivationKind::Linear.apply(x.clone()), x);

    // Dense(1) + softmax 时每行只有一个元素，结果恒为 1
    let single = ActivationKind::Softmax.apply(Tensor::new(&[-3.0, 7.0], &[2, 1])?);
    assert_eq!(single.to_vec(), vec![1.0, 1.0]);

    let layer = Activation::new(ActivationKind::Relu);
    assert_eq!(layer.type_name(), "ReLU");
    assert_eq!(infer(&layer, &[&x], &[])?.to_vec(), vec![0.0, 0.0, 2.0]);
    assert_eq!(Activation::new(ActivationKind::Tanh).type_name(), "Activation");
    Ok(())
}

#[test]
fn test_activation_kind_parsing() {
    assert_eq!("softmax".parse::<ActivationKind>(), Ok(ActivationKind::Softmax));
    assert_eq!(" ReLU ".parse::<ActivationKind>(), Ok(ActivationKind::Relu));
    assert_eq!("none".parse::<ActivationKind>(), Ok(ActivationKind::Linear));
    assert_eq!(
        "swish".parse::<ActivationKind>(),
        Err(crate::errors::ConfigurationError::UnknownActivation(
            "swish".to_string()
        ))
    );
    assert_eq!(ActivationKind::Sigmoid.to_string(), "sigmoid");
}

#[test]
fn test_dense_forward_requires_matrix() {
    let dense = Dense::new(2, ActivationKind::Linear);
    let x = Tensor::ones(&[1, 2, 2, 1]);
    let params = [Tensor::ones(&[4, 2]), Tensor::zeros(&[2])];
    assert!(matches!(
        infer(&dense, &[&x], &params),
        Err(GraphError::Tensor(TensorError::DimensionMismatch { expected: 2, got: 4 }))
    ));
}
