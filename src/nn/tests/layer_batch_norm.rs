/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : BatchNorm 单元测试（推理/训练模式及滑动统计量更新）
 */

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{assert_tensor_eq, infer};
use crate::nn::layer::BatchNorm;
use crate::nn::{FeatureShape, ForwardContext, GraphError, Init, TraitLayer};
use crate::tensor::Tensor;

fn default_params(channels: usize) -> Vec<Tensor> {
    vec![
        Tensor::ones(&[channels]),
        Tensor::zeros(&[channels]),
        Tensor::zeros(&[channels]),
        Tensor::ones(&[channels]),
    ]
}

#[test]
fn test_batch_norm_param_specs() {
    let specs = BatchNorm::default().param_specs(&[FeatureShape::spatial(56, 56, 64)]);
    let names: Vec<_> = specs.iter().map(|s| s.name).collect();
    assert_eq!(names, ["gamma", "beta", "moving_mean", "moving_variance"]);
    assert!(specs.iter().all(|s| s.shape == vec![64]));
    assert_eq!(specs.iter().filter(|s| s.trainable).count(), 2);
    assert_eq!(specs[0].init, Init::Ones);
    assert_eq!(specs[3].init, Init::Ones);
}

#[test]
fn test_batch_norm_inference_uses_moving_stats() -> Result<(), GraphError> {
    let bn = BatchNorm::default();
    let x = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2])?;

    // 初始参数下近似恒等：x / sqrt(1 + eps)
    let output = infer(&bn, &[&x], &default_params(2))?;
    let s = 1.0 / 1.001f32.sqrt();
    assert_tensor_eq(&output, &[s, 2.0 * s, 3.0 * s, 4.0 * s], 1e-6);

    // y = gamma * (x - mean) / sqrt(var + eps) + beta
    let params = vec![
        Tensor::new(&[2.0, 2.0], &[2])?,
        Tensor::new(&[1.0, -1.0], &[2])?,
        Tensor::new(&[1.0, 1.0], &[2])?,
        Tensor::new(&[3.0, 3.0], &[2])?,
    ];
    let output = infer(&bn, &[&x], &params)?;
    let k = 2.0 / 3.001f32.sqrt();
    assert_tensor_eq(&output, &[1.0, k - 1.0, 2.0 * k + 1.0, 3.0 * k - 1.0], 1e-5);
    Ok(())
}

#[test]
fn test_batch_norm_training_uses_batch_stats() -> Result<(), GraphError> {
    let bn = BatchNorm::default();
    let x = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2])?;
    let mut params = default_params(2);
    let mut rng = StdRng::seed_from_u64(0);

    // batch 均值 [2, 3]，有偏方差 [1, 1]
    let output = bn.forward(&[&x], &params, &mut ForwardContext::training(&mut rng))?;
    let s = 1.0 / 1.001f32.sqrt();
    assert_tensor_eq(&output, &[-s, -s, s, s], 1e-6);

    bn.update_state(&[&x], &mut params)?;
    assert_tensor_eq(&params[2], &[0.02, 0.03], 1e-6);
    assert_tensor_eq(&params[3], &[1.0, 1.0], 1e-6);
    // gamma/beta 不受影响
    assert_tensor_eq(&params[0], &[1.0, 1.0], 0.0);
    assert_tensor_eq(&params[1], &[0.0, 0.0], 0.0);
    Ok(())
}

#[test]
fn test_batch_norm_nhwc_normalizes_last_axis() -> Result<(), GraphError> {
    // [1, 2, 1, 2]：通道 0 为 (0, 4)，通道 1 为 (10, 10)
    let bn = BatchNorm::default();
    let x = Tensor::new(&[0.0, 10.0, 4.0, 10.0], &[1, 2, 1, 2])?;
    let mut rng = StdRng::seed_from_u64(0);
    let output = bn.forward(&[&x], &default_params(2), &mut ForwardContext::training(&mut rng))?;
    let s = 2.0 / 4.001f32.sqrt();
    assert_tensor_eq(&output, &[-s, 0.0, s, 0.0], 1e-5);
    Ok(())
}

#[test]
fn test_batch_norm_param_length_mismatch() -> Result<(), GraphError> {
    let bn = BatchNorm::default();
    let x = Tensor::ones(&[1, 3]);
    assert!(matches!(
        infer(&bn, &[&x], &default_params(2)),
        Err(GraphError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        infer(&bn, &[&x], &[]),
        Err(GraphError::ComputationError(_))
    ));
    Ok(())
}
