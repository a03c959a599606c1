mod layer_batch_norm;
mod layer_conv2d;
mod layer_dense;
mod layer_pool2d;
mod shape;

use crate::nn::{ForwardContext, GraphError, TraitLayer};
use crate::tensor::Tensor;

/// 以推理模式执行单个层的前向计算
fn infer(layer: &impl TraitLayer, inputs: &[&Tensor], params: &[Tensor]) -> Result<Tensor, GraphError> {
    layer.forward(inputs, params, &mut ForwardContext::inference())
}

/// 生成 1, 2, 3, ... 的张量
fn arange(shape: &[usize]) -> Result<Tensor, GraphError> {
    let data: Vec<f32> = (1..=shape.iter().product::<usize>()).map(|v| v as f32).collect();
    Ok(Tensor::new(&data, shape)?)
}

/// 逐元素比较张量与期望值
fn assert_tensor_eq(actual: &Tensor, expected: &[f32], epsilon: f32) {
    assert_eq!(actual.size(), expected.len(), "元素个数不一致");
    for (a, e) in actual.to_vec().iter().zip(expected) {
        approx::assert_abs_diff_eq!(*a, *e, epsilon = epsilon);
    }
}
