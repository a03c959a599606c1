use ndarray::{Array, ArrayD, ArrayViewD, Axis, IxDyn};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::errors::TensorError;

mod save_load;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。本crate中的图像张量一律采用 NHWC 布局：`[batch, H, W, C]`，
/// 全连接层的张量为 `[batch, features]`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// 创建一个张量，`data`的长度必须和`shape`中所有元素的乘积相等
    pub fn new(data: &[f32], shape: &[usize]) -> Result<Tensor, TensorError> {
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec()).map_err(|_| {
            TensorError::DataShapeMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
            }
        })?;
        Ok(Tensor { data })
    }

    pub fn zeros(shape: &[usize]) -> Tensor {
        Tensor {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    pub fn ones(shape: &[usize]) -> Tensor {
        Tensor {
            data: ArrayD::ones(IxDyn(shape)),
        }
    }

    pub fn from_array(data: ArrayD<f32>) -> Tensor {
        Tensor { data }
    }

    /// 创建一个服从正态分布的随机张量（Box-Muller 变换，使用指定的 RNG 以保证可重复）
    pub fn normal_with_rng(mean: f32, std_dev: f32, shape: &[usize], rng: &mut StdRng) -> Tensor {
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1: f32 = rng.r#gen();
            let u2: f32 = rng.r#gen();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Tensor {
            data: ArrayD::from_shape_vec(IxDyn(shape), data)
                .unwrap_or_else(|_| ArrayD::zeros(IxDyn(shape))),
        }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 张量的维数（阶数）
    pub fn dimension(&self) -> usize {
        self.data.ndim()
    }

    /// 元素个数
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    pub fn into_array(self) -> ArrayD<f32> {
        self.data
    }

    /// 按逻辑（行优先）顺序导出所有元素
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    /// 沿最后一维（通道维）拼接多个张量，其余维度必须一致
    pub fn concat_last_axis(tensors: &[&Tensor]) -> Result<Tensor, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        let axis = Axis(first.dimension().saturating_sub(1));
        let views: Vec<_> = tensors.iter().map(|t| t.data.view()).collect();
        let data = ndarray::concatenate(axis, &views).map_err(|_| {
            let mismatched = tensors
                .iter()
                .find(|t| t.dimension() != first.dimension())
                .or_else(|| tensors.get(1))
                .unwrap_or(first);
            TensorError::IncompatibleShape(first.shape().to_vec(), mismatched.shape().to_vec())
        })?;
        Ok(Tensor { data })
    }

    /// 校验维数
    pub fn expect_dimension(&self, expected: usize) -> Result<(), TensorError> {
        if self.dimension() == expected {
            Ok(())
        } else {
            Err(TensorError::DimensionMismatch {
                expected,
                got: self.dimension(),
            })
        }
    }
}

impl<const N: usize> Index<[usize; N]> for Tensor {
    type Output = f32;

    fn index(&self, index: [usize; N]) -> &Self::Output {
        &self.data[&index[..]]
    }
}
