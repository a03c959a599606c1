/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 单样本形状（FeatureShape）与填充方式
 *
 * 与 Keras 的 (None, H, W, C) 设计一致：batch 维度始终是动态的，不参与形状推断，
 * 因此这里只记录单个样本的形状。显示时 batch 维度用 `?` 表示。
 */

use num_integer::Integer;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::GraphError;

/// 单样本形状：图像特征图 `[H, W, C]` 或展平后的特征向量 `[N]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FeatureShape {
    Spatial {
        height: usize,
        width: usize,
        channels: usize,
    },
    Flat {
        features: usize,
    },
}

impl FeatureShape {
    pub const fn spatial(height: usize, width: usize, channels: usize) -> Self {
        Self::Spatial {
            height,
            width,
            channels,
        }
    }

    pub const fn flat(features: usize) -> Self {
        Self::Flat { features }
    }

    /// 最后一维的大小（特征图为通道数，向量为特征数）
    pub const fn channels(&self) -> usize {
        match *self {
            Self::Spatial { channels, .. } => channels,
            Self::Flat { features } => features,
        }
    }

    /// 空间尺寸 (H, W)，向量形状返回 None
    pub const fn spatial_dims(&self) -> Option<(usize, usize)> {
        match *self {
            Self::Spatial { height, width, .. } => Some((height, width)),
            Self::Flat { .. } => None,
        }
    }

    /// 单样本元素总数
    pub const fn num_elements(&self) -> usize {
        match *self {
            Self::Spatial {
                height,
                width,
                channels,
            } => height * width * channels,
            Self::Flat { features } => features,
        }
    }

    /// 将最后一维替换为`channels`（用于卷积、拼接等只改变通道数的运算）
    pub const fn with_channels(&self, channels: usize) -> Self {
        match *self {
            Self::Spatial { height, width, .. } => Self::Spatial {
                height,
                width,
                channels,
            },
            Self::Flat { .. } => Self::Flat { features: channels },
        }
    }

    /// 不含 batch 维的形状向量
    pub fn dims(&self) -> Vec<usize> {
        match *self {
            Self::Spatial {
                height,
                width,
                channels,
            } => vec![height, width, channels],
            Self::Flat { features } => vec![features],
        }
    }

    /// 带 batch 维的完整张量形状
    pub fn with_batch(&self, batch_size: usize) -> Vec<usize> {
        let mut dims = vec![batch_size];
        dims.extend(self.dims());
        dims
    }

    /// 检查实际张量形状（含 batch 维）是否与本形状兼容
    pub fn is_compatible_with_tensor(&self, tensor_shape: &[usize]) -> bool {
        tensor_shape.len() == self.dims().len() + 1 && tensor_shape[1..] == self.dims()[..]
    }

    /// 要求为特征图形状，否则返回带`context`说明的错误
    pub fn expect_spatial(&self, context: &str) -> Result<(usize, usize, usize), GraphError> {
        match *self {
            Self::Spatial {
                height,
                width,
                channels,
            } => Ok((height, width, channels)),
            Self::Flat { features } => Err(GraphError::ShapeMismatch {
                expected: vec![0, 0, 0],
                got: vec![features],
                message: format!("{context}的输入必须是特征图 [H, W, C]，得到 {self}"),
            }),
        }
    }

    /// 要求为展平的向量形状
    pub fn expect_flat(&self, context: &str) -> Result<usize, GraphError> {
        match *self {
            Self::Flat { features } => Ok(features),
            Self::Spatial { .. } => Err(GraphError::ShapeMismatch {
                expected: vec![0],
                got: self.dims(),
                message: format!("{context}的输入必须是向量 [N]，得到 {self}（请先 Flatten）"),
            }),
        }
    }
}

impl From<(usize, usize, usize)> for FeatureShape {
    fn from((height, width, channels): (usize, usize, usize)) -> Self {
        Self::spatial(height, width, channels)
    }
}

impl fmt::Display for FeatureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims().iter().map(ToString::to_string).collect();
        write!(f, "[?, {}]", dims.join(", "))
    }
}

/// 卷积/池化的填充方式（TensorFlow 语义）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// 不填充，窗口必须完全落在输入内
    #[default]
    Valid,
    /// 填充使输出尺寸为 `ceil(in / stride)`
    Same,
}

impl Padding {
    /// 计算单个空间维度的输出尺寸
    ///
    /// ```text
    /// valid: out = (in - k) / s + 1   （要求 in ≥ k）
    /// same:  out = ceil(in / s)
    /// ```
    pub fn output_dim(&self, input: usize, kernel: usize, stride: usize) -> Option<usize> {
        if stride == 0 || kernel == 0 {
            return None;
        }
        match self {
            Self::Valid if input >= kernel => Some((input - kernel) / stride + 1),
            Self::Valid => None,
            Self::Same if input > 0 => Some(Integer::div_ceil(&input, &stride)),
            Self::Same => None,
        }
    }

    /// 单个空间维度在前（上/左）和后（下/右）的填充量
    ///
    /// same 模式下总填充量为 `max((out - 1) * s + k - in, 0)`，多出的一格补在后面
    pub fn pads(&self, input: usize, kernel: usize, stride: usize) -> (usize, usize) {
        match self {
            Self::Valid => (0, 0),
            Self::Same => {
                let out = Integer::div_ceil(&input, &stride);
                let total = ((out.saturating_sub(1)) * stride + kernel).saturating_sub(input);
                (total / 2, total - total / 2)
            }
        }
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Same => write!(f, "same"),
        }
    }
}
