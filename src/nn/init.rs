use rand::rngs::StdRng;

use crate::tensor::Tensor;

/// 参数初始化策略
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// Kaiming/He 初始化（适用于 `ReLU`）
    Kaiming,
    /// Xavier/Glorot 初始化（适用于 Softmax/Sigmoid/Tanh 等输出层）
    Xavier,
}

impl Init {
    /// 生成初始化后的 Tensor（使用指定的 RNG）
    ///
    /// 参数按 `[..., fan_out]` 布局存放（卷积核 `[kH, kW, C_in, C_out]`，全连接 `[in, out]`），
    /// 因此 fan_in 为除最后一维以外各维的乘积
    pub fn generate_with_rng(&self, shape: &[usize], rng: &mut StdRng) -> Tensor {
        match self {
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Kaiming => {
                let (fan_in, _) = fans(shape);
                let std = (2.0 / fan_in as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
            Self::Xavier => {
                let (fan_in, fan_out) = fans(shape);
                let std = (2.0 / (fan_in + fan_out) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
        }
    }
}

fn fans(shape: &[usize]) -> (usize, usize) {
    match shape.split_last() {
        Some((&fan_out, rest)) if !rest.is_empty() => {
            let receptive: usize = rest.iter().product();
            let spatial: usize = rest[..rest.len() - 1].iter().product();
            (receptive.max(1), (fan_out * spatial).max(1))
        }
        Some((&n, _)) => (n.max(1), n.max(1)),
        None => (1, 1),
    }
}
