use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    #[error("数据长度{data_len}与形状{shape:?}的元素个数不一致")]
    DataShapeMismatch { data_len: usize, shape: Vec<usize> },
    #[error("张量维数须为{expected}，实际为{got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("张量列表为空")]
    EmptyList,
    #[error("张量形状不兼容：{0:?} 与 {1:?}")]
    IncompatibleShape(Vec<usize>, Vec<usize>),
    #[error("张量（反）序列化失败：{0}")]
    Serialization(String),
}

/// 构建网络时的配置错误，在调用构建函数时同步返回
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    // 数字比较用
    #[error("{value_name}须{operator}{threshold}，实际为{value}")]
    ValueMustSatisfyComparison {
        value_name: String,
        operator: ComparisonOperator,
        threshold: usize,
        value: usize,
    },
    #[error("{name}须位于[0, 1)区间内，实际为{value}")]
    RateOutOfRange { name: String, value: f32 },
    #[error("{0}不能为空")]
    EmptyRepetitions(String),
    #[error("未知的激活函数：{0}")]
    UnknownActivation(String),
    #[error("未知的网络结构：{0}")]
    UnknownArchitecture(String),
    #[error("配置文件无效：{0}")]
    InvalidConfigFile(String),
}

impl ConfigurationError {
    /// 校验`value ≥ 1`，用于输入尺寸、类别数等必须为正的量
    pub fn check_positive(value_name: &str, value: usize) -> Result<(), Self> {
        Self::check_at_least(value_name, value, 1)
    }

    /// 校验`value ≥ threshold`
    pub fn check_at_least(value_name: &str, value: usize, threshold: usize) -> Result<(), Self> {
        if value >= threshold {
            Ok(())
        } else {
            Err(Self::ValueMustSatisfyComparison {
                value_name: value_name.to_string(),
                operator: ComparisonOperator::GreaterOrEqual,
                threshold,
                value,
            })
        }
    }

    /// 校验丢弃率位于`[0, 1)`
    pub fn check_rate(name: &str, value: f32) -> Result<(), Self> {
        if (0.0..1.0).contains(&value) {
            Ok(())
        } else {
            Err(Self::RateOutOfRange {
                name: name.to_string(),
                value,
            })
        }
    }
}
