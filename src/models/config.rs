/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 网络结构的全部可调超参数
 *
 * 所有默认值集中在各 `Default` 实现中；JSON 配置中缺省的字段取默认值。
 */

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ConfigurationError;
use crate::nn::ActivationKind;

/// 三处历史遗留接线问题的处理方式
///
/// - DenseNet 的分类头读取最后一个 dense block 的输出，最后一个 transition block 被计算后丢弃；
///   corrected 接线下分类头改为读取该 transition block 的输出
/// - 多分支 DenseNet 每个分支都计算了一个不被使用的 transition block
/// - AlexNet 第一层声明的输入固定为 224×224×3，忽略 `input_shape` 参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WiringMode {
    /// 保留历史接线：死计算照常搭建（随后被剪枝），AlexNet 输入固定为 224×224×3
    #[default]
    Reference,
    /// DenseNet 分类头读取最后一个 transition block，多分支版本不搭建死计算，
    /// AlexNet 使用传入的 `input_shape`
    Corrected,
}

/// 顶层配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// 输出层的激活函数
    pub final_activation: ActivationKind,
    pub wiring: WiringMode,
    pub cnn: CnnConfig,
    pub alexnet: AlexNetConfig,
    pub vgg19: Vgg19Config,
    pub densenet: DenseNetConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            final_activation: ActivationKind::Softmax,
            wiring: WiringMode::Reference,
            cnn: CnnConfig::default(),
            alexnet: AlexNetConfig::default(),
            vgg19: Vgg19Config::default(),
            densenet: DenseNetConfig::default(),
        }
    }
}

impl ModelConfig {
    #[must_use]
    pub fn with_final_activation(mut self, activation: ActivationKind) -> Self {
        self.final_activation = activation;
        self
    }

    #[must_use]
    pub fn with_wiring(mut self, wiring: WiringMode) -> Self {
        self.wiring = wiring;
        self
    }

    #[must_use]
    pub fn with_growth_rate(mut self, growth_rate: usize) -> Self {
        self.densenet.growth_rate = growth_rate;
        self
    }

    #[must_use]
    pub fn with_densenet(mut self, densenet: DenseNetConfig) -> Self {
        self.densenet = densenet;
        self
    }

    /// 从 JSON 字符串解析并校验
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigurationError::InvalidConfigFile(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载并校验
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::InvalidConfigFile(format!("{}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.cnn.validate()?;
        self.alexnet.validate()?;
        self.vgg19.validate()?;
        self.densenet.validate()
    }
}

/// 普通 CNN：若干 3×3 ReLU 卷积 → 池化 → Dropout → Flatten → 隐藏全连接 → Dropout → 输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CnnConfig {
    pub conv_filters: Vec<usize>,
    pub kernel_size: usize,
    pub pool_size: usize,
    pub conv_dropout: f32,
    pub hidden_units: usize,
    pub hidden_dropout: f32,
}

impl Default for CnnConfig {
    fn default() -> Self {
        Self {
            conv_filters: vec![32, 64],
            kernel_size: 3,
            pool_size: 2,
            conv_dropout: 0.25,
            hidden_units: 128,
            hidden_dropout: 0.5,
        }
    }
}

impl CnnConfig {
    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.conv_filters.is_empty() {
            return Err(ConfigurationError::EmptyRepetitions("cnn.conv_filters".to_string()));
        }
        for &filters in &self.conv_filters {
            ConfigurationError::check_positive("cnn.conv_filters", filters)?;
        }
        ConfigurationError::check_positive("cnn.kernel_size", self.kernel_size)?;
        ConfigurationError::check_positive("cnn.pool_size", self.pool_size)?;
        ConfigurationError::check_positive("cnn.hidden_units", self.hidden_units)?;
        ConfigurationError::check_rate("cnn.conv_dropout", self.conv_dropout)?;
        ConfigurationError::check_rate("cnn.hidden_dropout", self.hidden_dropout)
    }
}

/// AlexNet 的全连接部分：每个隐藏层为 Dense → ReLU → Dropout → BatchNorm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlexNetConfig {
    pub dense_units: Vec<usize>,
    pub dropout: f32,
}

impl Default for AlexNetConfig {
    fn default() -> Self {
        Self {
            dense_units: vec![4096, 4096, 1000],
            dropout: 0.4,
        }
    }
}

impl AlexNetConfig {
    fn validate(&self) -> Result<(), ConfigurationError> {
        for &units in &self.dense_units {
            ConfigurationError::check_positive("alexnet.dense_units", units)?;
        }
        ConfigurationError::check_rate("alexnet.dropout", self.dropout)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vgg19Config {
    /// 两个隐藏全连接层的宽度
    pub hidden_units: usize,
}

impl Default for Vgg19Config {
    fn default() -> Self {
        Self { hidden_units: 4096 }
    }
}

impl Vgg19Config {
    fn validate(&self) -> Result<(), ConfigurationError> {
        ConfigurationError::check_positive("vgg19.hidden_units", self.hidden_units)
    }
}

/// DenseNet 及多分支 DenseNet 的超参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenseNetConfig {
    /// 每个 bn_rl_conv 新增的通道数
    pub growth_rate: usize,
    /// 各 dense block 的层数
    pub repetitions: Vec<usize>,
    /// stem 卷积的通道数
    pub stem_filters: usize,
    /// 多分支版本共享主干的各 dense block 层数
    pub branch_trunk_repetitions: Vec<usize>,
    /// 多分支版本每个分支的 dense block 层数
    pub branch_repetitions: usize,
}

impl Default for DenseNetConfig {
    fn default() -> Self {
        Self {
            growth_rate: 12,
            repetitions: vec![6, 12, 24, 16],
            stem_filters: 64,
            branch_trunk_repetitions: vec![6, 12, 24],
            branch_repetitions: 16,
        }
    }
}

impl DenseNetConfig {
    /// 用于快速实验的小型配置
    pub fn tiny() -> Self {
        Self {
            growth_rate: 4,
            repetitions: vec![2, 2],
            stem_filters: 8,
            branch_trunk_repetitions: vec![2],
            branch_repetitions: 2,
        }
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        ConfigurationError::check_positive("densenet.growth_rate", self.growth_rate)?;
        ConfigurationError::check_positive("densenet.stem_filters", self.stem_filters)?;
        if self.repetitions.is_empty() {
            return Err(ConfigurationError::EmptyRepetitions(
                "densenet.repetitions".to_string(),
            ));
        }

        // 两种接线都会搭建每个 transition block，其输入至少要有 2 个通道才能减半
        self.check_transitions("densenet.repetitions", &self.repetitions)?;
        let trunk = self.check_transitions(
            "densenet.branch_trunk_repetitions",
            &self.branch_trunk_repetitions,
        )?;
        ConfigurationError::check_at_least(
            "densenet.branch_repetitions 之后的通道数",
            trunk + self.branch_repetitions * self.growth_rate,
            2,
        )
    }

    /// 沿 dense block / transition block 推算通道数，返回最后一个 transition 的输出通道数
    fn check_transitions(&self, name: &str, repetitions: &[usize]) -> Result<usize, ConfigurationError> {
        let mut channels = self.stem_filters;
        for &r in repetitions {
            channels += r * self.growth_rate;
            ConfigurationError::check_at_least(&format!("{name} 之后的通道数"), channels, 2)?;
            channels /= 2;
        }
        Ok(channels)
    }
}
