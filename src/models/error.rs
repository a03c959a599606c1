use thiserror::Error;

use crate::errors::ConfigurationError;
use crate::nn::GraphError;

/// 构建网络结构时的错误
#[derive(Error, Debug, PartialEq)]
pub enum BuildError {
    /// 输入尺寸、类别数或配置不合法（调用时同步返回）
    #[error(transparent)]
    Config(#[from] ConfigurationError),
    /// 拓扑在形状推断阶段不成立（如输入尺寸小于卷积核）
    #[error(transparent)]
    Graph(#[from] GraphError),
}
