//! # CNN Zoo
//!
//! `cnn_zoo`用纯rust描述五种经典的图像分类卷积网络结构（普通CNN、AlexNet、VGG19、
//! DenseNet以及每个类别一个分支的多分支DenseNet）。
//!
//! 分为三层：
//! - 层规格（`nn::layer`）：只记录超参数，形状推断是纯函数
//! - 符号图（`nn::GraphBuilder` / `nn::Sequential` → `nn::ModelGraph`）：搭建时即完成形状检查，
//!   并剪除从输出不可达的节点
//! - 模型（`nn::Model`）：实例化参数，提供前向传播与保存/加载
//!
//! ```ignore
//! use cnn_zoo::models::{densenet, ModelConfig};
//! use cnn_zoo::nn::Model;
//!
//! let graph = densenet((224, 224, 3), 5, &ModelConfig::default())?;
//! graph.summary();
//! let model = Model::new_with_seed(graph, 42);
//! ```

pub mod errors;
pub mod models;
pub mod nn;
pub mod tensor;
