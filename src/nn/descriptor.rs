/*
 * @Author       : 老董
 * @Date         : 2025-12-27
 * @Description  : 图描述符（Graph Descriptor）
 *                 统一的中间表示（IR），用于序列化、摘要和模型保存/加载
 */

use serde::{Deserialize, Serialize};

use super::LayerOp;

/// 图的可序列化描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDescriptor {
    /// 格式版本（用于向后兼容）
    pub version: String,
    /// 图名称
    pub name: String,
    /// 输入节点 ID
    pub input: u64,
    /// 输出节点 ID
    pub output: u64,
    /// 所有节点描述（按拓扑序）
    pub nodes: Vec<NodeDescriptor>,
    /// 参数文件路径（相对于 JSON 文件），仅在保存完整模型时使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params_file: Option<String>,
}

/// 节点描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub id: u64,
    pub name: String,
    /// 层规格（含全部超参数）
    pub op: LayerOp,
    /// 单样本输出形状（不含 batch 维）
    pub output_shape: Vec<usize>,
    /// 父节点 ID 列表（定义拓扑）
    pub parents: Vec<u64>,
    /// 参数数量（无参数的层为 None）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_count: Option<usize>,
}

impl GraphDescriptor {
    pub fn new(name: &str, input: u64, output: u64) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: name.to_string(),
            input,
            output,
            nodes: Vec::new(),
            params_file: None,
        }
    }

    pub fn add_node(&mut self, node: NodeDescriptor) {
        self.nodes.push(node);
    }

    /// 获取总参数量
    pub fn total_params(&self) -> usize {
        self.nodes.iter().filter_map(|n| n.param_count).sum()
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl NodeDescriptor {
    pub fn new(
        id: u64,
        name: &str,
        op: LayerOp,
        output_shape: Vec<usize>,
        parents: Vec<u64>,
        param_count: usize,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            op,
            output_shape,
            parents,
            param_count: (param_count > 0).then_some(param_count),
        }
    }
}
