/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : ModelGraph 的 describe/summary 及从描述符重建
 */

use std::collections::HashMap;
use std::path::Path;

use super::{GraphBuilder, GraphError, ModelGraph, Node, NodeId, Var};
use crate::nn::descriptor::{GraphDescriptor, NodeDescriptor};
use crate::nn::layer::{LayerOp, TraitLayer};

impl ModelGraph {
    // ========== 图描述（describe）==========

    /// 导出图的描述符（用于序列化、摘要、保存模型）
    ///
    /// # 示例
    /// ```ignore
    /// let descriptor = graph.describe();
    /// println!("{}", descriptor.to_json()?);
    /// ```
    pub fn describe(&self) -> GraphDescriptor {
        let mut descriptor =
            GraphDescriptor::new(self.name(), self.input_id().0, self.output_id().0);
        for node in self.nodes() {
            descriptor.add_node(NodeDescriptor::new(
                node.id().0,
                node.name(),
                node.op().clone(),
                node.output_shape().dims(),
                node.parents().iter().map(|id| id.0).collect(),
                node.param_count(),
            ));
        }
        descriptor
    }

    /// 根据描述符重新搭建计算图（形状会重新推断并与描述符核对）
    ///
    /// 节点名称保持不变，节点 ID 按拓扑序重新编号
    pub fn from_descriptor(descriptor: &GraphDescriptor) -> Result<Self, GraphError> {
        let mut nodes: Vec<&NodeDescriptor> = descriptor.nodes.iter().collect();
        nodes.sort_by_key(|node| node.id);

        let mut builder = GraphBuilder::new(&descriptor.name);
        let mut vars: HashMap<u64, Var> = HashMap::new();
        for node in nodes {
            let var = match &node.op {
                LayerOp::Input(input) => builder.input_named(input.shape, &node.name)?,
                op => {
                    let parents = node
                        .parents
                        .iter()
                        .map(|id| {
                            vars.get(id)
                                .copied()
                                .ok_or(GraphError::NodeNotFound(NodeId(*id)))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    builder.add(op.clone(), &parents, Some(&node.name))?
                }
            };
            if var.shape().dims() != node.output_shape {
                return Err(GraphError::ShapeMismatch {
                    expected: node.output_shape.clone(),
                    got: var.shape().dims(),
                    message: format!("节点 {} 重新推断的形状与描述符不一致", node.name),
                });
            }
            vars.insert(node.id, var);
        }

        let output = vars
            .get(&descriptor.output)
            .copied()
            .ok_or(GraphError::NodeNotFound(NodeId(descriptor.output)))?;
        builder.finish(output)
    }

    // ========== 模型摘要（summary）==========

    /// 打印模型摘要（类似 Keras 的 `model.summary()`）
    pub fn summary(&self) {
        println!("{}", self.summary_string());
    }

    /// 将模型摘要保存到文件
    ///
    /// 根据文件扩展名自动选择格式：
    /// - `.md` → Markdown 表格
    /// - 其他（`.txt` 等）→ Unicode 文本表格
    pub fn save_summary<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let path = path.as_ref();
        let summary = match path.extension().and_then(|e| e.to_str()) {
            Some("md") => self.summary_markdown(),
            _ => self.summary_string(),
        };
        std::fs::write(path, summary)
            .map_err(|e| GraphError::ComputationError(format!("保存摘要文件失败: {e}")))
    }

    /// 返回模型摘要的 Markdown 格式字符串
    pub fn summary_markdown(&self) -> String {
        let mut output = format!("# 模型摘要: {}\n\n", self.name());
        output.push_str(&format!("| {} |\n", HEADERS.join(" | ")));
        output.push_str(&format!("|{}\n", "------|".repeat(HEADERS.len())));
        for row in self.summary_rows() {
            output.push_str(&format!("| {} |\n", row.join(" | ")));
        }
        output.push_str(&format!(
            "\n**总参数量**: {}  \n**可训练参数**: {}  \n**不可训练参数**: {}\n",
            format_number(self.param_count()),
            format_number(self.trainable_param_count()),
            format_number(self.param_count() - self.trainable_param_count())
        ));
        output
    }

    /// 返回模型摘要字符串（Unicode 文本表格，用于控制台输出）
    pub fn summary_string(&self) -> String {
        let rows = self.summary_rows();
        let mut widths: Vec<usize> = HEADERS.iter().map(|h| display_width(h)).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(display_width(cell));
            }
        }
        let border = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{left}{}{right}\n", segments.join(mid))
        };
        let line = |cells: &[String]| {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| pad(cell, w))
                .collect();
            format!("│ {} │\n", padded.join(" │ "))
        };

        let mut output = border("┌", "┬", "┐");
        output.push_str(&line(&HEADERS.map(String::from)[..]));
        output.push_str(&border("├", "┼", "┤"));
        for row in &rows {
            output.push_str(&line(&row[..]));
        }
        output.push_str(&border("├", "┴", "┤"));

        let inner_width = widths.iter().map(|w| w + 3).sum::<usize>() - 3;
        for stat in [
            format!("总参数量: {}", format_number(self.param_count())),
            format!("可训练参数: {}", format_number(self.trainable_param_count())),
            format!(
                "不可训练参数: {}",
                format_number(self.param_count() - self.trainable_param_count())
            ),
        ] {
            output.push_str(&format!("│ {} │\n", pad(&stat, inner_width)));
        }
        output.push_str(&format!("└{}┘\n", "─".repeat(inner_width + 2)));
        output
    }

    fn summary_rows(&self) -> Vec<[String; 6]> {
        self.nodes()
            .iter()
            .map(|node| {
                let params = node.param_count();
                [
                    node.name().to_string(),
                    node.type_name().to_string(),
                    node.output_shape().to_string(),
                    node.op().describe(),
                    if params == 0 {
                        "-".to_string()
                    } else {
                        format_number(params)
                    },
                    self.parent_names(node),
                ]
            })
            .collect()
    }

    fn parent_names(&self, node: &Node) -> String {
        if node.parents().is_empty() {
            return "-".to_string();
        }
        node.parents()
            .iter()
            .filter_map(|id| self.node(*id).ok())
            .map(Node::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

const HEADERS: [&str; 6] = ["节点名称", "类型", "输出形状", "配置", "参数量", "父节点"];

/// 格式化数字为千分位分隔形式
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// 计算字符串显示宽度（中日韩字符占两格）
fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| if (c as u32) >= 0x2E80 { 2 } else { 1 })
        .sum()
}

fn pad(s: &str, width: usize) -> String {
    format!("{s}{}", " ".repeat(width.saturating_sub(display_width(s))))
}
