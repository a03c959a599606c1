/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Model 高层 I/O（save_model/load_model）
 *
 * 一个模型保存为两个文件：
 * - `{path}.json`：图的拓扑描述（GraphDescriptor，可读）
 * - `{path}.bin`：参数数据（见 serialization.rs）
 */

use std::path::Path;

use super::Model;
use crate::nn::{GraphDescriptor, GraphError, ModelGraph};

impl Model {
    /// 保存完整模型（拓扑 JSON + 参数 bin）
    ///
    /// # 示例
    /// ```ignore
    /// model.save_model("models/densenet")?;
    /// // 生成：models/densenet.json + models/densenet.bin
    /// ```
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let path = path.as_ref();
        let json_path = path.with_extension("json");
        let bin_path = path.with_extension("bin");

        self.save_params(&bin_path)?;

        let mut descriptor = self.graph().describe();
        descriptor.params_file = Some(bin_path.file_name().map_or_else(
            || "params.bin".to_string(),
            |s| s.to_string_lossy().to_string(),
        ));
        let json = descriptor
            .to_json()
            .map_err(|e| GraphError::ComputationError(format!("序列化图描述失败: {e}")))?;
        std::fs::write(&json_path, json)
            .map_err(|e| GraphError::ComputationError(format!("写入 JSON 文件失败: {e}")))?;

        tracing::debug!(path = %json_path.display(), "模型已保存");
        Ok(())
    }

    /// 从 `{path}.json` 重建计算图，再从其引用的参数文件加载参数
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let json_path = path.with_extension("json");

        let json = std::fs::read_to_string(&json_path)
            .map_err(|e| GraphError::ComputationError(format!("读取 JSON 文件失败: {e}")))?;
        let descriptor = GraphDescriptor::from_json(&json)
            .map_err(|e| GraphError::ComputationError(format!("解析图描述失败: {e}")))?;

        let bin_path = if let Some(ref params_file) = descriptor.params_file {
            path.parent().map_or_else(
                || Path::new(params_file).to_path_buf(),
                |p| p.join(params_file),
            )
        } else {
            path.with_extension("bin")
        };

        let graph = ModelGraph::from_descriptor(&descriptor)?;
        let mut model = Self::new_with_seed(graph, 0);
        model.load_params(&bin_path)?;
        Ok(model)
    }
}
