/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Model 底层参数序列化（save_params/load_params）
 *
 * 文件格式：魔数 "CZPR" | 版本 u32 | 参数个数 u32 | 逐个参数：名称长度 u32 + 名称 + bincode 编码的 Tensor
 *
 * 与 model_io.rs 的区别：
 * - serialization.rs：只处理参数的二进制读写
 * - model_io.rs：生成/解析 GraphDescriptor 并调用本文件的方法
 */

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::Model;
use crate::nn::GraphError;
use crate::tensor::Tensor;

impl Model {
    /// 参数文件魔数
    const PARAMS_MAGIC: &'static [u8; 4] = b"CZPR";
    /// 参数文件版本
    const PARAMS_VERSION: u32 = 1;

    /// 保存所有参数（含 BatchNorm 的滑动统计量）到二进制文件
    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let file = File::create(path.as_ref())
            .map_err(|e| GraphError::ComputationError(format!("无法创建参数文件: {e}")))?;
        let mut writer = BufWriter::new(file);
        let named = self.named_params();

        write_u32(&mut writer, u32::from_le_bytes(*Self::PARAMS_MAGIC), "魔数")?;
        write_u32(&mut writer, Self::PARAMS_VERSION, "版本")?;
        write_u32(&mut writer, named.len() as u32, "参数数量")?;
        for (name, tensor) in &named {
            write_u32(&mut writer, name.len() as u32, "名称长度")?;
            writer
                .write_all(name.as_bytes())
                .map_err(|e| GraphError::ComputationError(format!("写入名称失败: {e}")))?;
            tensor.save(&mut writer)?;
        }

        writer
            .flush()
            .map_err(|e| GraphError::ComputationError(format!("刷新缓冲区失败: {e}")))
    }

    /// 从二进制文件加载参数
    ///
    /// 文件中的每个参数都必须能在当前模型中找到且形状一致，否则不修改任何参数并返回错误；
    /// 模型中存在而文件中缺失的参数保持不变
    pub fn load_params<P: AsRef<Path>>(&mut self, path: P) -> Result<(), GraphError> {
        let file = File::open(path.as_ref())
            .map_err(|e| GraphError::ComputationError(format!("无法打开参数文件: {e}")))?;
        let mut reader = BufReader::new(file);

        if read_u32(&mut reader, "魔数")?.to_le_bytes() != *Self::PARAMS_MAGIC {
            return Err(GraphError::ComputationError(
                "无效的参数文件：请使用 save_params() 保存的文件".to_string(),
            ));
        }
        let version = read_u32(&mut reader, "版本")?;
        if version != Self::PARAMS_VERSION {
            return Err(GraphError::ComputationError(format!(
                "不支持的参数文件版本: {version}"
            )));
        }

        let count = read_u32(&mut reader, "参数数量")?;
        let mut loaded: HashMap<String, Tensor> = HashMap::new();
        for _ in 0..count {
            let name_len = read_u32(&mut reader, "名称长度")? as usize;
            let mut name_bytes = vec![0u8; name_len];
            reader
                .read_exact(&mut name_bytes)
                .map_err(|e| GraphError::ComputationError(format!("读取名称失败: {e}")))?;
            let name = String::from_utf8(name_bytes)
                .map_err(|e| GraphError::ComputationError(format!("名称编码无效: {e}")))?;
            let tensor = Tensor::load(&mut reader)?;

            let current = self.param(&name).ok_or_else(|| {
                GraphError::ComputationError(format!("参数文件中的 {name} 在模型中不存在"))
            })?;
            if current.shape() != tensor.shape() {
                return Err(GraphError::ShapeMismatch {
                    expected: current.shape().to_vec(),
                    got: tensor.shape().to_vec(),
                    message: format!("参数 {name} 的形状与模型不一致"),
                });
            }
            loaded.insert(name, tensor);
        }

        let missing = self.named_params().len().saturating_sub(loaded.len());
        if missing > 0 {
            tracing::warn!(missing, "参数文件未覆盖模型的全部参数，缺失的参数保持不变");
        }
        for (name, tensor) in loaded {
            self.set_param(&name, tensor)?;
        }
        Ok(())
    }
}

fn write_u32<W: Write>(writer: &mut W, value: u32, what: &str) -> Result<(), GraphError> {
    writer
        .write_all(&value.to_le_bytes())
        .map_err(|e| GraphError::ComputationError(format!("写入{what}失败: {e}")))
}

fn read_u32<R: Read>(reader: &mut R, what: &str) -> Result<u32, GraphError> {
    let mut bytes = [0u8; 4];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| GraphError::ComputationError(format!("读取{what}失败: {e}")))?;
    Ok(u32::from_le_bytes(bytes))
}
