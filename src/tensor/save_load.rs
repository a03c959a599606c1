use std::io::{Read, Write};

use super::Tensor;
use crate::errors::TensorError;

// 保存和加载张量
impl Tensor {
    /// 将单个Tensor写入`writer`
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), TensorError> {
        bincode::serialize_into(writer, self)
            .map_err(|e| TensorError::Serialization(e.to_string()))
    }

    /// 从`reader`加载单个Tensor
    pub fn load<R: Read>(reader: &mut R) -> Result<Self, TensorError> {
        bincode::deserialize_from(reader).map_err(|e| TensorError::Serialization(e.to_string()))
    }
}
