/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : Sequential：有序的层规格列表
 *
 * 列表本身是一个纯值（只记录各层的超参数），调用 `build` 时才根据输入形状
 * 物化为 ModelGraph，从而把"描述网络"与"搭建网络"分开。
 */

use super::{GraphBuilder, GraphError, ModelGraph};
use crate::nn::layer::{LayerOp, TraitLayer};
use crate::nn::FeatureShape;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequential {
    name: String,
    layers: Vec<LayerOp>,
}

impl Sequential {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            layers: Vec::new(),
        }
    }

    /// 追加一层（链式调用）
    #[must_use]
    pub fn add(mut self, layer: impl Into<LayerOp>) -> Self {
        self.layers.push(layer.into());
        self
    }

    pub fn push(&mut self, layer: impl Into<LayerOp>) {
        self.layers.push(layer.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layers(&self) -> &[LayerOp] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// 逐层推断形状，返回每层的输出形状（不搭建图）
    pub fn infer_shapes(&self, input_shape: impl Into<FeatureShape>) -> Result<Vec<FeatureShape>, GraphError> {
        let mut shape = input_shape.into();
        let mut shapes = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            shape = layer.output_shape(&[shape])?;
            shapes.push(shape);
        }
        Ok(shapes)
    }

    /// 以 `input_shape` 为输入物化为计算图
    pub fn build(&self, input_shape: impl Into<FeatureShape>) -> Result<ModelGraph, GraphError> {
        let mut builder = GraphBuilder::new(&self.name);
        let mut x = builder.input(input_shape)?;
        for layer in &self.layers {
            x = builder.add(layer.clone(), &[x], None)?;
        }
        builder.finish(x)
    }
}
