mod vgg19;

use crate::nn::{FeatureShape, ModelGraph};

/// 按节点名取输出形状
fn shape_of(graph: &ModelGraph, name: &str) -> Option<FeatureShape> {
    graph.node_by_name(name).map(|node| node.output_shape())
}
