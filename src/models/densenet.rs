/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : DenseNet 与多分支 DenseNet
 *
 * 基本单元（pre-activation）：bn_rl_conv = BatchNorm → ReLU → Conv
 * - dense_block：重复 r 次 `x = bn_rl_conv(t, growth_rate, 3)`，`t = concat(t, x)`，
 *   通道数每次增加 growth_rate
 * - transition_block：1×1 bn_rl_conv 把通道数减半，再 2×2/s2 平均池化把空间尺寸减半
 *
 * 每个 dense block 之后都接一个 transition block。reference 接线下分类头读取最后一个
 * dense block 的输出，最后一个 transition 成为死计算被剪除；corrected 接线下分类头读取
 * 最后一个 transition 的输出。
 */

use super::{Architecture, BuildError, ModelConfig, WiringMode, log_built, validate_request};
use crate::nn::layer::{AvgPool2d, Conv2d, Dense, MaxPool2d};
use crate::nn::{GraphBuilder, GraphError, ModelGraph, Padding, Var};

/// BatchNorm → ReLU → Conv(filters, kernel×kernel, 步长 1, same 填充)
pub fn bn_rl_conv(
    graph: &mut GraphBuilder,
    x: Var,
    filters: usize,
    kernel: usize,
) -> Result<Var, GraphError> {
    let x = graph.batch_norm(x)?;
    let x = graph.relu(x)?;
    graph.conv2d(
        x,
        Conv2d::new(filters, (kernel, kernel)).with_padding(Padding::Same),
    )
}

/// 输出通道数 = 输入通道数 + repetitions × growth_rate
pub fn dense_block(
    graph: &mut GraphBuilder,
    mut tensor: Var,
    repetitions: usize,
    growth_rate: usize,
) -> Result<Var, GraphError> {
    for _ in 0..repetitions {
        let x = bn_rl_conv(graph, tensor, growth_rate, 3)?;
        tensor = graph.concatenate(&[tensor, x])?;
    }
    Ok(tensor)
}

/// 通道数取自句柄自身的形状：C → C / 2，空间尺寸 d → ceil(d / 2)
pub fn transition_block(graph: &mut GraphBuilder, x: Var) -> Result<Var, GraphError> {
    let x = bn_rl_conv(graph, x, x.channels() / 2, 1)?;
    graph.avg_pool2d(x, AvgPool2d::new((2, 2), Some((2, 2)), Padding::Same))
}

/// Conv(7×7, s2, same) → MaxPool(3×3, s2, same)
pub fn stem(graph: &mut GraphBuilder, x: Var, filters: usize) -> Result<Var, GraphError> {
    let x = graph.conv2d(
        x,
        Conv2d::new(filters, (7, 7))
            .with_strides((2, 2))
            .with_padding(Padding::Same),
    )?;
    graph.max_pool2d(x, MaxPool2d::new((3, 3), Some((2, 2)), Padding::Same))
}

pub fn densenet(
    input_shape: (usize, usize, usize),
    num_classes: usize,
    config: &ModelConfig,
) -> Result<ModelGraph, BuildError> {
    validate_request(input_shape, num_classes, config)?;
    let dense = &config.densenet;

    let mut graph = GraphBuilder::new("densenet");
    let input = graph.input(input_shape)?;
    let mut x = stem(&mut graph, input, dense.stem_filters)?;
    let mut d = x;
    for &r in &dense.repetitions {
        d = dense_block(&mut graph, x, r, dense.growth_rate)?;
        x = transition_block(&mut graph, d)?;
    }

    let head_input = match config.wiring {
        WiringMode::Reference => d,
        WiringMode::Corrected => x,
    };
    let pooled = graph.global_avg_pool2d(head_input)?;
    let output = graph.dense(pooled, num_classes, config.final_activation)?;
    let model = graph.finish(output)?;
    log_built(Architecture::DenseNet, &model);
    Ok(model)
}

/// 主干之后每个类别一个独立分支：dense block → 全局平均池化 → Dense(1)，
/// 最后把 num_classes 个标量输出沿特征维拼接
pub fn densenet_multi(
    input_shape: (usize, usize, usize),
    num_classes: usize,
    config: &ModelConfig,
) -> Result<ModelGraph, BuildError> {
    validate_request(input_shape, num_classes, config)?;
    let dense = &config.densenet;

    let mut graph = GraphBuilder::new("densenet_multi");
    let input = graph.input(input_shape)?;
    let mut x = stem(&mut graph, input, dense.stem_filters)?;
    for &r in &dense.branch_trunk_repetitions {
        let d = dense_block(&mut graph, x, r, dense.growth_rate)?;
        x = transition_block(&mut graph, d)?;
    }

    let mut outputs = Vec::with_capacity(num_classes);
    for class in 0..num_classes {
        tracing::debug!(class, "搭建类别分支");
        let d = dense_block(&mut graph, x, dense.branch_repetitions, dense.growth_rate)?;
        if config.wiring == WiringMode::Reference {
            transition_block(&mut graph, d)?;
        }
        let branch = graph.global_avg_pool2d(d)?;
        let output = graph.add(
            Dense::new(1, config.final_activation),
            &[branch],
            Some(&format!("class_{class}")),
        )?;
        outputs.push(output);
    }

    let output = graph.concatenate(&outputs)?;
    let model = graph.finish(output)?;
    log_built(Architecture::DenseNetMulti, &model);
    Ok(model)
}
