use incept_core::internal::*;
use incept_core::ops::cnn::{AvgPool, MaxPool, PaddingSpec, PoolSpec};
use incept_core::ops::matmul::Linear;
use incept_core::ops::nn::{Dropout, Lrn, Relu, Softmax};
use incept_core::ops::sequence::Sequence;

use crate::inception::{InceptionSpec, conv_relu, inception};
use crate::params::ParameterSource;

/// Addressable layers, in graph order.
pub const LAYERS: [&str; 21] = [
    "conv1",
    "pool1",
    "conv2_reduce",
    "conv2",
    "pool2",
    "inception_3a",
    "inception_3b",
    "pool3",
    "inception_4a",
    "inception_4b",
    "inception_4c",
    "inception_4d",
    "inception_4e",
    "pool4",
    "inception_5a",
    "inception_5b",
    "pool5",
    "loss3_fc",
    "prob",
    "loss1_fc2",
    "loss2_fc2",
];

pub const CLASSES: usize = 1000;

fn spec(
    input: usize,
    out1: usize,
    proj3: usize,
    out3: usize,
    proj5: usize,
    out5: usize,
    proj_pool: usize,
) -> InceptionSpec {
    InceptionSpec { input, out1, proj3, out3, proj5, out5, proj_pool }
}

fn max_pool_3x3_s2() -> MaxPool {
    MaxPool::new(PoolSpec::new([3, 3], [2, 2], PaddingSpec::ceil(0)))
}

fn lrn() -> Lrn {
    Lrn::new(1e-4, 0.75, 1.0, 5)
}

fn linear(
    params: &mut dyn ParameterSource,
    name: &str,
    shape: (usize, usize),
) -> InceptResult<Linear> {
    let (weight, bias) = params.linear(name, shape)?;
    Linear::new(weight, bias).with_context(|| format!("Building {name}"))
}

/// Auxiliary classifier branching from a 14x14 inception output.
fn auxiliary_head(
    params: &mut dyn ParameterSource,
    prefix: &str,
    channels: usize,
) -> InceptResult<Sequence> {
    let mut ops: TVec<Box<dyn Op>> =
        tvec!(AvgPool::new(PoolSpec::new([5, 5], [3, 3], PaddingSpec::valid())).into());
    ops.extend(conv_relu(params, &format!("{prefix}_conv"), (128, channels, 1, 1), 1, 0)?);
    ops.push(linear(params, &format!("{prefix}_fc1"), (1024, 2048))?.into());
    ops.push(Relu.into());
    ops.push(Dropout::new(0.7).into());
    ops.push(linear(params, &format!("{prefix}_fc2"), (CLASSES, 1024))?.into());
    Ok(Sequence::new(ops))
}

/// Wire one Inception block named `names.0`, its parameters under `names.1`.
fn block(
    g: &mut Graph,
    params: &mut dyn ParameterSource,
    names: (&str, &str),
    spec: InceptionSpec,
    input: usize,
) -> InceptResult<usize> {
    let op = inception(params, names.1, &spec)?;
    g.wire_node(names.0, op, &[input])
}

/// Wire the whole network, its single source named `data`.
pub fn build(params: &mut dyn ParameterSource) -> InceptResult<Graph> {
    let mut g = Graph::default();
    let data = g.add_source("data", tvec!(None, Some(3), None, None))?;

    let conv1 = conv_relu(params, "conv1", (64, 3, 7, 7), 2, 3)?;
    let x = g.wire_node("conv1", Sequence::new(conv1), &[data])?;
    let x =
        g.wire_node("pool1", Sequence::new(tvec!(max_pool_3x3_s2().into(), lrn().into())), &[x])?;
    let reduce = conv_relu(params, "conv2_reduce", (64, 64, 1, 1), 1, 0)?;
    let x = g.wire_node("conv2_reduce", Sequence::new(reduce), &[x])?;
    let mut conv2 = conv_relu(params, "conv2", (192, 64, 3, 3), 1, 1)?;
    conv2.push(lrn().into());
    let x = g.wire_node("conv2", Sequence::new(conv2), &[x])?;
    let x = g.wire_node("pool2", max_pool_3x3_s2(), &[x])?;

    let x = block(&mut g, params, ("inception_3a", "inc3a"), spec(192, 64, 96, 128, 16, 32, 32), x)?;
    let x = block(&mut g, params, ("inception_3b", "inc3b"), spec(256, 128, 128, 192, 32, 96, 64), x)?;
    let x = g.wire_node("pool3", max_pool_3x3_s2(), &[x])?;
    let inc4a =
        block(&mut g, params, ("inception_4a", "inc4a"), spec(480, 192, 96, 208, 16, 48, 64), x)?;
    let x = block(
        &mut g,
        params,
        ("inception_4b", "inc4b"),
        spec(512, 160, 112, 224, 24, 64, 64),
        inc4a,
    )?;
    let x = block(&mut g, params, ("inception_4c", "inc4c"), spec(512, 128, 128, 256, 24, 64, 64), x)?;
    let inc4d =
        block(&mut g, params, ("inception_4d", "inc4d"), spec(512, 112, 144, 288, 32, 64, 64), x)?;
    let x = block(
        &mut g,
        params,
        ("inception_4e", "inc4e"),
        spec(528, 256, 160, 320, 32, 128, 128),
        inc4d,
    )?;
    let x = g.wire_node("pool4", max_pool_3x3_s2(), &[x])?;
    let x =
        block(&mut g, params, ("inception_5a", "inc5a"), spec(832, 256, 160, 320, 32, 128, 128), x)?;
    let x =
        block(&mut g, params, ("inception_5b", "inc5b"), spec(832, 384, 192, 384, 48, 128, 128), x)?;

    let pool5 = AvgPool::new(PoolSpec::new([7, 7], [1, 1], PaddingSpec::valid()));
    let x = g.wire_node("pool5", pool5, &[x])?;
    let fc = linear(params, "loss3_fc", (CLASSES, 1024))?;
    let x =
        g.wire_node("loss3_fc", Sequence::new(tvec!(Dropout::new(0.4).into(), fc.into())), &[x])?;
    g.wire_node("prob", Softmax::new(1), &[x])?;

    g.wire_node("loss1_fc2", auxiliary_head(params, "loss1", 512)?, &[inc4a])?;
    g.wire_node("loss2_fc2", auxiliary_head(params, "loss2", 528)?, &[inc4d])?;
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RandomParams;

    #[test]
    fn layers_in_graph_order() {
        let graph = build(&mut RandomParams::new(0)).unwrap();
        assert_eq!(graph.layer_names().collect::<Vec<_>>(), LAYERS.to_vec());
        assert_eq!(graph.input_nodes(), &[0]);
    }
}
