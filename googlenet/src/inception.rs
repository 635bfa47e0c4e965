use incept_core::internal::*;
use incept_core::ops::array::Branches;
use incept_core::ops::cnn::{Conv, MaxPool, PaddingSpec, PoolSpec};
use incept_core::ops::nn::Relu;
use incept_core::ops::sequence::Sequence;

use crate::params::ParameterSource;

/// Channel counts of an Inception block.
#[derive(Debug, Clone, Copy)]
pub struct InceptionSpec {
    pub input: usize,
    pub out1: usize,
    pub proj3: usize,
    pub out3: usize,
    pub proj5: usize,
    pub out5: usize,
    pub proj_pool: usize,
}

pub(crate) fn conv_relu(
    params: &mut dyn ParameterSource,
    name: &str,
    shape: (usize, usize, usize, usize),
    stride: usize,
    pad: usize,
) -> InceptResult<TVec<Box<dyn Op>>> {
    let (kernel, bias) = params.conv(name, shape)?;
    let conv = Conv::new(kernel, bias, [stride, stride], PaddingSpec::explicit(pad))
        .with_context(|| format!("Building {name}"))?;
    Ok(tvec!(conv.into(), Relu.into()))
}

/// The four branches of the block, concatenated on channels:
/// 1x1 | 1x1 then 3x3 | 1x1 then 5x5 | 3x3 max pool then 1x1.
///
/// Parameters are looked up as `{prefix}/conv1`, `{prefix}/proj3`,
/// `{prefix}/conv3`, `{prefix}/proj5`, `{prefix}/conv5` and `{prefix}/projp`.
pub fn inception(
    params: &mut dyn ParameterSource,
    prefix: &str,
    spec: &InceptionSpec,
) -> InceptResult<Branches> {
    let i = spec.input;
    let one = conv_relu(params, &format!("{prefix}/conv1"), (spec.out1, i, 1, 1), 1, 0)?;

    let mut three = conv_relu(params, &format!("{prefix}/proj3"), (spec.proj3, i, 1, 1), 1, 0)?;
    three.extend(conv_relu(params, &format!("{prefix}/conv3"), (spec.out3, spec.proj3, 3, 3), 1, 1)?);

    let mut five = conv_relu(params, &format!("{prefix}/proj5"), (spec.proj5, i, 1, 1), 1, 0)?;
    five.extend(conv_relu(params, &format!("{prefix}/conv5"), (spec.out5, spec.proj5, 5, 5), 1, 2)?);

    let pool = MaxPool::new(PoolSpec::new([3, 3], [1, 1], PaddingSpec::ceil(1)));
    let mut pool: TVec<Box<dyn Op>> = tvec!(pool.into());
    pool.extend(conv_relu(params, &format!("{prefix}/projp"), (spec.proj_pool, i, 1, 1), 1, 0)?);

    Ok(Branches::new(tvec!(
        Sequence::new(one).into(),
        Sequence::new(three).into(),
        Sequence::new(five).into(),
        Sequence::new(pool).into(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RandomParams;

    #[test]
    fn block_3a_geometry() {
        let spec = InceptionSpec {
            input: 192,
            out1: 64,
            proj3: 96,
            out3: 128,
            proj5: 16,
            out5: 32,
            proj_pool: 32,
        };
        let block = inception(&mut RandomParams::new(0), "inc3a", &spec).unwrap();
        assert_eq!(&*block.output_shape(&[&[2, 192, 28, 28]]).unwrap(), &[2, 256, 28, 28]);
        assert!(block.output_shape(&[&[2, 191, 28, 28]]).is_err());
    }
}
