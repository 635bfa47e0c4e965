use ndarray::Zip;
use ndarray::prelude::*;

use crate::internal::*;
use crate::ops::{eval_per_sample, nchw};

/// Local response normalization across channels, caffe flavour:
/// `x / (bias + alpha / size * sum(x²))^beta` with the sum over the `size`
/// neighbouring channels centered on x.
#[derive(Debug, Clone, new)]
pub struct Lrn {
    pub alpha: f32,
    pub beta: f32,
    pub bias: f32,
    pub size: usize,
}

impl Lrn {
    pub(crate) fn eval_sample(&self, input: ArrayView3<f32>) -> InceptResult<Array3<f32>> {
        let channels = input.len_of(Axis(0));
        let squares = input.mapv(|x| x * x);
        let mut scale = Array3::<f32>::zeros(input.raw_dim());
        for c in 0..channels {
            let c_min = c.saturating_sub((self.size - 1) / 2);
            let c_max = (c + self.size / 2).min(channels - 1);
            let mut acc = scale.index_axis_mut(Axis(0), c);
            for n in c_min..=c_max {
                acc += &squares.index_axis(Axis(0), n);
            }
        }
        let factor = self.alpha / self.size as f32;
        Ok(Zip::from(&input)
            .and(&scale)
            .map_collect(|&x, &s| x / (self.bias + factor * s).powf(self.beta)))
    }
}

impl Op for Lrn {
    fn name(&self) -> Cow<'_, str> {
        "Lrn".into()
    }

    fn info(&self) -> InceptResult<Vec<String>> {
        Ok(vec![format!(
            "size: {}, alpha: {}, beta: {}, bias: {}",
            self.size, self.alpha, self.beta, self.bias
        )])
    }

    fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>> {
        check_input_arity(inputs, 1)?;
        ensure!(self.size > 0, "Lrn size must be positive");
        nchw(inputs[0])?;
        Ok(inputs[0].into())
    }

    fn eval(&self, session: &SessionState, mut inputs: TVec<Arc<Tensor>>) -> InceptResult<Tensor> {
        let input = args_1!(inputs);
        eval_per_sample(session, &input, |sample| self.eval_sample(sample))
    }
}
