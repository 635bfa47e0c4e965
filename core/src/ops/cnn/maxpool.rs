use ndarray::Zip;
use ndarray::prelude::*;

use super::padding::{pad_sample, window_at};
use crate::internal::*;
use crate::ops::cnn::PoolSpec;
use crate::ops::eval_per_sample;

#[derive(Debug, Clone, new)]
pub struct MaxPool {
    pub pool_spec: PoolSpec,
}

impl MaxPool {
    pub(crate) fn eval_sample(&self, input: ArrayView3<f32>) -> InceptResult<Array3<f32>> {
        let (c, h, w) = input.dim();
        let geo = self.pool_spec.compute_geo(h, w)?;
        // padding never wins a max
        let padded = pad_sample(&input, &geo, f32::NEG_INFINITY);
        let mut output = Array3::from_elem((c, geo[0].output, geo[1].output), f32::NEG_INFINITY);
        let [kh, kw] = self.pool_spec.kernel_shape;
        for ky in 0..kh {
            for kx in 0..kw {
                let window = window_at(padded.view(), &geo, &self.pool_spec.strides, ky, kx);
                Zip::from(&mut output).and(&window).for_each(|o, &x| {
                    if x > *o {
                        *o = x
                    }
                });
            }
        }
        Ok(output)
    }
}

impl Op for MaxPool {
    fn name(&self) -> Cow<'_, str> {
        "MaxPool".into()
    }

    fn info(&self) -> InceptResult<Vec<String>> {
        Ok(self.pool_spec.info())
    }

    fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>> {
        self.pool_spec.output_shape(inputs)
    }

    fn eval(&self, session: &SessionState, mut inputs: TVec<Arc<Tensor>>) -> InceptResult<Tensor> {
        let input = args_1!(inputs);
        eval_per_sample(session, &input, |sample| self.eval_sample(sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::cnn::PaddingSpec;
    use ndarray::arr3;

    #[test]
    fn ceil_mode_keeps_the_last_partial_window() {
        let pool = MaxPool::new(PoolSpec::new([3, 3], [2, 2], PaddingSpec::ceil(0)));
        let input = Array3::from_shape_fn((1, 4, 4), |(_, y, x)| (y * 4 + x) as f32);
        let output = pool.eval_sample(input.view()).unwrap();
        assert_eq!(output, arr3(&[[[10.0, 11.0], [14.0, 15.0]]]));
    }

    #[test]
    fn padded_border_is_ignored() {
        let pool = MaxPool::new(PoolSpec::new([3, 3], [1, 1], PaddingSpec::explicit(1)));
        let input = Array3::from_elem((2, 3, 3), -5.0f32);
        let output = pool.eval_sample(input.view()).unwrap();
        assert_eq!(output.dim(), (2, 3, 3));
        assert!(output.iter().all(|&x| x == -5.0));
    }
}
