use ndarray::prelude::*;

use super::padding::{pad_sample, window_at};
use crate::internal::*;
use crate::ops::cnn::PoolSpec;
use crate::ops::eval_per_sample;

/// Average pooling. Padded cells count in the divisor, as in caffe.
#[derive(Debug, Clone, new)]
pub struct AvgPool {
    pub pool_spec: PoolSpec,
}

impl AvgPool {
    pub(crate) fn eval_sample(&self, input: ArrayView3<f32>) -> InceptResult<Array3<f32>> {
        let (c, h, w) = input.dim();
        let geo = self.pool_spec.compute_geo(h, w)?;
        let padded = pad_sample(&input, &geo, 0.0);
        let mut output = Array3::<f32>::zeros((c, geo[0].output, geo[1].output));
        let [kh, kw] = self.pool_spec.kernel_shape;
        for ky in 0..kh {
            for kx in 0..kw {
                output += &window_at(padded.view(), &geo, &self.pool_spec.strides, ky, kx);
            }
        }
        output /= (kh * kw) as f32;
        Ok(output)
    }
}

impl Op for AvgPool {
    fn name(&self) -> Cow<'_, str> {
        "AvgPool".into()
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
    fn global_average() {
        let pool = AvgPool::new(PoolSpec::new([2, 3], [1, 1], PaddingSpec::valid()));
        let input = Array3::from_shape_fn((2, 2, 3), |(c, y, x)| (c * 100 + y * 3 + x) as f32);
        let output = pool.eval_sample(input.view()).unwrap();
        assert_eq!(output, arr3(&[[[2.5]], [[102.5]]]));
    }

    #[test]
    fn strided_windows() {
        let pool = AvgPool::new(PoolSpec::new([5, 5], [3, 3], PaddingSpec::valid()));
        let input = Array3::from_elem((1, 14, 14), 2.0f32);
        let output = pool.eval_sample(input.view()).unwrap();
        assert_eq!(output.dim(), (1, 4, 4));
        assert!(output.iter().all(|&x| (x - 2.0).abs() < 1e-6));
    }
}
