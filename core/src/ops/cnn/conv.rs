use ndarray::prelude::*;

use super::padding::{ComputedPaddedDim, PaddingSpec, pad_sample, window_at};
use crate::internal::*;
use crate::ops::{eval_per_sample, nchw};

/// 2D convolution on NCHW data, OIHW kernel, with bias.
///
/// Evaluated per sample as an im2col followed by a single matrix product.
#[derive(Debug, Clone)]
pub struct Conv {
    /// Kernel, reshaped to (O, I * KH * KW).
    kernel: Arc<Array2<f32>>,
    bias: Arc<Array1<f32>>,
    input_channels: usize,
    kernel_shape: [usize; 2],
    strides: [usize; 2],
    padding: PaddingSpec,
}

impl Conv {
    pub fn new(
        kernel: Array4<f32>,
        bias: Array1<f32>,
        strides: [usize; 2],
        padding: PaddingSpec,
    ) -> InceptResult<Conv> {
        let (o, i, kh, kw) = kernel.dim();
        ensure!(
            bias.len() == o,
            "Convolution bias has {} values for {} output channels",
            bias.len(),
            o
        );
        ensure!(!padding.ceil_mode, "Convolution does not support ceil mode");
        let kernel = kernel.as_standard_layout().into_owned().into_shape_with_order((o, i * kh * kw))?;
        Ok(Conv {
            kernel: Arc::new(kernel),
            bias: Arc::new(bias),
            input_channels: i,
            kernel_shape: [kh, kw],
            strides,
            padding,
        })
    }

    pub fn output_channels(&self) -> usize {
        self.kernel.nrows()
    }

    fn is_pointwise(&self) -> bool {
        self.kernel_shape == [1, 1] && self.strides == [1, 1] && self.padding.pads == [0, 0]
    }

    fn compute_geo(&self, h: usize, w: usize) -> InceptResult<TVec<ComputedPaddedDim>> {
        self.padding.compute(&[h, w], &self.kernel_shape, &self.strides)
    }

    /// Lay out every receptive field as a column: (I * KH * KW, OH * OW).
    fn im2col(
        &self,
        input: &ArrayView3<f32>,
        geo: &[ComputedPaddedDim],
    ) -> InceptResult<Array2<f32>> {
        let (c, _, _) = input.dim();
        let [kh, kw] = self.kernel_shape;
        let (oh, ow) = (geo[0].output, geo[1].output);
        let padded = pad_sample(input, geo, 0.0);
        let mut cols = Array2::<f32>::zeros((c * kh * kw, oh * ow));
        for ci in 0..c {
            let channel = padded.slice(s![ci..ci + 1, .., ..]);
            for ky in 0..kh {
                for kx in 0..kw {
                    let row = (ci * kh + ky) * kw + kx;
                    let window = window_at(channel, geo, &self.strides, ky, kx);
                    cols.row_mut(row)
                        .into_shape_with_order((1, oh, ow))?
                        .assign(&window);
                }
            }
        }
        Ok(cols)
    }

    pub(crate) fn eval_sample(&self, input: ArrayView3<f32>) -> InceptResult<Array3<f32>> {
        let (c, h, w) = input.dim();
        ensure!(
            c == self.input_channels,
            "Convolution expects {} input channels, got {}",
            self.input_channels,
            c
        );
        let geo = self.compute_geo(h, w)?;
        let (oh, ow) = (geo[0].output, geo[1].output);
        let input = input.as_standard_layout();
        let mut output = if self.is_pointwise() {
            self.kernel.dot(&input.view().into_shape_with_order((c, h * w))?)
        } else {
            self.kernel.dot(&self.im2col(&input.view(), &geo)?)
        };
        output += &self.bias.view().insert_axis(Axis(1));
        Ok(output.into_shape_with_order((self.output_channels(), oh, ow))?)
    }
}

impl Op for Conv {
    fn name(&self) -> Cow<'_, str> {
        "Conv".into()
    }

    fn info(&self) -> InceptResult<Vec<String>> {
        Ok(vec![
            format!(
                "Kernel {}x{}, {} -> {} channels",
                self.kernel_shape[0],
                self.kernel_shape[1],
                self.input_channels,
                self.output_channels()
            ),
            format!("Strides: {:?}, padding: {:?}", self.strides, self.padding.pads),
        ])
    }

    fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>> {
        check_input_arity(inputs, 1)?;
        let (n, c, h, w) = nchw(inputs[0])?;
        ensure!(
            c == self.input_channels,
            "Convolution expects {} input channels, got {}",
            self.input_channels,
            c
        );
        let geo = self.compute_geo(h, w)?;
        Ok(tvec!(n, self.output_channels(), geo[0].output, geo[1].output))
    }

    fn eval(&self, session: &SessionState, mut inputs: TVec<Arc<Tensor>>) -> InceptResult<Tensor> {
        let input = args_1!(inputs);
        eval_per_sample(session, &input, |sample| self.eval_sample(sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Straightforward nested loops, the reference for the im2col path.
    fn reference(
        input: &Array3<f32>,
        kernel: &Array4<f32>,
        bias: &Array1<f32>,
        stride: usize,
        pad: usize,
    ) -> Array3<f32> {
        let (c, h, w) = input.dim();
        let (o, _, kh, kw) = kernel.dim();
        let oh = (h + 2 * pad - kh) / stride + 1;
        let ow = (w + 2 * pad - kw) / stride + 1;
        Array3::from_shape_fn((o, oh, ow), |(co, y, x)| {
            let mut sum = bias[co];
            for ci in 0..c {
                for ky in 0..kh {
                    for kx in 0..kw {
                        let iy = (y * stride + ky) as isize - pad as isize;
                        let ix = (x * stride + kx) as isize - pad as isize;
                        if iy >= 0 && ix >= 0 && (iy as usize) < h && (ix as usize) < w {
                            sum += input[(ci, iy as usize, ix as usize)] * kernel[(co, ci, ky, kx)];
                        }
                    }
                }
            }
            sum
        })
    }

    #[derive(Debug)]
    struct ConvProblem {
        input: Array3<f32>,
        kernel: Array4<f32>,
        bias: Array1<f32>,
        stride: usize,
        pad: usize,
    }

    impl ConvProblem {
        fn check(&self) -> InceptResult<()> {
            let conv = Conv::new(
                self.kernel.clone(),
                self.bias.clone(),
                [self.stride; 2],
                PaddingSpec::explicit(self.pad),
            )?;
            let found = conv.eval_sample(self.input.view())?.into_tensor();
            let expected =
                reference(&self.input, &self.kernel, &self.bias, self.stride, self.pad).into_tensor();
            found.close_enough(&expected, true)
        }
    }

    impl Arbitrary for ConvProblem {
        type Parameters = ();
        type Strategy = BoxedStrategy<ConvProblem>;
        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            (1usize..4, 1usize..4, 1usize..4, 1usize..3, 0usize..2, 0usize..5, 0usize..5)
                .prop_flat_map(|(c, o, k, stride, pad, extra_h, extra_w)| {
                    let (h, w) = (k + extra_h, k + extra_w);
                    (
                        proptest::collection::vec(-1f32..1f32, c * h * w),
                        proptest::collection::vec(-1f32..1f32, o * c * k * k),
                        proptest::collection::vec(-1f32..1f32, o),
                        Just((c, o, k, h, w, stride, pad)),
                    )
                })
                .prop_map(|(i, k, b, (c, o, kk, h, w, stride, pad))| ConvProblem {
                    input: Array3::from_shape_vec((c, h, w), i).unwrap(),
                    kernel: Array4::from_shape_vec((o, c, kk, kk), k).unwrap(),
                    bias: Array1::from(b),
                    stride,
                    pad,
                })
                .boxed()
        }
    }

    proptest! {
        #[test]
        fn prop(pb in any::<ConvProblem>()) {
            pb.check().unwrap()
        }
    }

    #[test]
    fn pointwise_is_a_channel_mix() {
        let kernel = arr2(&[[1.0f32, 2.0], [0.0, -1.0]]).into_shape_with_order((2, 2, 1, 1)).unwrap();
        let conv = Conv::new(kernel, arr1(&[0.5, 0.0]), [1, 1], PaddingSpec::valid()).unwrap();
        let input = Array3::from_shape_vec((2, 1, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let output = conv.eval_sample(input.view()).unwrap();
        assert_eq!(output, Array3::from_shape_vec((2, 1, 2), vec![7.5, 10.5, -3.0, -4.0]).unwrap());
    }

    #[test]
    fn output_shape_follows_geometry() {
        let conv = Conv::new(
            Array4::zeros((64, 3, 7, 7)),
            Array1::zeros(64),
            [2, 2],
            PaddingSpec::explicit(3),
        )
        .unwrap();
        assert_eq!(&*conv.output_shape(&[&[2, 3, 224, 224]]).unwrap(), &[2, 64, 112, 112]);
        assert_eq!(&*conv.output_shape(&[&[1, 3, 80, 60]]).unwrap(), &[1, 64, 40, 30]);
        assert!(conv.output_shape(&[&[1, 4, 80, 60]]).is_err());
    }

    #[test]
    fn rejects_bad_bias() {
        assert!(
            Conv::new(Array4::zeros((4, 3, 1, 1)), Array1::zeros(3), [1, 1], PaddingSpec::valid())
                .is_err()
        );
    }
}
