use crate::internal::*;
use ndarray::prelude::*;

/// Symmetric explicit padding, with caffe-style "ceil" rounding as an option.
///
/// In ceil mode the output covers the whole input: a last, partial window is
/// added when the stride does not divide evenly, and padded after the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, new)]
pub struct PaddingSpec {
    pub pads: [usize; 2],
    pub ceil_mode: bool,
}

#[derive(Debug, Clone, new, PartialEq, Eq)]
pub struct ComputedPaddedDim {
    pub input: usize,
    pub output: usize,
    pub pad_before: usize,
    pub pad_after: usize,
}

impl ComputedPaddedDim {
    /// Length of the input once padded on both ends.
    pub fn padded(&self) -> usize {
        self.pad_before + self.input + self.pad_after
    }
}

impl PaddingSpec {
    pub fn valid() -> PaddingSpec {
        PaddingSpec::default()
    }

    pub fn explicit(pad: usize) -> PaddingSpec {
        PaddingSpec::new([pad, pad], false)
    }

    pub fn ceil(pad: usize) -> PaddingSpec {
        PaddingSpec::new([pad, pad], true)
    }

    pub fn compute(
        &self,
        input_spatial_shape: &[usize],
        kernel_spatial_shape: &[usize],
        strides: &[usize],
    ) -> InceptResult<TVec<ComputedPaddedDim>> {
        (0..input_spatial_shape.len())
            .map(|d| {
                self.compute_one(
                    d,
                    input_spatial_shape[d],
                    kernel_spatial_shape[d],
                    strides[d],
                )
            })
            .collect()
    }

    pub fn compute_one(
        &self,
        axis: usize,
        input: usize,
        kernel: usize,
        stride: usize,
    ) -> InceptResult<ComputedPaddedDim> {
        let pad = self.pads[axis];
        ensure!(stride > 0, "Stride must be positive");
        if input + 2 * pad < kernel {
            bail!(
                "Input of size {} (padded by {} on both ends) is smaller than kernel {} on axis {}",
                input,
                pad,
                kernel,
                axis
            )
        }
        let span = input + 2 * pad - kernel;
        let output = if self.ceil_mode { span.div_ceil(stride) } else { span / stride } + 1;
        let needed = (output - 1) * stride + kernel;
        let pad_after = needed.saturating_sub(input + pad).max(pad);
        Ok(ComputedPaddedDim::new(input, output, pad, pad_after))
    }
}

/// Copy a (C, H, W) sample into a buffer padded as computed, filled with `fill`.
pub(crate) fn pad_sample(
    input: &ArrayView3<f32>,
    geo: &[ComputedPaddedDim],
    fill: f32,
) -> Array3<f32> {
    let (c, h, w) = input.dim();
    let mut padded = Array3::from_elem((c, geo[0].padded(), geo[1].padded()), fill);
    let (top, left) = (geo[0].pad_before, geo[1].pad_before);
    padded.slice_mut(s![.., top..top + h, left..left + w]).assign(input);
    padded
}

/// The strided view of `padded` seen by kernel offset (ky, kx): one value per
/// output position.
pub(crate) fn window_at<'a>(
    padded: ArrayView3<'a, f32>,
    geo: &[ComputedPaddedDim],
    strides: &[usize],
    ky: usize,
    kx: usize,
) -> ArrayView3<'a, f32> {
    let (sy, sx) = (strides[0] as isize, strides[1] as isize);
    let (oh, ow) = (geo[0].output, geo[1].output);
    padded.slice_move(s![
        ..,
        ky..ky + (oh - 1) * strides[0] + 1;sy,
        kx..kx + (ow - 1) * strides[1] + 1;sx
    ])
}
