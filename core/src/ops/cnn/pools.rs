use crate::internal::*;
use crate::ops::cnn::{ComputedPaddedDim, PaddingSpec};
use crate::ops::nchw;

/// Window geometry shared by the pooling ops.
#[derive(Debug, Clone, new, PartialEq, Eq)]
pub struct PoolSpec {
    pub kernel_shape: [usize; 2],
    pub strides: [usize; 2],
    pub padding: PaddingSpec,
}

impl PoolSpec {
    pub fn info(&self) -> Vec<String> {
        vec![format!(
            "Kernel shape:{:?} (strides:{:?}, padding:{:?})",
            self.kernel_shape, self.strides, self.padding,
        )]
    }

    pub fn compute_geo(&self, h: usize, w: usize) -> InceptResult<TVec<ComputedPaddedDim>> {
        self.padding.compute(&[h, w], &self.kernel_shape, &self.strides)
    }

    pub fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>> {
        check_input_arity(inputs, 1)?;
        let (n, c, h, w) = nchw(inputs[0])?;
        let geo = self.compute_geo(h, w)?;
        Ok(tvec!(n, c, geo[0].output, geo[1].output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_mode_pooling_shapes() {
        let spec = PoolSpec::new([3, 3], [2, 2], PaddingSpec::ceil(0));
        assert_eq!(&*spec.output_shape(&[&[1, 64, 112, 112]]).unwrap(), &[1, 64, 56, 56]);
        assert_eq!(&*spec.output_shape(&[&[1, 64, 40, 30]]).unwrap(), &[1, 64, 20, 15]);
        assert!(spec.output_shape(&[&[64, 40, 30]]).is_err());
    }
}
