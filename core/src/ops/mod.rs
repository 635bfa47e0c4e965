//! Ops
use std::fmt;

use downcast_rs::{Downcast, impl_downcast};
use dyn_clone::DynClone;
use ndarray::prelude::*;

#[macro_use]
pub mod macros;

pub mod array;
pub mod cnn;
pub mod matmul;
pub mod nn;
pub mod sequence;
pub mod source;

use crate::internal::*;

/// A frozen operator.
///
/// Parameters, if any, are baked in at construction and never change: an op
/// is a pure function of its inputs, safe to share between threads.
pub trait Op: fmt::Debug + DynClone + Send + Sync + 'static + Downcast {
    fn name(&self) -> Cow<'_, str>;

    /// Short (one-line) strings giving hints on internal implementation or
    /// important configuration details to be displayed in dumps.
    fn info(&self) -> InceptResult<Vec<String>> {
        Ok(vec![])
    }

    /// Output shape for the given input shapes.
    ///
    /// This is where geometry is validated: a plan computes all shapes before
    /// evaluating anything.
    fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>>;

    fn eval(&self, session: &SessionState, inputs: TVec<Arc<Tensor>>) -> InceptResult<Tensor>;
}

impl_downcast!(Op);
dyn_clone::clone_trait_object!(Op);

impl<O: Op> From<O> for Box<dyn Op> {
    fn from(it: O) -> Box<dyn Op> {
        Box::new(it)
    }
}

pub fn check_input_arity(inputs: &[&[usize]], expected: usize) -> InceptResult<()> {
    if inputs.len() != expected {
        bail!("Wrong input number. Expected {}, got {}.", expected, inputs.len())
    } else {
        Ok(())
    }
}

/// Input shape of an image batch op, as (n, c, h, w).
pub(crate) fn nchw(shape: &[usize]) -> InceptResult<(usize, usize, usize, usize)> {
    if let &[n, c, h, w] = shape {
        Ok((n, c, h, w))
    } else {
        bail!("Expected a NCHW input, got shape {:?}", shape)
    }
}

/// Apply `f` to every (C, H, W) sample of a NCHW batch and stack the results.
pub(crate) fn eval_per_sample<F>(session: &SessionState, input: &Tensor, f: F) -> InceptResult<Tensor>
where
    F: Fn(ArrayView3<f32>) -> InceptResult<Array3<f32>> + Send + Sync,
{
    let x = input.to_array_view().into_dimensionality::<Ix4>()?;
    let samples =
        session.executor.map_samples(x.len_of(Axis(0)), |n| f(x.index_axis(Axis(0), n)))?;
    let views: TVec<ArrayView3<f32>> = samples.iter().map(|s| s.view()).collect();
    Ok(ndarray::stack(Axis(0), &views)?.into_tensor())
}
