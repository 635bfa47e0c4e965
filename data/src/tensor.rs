//! `Tensor`, the f32 array flowing between graph nodes.
use crate::TVec;
use crate::datum::DatumType;
use itertools::Itertools;
use ndarray::prelude::*;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Tensor is a dense, owned, float32 n-dimensional array.
///
/// It is what every operator consumes and produces once raw images have been
/// preprocessed. Its element type never changes, but `datum_type()` is kept so
/// callers can assert on it.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// Create a tensor full of zeros.
    pub fn zero(shape: &[usize]) -> Tensor {
        Tensor { data: ArrayD::zeros(shape) }
    }

    /// Create a tensor from a shape and a row-major slice.
    pub fn from_shape(shape: &[usize], data: &[f32]) -> anyhow::Result<Tensor> {
        let data = ArrayD::from_shape_vec(shape, data.to_vec())?;
        Ok(Tensor { data })
    }

    pub fn datum_type(&self) -> DatumType {
        DatumType::F32
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_array_view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    pub fn to_array_view_mut(&mut self) -> ArrayViewMutD<'_, f32> {
        self.data.view_mut()
    }

    /// Access the data as a slice, if it is laid out in standard order.
    pub fn as_slice(&self) -> anyhow::Result<&[f32]> {
        self.data
            .as_slice()
            .ok_or_else(|| anyhow::format_err!("Tensor {:?} is not contiguous", self.shape()))
    }

    /// Stack tensors of identical shape along a new `axis`.
    pub fn stack_tensors(axis: usize, tensors: &[impl Borrow<Tensor>]) -> anyhow::Result<Tensor> {
        anyhow::ensure!(!tensors.is_empty(), "Can not stack an empty list of tensors");
        let views: TVec<ArrayViewD<f32>> =
            tensors.iter().map(|t| t.borrow().to_array_view()).collect();
        Ok(Tensor { data: ndarray::stack(Axis(axis), &views)? })
    }

    pub fn dump(&self, force_full: bool) -> String {
        let trunc = self.len() > 12 && !force_full;
        let data = self.data.iter().take(if trunc { 12 } else { self.len() }).join(", ");
        format!(
            "{},{} {}{}",
            self.shape().iter().join(","),
            self.datum_type(),
            data,
            if trunc { "..." } else { "" }
        )
    }

    /// Compare two tensors, allowing for rounding errors.
    pub fn close_enough(&self, other: &Self, approx: bool) -> anyhow::Result<()> {
        if self.shape() != other.shape() {
            anyhow::bail!("Shape mismatch {:?} != {:?}", self.shape(), other.shape())
        }
        if !approx {
            // bitwise, so that NaNs compare
            let mismatch =
                self.data.iter().zip(other.data.iter()).position(|(a, b)| a.to_bits() != b.to_bits());
            return match mismatch {
                None => Ok(()),
                Some(ix) => anyhow::bail!("Mismatch at flat index {}", ix),
            };
        }
        let atol = 5e-4;
        let rtol = 1e-4;
        for ((ix, &a), &b) in self.data.indexed_iter().zip(other.data.iter()) {
            if !((a.is_nan() && b.is_nan())
                || (a.is_infinite() && b.is_infinite() && a.signum() == b.signum())
                || (a - b).abs() <= atol + rtol * b.abs())
            {
                anyhow::bail!("Mismatch at {:?} {} != {}", ix.slice(), a, b)
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", self.dump(false))
    }
}

impl<D: Dimension> From<Array<f32, D>> for Tensor {
    fn from(it: Array<f32, D>) -> Tensor {
        Tensor { data: it.into_dyn() }
    }
}

/// Convenient conversion to Tensor.
pub trait IntoTensor: Sized {
    /// Convert Self to a Tensor.
    ///
    /// May perform a copy
    fn into_tensor(self) -> Tensor;
}

/// Convenient conversion to Arc<Tensor>.
pub trait IntoArcTensor: Sized {
    fn into_arc_tensor(self) -> Arc<Tensor>;
}

impl<D: Dimension> IntoTensor for Array<f32, D> {
    fn into_tensor(self) -> Tensor {
        Tensor::from(self)
    }
}

impl IntoTensor for Tensor {
    fn into_tensor(self) -> Tensor {
        self
    }
}

impl IntoTensor for Arc<Tensor> {
    fn into_tensor(self) -> Tensor {
        Arc::try_unwrap(self).unwrap_or_else(|t| (*t).clone())
    }
}

impl<D: Dimension> IntoArcTensor for Array<f32, D> {
    fn into_arc_tensor(self) -> Arc<Tensor> {
        Arc::new(Tensor::from(self))
    }
}

impl IntoArcTensor for Tensor {
    fn into_arc_tensor(self) -> Arc<Tensor> {
        Arc::new(self)
    }
}
