#[macro_use]
mod macros;

/// A Smallvec instantiation with 4 embeddable values.
///
/// Used about everywhere in incept, for node inputs and tensor dimensions.
pub type TVec<T> = smallvec::SmallVec<[T; 4]>;

pub mod prelude {
    pub use crate::TVec;
    pub use crate::datum::DatumType;
    pub use crate::image::RawImage;
    pub use crate::tensor::{IntoArcTensor, IntoTensor, Tensor};
    pub use crate::tvec;
}

pub mod internal {
    pub use crate::prelude::*;
    pub use ndarray as incept_ndarray;
    pub use smallvec as incept_smallvec;
}

pub use anyhow;

mod datum;
mod image;
mod tensor;
