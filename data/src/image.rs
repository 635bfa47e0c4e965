use crate::datum::DatumType;
use ndarray::prelude::*;

/// A decoded image, as handed over by the caller.
///
/// Accepted layouts are `(H, W)`, `(H, W, C)` and `(C, H, W)`; which one it
/// is gets decided by preprocessing, not here.
#[derive(Clone, Debug, PartialEq)]
pub enum RawImage {
    U8(ArrayD<u8>),
    F32(ArrayD<f32>),
}

impl RawImage {
    pub fn datum_type(&self) -> DatumType {
        match self {
            RawImage::U8(_) => DatumType::U8,
            RawImage::F32(_) => DatumType::F32,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            RawImage::U8(a) => a.shape(),
            RawImage::F32(a) => a.shape(),
        }
    }

    /// Pixel values as f32, in the same layout. Always copies.
    pub fn to_f32(&self) -> ArrayD<f32> {
        match self {
            RawImage::U8(a) => a.mapv(|x| x as f32),
            RawImage::F32(a) => a.to_owned(),
        }
    }
}

impl<D: Dimension> From<Array<u8, D>> for RawImage {
    fn from(it: Array<u8, D>) -> RawImage {
        RawImage::U8(it.into_dyn())
    }
}

impl<D: Dimension> From<Array<f32, D>> for RawImage {
    fn from(it: Array<f32, D>) -> RawImage {
        RawImage::F32(it.into_dyn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u8_pixels_widen_to_f32() {
        let img: RawImage = Array2::from_elem((2, 3), 255u8).into();
        assert_eq!(img.datum_type(), DatumType::U8);
        assert_eq!(img.shape(), &[2, 3]);
        assert!(img.to_f32().iter().all(|&x| x == 255.0));
    }

    #[test]
    fn f32_pixels_are_kept() {
        let img: RawImage = Array3::from_elem((1, 2, 2), 12.5f32).into();
        assert_eq!(img.datum_type(), DatumType::F32);
        assert_eq!(img.to_f32()[&[0, 1, 1][..]], 12.5);
    }
}
