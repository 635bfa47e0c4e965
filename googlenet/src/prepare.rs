use incept_core::internal::*;
use ndarray::prelude::*;

/// `(height, width)` images are resized to by default.
pub const DEFAULT_SIZE: Option<(usize, usize)> = Some((224, 224));

/// Per-channel mean of the training set, in BGR order.
pub const BGR_MEAN: [f32; 3] = [104.0, 117.0, 123.0];

/// Turn a raw image into the `(3, H, W)` f32 tensor the network consumes.
///
/// The input may be `(H, W)` grayscale, channel-last `(H, W, C)` (any last
/// axis of 4 or less is taken as channels) or channel-first `(C, H, W)`.
/// Grayscale is replicated to three channels. When `size` is given the image
/// is resized to exactly `(height, width)`. Pixel values are expected in the
/// 0..255 range: f32 pixels outside of it are clamped, with or without a
/// resize. Channels are then reordered to BGR and `BGR_MEAN` is subtracted.
pub fn prepare(image: &RawImage, size: Option<(usize, usize)>) -> InceptResult<Tensor> {
    let chw = channels_first(image)?;
    let rgb = match chw.len_of(Axis(0)) {
        1 => ndarray::concatenate(Axis(0), &[chw.view(), chw.view(), chw.view()])?,
        3 => chw,
        c => {
            return Err(invalid_input!(
                "expected 1 or 3 channels, got {} in an image of shape {:?}",
                c,
                image.shape()
            )
            .into());
        }
    };
    let (_, h, w) = rgb.dim();
    if h == 0 || w == 0 {
        return Err(invalid_input!("image of shape {:?} is empty", image.shape()).into());
    }
    let rgb = match size {
        Some((height, width)) if (height, width) != (h, w) => resize(rgb, height, width)?,
        Some(_) if !crate::available() => resize(rgb, h, w)?,
        _ => rgb,
    };
    let mut bgr = rgb;
    bgr.invert_axis(Axis(0));
    for (mut channel, mean) in bgr.outer_iter_mut().zip(BGR_MEAN.iter()) {
        channel -= *mean;
    }
    Ok(bgr.as_standard_layout().into_owned().into_tensor())
}

/// Pixels as an owned (C, H, W) array, clamped to 0..255.
fn channels_first(image: &RawImage) -> InceptResult<Array3<f32>> {
    let pixels = image.to_f32().mapv_into(|x| x.clamp(0.0, 255.0));
    match *image.shape() {
        [h, w] => Ok(pixels.into_shape_with_order((1, h, w))?),
        [_, _, c] if c <= 4 => {
            Ok(pixels.into_dimensionality::<Ix3>()?.permuted_axes([2, 0, 1]))
        }
        [_, _, _] => Ok(pixels.into_dimensionality::<Ix3>()?),
        ref shape => {
            Err(invalid_input!("expected a rank 2 or 3 image, got shape {:?}", shape).into())
        }
    }
}

#[cfg(feature = "image")]
fn resize(chw: Array3<f32>, height: usize, width: usize) -> InceptResult<Array3<f32>> {
    use image::imageops::{FilterType, resize};
    ensure!(
        height > 0 && width > 0,
        InceptError::InvalidInput(format!("can not resize to {height}x{width}"))
    );
    let (_, h, w) = chw.dim();
    // float images are clamped to 0..1 by the resampler
    let hwc: Vec<f32> = chw.permuted_axes([1, 2, 0]).iter().map(|x| x / 255.0).collect();
    let buffer = image::Rgb32FImage::from_raw(w as u32, h as u32, hwc)
        .ok_or_else(|| format_err!("Failed to wrap a {}x{} image", h, w))?;
    let resized = resize(&buffer, width as u32, height as u32, FilterType::Triangle);
    let hwc = Array3::from_shape_vec((height, width, 3), resized.into_raw())?;
    Ok(hwc.permuted_axes([2, 0, 1]).mapv(|x| x * 255.0))
}

#[cfg(not(feature = "image"))]
fn resize(_chw: Array3<f32>, _height: usize, _width: usize) -> InceptResult<Array3<f32>> {
    Err(InceptError::CapabilityUnavailable("image resizing (build with the `image` feature)").into())
}
