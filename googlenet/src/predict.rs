use incept_core::internal::*;
use ndarray::prelude::*;

use crate::engine::GoogLeNet;
use crate::extract::prepare_all;

/// Images are prepared at this `(height, width)` before being cropped.
pub const OVERSAMPLE_SIZE: (usize, usize) = (256, 256);
/// Size of each view fed to the network.
pub const CROP_SIZE: (usize, usize) = (224, 224);
pub const VIEWS_PER_IMAGE: usize = 10;

/// Views of a set of images stacked as one batch, remembering which image
/// each view comes from.
#[derive(Debug, Clone)]
pub struct CropBatch {
    pub views: Tensor,
    pub origins: Vec<usize>,
}

/// Corners, center, then the horizontal mirror of each of those five.
fn oversample_views(
    image: ArrayView3<'_, f32>,
    (ch, cw): (usize, usize),
) -> InceptResult<TVec<ArrayView3<'_, f32>>> {
    let (_, h, w) = image.dim();
    if h < ch || w < cw {
        return Err(invalid_input!("can not cut {}x{} views out of a {}x{} image", ch, cw, h, w)
            .into());
    }
    let origins = [(0, 0), (0, w - cw), (h - ch, 0), (h - ch, w - cw), ((h - ch) / 2, (w - cw) / 2)];
    let crops: TVec<ArrayView3<f32>> =
        origins.iter().map(|&(y, x)| image.slice_move(s![.., y..y + ch, x..x + cw])).collect();
    let mirrors: TVec<ArrayView3<f32>> =
        crops.iter().map(|&crop| crop.slice_move(s![.., .., ..;-1])).collect();
    Ok(crops.into_iter().chain(mirrors).collect())
}

impl CropBatch {
    /// Cut `VIEWS_PER_IMAGE` views of `crop` size out of each `(3, H, W)`
    /// image, in image order.
    pub fn oversample(images: &[Tensor], crop: (usize, usize)) -> InceptResult<CropBatch> {
        let mut views: Vec<ArrayView3<f32>> = Vec::with_capacity(images.len() * VIEWS_PER_IMAGE);
        let mut origins = Vec::with_capacity(images.len() * VIEWS_PER_IMAGE);
        for (ix, image) in images.iter().enumerate() {
            let image = image.to_array_view().into_dimensionality::<Ix3>()?;
            views.extend(oversample_views(image, crop).with_context(|| format!("Image #{ix}"))?);
            origins.extend(std::iter::repeat_n(ix, VIEWS_PER_IMAGE));
        }
        let views = ndarray::stack(Axis(0), &views)?.into_tensor();
        Ok(CropBatch { views, origins })
    }

    /// Average per-view rows back into one row per original image.
    pub fn average(&self, per_view: &Tensor) -> InceptResult<Tensor> {
        average_views(&self.origins, per_view)
    }
}

fn average_views(origins: &[usize], per_view: &Tensor) -> InceptResult<Tensor> {
    let per_view = per_view.to_array_view().into_dimensionality::<Ix2>()?;
    ensure!(
        per_view.nrows() == origins.len(),
        "Got {} rows for {} views",
        per_view.nrows(),
        origins.len()
    );
    let images = origins.iter().max().map(|&o| o + 1).unwrap_or(0);
    let mut sums = Array2::<f32>::zeros((images, per_view.ncols()));
    let mut counts = vec![0usize; images];
    for (row, &origin) in per_view.outer_iter().zip(origins.iter()) {
        let mut sum = sums.row_mut(origin);
        sum += &row;
        counts[origin] += 1;
    }
    for (mut sum, &count) in sums.outer_iter_mut().zip(counts.iter()) {
        sum /= count.max(1) as f32;
    }
    Ok(sums.into_tensor())
}

impl GoogLeNet {
    /// Class probabilities, `(N, 1000)`.
    ///
    /// With `oversample`, each image is prepared at `OVERSAMPLE_SIZE` and the
    /// probabilities of its ten `CROP_SIZE` views are averaged. Otherwise the
    /// image is simply resized to `CROP_SIZE`.
    pub fn predict(&self, images: &[RawImage], oversample: bool) -> InceptResult<Tensor> {
        if !oversample {
            let mut bundle = self.extract(images, &["prob"], Some(CROP_SIZE))?;
            return bundle.take("prob").ok_or_else(|| format_err!("prob was not computed"));
        }
        let plan = self.plan(&["prob"])?;
        let prepared = prepare_all(images, Some(OVERSAMPLE_SIZE))?;
        let CropBatch { views, origins } = CropBatch::oversample(&prepared, CROP_SIZE)?;
        drop(prepared);
        debug!("Oversampled {} image(s) into {} views", images.len(), origins.len());
        let mut bundle = self.run_plan(&plan, views)?;
        let prob = bundle.take("prob").ok_or_else(|| format_err!("prob was not computed"))?;
        average_views(&origins, &prob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_views_in_order() {
        let image = Array3::from_shape_fn((1, 3, 4), |(_, y, x)| (y * 4 + x) as f32);
        let views = oversample_views(image.view(), (2, 2)).unwrap();
        assert_eq!(views.len(), VIEWS_PER_IMAGE);
        let firsts: Vec<f32> = views.iter().map(|v| v[(0, 0, 0)]).collect();
        // top-left, top-right, bottom-left, bottom-right, center, then mirrored
        assert_eq!(firsts, vec![0., 2., 4., 6., 1., 1., 3., 5., 7., 2.]);
        assert_eq!(views[5], views[0].slice(s![.., .., ..;-1]));
    }

    #[test]
    fn too_small_for_the_crop() {
        let image = Array3::<f32>::zeros((3, 200, 300));
        assert!(oversample_views(image.view(), CROP_SIZE).is_err());
    }

    #[test]
    fn origins_and_averages() {
        let images = vec![Tensor::zero(&[3, 4, 4]), Tensor::zero(&[3, 4, 4])];
        let batch = CropBatch::oversample(&images, (3, 3)).unwrap();
        assert_eq!(batch.views.shape(), &[20, 3, 3, 3]);
        assert_eq!(&batch.origins[8..12], &[0, 0, 1, 1]);
        let per_view = Array2::from_shape_fn((20, 2), |(v, c)| (v + c) as f32).into_tensor();
        let averaged = batch.average(&per_view).unwrap();
        assert_eq!(averaged.as_slice().unwrap(), &[4.5, 5.5, 14.5, 15.5]);
    }
}
