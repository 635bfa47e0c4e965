//! Where the frozen weights come from.
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use incept_core::internal::*;
use ndarray::prelude::*;
use ndarray_npy::NpzReader;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_distr::{Distribution, Normal};

/// Weights to build the network with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Weights {
    /// Untrained: LeCun normal kernels, zero biases, drawn from a seeded
    /// generator so that two engines with the same seed are identical.
    Random { seed: u64 },
    /// A chainer-style npz archive, with keys like `conv1/W`,
    /// `inc3a/proj3/b` or `loss3_fc/W`.
    Npz(PathBuf),
}

impl Default for Weights {
    fn default() -> Weights {
        Weights::Random { seed: 0 }
    }
}

/// Supplies parameters while the topology is built, one layer at a time.
///
/// Shapes are chainer's: convolution kernels `(out, in, kh, kw)`, linear
/// weights `(out, in)`.
pub trait ParameterSource {
    fn conv(
        &mut self,
        name: &str,
        shape: (usize, usize, usize, usize),
    ) -> InceptResult<(Array4<f32>, Array1<f32>)>;

    fn linear(&mut self, name: &str, shape: (usize, usize)) -> InceptResult<(Array2<f32>, Array1<f32>)>;
}

pub struct RandomParams {
    rng: SmallRng,
}

impl RandomParams {
    pub fn new(seed: u64) -> RandomParams {
        RandomParams { rng: SmallRng::seed_from_u64(seed) }
    }

    fn lecun_normal<D: Dimension>(
        &mut self,
        shape: impl ShapeBuilder<Dim = D>,
        fan_in: usize,
    ) -> InceptResult<Array<f32, D>> {
        let normal = Normal::new(0.0f32, (1.0 / fan_in as f32).sqrt())
            .map_err(|e| format_err!("Bad initializer scale for fan-in {}: {}", fan_in, e))?;
        let rng = &mut self.rng;
        Ok(Array::from_shape_simple_fn(shape, || normal.sample(rng)))
    }
}

impl ParameterSource for RandomParams {
    fn conv(
        &mut self,
        _name: &str,
        shape: (usize, usize, usize, usize),
    ) -> InceptResult<(Array4<f32>, Array1<f32>)> {
        let (o, i, kh, kw) = shape;
        Ok((self.lecun_normal(shape, i * kh * kw)?, Array1::zeros(o)))
    }

    fn linear(&mut self, _name: &str, shape: (usize, usize)) -> InceptResult<(Array2<f32>, Array1<f32>)> {
        Ok((self.lecun_normal(shape, shape.1)?, Array1::zeros(shape.0)))
    }
}

pub struct NpzParams<R: Read + Seek> {
    npz: NpzReader<R>,
}

impl NpzParams<fs_err::File> {
    pub fn open(path: impl AsRef<Path>) -> InceptResult<NpzParams<fs_err::File>> {
        let file = fs_err::File::open(path.as_ref())?;
        NpzParams::new(file).with_context(|| format!("Reading {}", path.as_ref().display()))
    }
}

impl<R: Read + Seek> NpzParams<R> {
    pub fn new(reader: R) -> InceptResult<NpzParams<R>> {
        Ok(NpzParams { npz: NpzReader::new(reader)? })
    }

    /// Read an array, with or without the `.npy` suffix in the archive.
    fn array<D: Dimension>(&mut self, name: &str, shape: &[usize]) -> InceptResult<Array<f32, D>> {
        let array: Array<f32, D> = match self.npz.by_name(name) {
            Ok(array) => array,
            Err(_) => self
                .npz
                .by_name(&format!("{name}.npy"))
                .with_context(|| format!("Reading {name} from npz"))?,
        };
        ensure!(
            array.shape() == shape,
            "Parameter {} has shape {:?}, expected {:?}",
            name,
            array.shape(),
            shape
        );
        Ok(array)
    }
}

impl<R: Read + Seek> ParameterSource for NpzParams<R> {
    fn conv(
        &mut self,
        name: &str,
        shape: (usize, usize, usize, usize),
    ) -> InceptResult<(Array4<f32>, Array1<f32>)> {
        let (o, i, kh, kw) = shape;
        let kernel = self.array(&format!("{name}/W"), &[o, i, kh, kw])?;
        let bias = self.array(&format!("{name}/b"), &[o])?;
        Ok((kernel, bias))
    }

    fn linear(&mut self, name: &str, shape: (usize, usize)) -> InceptResult<(Array2<f32>, Array1<f32>)> {
        let weight = self.array(&format!("{name}/W"), &[shape.0, shape.1])?;
        let bias = self.array(&format!("{name}/b"), &[shape.0])?;
        Ok((weight, bias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray_npy::NpzWriter;

    #[test]
    fn random_is_seeded() {
        let (a, b) = RandomParams::new(3).conv("conv1", (4, 3, 2, 2)).unwrap();
        let (c, _) = RandomParams::new(3).conv("conv1", (4, 3, 2, 2)).unwrap();
        let (d, _) = RandomParams::new(4).conv("conv1", (4, 3, 2, 2)).unwrap();
        assert_eq!(a, c);
        assert_ne!(a, d);
        assert!(b.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn lecun_scale() {
        let (w, _) = RandomParams::new(0).linear("fc", (200, 400)).unwrap();
        let var = w.mapv(|x| x * x).mean().unwrap();
        assert!((var - 1.0 / 400.0).abs() < 0.1 / 400.0, "variance {var}");
    }

    #[test]
    fn npz_roundtrip_with_chainer_names() {
        let mut buffer = std::io::Cursor::new(vec![]);
        {
            let mut npz = NpzWriter::new(&mut buffer);
            npz.add_array("inc3a/proj3/W", &Array4::<f32>::ones((2, 3, 1, 1))).unwrap();
            npz.add_array("inc3a/proj3/b", &arr1(&[1.0f32, 2.0])).unwrap();
            npz.finish().unwrap();
        }
        buffer.set_position(0);
        let mut params = NpzParams::new(buffer).unwrap();
        let (w, b) = params.conv("inc3a/proj3", (2, 3, 1, 1)).unwrap();
        assert_eq!(w.shape(), &[2, 3, 1, 1]);
        assert_eq!(b, arr1(&[1.0f32, 2.0]));
        assert!(params.conv("inc3a/proj3", (2, 4, 1, 1)).is_err());
        assert!(params.conv("inc3a/conv3", (2, 3, 1, 1)).is_err());
    }
}
