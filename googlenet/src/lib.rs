//! # incept-googlenet
//!
//! GoogLeNet (Inception v1) with its two auxiliary heads, as a frozen
//! function from images to named feature maps.
//!
//! * `prepare` turns any raw image into the `(3, H, W)` BGR, mean-subtracted
//!   tensor the network expects,
//! * `GoogLeNet::forward` and `GoogLeNet::extract` compute only the layers
//!   that were asked for, and what they depend on,
//! * `GoogLeNet::predict` averages class probabilities over ten crops of each
//!   image.
//!
//! Resizing needs the `image` feature (on by default). Check `available()`
//! before relying on it.
#[macro_use]
extern crate log;

mod engine;
mod extract;
mod inception;
pub mod params;
mod predict;
mod prepare;
mod topology;

pub use self::engine::{Backend, EngineConfig, GoogLeNet};
pub use self::extract::OutputBundle;
pub use self::params::Weights;
pub use self::predict::{CROP_SIZE, CropBatch, OVERSAMPLE_SIZE, VIEWS_PER_IMAGE};
pub use self::prepare::{BGR_MEAN, DEFAULT_SIZE, prepare};
pub use self::topology::LAYERS;

pub use incept_core;
pub use incept_core::prelude::*;

/// Whether image resizing was compiled in.
pub fn available() -> bool {
    cfg!(feature = "image")
}
