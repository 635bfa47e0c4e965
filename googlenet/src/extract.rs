use std::ops::Index;

use incept_core::internal::*;

use crate::engine::GoogLeNet;
use crate::prepare::prepare;

/// Named results of one forward pass, in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputBundle {
    outputs: Vec<(String, Tensor)>,
}

impl OutputBundle {
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.outputs.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn take(&mut self, name: &str) -> Option<Tensor> {
        let pos = self.outputs.iter().position(|(n, _)| n == name)?;
        Some(self.outputs.remove(pos).1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tensor)> {
        self.outputs.iter().map(|(n, t)| (n.as_str(), t))
    }
}

impl Index<&str> for OutputBundle {
    type Output = Tensor;
    fn index(&self, name: &str) -> &Tensor {
        match self.get(name) {
            Some(t) => t,
            None => panic!("No output named {name:?} in bundle"),
        }
    }
}

impl FromIterator<(String, Tensor)> for OutputBundle {
    fn from_iter<I: IntoIterator<Item = (String, Tensor)>>(iter: I) -> OutputBundle {
        OutputBundle { outputs: iter.into_iter().collect() }
    }
}

impl IntoIterator for OutputBundle {
    type Item = (String, Tensor);
    type IntoIter = std::vec::IntoIter<(String, Tensor)>;
    fn into_iter(self) -> Self::IntoIter {
        self.outputs.into_iter()
    }
}

/// Prepare every image at `size`, checking they all end up the same shape.
pub(crate) fn prepare_all(
    images: &[RawImage],
    size: Option<(usize, usize)>,
) -> InceptResult<Vec<Tensor>> {
    if images.is_empty() {
        return Err(invalid_input!("no image to process").into());
    }
    if size.is_some() && !crate::available() {
        return Err(InceptError::CapabilityUnavailable(
            "image resizing (build with the `image` feature)",
        )
        .into());
    }
    let mut prepared: Vec<Tensor> = Vec::with_capacity(images.len());
    for (ix, image) in images.iter().enumerate() {
        let tensor = prepare(image, size).with_context(|| {
            format!("Preparing image #{ix} ({} {:?})", image.datum_type(), image.shape())
        })?;
        if let Some(first) = prepared.first() {
            if first.shape() != tensor.shape() {
                return Err(invalid_input!(
                    "image #{} prepares to {:?}, but image #0 to {:?}",
                    ix,
                    tensor.shape(),
                    first.shape()
                )
                .into());
            }
        }
        prepared.push(tensor);
    }
    Ok(prepared)
}

impl GoogLeNet {
    /// Prepare, batch and evaluate raw images.
    ///
    /// Layer names are checked first, then the resize capability, then each
    /// image. With `size` set to `None`, all images must already share their
    /// spatial dimensions.
    pub fn extract(
        &self,
        images: &[RawImage],
        layers: &[&str],
        size: Option<(usize, usize)>,
    ) -> InceptResult<OutputBundle> {
        let plan = self.plan(layers)?;
        let prepared = prepare_all(images, size)?;
        let batch = Tensor::stack_tensors(0, &prepared)?;
        drop(prepared);
        self.run_plan(&plan, batch)
    }
}
