use ndarray::prelude::*;

use crate::internal::*;

#[derive(Debug, Clone, new)]
pub struct Concat {
    pub axis: usize,
}

impl Op for Concat {
    fn name(&self) -> Cow<'_, str> {
        "Concat".into()
    }

    fn info(&self) -> InceptResult<Vec<String>> {
        Ok(vec![format!("Axis: {}", self.axis)])
    }

    fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>> {
        ensure!(!inputs.is_empty(), "Concat needs at least one input");
        let mut shape: TVec<usize> = inputs[0].into();
        ensure!(self.axis < shape.len(), "Concat on axis {} of shape {:?}", self.axis, shape);
        for input in &inputs[1..] {
            let compatible = input.len() == shape.len()
                && input
                    .iter()
                    .zip(shape.iter())
                    .enumerate()
                    .all(|(ix, (a, b))| ix == self.axis || a == b);
            ensure!(
                compatible,
                "Can not concat {:?} and {:?} on axis {}",
                inputs[0],
                input,
                self.axis
            );
            shape[self.axis] += input[self.axis];
        }
        Ok(shape)
    }

    fn eval(&self, _session: &SessionState, inputs: TVec<Arc<Tensor>>) -> InceptResult<Tensor> {
        let views: TVec<ArrayViewD<f32>> = inputs.iter().map(|t| t.to_array_view()).collect();
        Ok(ndarray::concatenate(Axis(self.axis), &views)?.into_tensor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_channels() {
        let a = Tensor::from_shape(&[1, 1, 2], &[1., 2.]).unwrap();
        let b = Tensor::from_shape(&[1, 2, 2], &[3., 4., 5., 6.]).unwrap();
        let concat = Concat::new(1);
        assert_eq!(&*concat.output_shape(&[a.shape(), b.shape()]).unwrap(), &[1, 3, 2]);
        let c = concat
            .eval(&SessionState::default(), tvec!(a.into_arc_tensor(), b.into_arc_tensor()))
            .unwrap();
        assert_eq!(c.as_slice().unwrap(), &[1., 2., 3., 4., 5., 6.]);
    }

    #[test]
    fn mismatched_spatial_dims() {
        assert!(Concat::new(1).output_shape(&[&[1, 2, 3, 3], &[1, 2, 3, 4]]).is_err());
    }
}
