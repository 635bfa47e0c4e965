use ndarray::prelude::*;

use crate::internal::*;

/// Fully-connected layer: `y = x · Wᵀ + b`, with W laid out (out, in).
///
/// Any trailing axes of the input are flattened, so a (N, C, H, W) feature
/// map feeds in as (N, C·H·W).
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Arc<Array2<f32>>,
    bias: Arc<Array1<f32>>,
}

impl Linear {
    pub fn new(weight: Array2<f32>, bias: Array1<f32>) -> InceptResult<Linear> {
        ensure!(
            weight.nrows() == bias.len(),
            "Linear bias has {} values for {} outputs",
            bias.len(),
            weight.nrows()
        );
        Ok(Linear { weight: Arc::new(weight), bias: Arc::new(bias) })
    }

    pub fn input_features(&self) -> usize {
        self.weight.ncols()
    }

    pub fn output_features(&self) -> usize {
        self.weight.nrows()
    }
}

impl Op for Linear {
    fn name(&self) -> Cow<'_, str> {
        "Linear".into()
    }

    fn info(&self) -> InceptResult<Vec<String>> {
        Ok(vec![format!("{} -> {}", self.input_features(), self.output_features())])
    }

    fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>> {
        check_input_arity(inputs, 1)?;
        let shape = inputs[0];
        ensure!(shape.len() >= 2, "Linear expects a batch, got shape {:?}", shape);
        let features: usize = shape[1..].iter().product();
        ensure!(
            features == self.input_features(),
            "Linear expects {} features, got shape {:?}",
            self.input_features(),
            shape
        );
        Ok(tvec!(shape[0], self.output_features()))
    }

    fn eval(&self, _session: &SessionState, mut inputs: TVec<Arc<Tensor>>) -> InceptResult<Tensor> {
        let input = args_1!(inputs);
        let n = input.shape()[0];
        let view = input.to_array_view();
        let view = view.as_standard_layout();
        let x = view.view().into_shape_with_order((n, input.len() / n))?;
        let mut output = x.dot(&self.weight.t());
        output += &*self.bias;
        Ok(output.into_tensor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_feature_maps() {
        let linear = Linear::new(arr2(&[[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 1.0, 0.0]]), arr1(&[0.0, 10.0]))
            .unwrap();
        let shape: &[usize] = &[2, 1, 2, 2];
        assert_eq!(&*linear.output_shape(&[shape]).unwrap(), &[2, 2]);
        let input = Tensor::from_shape(shape, &[1., 2., 3., 4., 5., 6., 7., 8.]).unwrap();
        let output = linear.eval(&SessionState::default(), tvec!(input.into_arc_tensor())).unwrap();
        assert_eq!(output.shape(), &[2, 2]);
        assert_eq!(output.as_slice().unwrap(), &[5., 15., 13., 23.]);
    }

    #[test]
    fn rejects_wrong_feature_count() {
        let linear = Linear::new(Array2::zeros((3, 4)), Array1::zeros(3)).unwrap();
        assert!(linear.output_shape(&[&[1, 5]]).is_err());
        assert!(Linear::new(Array2::zeros((3, 4)), Array1::zeros(2)).is_err());
    }
}
