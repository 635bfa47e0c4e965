use ndarray::prelude::*;

use crate::internal::*;

#[derive(Debug, Clone, new)]
pub struct Softmax {
    pub axis: usize,
}

impl Op for Softmax {
    fn name(&self) -> Cow<'_, str> {
        "Softmax".into()
    }

    fn info(&self) -> InceptResult<Vec<String>> {
        Ok(vec![format!("Axis: {}", self.axis)])
    }

    fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>> {
        check_input_arity(inputs, 1)?;
        ensure!(
            self.axis < inputs[0].len(),
            "Softmax on axis {} of a rank {} input",
            self.axis,
            inputs[0].len()
        );
        Ok(inputs[0].into())
    }

    fn eval(&self, _session: &SessionState, mut inputs: TVec<Arc<Tensor>>) -> InceptResult<Tensor> {
        let mut output = args_1!(inputs).into_tensor();
        let mut view = output.to_array_view_mut();
        for mut lane in view.lanes_mut(Axis(self.axis)) {
            let max = lane.fold(f32::NEG_INFINITY, |m, &x| m.max(x));
            lane.mapv_inplace(|x| (x - max).exp());
            let sum = lane.sum();
            lane /= sum;
        }
        Ok(output)
    }
}
