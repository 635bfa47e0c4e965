use crate::internal::*;

#[derive(Debug, Clone, Default)]
pub struct Relu;

impl Op for Relu {
    fn name(&self) -> Cow<'_, str> {
        "Relu".into()
    }

    fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>> {
        check_input_arity(inputs, 1)?;
        Ok(inputs[0].into())
    }

    fn eval(&self, _session: &SessionState, mut inputs: TVec<Arc<Tensor>>) -> InceptResult<Tensor> {
        let mut output = args_1!(inputs).into_tensor();
        output.to_array_view_mut().mapv_inplace(|x| x.max(0.0));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_negatives() {
        let input = Tensor::from_shape(&[4], &[-1.0, 0.0, 2.5, -0.0]).unwrap();
        let output = Relu.eval(&SessionState::default(), tvec!(input.into_arc_tensor())).unwrap();
        assert_eq!(output.as_slice().unwrap(), &[0.0, 0.0, 2.5, 0.0]);
    }
}
