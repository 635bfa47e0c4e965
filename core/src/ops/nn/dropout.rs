use crate::internal::*;

/// Dropout, at inference time: the identity.
#[derive(Debug, Clone, new)]
pub struct Dropout {
    pub ratio: f32,
}

impl Op for Dropout {
    fn name(&self) -> Cow<'_, str> {
        "Dropout".into()
    }

    fn info(&self) -> InceptResult<Vec<String>> {
        Ok(vec![format!("ratio: {} (inference, pass-through)", self.ratio)])
    }

    fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>> {
        check_input_arity(inputs, 1)?;
        Ok(inputs[0].into())
    }

    fn eval(&self, _session: &SessionState, mut inputs: TVec<Arc<Tensor>>) -> InceptResult<Tensor> {
        Ok(args_1!(inputs).into_tensor())
    }
}
