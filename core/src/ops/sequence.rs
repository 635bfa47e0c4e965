use crate::internal::*;

/// Ops applied one after the other, as a single node.
#[derive(Debug, Clone, new)]
pub struct Sequence {
    pub ops: TVec<Box<dyn Op>>,
}

impl Op for Sequence {
    fn name(&self) -> Cow<'_, str> {
        "Sequence".into()
    }

    fn info(&self) -> InceptResult<Vec<String>> {
        Ok(vec![self.ops.iter().map(|op| op.name()).join(" -> ")])
    }

    fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>> {
        check_input_arity(inputs, 1)?;
        let mut shape: TVec<usize> = inputs[0].into();
        for op in &self.ops {
            shape = op.output_shape(&[&*shape]).with_context(|| format!("In {}", op.name()))?;
        }
        Ok(shape)
    }

    fn eval(&self, session: &SessionState, mut inputs: TVec<Arc<Tensor>>) -> InceptResult<Tensor> {
        let mut value = args_1!(inputs);
        for op in &self.ops {
            value = op.eval(session, tvec!(value))?.into_arc_tensor();
        }
        Ok(value.into_tensor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::matmul::Linear;
    use crate::ops::nn::{Relu, Softmax};
    use ndarray::prelude::*;

    #[test]
    fn chains_shapes_and_values() {
        let linear = Linear::new(arr2(&[[1.0, -1.0], [-1.0, 1.0]]), arr1(&[0.0, 0.0])).unwrap();
        let seq = Sequence::new(tvec!(linear.into(), Relu.into(), Softmax::new(1).into()));
        assert_eq!(&*seq.output_shape(&[&[3, 2]]).unwrap(), &[3, 2]);
        assert!(seq.output_shape(&[&[3, 4]]).is_err());
        let input = Tensor::from_shape(&[1, 2], &[1.0, 1.0]).unwrap();
        let output = seq.eval(&SessionState::default(), tvec!(input.into_arc_tensor())).unwrap();
        assert_eq!(output.as_slice().unwrap(), &[0.5, 0.5]);
        assert_eq!(seq.info().unwrap(), vec!["Linear -> Relu -> Softmax".to_string()]);
    }
}
