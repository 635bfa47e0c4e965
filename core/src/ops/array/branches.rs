use crate::internal::*;
use crate::ops::array::Concat;

/// Parallel branches fed by the same input, concatenated on the channel axis.
///
/// This is the shape of an Inception block: the block is one addressable
/// node, the branches are its private wiring.
#[derive(Debug, Clone)]
pub struct Branches {
    pub branches: TVec<Box<dyn Op>>,
    concat: Concat,
}

impl Branches {
    pub fn new(branches: TVec<Box<dyn Op>>) -> Branches {
        Branches { branches, concat: Concat::new(1) }
    }
}

impl Op for Branches {
    fn name(&self) -> Cow<'_, str> {
        "Branches".into()
    }

    fn info(&self) -> InceptResult<Vec<String>> {
        self.branches
            .iter()
            .enumerate()
            .map(|(ix, b)| Ok(format!("#{}: {} {}", ix, b.name(), b.info()?.join(", "))))
            .collect()
    }

    fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>> {
        check_input_arity(inputs, 1)?;
        let shapes = self
            .branches
            .iter()
            .enumerate()
            .map(|(ix, b)| b.output_shape(inputs).with_context(|| format!("Branch #{ix}")))
            .collect::<InceptResult<TVec<_>>>()?;
        let shapes: TVec<&[usize]> = shapes.iter().map(|s| &**s).collect();
        self.concat.output_shape(&shapes)
    }

    fn eval(&self, session: &SessionState, mut inputs: TVec<Arc<Tensor>>) -> InceptResult<Tensor> {
        let input = args_1!(inputs);
        let outputs = self
            .branches
            .iter()
            .map(|b| Ok(b.eval(session, tvec!(input.clone()))?.into_arc_tensor()))
            .collect::<InceptResult<TVec<_>>>()?;
        self.concat.eval(session, outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::nn::{Dropout, Relu};

    #[test]
    fn branches_stack_on_channels() {
        let op = Branches::new(tvec!(Relu.into(), Dropout::new(0.4).into()));
        assert_eq!(&*op.output_shape(&[&[2, 3, 4, 4]]).unwrap(), &[2, 6, 4, 4]);
        let input = Tensor::from_shape(&[1, 1, 1, 2], &[-1.0, 1.0]).unwrap();
        let output = op.eval(&SessionState::default(), tvec!(input.into_arc_tensor())).unwrap();
        assert_eq!(output.shape(), &[1, 2, 1, 2]);
        assert_eq!(output.as_slice().unwrap(), &[0.0, 1.0, -1.0, 1.0]);
    }
}
