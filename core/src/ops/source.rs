use crate::internal::*;

/// Graph entry point. Never evaluated: plans feed it the input tensor.
///
/// The expected shape is `None` for free axes, so `[None, Some(3), None, None]`
/// reads as "any NCHW batch with 3 channels".
#[derive(Debug, Clone, new)]
pub struct Source {
    pub fact: TVec<Option<usize>>,
}

impl Source {
    pub fn check(&self, shape: &[usize]) -> InceptResult<()> {
        if shape.len() != self.fact.len() {
            return Err(invalid_input!(
                "expected a rank {} tensor, got shape {:?}",
                self.fact.len(),
                shape
            )
            .into());
        }
        for (axis, (&dim, expected)) in shape.iter().zip(self.fact.iter()).enumerate() {
            if dim == 0 {
                return Err(invalid_input!("axis {} of shape {:?} is empty", axis, shape).into());
            }
            if let Some(expected) = expected {
                if dim != *expected {
                    return Err(invalid_input!(
                        "expected {} on axis {}, got shape {:?}",
                        expected,
                        axis,
                        shape
                    )
                    .into());
                }
            }
        }
        Ok(())
    }
}

impl Op for Source {
    fn name(&self) -> Cow<'_, str> {
        "Source".into()
    }

    fn info(&self) -> InceptResult<Vec<String>> {
        let mut dims = self.fact.iter().map(|d| d.map(|d| d.to_string()).unwrap_or("?".into()));
        Ok(vec![format!("Fact: {}", dims.join("x"))])
    }

    fn output_shape(&self, inputs: &[&[usize]]) -> InceptResult<TVec<usize>> {
        check_input_arity(inputs, 1)?;
        self.check(inputs[0])?;
        Ok(inputs[0].into())
    }

    fn eval(&self, _session: &SessionState, _inputs: TVec<Arc<Tensor>>) -> InceptResult<Tensor> {
        bail!("Source is fed by the plan, not evaluated")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checks_rank_and_fixed_dims() {
        let source = Source::new(tvec!(None, Some(3), None, None));
        assert!(source.check(&[2, 3, 10, 10]).is_ok());
        for bad in [&[3, 10, 10][..], &[2, 1, 10, 10][..], &[0, 3, 10, 10][..]] {
            let e = source.check(bad).unwrap_err();
            assert!(matches!(e.incept_error(), Some(InceptError::InvalidInput(_))));
        }
    }
}
