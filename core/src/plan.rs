use std::fmt;

use crate::internal::*;
use crate::model::order::ancestors;
use crate::ops::source::Source;

/// What every op gets to see while a plan runs.
#[derive(Clone, Debug, Default, new)]
pub struct SessionState {
    pub executor: Executor,
}

/// A partial evaluation of a model: the static order restricted to what the
/// requested outputs depend on.
#[derive(Clone)]
pub struct SimplePlan<'m> {
    pub model: &'m RunnableModel,
    pub outputs: Vec<usize>,
    pub order: Vec<usize>,
    /// Step after which each node value is no longer needed.
    values_needed_until_step: Vec<usize>,
}

impl<'m> SimplePlan<'m> {
    /// A plan computing all the named layers in one pass.
    ///
    /// Names are resolved before anything else. Duplicates collapse, keeping
    /// the first occurrence.
    pub fn new_for_outputs(
        model: &'m RunnableModel,
        outputs: &[impl AsRef<str>],
    ) -> InceptResult<SimplePlan<'m>> {
        let mut ids: Vec<usize> = vec![];
        for name in outputs {
            let id = model.node_id_by_name(name.as_ref())?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Self::new_for_output_nodes(model, &ids)
    }

    pub fn new_for_output_nodes(
        model: &'m RunnableModel,
        outputs: &[usize],
    ) -> InceptResult<SimplePlan<'m>> {
        ensure!(!outputs.is_empty(), "A plan needs at least one output");
        let needed = ancestors(model.nodes(), outputs);
        let order: Vec<usize> =
            model.order().iter().cloned().filter(|&n| needed.contains(n)).collect();
        let mut values_needed_until_step = vec![0; model.nodes().len()];
        for (step, &n) in order.iter().enumerate() {
            for &i in &model.node(n).inputs {
                values_needed_until_step[i] = step;
            }
        }
        for &o in outputs {
            values_needed_until_step[o] = order.len();
        }
        debug!(
            "Plan for {} evaluates {} of {} nodes",
            outputs.iter().map(|&o| &model.node(o).name).join(", "),
            order.len(),
            model.nodes().len()
        );
        Ok(SimplePlan { model, outputs: outputs.to_vec(), order, values_needed_until_step })
    }

    /// Input node ids this plan reads from, in model input order.
    fn inputs(&self) -> impl Iterator<Item = usize> + '_ {
        self.model.input_nodes().iter().cloned()
    }

    /// Shape of every evaluated node, computed from the input shapes alone.
    ///
    /// Any inconsistency is reported as `InvalidInput` naming the node.
    fn all_shapes(&self, input_shapes: &[&[usize]]) -> InceptResult<Vec<Option<TVec<usize>>>> {
        let inputs: Vec<usize> = self.inputs().collect();
        ensure!(
            input_shapes.len() == inputs.len(),
            InceptError::InvalidInput(format!(
                "expected {} input(s), got {}",
                inputs.len(),
                input_shapes.len()
            ))
        );
        let mut shapes: Vec<Option<TVec<usize>>> = vec![None; self.model.nodes().len()];
        for &n in &self.order {
            let node = self.model.node(n);
            let shape = {
                let node_inputs: TVec<&[usize]> = if node.op_is::<Source>() {
                    let pos = inputs.iter().position(|&i| i == n).unwrap_or_default();
                    tvec!(input_shapes[pos])
                } else {
                    node.inputs
                        .iter()
                        .map(|&i| {
                            shapes[i]
                                .as_deref()
                                .ok_or_else(|| format_err!("Missing shape for input #{} of {}", i, node))
                        })
                        .collect::<InceptResult<_>>()?
                };
                match node.op.output_shape(&node_inputs) {
                    Ok(shape) => shape,
                    Err(e) if e.incept_error().is_some() => {
                        return Err(e.context(format!("Checking layer {:?}", node.name)));
                    }
                    Err(e) => {
                        return Err(invalid_input!(
                            "layer {:?} can not take input(s) of shape {}: {}",
                            node.name,
                            node_inputs.iter().map(|s| format!("{s:?}")).join(", "),
                            e
                        )
                        .into());
                    }
                }
            };
            shapes[n] = Some(shape);
        }
        Ok(shapes)
    }

    /// Shapes of the requested outputs for the given input shapes, without
    /// computing anything.
    pub fn output_shapes(&self, input_shapes: &[&[usize]]) -> InceptResult<TVec<TVec<usize>>> {
        let mut shapes = self.all_shapes(input_shapes)?;
        self.outputs
            .iter()
            .map(|&o| shapes[o].take().ok_or_else(|| format_err!("Output #{} was not computed", o)))
            .collect()
    }

    pub fn run(&self, session: &SessionState, inputs: TVec<Tensor>) -> InceptResult<TVec<Arc<Tensor>>> {
        {
            let input_shapes: TVec<&[usize]> = inputs.iter().map(|t| t.shape()).collect();
            self.all_shapes(&input_shapes)?;
        }
        let input_ids: Vec<usize> = self.inputs().collect();
        let mut inputs: Vec<Option<Tensor>> = inputs.into_iter().map(Some).collect();
        let mut values: Vec<Option<Arc<Tensor>>> = vec![None; self.model.nodes().len()];
        for (step, &n) in self.order.iter().enumerate() {
            let node = self.model.node(n);
            trace!("Running step {}, node {}", step, node);
            if node.op_is::<Source>() {
                let pos = input_ids.iter().position(|&i| i == n).unwrap_or_default();
                let input = inputs[pos]
                    .take()
                    .ok_or_else(|| format_err!("Input for {} was already consumed", node))?;
                values[n] = Some(input.into_arc_tensor());
                continue;
            }
            let node_inputs = node
                .inputs
                .iter()
                .map(|&i| {
                    values[i].clone().ok_or_else(|| format_err!("Input #{} of {} not computed", i, node))
                })
                .collect::<InceptResult<TVec<_>>>()?;
            // let the op own its inputs when this is their last use
            for &i in &node.inputs {
                if self.values_needed_until_step[i] == step {
                    values[i] = None;
                }
            }
            let output = node
                .op
                .eval(session, node_inputs)
                .with_context(|| format!("Evaluating {}", node))?;
            trace!("  output: {:?}", output);
            values[n] = Some(output.into_arc_tensor());
        }
        self.outputs
            .iter()
            .map(|&o| values[o].take().ok_or_else(|| format_err!("Output #{} was not computed", o)))
            .collect()
    }

    pub fn model(&self) -> &RunnableModel {
        self.model
    }
}

impl fmt::Debug for SimplePlan<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "SimplePlan{{ outputs: {:?}, order: {:?} }}", self.outputs, self.order)
    }
}
