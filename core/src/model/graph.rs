use std::collections::HashMap;

use crate::internal::*;
use crate::ops::source::Source;

use super::order::eval_order_for_nodes;

/// Main graph building structure.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    names: HashMap<String, usize>,
    inputs: Vec<usize>,
}

impl Graph {
    /// Add a graph entry point, expecting tensors matching `fact`.
    pub fn add_source(
        &mut self,
        name: impl Into<String>,
        fact: TVec<Option<usize>>,
    ) -> InceptResult<usize> {
        let id = self.wire_node(name, Source::new(fact), &[])?;
        self.inputs.push(id);
        Ok(id)
    }

    /// Add a node fed by the outputs of `inputs`, all already in the graph.
    pub fn wire_node(
        &mut self,
        name: impl Into<String>,
        op: impl Into<Box<dyn Op>>,
        inputs: &[usize],
    ) -> InceptResult<usize> {
        let name = name.into();
        ensure!(!name.is_empty(), "Node names can not be empty");
        ensure!(!self.names.contains_key(&name), "Duplicate node name {:?}", name);
        let id = self.nodes.len();
        if let Some(missing) = inputs.iter().find(|&&i| i >= id) {
            bail!("Node {:?} wired to #{}, which is not in the graph", name, missing)
        }
        self.names.insert(name.clone(), id);
        self.nodes.push(Node { id, name, inputs: inputs.into(), op: op.into() });
        Ok(id)
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    /// Access the nodes table.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn input_nodes(&self) -> &[usize] {
        &self.inputs
    }

    /// Names of every node but the sources, in insertion order.
    pub fn layer_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes.iter().filter(|n| !n.op_is::<Source>()).map(|n| n.name.as_str())
    }

    /// Find a layer by its name. Sources are not addressable.
    pub fn node_id_by_name(&self, name: &str) -> InceptResult<usize> {
        match self.names.get(name) {
            Some(&id) if !self.nodes[id].op_is::<Source>() => Ok(id),
            _ => Err(InceptError::UnknownLayer {
                name: name.to_string(),
                available: self.layer_names().map(|s| s.to_string()).collect(),
            }
            .into()),
        }
    }

    /// Nodes nobody consumes.
    fn sinks(&self) -> Vec<usize> {
        let mut consumed = bit_set::BitSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            consumed.extend(node.inputs.iter().cloned());
        }
        (0..self.nodes.len()).filter(|n| !consumed.contains(*n)).collect()
    }

    /// Freeze the graph and compute its static evaluation order.
    pub fn into_runnable(self) -> InceptResult<RunnableModel> {
        ensure!(!self.inputs.is_empty(), "Graph has no source");
        let order = eval_order_for_nodes(&self.nodes, &self.inputs, &self.sinks())?;
        debug!("Graph frozen with {} nodes", order.len());
        Ok(RunnableModel { graph: self, order })
    }
}

/// An immutable graph, with the topological order every plan derives from.
#[derive(Clone, Debug)]
pub struct RunnableModel {
    graph: Graph,
    order: Vec<usize>,
}

impl RunnableModel {
    pub fn order(&self) -> &[usize] {
        &self.order
    }
}

impl std::ops::Deref for RunnableModel {
    type Target = Graph;
    fn deref(&self) -> &Graph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::nn::Relu;

    #[test]
    fn names_are_unique() {
        let mut graph = Graph::default();
        let a = graph.add_source("a", tvec!(None)).unwrap();
        graph.wire_node("b", Relu, &[a]).unwrap();
        assert!(graph.wire_node("b", Relu, &[a]).is_err());
        assert!(graph.wire_node("a", Relu, &[a]).is_err());
    }

    #[test]
    fn inputs_must_exist() {
        let mut graph = Graph::default();
        let a = graph.add_source("a", tvec!(None)).unwrap();
        assert!(graph.wire_node("b", Relu, &[a + 1]).is_err());
        assert_eq!(graph.nodes().len(), 1);
    }

    #[test]
    fn sources_are_not_layers() {
        let mut graph = Graph::default();
        let a = graph.add_source("data", tvec!(None)).unwrap();
        graph.wire_node("relu", Relu, &[a]).unwrap();
        assert_eq!(graph.layer_names().collect::<Vec<_>>(), vec!["relu"]);
        assert_eq!(graph.node_id_by_name("relu").unwrap(), 1);
        let e = graph.node_id_by_name("data").unwrap_err();
        assert_eq!(
            e.incept_error(),
            Some(&InceptError::UnknownLayer { name: "data".into(), available: vec!["relu".into()] })
        );
    }
}
