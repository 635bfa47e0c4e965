use bit_set::BitSet;

use crate::internal::*;

/// Find an evaluation order for a list of graph nodes.
///
/// Depth-first from the targets: a node goes in the order as soon as all its
/// inputs are in. `inputs` are treated as ready with no dependency.
pub fn eval_order_for_nodes(
    nodes: &[Node],
    inputs: &[usize],
    targets: &[usize],
) -> InceptResult<Vec<usize>> {
    let mut done = BitSet::with_capacity(nodes.len());
    let mut pending = BitSet::with_capacity(nodes.len());
    let mut needed: Vec<usize> = targets.iter().rev().cloned().collect();
    let mut order: Vec<usize> = vec![];
    while let Some(&node) = needed.last() {
        if done.contains(node) {
            needed.pop();
            continue;
        }
        if inputs.contains(&node) || nodes[node].inputs.iter().all(|&i| done.contains(i)) {
            order.push(node);
            needed.pop();
            done.insert(node);
        } else {
            if !pending.insert(node) {
                bail!("Cycle detected around node {}", nodes[node])
            }
            for &input in nodes[node].inputs.iter().rev() {
                if !done.contains(input) {
                    needed.push(input);
                }
            }
        }
    }
    Ok(order)
}

/// Every node `targets` depend on, targets included.
pub fn ancestors(nodes: &[Node], targets: &[usize]) -> BitSet {
    let mut seen = BitSet::with_capacity(nodes.len());
    let mut todo: Vec<usize> = targets.to_vec();
    while let Some(node) = todo.pop() {
        if seen.insert(node) {
            todo.extend(nodes[node].inputs.iter().cloned().filter(|&i| !seen.contains(i)));
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::array::Concat;
    use crate::ops::nn::Relu;

    fn diamond() -> Graph {
        let mut graph = Graph::default();
        let a = graph.add_source("a", tvec!(None, None)).unwrap();
        let left = graph.wire_node("left", Relu, &[a]).unwrap();
        let right = graph.wire_node("right", Relu, &[a]).unwrap();
        let join = graph.wire_node("join", Concat::new(1), &[left, right]).unwrap();
        graph.wire_node("tail", Relu, &[join]).unwrap();
        graph.wire_node("side", Relu, &[left]).unwrap();
        graph
    }

    #[test]
    fn test_diamond() {
        let graph = diamond();
        let order = eval_order_for_nodes(graph.nodes(), graph.input_nodes(), &[4]).unwrap();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn full_order_is_topological() {
        let model = diamond().into_runnable().unwrap();
        assert_eq!(model.order().len(), 6);
        for (pos, &n) in model.order().iter().enumerate() {
            for input in &model.node(n).inputs {
                assert!(model.order()[..pos].contains(input));
            }
        }
    }

    #[test]
    fn ancestors_stop_at_the_source() {
        let graph = diamond();
        let set = ancestors(graph.nodes(), &[5]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 1, 5]);
        let set = ancestors(graph.nodes(), &[3, 1]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }
}
