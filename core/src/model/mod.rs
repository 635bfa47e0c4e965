//! # Graph and nodes
//!
//! A `Graph` is a DAG of named nodes, each carrying one `Op`. Nodes can only
//! be wired to nodes already present, which keeps the graph acyclic and its
//! insertion order topological.
mod graph;
mod node;
pub mod order;

pub use self::graph::{Graph, RunnableModel};
pub use self::node::Node;
