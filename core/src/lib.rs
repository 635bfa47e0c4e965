//! # incept-core
//!
//! Named operator graphs with partial evaluation, and the CNN operators a
//! GoogLeNet needs.
//!
//! A `Graph` is built once, node by node: every node has a unique name, an
//! operator with frozen parameters, and inputs taken from nodes already in the
//! graph. `into_runnable` freezes it and computes a static evaluation order.
//! A `SimplePlan` then restricts that order to the ancestors of the requested
//! outputs, so asking for an early layer never pays for the rest of the
//! network.
//!
//! ```
//! use incept_core::internal::*;
//! use incept_core::ops::nn::Relu;
//!
//! let mut graph = Graph::default();
//! let data = graph.add_source("data", tvec!(None, None)).unwrap();
//! graph.wire_node("relu", Relu, &[data]).unwrap();
//! let model = graph.into_runnable().unwrap();
//!
//! let plan = SimplePlan::new_for_outputs(&model, &["relu"]).unwrap();
//! let input = Tensor::from_shape(&[1, 3], &[-1.0, 0.5, 2.0]).unwrap();
//! let outputs = plan.run(&SessionState::default(), tvec!(input)).unwrap();
//! assert_eq!(outputs[0].as_slice().unwrap(), &[0.0, 0.5, 2.0]);
//! ```

#[macro_use]
extern crate derive_new;
#[macro_use]
extern crate log;

pub use incept_data;

#[macro_use]
pub mod errors;
#[macro_use]
pub mod ops;

pub mod model;
pub mod plan;
pub mod runtime;

pub mod prelude {
    pub use crate::errors::{InceptError, InceptErrorExt, InceptResult};
    pub use crate::model::{Graph, Node, RunnableModel};
    pub use crate::plan::{SessionState, SimplePlan};
    pub use crate::runtime::Executor;
    pub use incept_data::prelude::*;
}

pub mod internal {
    pub use crate::prelude::*;
    pub use crate::ops::{Op, check_input_arity};
    pub use crate::{args_1, invalid_input};
    pub use anyhow::{Context, bail, ensure, format_err};
    pub use incept_data::internal::*;
    pub use itertools::Itertools;
    pub use std::borrow::Cow;
    pub use std::sync::Arc;
}

#[cfg(test)]
#[allow(dead_code)]
fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("INCEPT_LOG").try_init();
}
