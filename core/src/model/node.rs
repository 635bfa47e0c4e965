use std::fmt;

use crate::internal::*;

#[derive(Debug, Clone)]
pub struct Node {
    pub id: usize,
    pub name: String,
    pub inputs: TVec<usize>,
    pub op: Box<dyn Op>,
}

impl Node {
    pub fn op(&self) -> &dyn Op {
        &*self.op
    }

    pub fn op_as<O: Op>(&self) -> Option<&O> {
        self.op().downcast_ref::<O>()
    }

    pub fn op_is<O: Op>(&self) -> bool {
        self.op_as::<O>().is_some()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "#{} \"{}\" {}", self.id, self.name, self.op.name())
    }
}
