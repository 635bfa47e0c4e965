mod activations;
mod dropout;
mod lrn;
mod softmax;

pub use self::activations::Relu;
pub use self::dropout::Dropout;
pub use self::lrn::Lrn;
pub use self::softmax::Softmax;
