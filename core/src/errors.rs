//! Error taxonomy.
//!
//! Everything returns `InceptResult`, an `anyhow::Result`. When the caller
//! needs to tell failures apart, the `InceptError` carried by the chain can be
//! recovered with `downcast_ref` (or `InceptErrorExt::incept_error`), context
//! layers notwithstanding.
use std::fmt;

pub type InceptResult<T> = anyhow::Result<T>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InceptError {
    /// Bad rank, channel count, empty batch, inconsistent or too small sizes.
    InvalidInput(String),
    /// A requested layer name does not exist in the topology.
    UnknownLayer { name: String, available: Vec<String> },
    /// An optional facility (image resizing) is not compiled in.
    CapabilityUnavailable(&'static str),
    /// The numeric backend failed. Not retried.
    Backend(String),
}

impl fmt::Display for InceptError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InceptError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            InceptError::UnknownLayer { name, available } => {
                write!(f, "Unknown layer {name:?} (available: {})", available.join(", "))
            }
            InceptError::CapabilityUnavailable(what) => write!(f, "Capability unavailable: {what}"),
            InceptError::Backend(msg) => write!(f, "Backend error: {msg}"),
        }
    }
}

impl std::error::Error for InceptError {}

pub trait InceptErrorExt {
    /// The typed error at the root of the chain, if any.
    fn incept_error(&self) -> Option<&InceptError>;
}

impl InceptErrorExt for anyhow::Error {
    fn incept_error(&self) -> Option<&InceptError> {
        self.downcast_ref::<InceptError>()
    }
}

#[macro_export]
macro_rules! invalid_input {
    ($($arg:tt)*) => {
        $crate::errors::InceptError::InvalidInput(format!($($arg)*))
    };
}
