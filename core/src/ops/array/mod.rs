/// # Operators on arrays and shapes
mod branches;
mod concat;

pub use self::branches::Branches;
pub use self::concat::Concat;
