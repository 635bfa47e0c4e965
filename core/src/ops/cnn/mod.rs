pub mod avgpool;
pub mod conv;
pub mod maxpool;
pub mod padding;
pub mod pools;

pub use self::avgpool::AvgPool;
pub use self::conv::Conv;
pub use self::maxpool::MaxPool;
pub use self::padding::{ComputedPaddedDim, PaddingSpec};
pub use self::pools::PoolSpec;
