use std::fmt;

/// Element types incept knows about.
///
/// Raw pixels come in as `U8` or `F32`; everything past preprocessing is `F32`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum DatumType {
    U8,
    F32,
}

impl fmt::Display for DatumType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DatumType::U8 => write!(f, "U8"),
            DatumType::F32 => write!(f, "F32"),
        }
    }
}
