///
/// Non-fatal conditions.
///
/// These let the operation finish and are returned next to its result. Each
/// one is also logged at `warn` level where it is raised.
///

use std::fmt;

use sqlmat_codec::Endian;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// No free `_1`..`_99` suffix was found; the field keeps its duplicate name.
    DuplicateFieldName { name: String },
    /// A typed BLOB was written on another platform or byte order.
    DifferentOrigin { platform: String, endian: Endian },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DuplicateFieldName { name } => {
                write!(f, "could not build unique fieldname for {}", name)
            }
            Warning::DifferentOrigin { platform, endian } => {
                write!(f, "BLOB stored on different platform ({}, {})", platform, endian)
            }
        }
    }
}
