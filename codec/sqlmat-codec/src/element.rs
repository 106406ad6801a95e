///
/// Element type ids.
///
/// The id of an element class is written into every typed BLOB header, so
/// the numbers below are part of the on-disk format. They keep the values
/// that blobs written by earlier releases already carry and must never be
/// renumbered.
///

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Logical,
    Char,
    Double,
    Single,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
}

impl ElementType {
    pub const ALL: [ElementType; 12] = [
        ElementType::Logical,
        ElementType::Char,
        ElementType::Double,
        ElementType::Single,
        ElementType::Int8,
        ElementType::UInt8,
        ElementType::Int16,
        ElementType::UInt16,
        ElementType::Int32,
        ElementType::UInt32,
        ElementType::Int64,
        ElementType::UInt64,
    ];

    /// Persisted id of this element class.
    pub const fn id(self) -> i32 {
        match self {
            ElementType::Logical => 3,
            ElementType::Char => 4,
            ElementType::Double => 6,
            ElementType::Single => 7,
            ElementType::Int8 => 8,
            ElementType::UInt8 => 9,
            ElementType::Int16 => 10,
            ElementType::UInt16 => 11,
            ElementType::Int32 => 12,
            ElementType::UInt32 => 13,
            ElementType::Int64 => 14,
            ElementType::UInt64 => 15,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    /// Size of one element in bytes. Char elements are UTF-16 code units.
    pub const fn size(self) -> usize {
        match self {
            ElementType::Logical | ElementType::Int8 | ElementType::UInt8 => 1,
            ElementType::Char | ElementType::Int16 | ElementType::UInt16 => 2,
            ElementType::Single | ElementType::Int32 | ElementType::UInt32 => 4,
            ElementType::Double | ElementType::Int64 | ElementType::UInt64 => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ElementType::Logical => "logical",
            ElementType::Char => "char",
            ElementType::Double => "double",
            ElementType::Single => "single",
            ElementType::Int8 => "int8",
            ElementType::UInt8 => "uint8",
            ElementType::Int16 => "int16",
            ElementType::UInt16 => "uint16",
            ElementType::Int32 => "int32",
            ElementType::UInt32 => "uint32",
            ElementType::Int64 => "int64",
            ElementType::UInt64 => "uint64",
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self, ElementType::Double | ElementType::Single)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_pinned() {
        assert_eq!(ElementType::Logical.id(), 3);
        assert_eq!(ElementType::Char.id(), 4);
        assert_eq!(ElementType::Double.id(), 6);
        assert_eq!(ElementType::Single.id(), 7);
        assert_eq!(ElementType::Int8.id(), 8);
        assert_eq!(ElementType::UInt64.id(), 15);
    }

    #[test]
    fn test_from_id_round_trips_every_type() {
        for t in ElementType::ALL {
            assert_eq!(ElementType::from_id(t.id()), Some(t));
        }
        assert_eq!(ElementType::from_id(0), None);
        assert_eq!(ElementType::from_id(5), None);
        assert_eq!(ElementType::from_id(16), None);
        assert_eq!(ElementType::from_id(-1), None);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(ElementType::Logical.size(), 1);
        assert_eq!(ElementType::Char.size(), 2);
        assert_eq!(ElementType::Single.size(), 4);
        assert_eq!(ElementType::Double.size(), 8);
        assert_eq!(ElementType::Int16.size(), 2);
        assert_eq!(ElementType::UInt32.size(), 4);
        assert_eq!(ElementType::Int64.size(), 8);
    }

    #[test]
    fn test_display_uses_class_name() {
        assert_eq!(ElementType::UInt8.to_string(), "uint8");
        assert_eq!(ElementType::Double.to_string(), "double");
    }
}
