//!
//! Host Value Model
//!
//! Rust side of the values the numeric host passes in and gets back:
//!
//! - `NumericArray`: element class, dimensions and the raw element bytes in
//!   native byte order, laid out exactly as the host stores them
//! - `CharArray`: a single-byte host string
//! - `HostValue`: any argument or result cell, including the shapes the
//!   bridge refuses (complex, cell, struct, opaque objects)
//! - `RecordArray` / `QueryOutput`: the tabular result of a query
//!
//! Element payloads are opaque bytes to the rest of the bridge. Typed
//! accessors exist for callers and tests.
//!

use std::fmt;

use sqlmat_codec::ElementType;

use crate::errors::{Error, Result};

mod sealed {
    pub trait Sealed {}
}

/// A primitive that can be stored in a `NumericArray`.
pub trait Element: Copy + sealed::Sealed {
    const TYPE: ElementType;

    fn push_ne(self, out: &mut Vec<u8>);
    fn read_ne(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}

            impl Element for $t {
                const TYPE: ElementType = ElementType::$variant;

                fn push_ne(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_ne_bytes());
                }

                fn read_ne(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_ne_bytes(buf)
                }
            }
        )*
    };
}

impl_element! {
    f64 => Double,
    f32 => Single,
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
}

impl sealed::Sealed for bool {}

impl Element for bool {
    const TYPE: ElementType = ElementType::Logical;

    fn push_ne(self, out: &mut Vec<u8>) {
        out.push(self as u8);
    }

    fn read_ne(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// A real numeric, logical or char array.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    element_type: ElementType,
    dims: Vec<usize>,
    data: Vec<u8>,
}

impl NumericArray {
    /// `data` must hold exactly product(dims) elements of `element_type`.
    pub fn new(element_type: ElementType, dims: Vec<usize>, data: Vec<u8>) -> Result<Self> {
        let expected = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .and_then(|count| count.checked_mul(element_type.size()));
        if expected != Some(data.len()) {
            return Err(Error::InvalidArgument(format!(
                "{} bytes do not fill a {} {} array",
                data.len(),
                format_dims(&dims),
                element_type
            )));
        }
        Ok(Self {
            element_type,
            dims,
            data,
        })
    }

    pub fn from_elements<T: Element>(dims: Vec<usize>, values: &[T]) -> Result<Self> {
        let mut data = Vec::with_capacity(values.len() * T::TYPE.size());
        for &v in values {
            v.push_ne(&mut data);
        }
        Self::new(T::TYPE, dims, data)
    }

    pub fn scalar<T: Element>(value: T) -> Self {
        let mut data = Vec::with_capacity(T::TYPE.size());
        value.push_ne(&mut data);
        Self {
            element_type: T::TYPE,
            dims: vec![1, 1],
            data,
        }
    }

    /// 1-by-n row vector.
    pub fn row<T: Element>(values: &[T]) -> Self {
        let mut data = Vec::with_capacity(values.len() * T::TYPE.size());
        for &v in values {
            v.push_ne(&mut data);
        }
        Self {
            element_type: T::TYPE,
            dims: vec![1, values.len()],
            data,
        }
    }

    /// 1-by-n uint8 row vector taking ownership of `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            element_type: ElementType::UInt8,
            dims: vec![1, bytes.len()],
            data: bytes,
        }
    }

    /// The 0-by-0 double array.
    pub fn empty() -> Self {
        Self {
            element_type: ElementType::Double,
            dims: vec![0, 0],
            data: Vec::new(),
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn element_count(&self) -> usize {
        self.data.len() / self.element_type.size()
    }

    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    pub fn is_scalar(&self) -> bool {
        self.element_count() == 1
    }

    /// Elements as `T`, or `None` if `T` is not this array's element class.
    pub fn to_vec<T: Element>(&self) -> Option<Vec<T>> {
        if T::TYPE != self.element_type {
            return None;
        }
        Some(
            self.data
                .chunks_exact(self.element_type.size())
                .map(T::read_ne)
                .collect(),
        )
    }

    fn element_bytes(&self, index: usize) -> Option<&[u8]> {
        let size = self.element_type.size();
        self.data.get(index * size..(index + 1) * size)
    }

    pub fn element_f64(&self, index: usize) -> Option<f64> {
        let b = self.element_bytes(index)?;
        Some(match self.element_type {
            ElementType::Logical => bool::read_ne(b) as u8 as f64,
            ElementType::Char | ElementType::UInt16 => u16::read_ne(b) as f64,
            ElementType::Double => f64::read_ne(b),
            ElementType::Single => f32::read_ne(b) as f64,
            ElementType::Int8 => i8::read_ne(b) as f64,
            ElementType::UInt8 => u8::read_ne(b) as f64,
            ElementType::Int16 => i16::read_ne(b) as f64,
            ElementType::Int32 => i32::read_ne(b) as f64,
            ElementType::UInt32 => u32::read_ne(b) as f64,
            ElementType::Int64 => i64::read_ne(b) as f64,
            ElementType::UInt64 => u64::read_ne(b) as f64,
        })
    }

    /// Element converted through a native integer; floats truncate toward zero.
    pub fn element_i64(&self, index: usize) -> Option<i64> {
        let b = self.element_bytes(index)?;
        Some(match self.element_type {
            ElementType::Logical => bool::read_ne(b) as i64,
            ElementType::Char | ElementType::UInt16 => u16::read_ne(b) as i64,
            ElementType::Double => f64::read_ne(b) as i64,
            ElementType::Single => f32::read_ne(b) as i64,
            ElementType::Int8 => i8::read_ne(b) as i64,
            ElementType::UInt8 => u8::read_ne(b) as i64,
            ElementType::Int16 => i16::read_ne(b) as i64,
            ElementType::Int32 => i32::read_ne(b) as i64,
            ElementType::UInt32 => u32::read_ne(b) as i64,
            ElementType::Int64 => i64::read_ne(b),
            ElementType::UInt64 => u64::read_ne(b) as i64,
        })
    }

    /// Char elements narrowed to single bytes; code units above 0xFF become `?`.
    pub fn char_bytes(&self) -> Option<Vec<u8>> {
        let units = self.to_char_units()?;
        Some(
            units
                .into_iter()
                .map(|u| u8::try_from(u).unwrap_or(b'?'))
                .collect(),
        )
    }

    fn to_char_units(&self) -> Option<Vec<u16>> {
        if self.element_type != ElementType::Char {
            return None;
        }
        Some(self.data.chunks_exact(2).map(u16::read_ne).collect())
    }
}

/// A host string: one byte per character.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharArray(Vec<u8>);

impl CharArray {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Characters above U+00FF have no single-byte form and become `?`.
    pub fn from_str_lossy(s: &str) -> Self {
        Self(
            s.chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        )
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads every byte as a Latin-1 character.
    pub fn to_string_lossy(&self) -> String {
        self.0.iter().map(|&b| char::from(b)).collect()
    }
}

impl From<&str> for CharArray {
    fn from(s: &str) -> Self {
        Self::from_str_lossy(s)
    }
}

/// Any value that can be passed in as an argument or come back as a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Numeric(NumericArray),
    Text(CharArray),
    Complex { real: NumericArray, imag: NumericArray },
    Cell(Vec<HostValue>),
    Struct(RecordArray),
    /// Host objects without a data representation (function handles, class instances).
    Opaque { class_name: String },
}

impl HostValue {
    pub fn text(s: &str) -> Self {
        HostValue::Text(CharArray::from_str_lossy(s))
    }

    pub fn double(value: f64) -> Self {
        HostValue::Numeric(NumericArray::scalar(value))
    }

    pub fn empty() -> Self {
        HostValue::Numeric(NumericArray::empty())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            HostValue::Numeric(a) => a.is_empty(),
            HostValue::Text(t) => t.is_empty(),
            HostValue::Complex { real, .. } => real.is_empty(),
            HostValue::Cell(items) => items.is_empty(),
            HostValue::Struct(records) => records.is_empty(),
            HostValue::Opaque { .. } => false,
        }
    }

    pub fn class_name(&self) -> String {
        match self {
            HostValue::Numeric(a) => a.element_type().name().to_string(),
            HostValue::Text(_) => "char".to_string(),
            HostValue::Complex { real, .. } => format!("complex {}", real.element_type()),
            HostValue::Cell(_) => "cell".to_string(),
            HostValue::Struct(_) => "struct".to_string(),
            HostValue::Opaque { class_name } => class_name.clone(),
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericArray> {
        match self {
            HostValue::Numeric(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&CharArray> {
        match self {
            HostValue::Text(t) => Some(t),
            _ => None,
        }
    }

    /// The value of a 1-by-1 numeric cell as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HostValue::Numeric(a) if a.is_scalar() => a.element_f64(0),
            _ => None,
        }
    }
}

/// A struct array: one record per row, one field per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordArray {
    fields: Vec<String>,
    records: Vec<Vec<HostValue>>,
}

impl RecordArray {
    /// Every record must have one value per field.
    pub fn new(fields: Vec<String>, records: Vec<Vec<HostValue>>) -> Result<Self> {
        if let Some(bad) = records.iter().position(|r| r.len() != fields.len()) {
            return Err(Error::InvalidArgument(format!(
                "record {} has {} values for {} fields",
                bad + 1,
                records[bad].len(),
                fields.len()
            )));
        }
        Ok(Self { fields, records })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn records(&self) -> &[Vec<HostValue>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    pub fn get(&self, record: usize, field: &str) -> Option<&HostValue> {
        let index = self.field_index(field)?;
        self.records.get(record)?.get(index)
    }

    pub fn column<'a>(&'a self, field: &str) -> Option<impl Iterator<Item = &'a HostValue> + 'a> {
        let index = self.field_index(field)?;
        Some(self.records.iter().map(move |r| &r[index]))
    }
}

/// Result of running one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// No rows (or no result columns). The host sees a 0-by-0 double array.
    Empty,
    Records(RecordArray),
}

impl QueryOutput {
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryOutput::Empty)
    }

    pub fn records(&self) -> Option<&RecordArray> {
        match self {
            QueryOutput::Records(r) => Some(r),
            QueryOutput::Empty => None,
        }
    }

    pub fn into_records(self) -> Option<RecordArray> {
        match self {
            QueryOutput::Records(r) => Some(r),
            QueryOutput::Empty => None,
        }
    }
}

pub fn format_dims(dims: &[usize]) -> String {
    dims.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("x")
}

impl fmt::Display for NumericArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", format_dims(&self.dims), self.element_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_and_row() {
        let s = NumericArray::scalar(2.5f64);
        assert_eq!(s.element_type(), ElementType::Double);
        assert_eq!(s.dims(), &[1, 1]);
        assert!(s.is_scalar());
        assert_eq!(s.element_f64(0), Some(2.5));

        let r = NumericArray::row(&[1i16, 2, 3]);
        assert_eq!(r.dims(), &[1, 3]);
        assert_eq!(r.element_count(), 3);
        assert_eq!(r.to_vec::<i16>(), Some(vec![1, 2, 3]));
        assert_eq!(r.to_vec::<i32>(), None);
    }

    #[test]
    fn test_new_checks_payload_length() {
        assert!(NumericArray::new(ElementType::Int32, vec![2, 2], vec![0; 16]).is_ok());
        let err = NumericArray::new(ElementType::Int32, vec![2, 2], vec![0; 15]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().contains("2x2 int32"));
    }

    #[test]
    fn test_from_elements_column_major_shape() {
        let a = NumericArray::from_elements(vec![2, 3], &[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(a.element_type(), ElementType::Single);
        assert_eq!(a.data().len(), 24);
        assert_eq!(a.element_f64(5), Some(6.0));
        assert_eq!(a.element_f64(6), None);
    }

    #[test]
    fn test_integer_conversion_truncates() {
        assert_eq!(NumericArray::scalar(3.9f64).element_i64(0), Some(3));
        assert_eq!(NumericArray::scalar(-3.9f32).element_i64(0), Some(-3));
        assert_eq!(NumericArray::scalar(true).element_i64(0), Some(1));
        assert_eq!(NumericArray::scalar(u32::MAX).element_i64(0), Some(u32::MAX as i64));
        assert_eq!(NumericArray::scalar(u64::MAX).element_i64(0), Some(-1));
    }

    #[test]
    fn test_logical_elements() {
        let a = NumericArray::row(&[true, false, true]);
        assert_eq!(a.element_type(), ElementType::Logical);
        assert_eq!(a.data(), &[1, 0, 1]);
        assert_eq!(a.to_vec::<bool>(), Some(vec![true, false, true]));
    }

    #[test]
    fn test_char_bytes() {
        let units: Vec<u8> = [b'h' as u16, 0xE9, 0x20AC]
            .iter()
            .flat_map(|u| u.to_ne_bytes())
            .collect();
        let a = NumericArray::new(ElementType::Char, vec![1, 3], units).unwrap();
        assert_eq!(a.char_bytes(), Some(vec![b'h', 0xE9, b'?']));
        assert_eq!(NumericArray::scalar(1u8).char_bytes(), None);
    }

    #[test]
    fn test_empty_values() {
        assert!(NumericArray::empty().is_empty());
        assert_eq!(NumericArray::empty().dims(), &[0, 0]);
        assert!(HostValue::empty().is_empty());
        assert!(HostValue::text("").is_empty());
        assert!(HostValue::Cell(vec![]).is_empty());
        assert!(!HostValue::Opaque { class_name: "function_handle".into() }.is_empty());
        assert!(!HostValue::double(0.0).is_empty());
    }

    #[test]
    fn test_char_array_latin1() {
        let t = CharArray::from_str_lossy("Zürich €");
        assert_eq!(t.as_bytes(), &[b'Z', 0xFC, b'r', b'i', b'c', b'h', b' ', b'?']);
        assert_eq!(CharArray::new(vec![b'Z', 0xFC]).to_string_lossy(), "Zü");
    }

    #[test]
    fn test_record_array_access() {
        let records = RecordArray::new(
            vec!["id".into(), "name".into()],
            vec![
                vec![HostValue::double(1.0), HostValue::text("a")],
                vec![HostValue::double(2.0), HostValue::text("b")],
            ],
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records.get(1, "name"), Some(&HostValue::text("b")));
        assert_eq!(records.get(2, "name"), None);
        assert_eq!(records.get(0, "missing"), None);
        let ids: Vec<f64> = records
            .column("id")
            .unwrap()
            .filter_map(HostValue::as_f64)
            .collect();
        assert_eq!(ids, vec![1.0, 2.0]);
    }

    #[test]
    fn test_record_array_rejects_ragged_rows() {
        let result = RecordArray::new(vec!["a".into()], vec![vec![]]);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(NumericArray::row(&[1u8, 2, 3]).to_string(), "[1x3 uint8]");
    }
}
