///
/// Result cells and the row accumulator.
///
/// Rows are decoded out of the engine one step at a time into owned
/// `TypedValue`s, because the engine's column buffers only live until the
/// next step. The row count is unknown until the statement is done, so rows
/// go into an append-only `RowBuffer` first and are drained into the
/// pre-sized output array afterwards, one row at a time.
///

use std::collections::VecDeque;

use rusqlite::types::ValueRef;
use sqlmat_codec::CharsetMode;

use crate::errors::{Error, Result};

/// One decoded result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Integer(i64),
    Float(f64),
    /// Host-side text bytes, already transcoded from the engine encoding.
    Text(Vec<u8>),
    Blob(Vec<u8>),
}

impl TypedValue {
    /// Copies a column value out of the engine.
    pub fn from_engine(value: ValueRef<'_>, charset: CharsetMode) -> Result<Self> {
        Ok(match value {
            ValueRef::Null => TypedValue::Null,
            ValueRef::Integer(i) => TypedValue::Integer(i),
            ValueRef::Real(f) => TypedValue::Float(f),
            ValueRef::Text(bytes) => TypedValue::Text(charset.to_host(bytes)),
            ValueRef::Blob(bytes) => TypedValue::Blob(copy_bytes(bytes)?),
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            TypedValue::Null => "null",
            TypedValue::Integer(_) => "integer",
            TypedValue::Float(_) => "float",
            TypedValue::Text(_) => "text",
            TypedValue::Blob(_) => "blob",
        }
    }
}

fn copy_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve_exact(bytes.len())
        .map_err(|_| Error::MemoryError(bytes.len()))?;
    out.extend_from_slice(bytes);
    Ok(out)
}

/// One value per result column.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    values: Vec<TypedValue>,
}

impl ResultRow {
    pub fn new(values: Vec<TypedValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<TypedValue> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Append-only row sequence, drained front to back exactly once.
#[derive(Debug, Default)]
pub struct RowBuffer {
    columns: usize,
    rows: VecDeque<ResultRow>,
}

impl RowBuffer {
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            rows: VecDeque::new(),
        }
    }

    pub fn push(&mut self, row: ResultRow) -> Result<()> {
        if row.len() != self.columns {
            return Err(Error::InvalidArgument(format!(
                "row has {} values for {} columns",
                row.len(),
                self.columns
            )));
        }
        self.rows.push_back(row);
        Ok(())
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Yields rows in insertion order, releasing each one as it is taken.
    pub fn drain(self) -> impl Iterator<Item = ResultRow> {
        self.rows.into_iter()
    }
}
