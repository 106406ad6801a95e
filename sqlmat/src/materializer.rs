///
/// Result Materializer
///
/// Drives a bound statement to completion and turns its rows into a host
/// record array:
///
///   Prepared -> (Stepping -> RowReady)* -> Done | Error
///
/// Every row is copied out of the engine into a `RowBuffer` while stepping.
/// Only once the engine reports completion is the row count known; the
/// output is then allocated once and the buffer drained into it, releasing
/// each buffered row as it is transcribed.
///
/// Column names become field names: any character that is not an ASCII
/// letter or digit is replaced by `_`, and with uniqueness checking on, each
/// later duplicate gets the first free suffix from `_1` to `_99`.
///

use rusqlite::Statement;
use tracing::{debug, warn};

use crate::array::{CharArray, HostValue, NumericArray, QueryOutput, RecordArray};
use crate::blob;
use crate::config::Config;
use crate::errors::{Error, Result};
use crate::row::{ResultRow, RowBuffer, TypedValue};
use crate::warning::Warning;

/// Highest numeric suffix tried when making a field name unique.
pub const MAX_FIELD_SUFFIX: usize = 99;

/// A query result plus the warnings raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Materialized {
    pub output: QueryOutput,
    pub warnings: Vec<Warning>,
}

impl Materialized {
    pub fn empty() -> Self {
        Self {
            output: QueryOutput::Empty,
            warnings: Vec::new(),
        }
    }
}

/// Steps `stmt` to completion. Parameters must already be bound.
pub fn materialize(stmt: &mut Statement<'_>, config: &Config) -> Result<Materialized> {
    let columns = stmt.column_count();
    if columns == 0 {
        let changed = stmt.raw_execute()?;
        debug!(changed, "statement without result columns done");
        return Ok(Materialized::empty());
    }

    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let buffer = collect_rows(stmt, columns, config)?;
    debug!(rows = buffer.len(), columns, "statement done");

    if buffer.is_empty() {
        return Ok(Materialized::empty());
    }

    let mut warnings = Vec::new();
    let mut fields: Vec<String> = names.iter().map(|n| sanitize_field_name(n)).collect();
    if config.check_unique_fields {
        warnings.extend(resolve_field_names(&mut fields));
    }

    let mut records = Vec::new();
    records
        .try_reserve_exact(buffer.len())
        .map_err(|_| Error::MemoryError(buffer.len()))?;
    for row in buffer.drain() {
        let record = row
            .into_values()
            .into_iter()
            .map(|value| render_cell(value, config, &mut warnings))
            .collect::<Result<Vec<_>>>()?;
        records.push(record);
    }

    Ok(Materialized {
        output: QueryOutput::Records(RecordArray::new(fields, records)?),
        warnings,
    })
}

fn collect_rows(stmt: &mut Statement<'_>, columns: usize, config: &Config) -> Result<RowBuffer> {
    let charset = config.charset();
    let mut buffer = RowBuffer::new(columns);
    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns);
        for index in 0..columns {
            values.push(TypedValue::from_engine(row.get_ref(index)?, charset)?);
        }
        buffer.push(ResultRow::new(values))?;
    }
    Ok(buffer)
}

pub fn sanitize_field_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Renames later duplicates in place. A name that cannot be made unique
/// within `MAX_FIELD_SUFFIX` tries is kept and reported.
pub fn resolve_field_names(names: &mut [String]) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for i in 1..names.len() {
        if !names[..i].contains(&names[i]) {
            continue;
        }
        let free = (1..=MAX_FIELD_SUFFIX)
            .map(|k| format!("{}_{}", names[i], k))
            .find(|candidate| !names.contains(candidate));
        match free {
            Some(unique) => names[i] = unique,
            None => {
                let warning = Warning::DuplicateFieldName {
                    name: names[i].clone(),
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }
    warnings
}

fn null_value(config: &Config) -> HostValue {
    if config.null_as_nan {
        HostValue::double(f64::NAN)
    } else {
        HostValue::empty()
    }
}

/// Converts one cell into its host value.
pub fn render_cell(value: TypedValue, config: &Config, warnings: &mut Vec<Warning>) -> Result<HostValue> {
    Ok(match value {
        TypedValue::Null => null_value(config),
        TypedValue::Integer(i) => HostValue::double(i as f64),
        TypedValue::Float(f) => HostValue::double(f),
        TypedValue::Text(bytes) => HostValue::Text(CharArray::new(bytes)),
        TypedValue::Blob(bytes) if bytes.is_empty() => HostValue::empty(),
        TypedValue::Blob(bytes) if config.typed_blobs => {
            HostValue::Numeric(blob::decode_array(&bytes, warnings)?)
        }
        TypedValue::Blob(bytes) => HostValue::Numeric(NumericArray::from_bytes(bytes)),
    })
}
