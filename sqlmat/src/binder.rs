///
/// Parameter Binder
///
/// Maps host argument values onto the positional `?` slots of a prepared
/// statement. Arguments are either given one per slot or as a single cell
/// whose items are the slot values. Slots without a value are bound NULL.
///
/// Per value:
/// - empty values bind NULL
/// - complex, cell and struct values are refused
/// - text (and char arrays) bind as TEXT, transcoded to UTF-8 when enabled
/// - scalar logical and integer values bind as INTEGER through `i64`
/// - scalar floats bind as REAL
/// - any other multi-element array binds as BLOB: its raw element bytes, or
///   a typed BLOB when typed-blob mode is on
///
/// Encoded buffers are owned by the `Parameter`s of one call and dropped
/// when the call returns, on success or error. The engine copies what it
/// keeps.
///

use std::borrow::Cow;

use rusqlite::Statement;
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use sqlmat_codec::ElementType;
use tracing::debug;

use crate::array::{HostValue, NumericArray};
use crate::blob;
use crate::config::Config;
use crate::errors::{Error, Result};

/// One encoded slot value, ready for the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter<'a> {
    Null,
    Integer(i64),
    Float(f64),
    Text(Cow<'a, [u8]>),
    Blob(Cow<'a, [u8]>),
}

impl ToSql for Parameter<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Parameter::Null => ToSqlOutput::Owned(Value::Null),
            Parameter::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Parameter::Float(f) => ToSqlOutput::Owned(Value::Real(*f)),
            Parameter::Text(bytes) => ToSqlOutput::Borrowed(ValueRef::Text(bytes)),
            Parameter::Blob(bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
        })
    }
}

/// Binds every slot of `stmt`. Returns the number of slots bound from a value.
pub fn bind_all(stmt: &mut Statement<'_>, args: &[HostValue], config: &Config) -> Result<usize> {
    let slots = stmt.parameter_count();
    let values = resolve_arguments(slots, args)?;

    let params = values
        .iter()
        .map(|v| encode_parameter(v, config))
        .collect::<Result<Vec<_>>>()?;

    for index in 1..=slots {
        match params.get(index - 1) {
            Some(param) => stmt.raw_bind_parameter(index, param)?,
            None => stmt.raw_bind_parameter(index, Parameter::Null)?,
        }
    }
    debug!(slots, bound = params.len(), "bound statement parameters");
    Ok(params.len())
}

/// The values that fill the slots, in slot order.
///
/// A lone cell argument is unwrapped into its items. Giving more values than
/// there are slots is an error.
pub fn resolve_arguments(slots: usize, args: &[HostValue]) -> Result<&[HostValue]> {
    if slots == 0 && !args.is_empty() {
        return Err(Error::UnexpectedArguments {
            expected: 0,
            given: args.len(),
        });
    }

    let values = match args.first() {
        Some(HostValue::Cell(items)) => {
            if args.len() > 1 {
                return Err(Error::UnexpectedArguments {
                    expected: 1,
                    given: args.len(),
                });
            }
            items.as_slice()
        }
        _ => args,
    };

    if values.len() > slots {
        return Err(Error::UnexpectedArguments {
            expected: slots,
            given: values.len(),
        });
    }
    Ok(values)
}

/// Encodes one argument for binding.
pub fn encode_parameter<'a>(value: &'a HostValue, config: &Config) -> Result<Parameter<'a>> {
    if value.is_empty() {
        return Ok(Parameter::Null);
    }
    match value {
        HostValue::Complex { .. } | HostValue::Cell(_) | HostValue::Struct(_) => {
            Err(Error::UnsupportedType(value.class_name()))
        }
        HostValue::Opaque { class_name } => Err(Error::InvalidArgument(format!(
            "a value of class {} cannot be bound",
            class_name
        ))),
        HostValue::Text(text) => Ok(encode_text(text.as_bytes(), config)),
        HostValue::Numeric(array) => encode_numeric(array, config),
    }
}

fn encode_text<'a>(bytes: &'a [u8], config: &Config) -> Parameter<'a> {
    Parameter::Text(Cow::Owned(config.charset().to_engine(bytes)))
}

fn encode_numeric<'a>(array: &'a NumericArray, config: &Config) -> Result<Parameter<'a>> {
    let element_type = array.element_type();

    if element_type == ElementType::Char {
        let bytes = array.char_bytes().unwrap_or_default();
        return Ok(Parameter::Text(Cow::Owned(config.charset().to_engine(&bytes))));
    }

    if !array.is_scalar() {
        return if config.typed_blobs {
            Ok(Parameter::Blob(Cow::Owned(blob::encode_array(array, config)?)))
        } else {
            Ok(Parameter::Blob(Cow::Borrowed(array.data())))
        };
    }

    let param = if element_type.is_float() {
        array.element_f64(0).map(Parameter::Float)
    } else {
        array.element_i64(0).map(Parameter::Integer)
    };
    param.ok_or_else(|| Error::InvalidArgument(format!("unreadable {} scalar", element_type)))
}
