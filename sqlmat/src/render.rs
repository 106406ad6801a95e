///
/// Plain-text and JSON views of a query result, used by the CLI.
///
/// Text output prints one `field: value` line per field and separates
/// records with a blank line. The empty-result marker prints as `[]`.
///
/// Host text is shown according to the session's charset mode: single-byte
/// (Latin-1) characters when converting, raw UTF-8 when passing through.
///

use serde_json::{Map, Number, Value};
use sqlmat_codec::CharsetMode;

use crate::array::{CharArray, HostValue, NumericArray, QueryOutput};

pub fn render_text(output: &QueryOutput, charset: CharsetMode) -> String {
    let records = match output {
        QueryOutput::Empty => return "[]\n".to_string(),
        QueryOutput::Records(records) => records,
    };

    let mut out = String::new();
    for (i, record) in records.records().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (field, value) in records.fields().iter().zip(record) {
            out.push_str(&format!("{}: {}\n", field, format_value(value, charset)));
        }
    }
    out
}

/// Display form of host text.
pub fn text_string(text: &CharArray, charset: CharsetMode) -> String {
    match charset {
        CharsetMode::Convert => text.to_string_lossy(),
        CharsetMode::Identity => String::from_utf8_lossy(text.as_bytes()).into_owned(),
    }
}

pub fn format_value(value: &HostValue, charset: CharsetMode) -> String {
    match value {
        HostValue::Numeric(array) if array.is_empty() => "[]".to_string(),
        HostValue::Numeric(array) if array.is_scalar() => array
            .element_f64(0)
            .map(|v| v.to_string())
            .unwrap_or_default(),
        HostValue::Numeric(array) => array.to_string(),
        HostValue::Text(text) => text_string(text, charset),
        other => format!("[{}]", other.class_name()),
    }
}

/// A JSON array with one object per record; the empty marker is `[]`.
pub fn render_json(output: &QueryOutput, charset: CharsetMode) -> Value {
    let Some(records) = output.records() else {
        return Value::Array(Vec::new());
    };
    let rows = records
        .records()
        .iter()
        .map(|record| {
            let object: Map<String, Value> = records
                .fields()
                .iter()
                .cloned()
                .zip(record.iter().map(|v| json_value(v, charset)))
                .collect();
            Value::Object(object)
        })
        .collect();
    Value::Array(rows)
}

fn json_number(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

fn json_array(array: &NumericArray) -> Value {
    if array.is_scalar() {
        return array.element_f64(0).map(json_number).unwrap_or(Value::Null);
    }
    Value::Array(
        (0..array.element_count())
            .map(|i| array.element_f64(i).map(json_number).unwrap_or(Value::Null))
            .collect(),
    )
}

fn json_value(value: &HostValue, charset: CharsetMode) -> Value {
    match value {
        HostValue::Numeric(array) => json_array(array),
        HostValue::Text(text) => Value::String(text_string(text, charset)),
        other => Value::String(other.class_name()),
    }
}
