///
/// SQL extension functions registered on every session.
///
/// - `pow(x, y)`: `x` raised to `y`, NULL if either argument is NULL
/// - `regex(str, pattern)`: first match of `pattern` in `str`, or NULL
/// - `regex(str, pattern, replacement)`: every match replaced, `$1` style
///   group references allowed; NULL if nothing matches
///
/// With charset conversion on, `regex` matches on the host's single-byte
/// text and converts its result back to UTF-8, so patterns see the same
/// characters the host does.
///

use std::error::Error as StdError;
use std::sync::Arc;

use regex::Regex;
use rusqlite::Connection;
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use sqlmat_codec::{CharsetMode, charset};

use crate::errors::Result;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub fn register(conn: &Connection, mode: CharsetMode) -> Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function("pow", 2, flags, |ctx| {
        let base = numeric_arg(ctx.get_raw(0));
        let exponent = numeric_arg(ctx.get_raw(1));
        Ok(base.zip(exponent).map(|(b, e)| b.powf(e)))
    })?;

    conn.create_scalar_function("regex", 2, flags, move |ctx| regex_call(ctx, mode))?;
    conn.create_scalar_function("regex", 3, flags, move |ctx| regex_call(ctx, mode))?;
    Ok(())
}

fn regex_call(ctx: &Context<'_>, mode: CharsetMode) -> rusqlite::Result<Option<String>> {
    let args: Vec<Option<Vec<u8>>> = (0..ctx.len()).map(|i| text_arg(ctx.get_raw(i))).collect();
    if args.iter().any(Option::is_none) {
        return Ok(None);
    }

    let pattern: Arc<Regex> = ctx.get_or_create_aux(1, |value| -> std::result::Result<_, BoxError> {
        let source = text_arg(value).unwrap_or_default();
        Ok(Regex::new(&decode_text(&source, mode))?)
    })?;

    let subject = decode_text(args[0].as_deref().unwrap_or_default(), mode);
    let result = match args.get(2) {
        Some(replacement) => {
            if !pattern.is_match(&subject) {
                return Ok(None);
            }
            let replacement = decode_text(replacement.as_deref().unwrap_or_default(), mode);
            pattern.replace_all(&subject, replacement.as_str()).into_owned()
        }
        None => match pattern.find(&subject) {
            Some(found) => found.as_str().to_string(),
            None => return Ok(None),
        },
    };
    Ok(Some(encode_text(&result, mode)))
}

/// SQLite's numeric view of a value; NULL stays `None`.
fn numeric_arg(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        ValueRef::Text(bytes) => Some(numeric_prefix(bytes)),
        ValueRef::Blob(_) => Some(0.0),
    }
}

/// Value of the longest numeric prefix after leading whitespace, 0 if none.
fn numeric_prefix(bytes: &[u8]) -> f64 {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let rest = &bytes[start..];
    let digits_from = |at: usize| {
        rest[at.min(rest.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(rest.first(), Some(b'+' | b'-')));
    let mut mantissa = digits_from(end);
    end += mantissa;
    if rest.get(end) == Some(&b'.') {
        let fraction = digits_from(end + 1);
        mantissa += fraction;
        end += 1 + fraction;
    }
    if mantissa == 0 {
        return 0.0;
    }
    if matches!(rest.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(rest.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits_from(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }

    std::str::from_utf8(&rest[..end])
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}

/// REAL as SQLite prints it: 15 significant digits, always with a fraction.
fn real_text(f: f64) -> String {
    if f.is_infinite() {
        return if f > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }
    let scientific = format!("{:.14e}", f);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..15).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", with_fraction(mantissa.to_string()), sign, exponent.abs());
    }
    with_fraction(format!("{:.*}", (14 - exponent) as usize, f))
}

/// Drops trailing fraction zeros but keeps at least one fraction digit.
fn with_fraction(mut digits: String) -> String {
    if digits.contains('.') {
        let trimmed = digits.trim_end_matches('0').len();
        digits.truncate(trimmed);
    } else {
        digits.push('.');
    }
    if digits.ends_with('.') {
        digits.push('0');
    }
    digits
}

/// SQLite's text view of a value; NULL stays `None`.
fn text_arg(value: ValueRef<'_>) -> Option<Vec<u8>> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string().into_bytes()),
        ValueRef::Real(f) => Some(real_text(f).into_bytes()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(bytes.to_vec()),
    }
}

fn decode_text(engine: &[u8], mode: CharsetMode) -> String {
    match mode {
        CharsetMode::Convert => mode.to_host(engine).iter().map(|&b| char::from(b)).collect(),
        CharsetMode::Identity => String::from_utf8_lossy(charset::c_str(engine)).into_owned(),
    }
}

fn encode_text(text: &str, mode: CharsetMode) -> String {
    match mode {
        CharsetMode::Convert => {
            let host: Vec<u8> = text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect();
            String::from_utf8_lossy(&mode.to_engine(&host)).into_owned()
        }
        CharsetMode::Identity => text.to_string(),
    }
}
