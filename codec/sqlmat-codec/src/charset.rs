///
/// Single-byte <-> UTF-8 transcoding.
///
/// Host strings are single-byte (Latin-1 style) while the engine stores UTF-8.
/// Only the two-byte UTF-8 subset is handled:
/// - bytes below 128 are copied unchanged
/// - a single byte `b >= 128` becomes `0xC0 + (b >> 6)`, `0x80 + (b & 63)`
/// - in UTF-8 input every byte `>= 128` starts a two-byte pair folded back
///   into `(lead << 6) | (cont & 63)`
///
/// Sequences of three or more bytes are not understood: they are folded
/// pairwise like any other high byte and come out garbled. That is a known
/// limitation of the format, kept as is.
///
/// Inputs are C strings: conversion stops at the first NUL byte and the
/// terminator is never part of the output. Each conversion has a measuring
/// companion (`single_byte_len`, `utf8_len`) so the output is allocated
/// exactly once.
///

/// Whether text crossing the host/engine boundary is transcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharsetMode {
    /// Host text is single-byte, engine text is UTF-8.
    #[default]
    Convert,
    /// Bytes are copied unchanged in both directions.
    Identity,
}

impl CharsetMode {
    pub fn from_flag(convert: bool) -> Self {
        if convert {
            CharsetMode::Convert
        } else {
            CharsetMode::Identity
        }
    }

    /// Host (single-byte) text to engine text.
    pub fn to_engine(self, host: &[u8]) -> Vec<u8> {
        match self {
            CharsetMode::Convert => to_utf8(host),
            CharsetMode::Identity => c_str(host).to_vec(),
        }
    }

    /// Engine text to host (single-byte) text.
    pub fn to_host(self, engine: &[u8]) -> Vec<u8> {
        match self {
            CharsetMode::Convert => to_single_byte(engine),
            CharsetMode::Identity => c_str(engine).to_vec(),
        }
    }
}

/// Bytes before the first NUL, or the whole slice if there is none.
pub fn c_str(bytes: &[u8]) -> &[u8] {
    match memchr::memchr(0, bytes) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Output length of `to_single_byte` for the same input.
pub fn single_byte_len(utf8: &[u8]) -> usize {
    let s = c_str(utf8);
    let mut i = 0;
    let mut count = 0;
    while i < s.len() {
        i += if s[i] < 0x80 { 1 } else { 2 };
        count += 1;
    }
    count
}

/// Output length of `to_utf8` for the same input.
pub fn utf8_len(single_byte: &[u8]) -> usize {
    c_str(single_byte)
        .iter()
        .map(|&b| if b < 0x80 { 1 } else { 2 })
        .sum()
}

pub fn to_single_byte(utf8: &[u8]) -> Vec<u8> {
    let s = c_str(utf8);
    let mut out = Vec::with_capacity(single_byte_len(s));
    let mut i = 0;
    while i < s.len() {
        let lead = s[i];
        if lead < 0x80 {
            out.push(lead);
            i += 1;
        } else {
            // A lead byte at the very end reads the terminator as continuation.
            let cont = s.get(i + 1).copied().unwrap_or(0);
            out.push((lead << 6) | (cont & 0x3F));
            i += 2;
        }
    }
    out
}

pub fn to_utf8(single_byte: &[u8]) -> Vec<u8> {
    let s = c_str(single_byte);
    let mut out = Vec::with_capacity(utf8_len(s));
    for &b in s {
        if b < 0x80 {
            out.push(b);
        } else {
            out.push(0xC0 + (b >> 6));
            out.push(0x80 + (b & 0x3F));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        assert_eq!(to_utf8(b"hello world"), b"hello world");
        assert_eq!(to_single_byte(b"hello world"), b"hello world");
        assert_eq!(utf8_len(b"abc"), 3);
        assert_eq!(single_byte_len(b"abc"), 3);
    }

    #[test]
    fn test_latin1_to_utf8() {
        // "Müller" in Latin-1
        let latin = [b'M', 0xFC, b'l', b'l', b'e', b'r'];
        let utf8 = to_utf8(&latin);
        assert_eq!(utf8, "Müller".as_bytes());
        assert_eq!(utf8_len(&latin), 7);
    }

    #[test]
    fn test_utf8_to_latin1() {
        let latin = to_single_byte("Grüße".as_bytes());
        assert_eq!(latin, vec![b'G', b'r', 0xFC, 0xDF, b'e']);
        assert_eq!(single_byte_len("Grüße".as_bytes()), 5);
    }

    #[test]
    fn test_round_trip_all_single_bytes() {
        let all: Vec<u8> = (1..=255u8).collect();
        let encoded = to_utf8(&all);
        assert_eq!(encoded.len(), utf8_len(&all));
        assert!(std::str::from_utf8(&encoded).is_ok());
        assert_eq!(to_single_byte(&encoded), all);
    }

    #[test]
    fn test_stops_at_nul() {
        assert_eq!(to_utf8(b"ab\0cd"), b"ab");
        assert_eq!(to_single_byte(b"ab\0cd"), b"ab");
        assert_eq!(utf8_len(b"ab\0\xFF"), 2);
        assert_eq!(single_byte_len(b"\0abc"), 0);
    }

    #[test]
    fn test_lone_trailing_lead_byte() {
        // 0xC3 alone: folded with a zero continuation and consumed.
        assert_eq!(to_single_byte(&[b'a', 0xC3]), vec![b'a', 0xC0]);
        assert_eq!(single_byte_len(&[b'a', 0xC3]), 2);
    }

    #[test]
    fn test_three_byte_sequences_are_not_understood() {
        // U+20AC (euro sign) is E2 82 AC: folded as one pair plus a lone lead.
        let out = to_single_byte("€".as_bytes());
        assert_eq!(out.len(), 2);
        assert_ne!(out, vec![0x80]);
    }

    #[test]
    fn test_identity_mode_copies() {
        let mode = CharsetMode::Identity;
        assert_eq!(mode.to_engine(&[0xFC, b'x']), vec![0xFC, b'x']);
        assert_eq!(mode.to_host("ü".as_bytes()), "ü".as_bytes());
        assert_eq!(mode.to_host(b"a\0b"), b"a");
    }

    #[test]
    fn test_convert_mode() {
        let mode = CharsetMode::from_flag(true);
        assert_eq!(mode, CharsetMode::Convert);
        assert_eq!(mode.to_engine(&[0xE9]), "é".as_bytes());
        assert_eq!(mode.to_host("é".as_bytes()), vec![0xE9]);
        assert_eq!(CharsetMode::from_flag(false), CharsetMode::Identity);
    }

    #[test]
    fn test_empty_input() {
        assert!(to_utf8(b"").is_empty());
        assert!(to_single_byte(b"").is_empty());
    }
}
