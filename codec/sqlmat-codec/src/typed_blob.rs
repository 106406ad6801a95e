///
/// Typed BLOB container.
///
/// A typed BLOB stores an n-dimensional array together with its element
/// type, shape and the platform that wrote it, so it can be read back as the
/// same array on another machine or in another session.
///
/// ## Layout
///
/// | offset   | size | field                                        |
/// |----------|------|----------------------------------------------|
/// | 0        | 13   | magic `"mkSQLite.tbh"` and a NUL             |
/// | 13       | 1    | padding                                      |
/// | 14       | 2    | header size, doubles as version (i16 = 36)   |
/// | 16       | 4    | element type id (i32)                        |
/// | 20       | 11   | platform name, NUL padded                    |
/// | 31       | 1    | byte order flag, `'L'` or `'B'`              |
/// | 32       | 4    | dimension count `n` (i32)                    |
/// | 36       | 4·n  | one size per dimension (i32)                 |
/// | 36 + 4·n | ...  | raw elements, copied verbatim                |
///
/// Header integers use the writer's byte order. The order flag sits at a
/// fixed offset, so a reader on any machine can parse the header. The
/// payload is never byte-swapped: a blob from a machine with the other byte
/// order decodes to reinterpreted numbers, and the reader is only told that
/// the origin differs.
///
/// The version field must equal `VERSION` exactly. There is no partial or
/// forward compatibility.
///

use crate::element::ElementType;
use crate::errors::BlobError;
use crate::platform::{Endian, Platform, PLATFORM_NAME_LEN};

pub const MAGIC: &[u8; 13] = b"mkSQLite.tbh\0";

/// Size of the fixed header including the first dimension slot.
pub const HEADER_SIZE: usize = 36;

pub const VERSION: i16 = HEADER_SIZE as i16;

/// Largest blob the format can describe.
pub const MAX_BLOB_SIZE: usize = i32::MAX as usize;

const VERSION_OFFSET: usize = 14;
const ELEMENT_TYPE_OFFSET: usize = 16;
const PLATFORM_OFFSET: usize = 20;
const ENDIAN_OFFSET: usize = 31;
const DIMS_OFFSET: usize = 32;

/// Offset of the first payload byte for `dims` dimensions.
pub const fn header_offset(dims: usize) -> usize {
    DIMS_OFFSET + 4 * (dims + 1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedBlob {
    pub element_type: ElementType,
    pub dims: Vec<usize>,
    pub data: Vec<u8>,
    pub platform: String,
    pub endian: Endian,
}

impl TypedBlob {
    pub fn element_count(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn origin(&self) -> Platform {
        Platform::new(&self.platform, self.endian)
    }

    /// True when the blob was written on a different platform or byte order.
    pub fn origin_differs(&self, host: &Platform) -> bool {
        self.endian != host.endian() || self.platform != host.name()
    }
}

/// Encode with the running platform as origin.
pub fn encode(
    element_type: ElementType,
    dims: &[usize],
    data: &[u8],
    max_size: usize,
) -> Result<Vec<u8>, BlobError> {
    encode_for(&Platform::current(), element_type, dims, data, max_size)
}

/// Encode as if written on `origin`, header integers in its byte order.
pub fn encode_for(
    origin: &Platform,
    element_type: ElementType,
    dims: &[usize],
    data: &[u8],
    max_size: usize,
) -> Result<Vec<u8>, BlobError> {
    let payload = payload_size(element_type, dims);
    let total = payload.and_then(|p| p.checked_add(header_offset(dims.len())));
    let (payload, total) = match (payload, total) {
        (Some(payload), Some(total)) => (payload, total),
        _ => {
            return Err(BlobError::SizeExceeded {
                size: usize::MAX,
                max: max_size,
            });
        }
    };

    let limit = max_size.min(MAX_BLOB_SIZE);
    let oversized_dim = dims.iter().any(|&d| d > i32::MAX as usize);
    if total > limit || oversized_dim {
        return Err(BlobError::SizeExceeded {
            size: total,
            max: limit,
        });
    }

    if data.len() != payload {
        return Err(BlobError::LengthMismatch {
            expected: payload,
            actual: data.len(),
        });
    }

    let mut blob = Vec::new();
    blob.try_reserve_exact(total)
        .map_err(|_| BlobError::OutOfMemory { size: total })?;

    let endian = origin.endian();
    blob.extend_from_slice(MAGIC);
    blob.push(0);
    put_i16(&mut blob, VERSION, endian);
    put_i32(&mut blob, element_type.id(), endian);

    let mut platform = [0u8; PLATFORM_NAME_LEN + 1];
    let name = origin.name().as_bytes();
    let len = name.len().min(PLATFORM_NAME_LEN);
    platform[..len].copy_from_slice(&name[..len]);
    blob.extend_from_slice(&platform);
    blob.push(endian.flag());

    put_i32(&mut blob, dims.len() as i32, endian);
    for &d in dims {
        put_i32(&mut blob, d as i32, endian);
    }
    debug_assert_eq!(blob.len(), header_offset(dims.len()));

    blob.extend_from_slice(data);
    Ok(blob)
}

pub fn decode(blob: &[u8]) -> Result<TypedBlob, BlobError> {
    if blob.len() < HEADER_SIZE {
        return Err(BlobError::UnsupportedHeader(format!(
            "{} bytes is shorter than the {} byte header",
            blob.len(),
            HEADER_SIZE
        )));
    }

    if &blob[..MAGIC.len()] != MAGIC {
        return Err(BlobError::BadMagic);
    }

    let endian = Endian::from_flag(blob[ENDIAN_OFFSET]).ok_or_else(|| {
        BlobError::UnsupportedHeader(format!(
            "invalid byte order flag 0x{:02x}",
            blob[ENDIAN_OFFSET]
        ))
    })?;

    let version = read_i16(blob, VERSION_OFFSET, endian);
    if version != VERSION {
        return Err(BlobError::UnsupportedVersion {
            found: version,
            expected: VERSION,
        });
    }

    let id = read_i32(blob, ELEMENT_TYPE_OFFSET, endian);
    let element_type = ElementType::from_id(id).ok_or(BlobError::UnknownElementType(id))?;

    let platform_field = &blob[PLATFORM_OFFSET..PLATFORM_OFFSET + PLATFORM_NAME_LEN];
    let platform_len = memchr::memchr(0, platform_field).unwrap_or(PLATFORM_NAME_LEN);
    let platform = String::from_utf8_lossy(&platform_field[..platform_len]).into_owned();

    let ndims = read_i32(blob, DIMS_OFFSET, endian);
    if ndims < 0 {
        return Err(BlobError::UnsupportedHeader(format!(
            "negative dimension count {}",
            ndims
        )));
    }
    let ndims = ndims as usize;
    let data_offset = header_offset(ndims);
    if blob.len() < data_offset {
        return Err(BlobError::UnsupportedHeader(format!(
            "dimension table for {} dimensions is truncated",
            ndims
        )));
    }

    let mut dims = Vec::with_capacity(ndims);
    for i in 0..ndims {
        let d = read_i32(blob, DIMS_OFFSET + 4 * (i + 1), endian);
        if d < 0 {
            return Err(BlobError::UnsupportedHeader(format!(
                "negative size {} for dimension {}",
                d,
                i + 1
            )));
        }
        dims.push(d as usize);
    }

    let payload = &blob[data_offset..];
    match payload_size(element_type, &dims) {
        Some(expected) if expected == payload.len() => {}
        expected => {
            return Err(BlobError::SizeMismatch {
                expected: expected.unwrap_or(usize::MAX),
                actual: payload.len(),
            });
        }
    }

    let mut data = Vec::new();
    data.try_reserve_exact(payload.len())
        .map_err(|_| BlobError::OutOfMemory { size: payload.len() })?;
    data.extend_from_slice(payload);

    Ok(TypedBlob {
        element_type,
        dims,
        data,
        platform,
        endian,
    })
}

fn payload_size(element_type: ElementType, dims: &[usize]) -> Option<usize> {
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))?
        .checked_mul(element_type.size())
}

fn put_i16(buf: &mut Vec<u8>, value: i16, endian: Endian) {
    match endian {
        Endian::Little => buf.extend_from_slice(&value.to_le_bytes()),
        Endian::Big => buf.extend_from_slice(&value.to_be_bytes()),
    }
}

fn put_i32(buf: &mut Vec<u8>, value: i32, endian: Endian) {
    match endian {
        Endian::Little => buf.extend_from_slice(&value.to_le_bytes()),
        Endian::Big => buf.extend_from_slice(&value.to_be_bytes()),
    }
}

fn read_i16(buf: &[u8], offset: usize, endian: Endian) -> i16 {
    let bytes = [buf[offset], buf[offset + 1]];
    match endian {
        Endian::Little => i16::from_le_bytes(bytes),
        Endian::Big => i16::from_be_bytes(bytes),
    }
}

fn read_i32(buf: &[u8], offset: usize, endian: Endian) -> i32 {
    let bytes = [buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]];
    match endian {
        Endian::Little => i32::from_le_bytes(bytes),
        Endian::Big => i32::from_be_bytes(bytes),
    }
}
