//!
//! sqlmat-codec - Charset and Typed BLOB Codecs
//!
//! This crate holds everything in the bridge that works on plain bytes and
//! never needs the SQL engine or the host runtime:
//!
//! - `charset` converts between the host's single-byte strings and the
//!   engine's UTF-8 text (two-byte sequences only)
//! - `element` pins the numeric ids of the element classes stored in BLOBs
//! - `platform` names the running platform and its byte order
//! - `typed_blob` encodes an n-dimensional typed array into a BLOB carrying
//!   its own type, shape and origin, and decodes it back
//!
//! Typed BLOBs are a persisted format. Their header is byte-stable for a
//! given `typed_blob::VERSION`; any layout change needs a version bump and
//! old blobs stop decoding.
//!

pub mod charset;
pub mod element;
pub mod errors;
pub mod platform;
pub mod typed_blob;

pub use charset::CharsetMode;
pub use element::ElementType;
pub use errors::BlobError;
pub use platform::{Endian, Platform};
pub use typed_blob::TypedBlob;
