///
/// # sqlmat - Typed-value bridge between a numeric array host and SQLite
///
/// Moves values between a host that thinks in typed n-dimensional arrays
/// and single-byte strings, and an embedded SQLite engine:
///
/// - `binder` turns host arguments into bound statement parameters
/// - `materializer` steps a statement and builds a record array from its rows
/// - `blob` stores whole arrays in typed BLOBs that remember class, shape
///   and origin platform
/// - `database` ties these together on one connection with one `Config`
///
/// ## Library Usage
///
/// ```rust,ignore
/// use sqlmat::{Config, Database, HostValue, NumericArray};
///
/// let db = Database::open("data.db", Config::default().with_typed_blobs(true))?;
/// db.query("CREATE TABLE m (name TEXT, data BLOB)", &[])?;
/// let matrix = NumericArray::from_elements(vec![2, 2], &[1.0f64, 2.0, 3.0, 4.0])?;
/// db.query(
///     "INSERT INTO m VALUES (?, ?)",
///     &[HostValue::text("eye"), HostValue::Numeric(matrix)],
/// )?;
/// let result = db.query("SELECT * FROM m", &[])?;
/// ```
///
/// ## CLI
///
/// ```sh
/// sqlmat query data.db "SELECT * FROM m WHERE name = ?" eye
/// sqlmat tables data.db
/// sqlmat version
/// ```
///

pub mod array;
pub mod binder;
pub mod blob;
pub mod config;
pub mod database;
pub mod errors;
pub mod functions;
pub mod materializer;
pub mod render;
pub mod row;
pub mod warning;

pub use array::{CharArray, Element, HostValue, NumericArray, QueryOutput, RecordArray};
pub use binder::bind_all;
pub use config::{Config, parse_config, parse_config_str};
pub use database::{Database, sqlite_version};
pub use errors::{Error, Result};
pub use materializer::{Materialized, materialize};
pub use sqlmat_codec::{CharsetMode, ElementType, Endian, Platform};
pub use warning::Warning;
