///
/// # Bridge Configuration
///
/// All switches that change how values cross the bridge live in one `Config`
/// value. It is passed to every entry point (binder, materializer, blob
/// bridge, database session) so independent callers never share state.
///
/// ## Example sqlmat.toml
///
/// ```toml
/// convert_utf8 = true          # transcode single-byte host text to UTF-8
/// typed_blobs = false          # store arrays as typed BLOBs
/// null_as_nan = false          # render NULL as NaN instead of []
/// check_unique_fields = true   # make duplicate column names unique
/// busy_timeout_ms = 1000
/// max_blob_size = 2147483647
/// ```
///
/// Every key is optional. Unknown keys are rejected so typos do not go
/// unnoticed.
///

use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlmat_codec::CharsetMode;
use sqlmat_codec::typed_blob::MAX_BLOB_SIZE;

use crate::errors::{Error, Result};

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub convert_utf8: bool,
    pub typed_blobs: bool,
    pub null_as_nan: bool,
    pub check_unique_fields: bool,
    pub busy_timeout_ms: u64,
    pub max_blob_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            convert_utf8: true,
            typed_blobs: false,
            null_as_nan: false,
            check_unique_fields: true,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            max_blob_size: MAX_BLOB_SIZE,
        }
    }
}

impl Config {
    pub fn charset(&self) -> CharsetMode {
        CharsetMode::from_flag(self.convert_utf8)
    }

    pub fn with_typed_blobs(mut self, on: bool) -> Self {
        self.typed_blobs = on;
        self
    }

    pub fn with_null_as_nan(mut self, on: bool) -> Self {
        self.null_as_nan = on;
        self
    }

    pub fn with_convert_utf8(mut self, on: bool) -> Self {
        self.convert_utf8 = on;
        self
    }

    pub fn with_check_unique_fields(mut self, on: bool) -> Self {
        self.check_unique_fields = on;
        self
    }

    pub fn with_max_blob_size(mut self, size: usize) -> Self {
        self.max_blob_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_blob_size > MAX_BLOB_SIZE {
            return Err(Error::Config(format!(
                "max_blob_size {} exceeds the format limit of {} bytes",
                self.max_blob_size, MAX_BLOB_SIZE
            )));
        }
        if self.busy_timeout_ms > i32::MAX as u64 {
            return Err(Error::Config(format!(
                "busy_timeout_ms {} is out of range",
                self.busy_timeout_ms
            )));
        }
        Ok(())
    }
}

pub fn parse_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
