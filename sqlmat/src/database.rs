///
/// Database session.
///
/// Owns one engine connection together with the `Config` every call on it
/// uses. Opening a session applies the busy timeout and registers the
/// extension functions. A session is closed by dropping it, or through
/// `close` to see the engine's close error.
///
/// `query` runs exactly one statement: prepare, bind, step to completion,
/// materialize. The statement is finalized when the call returns, on every
/// path.
///

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::array::{CharArray, HostValue};
use crate::binder;
use crate::config::Config;
use crate::errors::{Error, Result};
use crate::functions;
use crate::materializer::{self, Materialized};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Replacement for the `show tables` shorthand.
pub const SHOW_TABLES_SQL: &str = "SELECT name AS tablename FROM sqlite_master \
     WHERE type IN ('table','view') AND name NOT LIKE 'sqlite_%' \
     UNION ALL SELECT name AS tablename FROM sqlite_temp_master \
     WHERE type IN ('table','view') ORDER BY 1";

/// Version string of the linked SQLite library.
pub fn sqlite_version() -> &'static str {
    rusqlite::version()
}

pub struct Database {
    conn: Connection,
    config: Config,
}

impl Database {
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening database");
        Self::with_connection(Connection::open(path)?, config)
    }

    pub fn open_in_memory(config: Config) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, config)
    }

    fn with_connection(conn: Connection, config: Config) -> Result<Self> {
        config.validate()?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        functions::register(&conn, config.charset())?;
        Ok(Self { conn, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the session configuration for all later calls.
    pub fn set_config(&mut self, config: Config) -> Result<()> {
        config.validate()?;
        if config.busy_timeout_ms != self.config.busy_timeout_ms {
            self.conn
                .busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        }
        if config.charset() != self.config.charset() {
            functions::register(&self.conn, config.charset())?;
        }
        self.config = config;
        Ok(())
    }

    pub fn set_busy_timeout(&mut self, millis: u64) -> Result<()> {
        let config = Config {
            busy_timeout_ms: millis,
            ..self.config.clone()
        };
        self.set_config(config)
    }

    /// Runs one statement with `args` bound to its `?` slots.
    pub fn query(&self, sql: &str, args: &[HostValue]) -> Result<Materialized> {
        let sql = translate_sql(sql);
        debug!(sql = %sql, args = args.len(), "query");
        let mut stmt = self.conn.prepare(sql)?;
        binder::bind_all(&mut stmt, args, &self.config)?;
        materializer::materialize(&mut stmt, &self.config)
    }

    /// Like `query`, with the statement text given as a host string.
    pub fn query_chars(&self, sql: &CharArray, args: &[HostValue]) -> Result<Materialized> {
        let bytes = self.config.charset().to_engine(sql.as_bytes());
        let sql = String::from_utf8(bytes)
            .map_err(|_| Error::InvalidArgument("SQL statement is not valid UTF-8".to_string()))?;
        self.query(&sql, args)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::from(e))
    }
}

/// Expands the `show tables` shorthand; anything else is passed through.
pub fn translate_sql(sql: &str) -> &str {
    let command = sql.trim().trim_end_matches(';').trim_end();
    if command.eq_ignore_ascii_case("show tables") {
        SHOW_TABLES_SQL
    } else {
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::QueryOutput;

    #[test]
    fn test_translate_show_tables() {
        assert_eq!(translate_sql("show tables"), SHOW_TABLES_SQL);
        assert_eq!(translate_sql("  SHOW TABLES; "), SHOW_TABLES_SQL);
        assert_eq!(translate_sql("SELECT 1"), "SELECT 1");
        assert_eq!(translate_sql("show tables_x"), "show tables_x");
    }

    #[test]
    fn test_show_tables_lists_tables_and_views() {
        let db = Database::open_in_memory(Config::default()).unwrap();
        db.connection()
            .execute_batch(
                "CREATE TABLE b (x); CREATE TABLE a (y); CREATE VIEW v AS SELECT x FROM b; \
                 CREATE TEMP TABLE t (z);",
            )
            .unwrap();
        let result = db.query("show tables", &[]).unwrap();
        let records = result.output.records().unwrap();
        assert_eq!(records.fields(), &["tablename"]);
        let names: Vec<String> = records
            .column("tablename")
            .unwrap()
            .filter_map(|v| v.as_text().map(CharArray::to_string_lossy))
            .collect();
        assert_eq!(names, vec!["a", "b", "t", "v"]);
    }

    #[test]
    fn test_show_tables_on_empty_database() {
        let db = Database::open_in_memory(Config::default()).unwrap();
        assert_eq!(db.query("show tables", &[]).unwrap().output, QueryOutput::Empty);
    }

    #[test]
    fn test_query_chars_transcodes_statement() {
        let db = Database::open_in_memory(Config::default()).unwrap();
        let sql = CharArray::new(b"SELECT 'Gr\xFC\xDFe' AS w".to_vec());
        let result = db.query_chars(&sql, &[]).unwrap();
        let records = result.output.records().unwrap();
        assert_eq!(
            records.get(0, "w"),
            Some(&HostValue::Text(CharArray::new(b"Gr\xFC\xDFe".to_vec())))
        );
    }

    #[test]
    fn test_set_busy_timeout_updates_config() {
        let mut db = Database::open_in_memory(Config::default()).unwrap();
        db.set_busy_timeout(50).unwrap();
        assert_eq!(db.config().busy_timeout_ms, 50);
        assert!(db.set_busy_timeout(u64::MAX).is_err());
        assert_eq!(db.config().busy_timeout_ms, 50);
    }

    #[test]
    fn test_set_config_reregisters_functions() {
        let mut db = Database::open_in_memory(Config::default()).unwrap();
        db.set_config(Config::default().with_convert_utf8(false)).unwrap();
        let result = db.query("SELECT regex('abc', 'b') AS m", &[]).unwrap();
        assert_eq!(
            result.output.records().unwrap().get(0, "m"),
            Some(&HostValue::text("b"))
        );
    }

    #[test]
    fn test_versions() {
        assert!(!VERSION.is_empty());
        assert!(sqlite_version().starts_with('3'));
    }

    #[test]
    fn test_close() {
        let db = Database::open_in_memory(Config::default()).unwrap();
        assert!(db.close().is_ok());
    }
}
