///
/// sqlmat CLI - run SQL against a SQLite file through the typed-value bridge
///
/// Commands:
/// - sqlmat query <db> <sql> [args...]: run one statement, print the records
/// - sqlmat tables <db>: list tables and views
/// - sqlmat version: print tool and SQLite versions
///
/// Arguments that parse as numbers are bound as double scalars, `null` and
/// the empty string as empty values, anything else as text. Text arguments
/// and text results use the session's charset mode: single-byte host strings
/// when converting, UTF-8 bytes as given with `--no-convert-utf8`.
///

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::warn;

use sqlmat::database::VERSION;
use sqlmat::render::{render_json, render_text};
use sqlmat::{
    CharArray, CharsetMode, Config, Database, HostValue, Materialized, parse_config,
    sqlite_version,
};

#[derive(Parser)]
#[command(name = "sqlmat")]
#[command(author, version, about = "Typed-value bridge to SQLite", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one SQL statement and print its result
    Query {
        /// Database file (created if missing)
        database: PathBuf,

        /// SQL statement, `?` marks a parameter slot
        sql: String,

        /// Parameter values, one per slot
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,

        #[command(flatten)]
        options: SessionOptions,
    },

    /// List tables and views
    Tables {
        database: PathBuf,

        #[command(flatten)]
        options: SessionOptions,
    },

    /// Print version information
    Version,
}

#[derive(Args)]
struct SessionOptions {
    /// TOML file with bridge settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Store and read arrays as typed BLOBs
    #[arg(long)]
    typed_blobs: bool,

    /// Render NULL as NaN instead of []
    #[arg(long)]
    null_as_nan: bool,

    /// Pass text through without UTF-8 conversion
    #[arg(long)]
    no_convert_utf8: bool,

    /// Keep duplicate column names as they are
    #[arg(long)]
    no_unique_fields: bool,

    /// Busy timeout in milliseconds
    #[arg(long)]
    busy_timeout: Option<u64>,

    /// Print records as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            database,
            sql,
            args,
            options,
        } => {
            run_query(&database, &sql, &args, &options);
        }
        Commands::Tables { database, options } => {
            run_query(&database, "show tables", &[], &options);
        }
        Commands::Version => {
            println!("sqlmat {} (SQLite {})", VERSION, sqlite_version());
        }
    }
}

fn run_query(database: &Path, sql: &str, args: &[String], options: &SessionOptions) {
    let config = match load_config(options) {
        Ok(c) => c,
        Err(e) => fail(&e),
    };
    let charset = config.charset();
    let args: Vec<HostValue> = args.iter().map(|a| parse_argument(a, charset)).collect();

    let db = match Database::open(database, config) {
        Ok(db) => db,
        Err(e) => fail(&e),
    };

    match db.query(sql, &args) {
        Ok(result) => print_result(&result, charset, options.json),
        Err(e) => fail(&e),
    }
}

fn load_config(options: &SessionOptions) -> sqlmat::Result<Config> {
    let mut config = match &options.config {
        Some(path) => parse_config(path)?,
        None => Config::default(),
    };
    if options.typed_blobs {
        config.typed_blobs = true;
    }
    if options.null_as_nan {
        config.null_as_nan = true;
    }
    if options.no_convert_utf8 {
        config.convert_utf8 = false;
    }
    if options.no_unique_fields {
        config.check_unique_fields = false;
    }
    if let Some(millis) = options.busy_timeout {
        config.busy_timeout_ms = millis;
    }
    Ok(config)
}

fn print_result(result: &Materialized, charset: CharsetMode, json: bool) {
    if json {
        match serde_json::to_string_pretty(&render_json(&result.output, charset)) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", render_text(&result.output, charset));
    }
}

fn fail(e: &sqlmat::Error) -> ! {
    eprintln!("error [{}]: {}", e.identifier(), e);
    std::process::exit(1);
}

/// Host value for one command-line argument.
fn parse_argument(arg: &str, charset: CharsetMode) -> HostValue {
    if arg.is_empty() || arg == "null" {
        return HostValue::empty();
    }
    if let Ok(v) = arg.parse::<f64>() {
        return HostValue::double(v);
    }
    match charset {
        CharsetMode::Identity => HostValue::Text(CharArray::new(arg.as_bytes().to_vec())),
        CharsetMode::Convert => {
            if arg.chars().any(|c| u32::from(c) > 0xFF) {
                warn!("argument {:?} has characters outside Latin-1, bound as '?'", arg);
            }
            HostValue::text(arg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_argument() {
        let charset = CharsetMode::Convert;
        assert_eq!(parse_argument("42", charset), HostValue::double(42.0));
        assert_eq!(parse_argument("-1.5e3", charset), HostValue::double(-1500.0));
        assert_eq!(parse_argument("null", charset), HostValue::empty());
        assert_eq!(parse_argument("", charset), HostValue::empty());
        assert_eq!(parse_argument("eye", charset), HostValue::text("eye"));
    }

    fn round_trip(arg: &str, config: Config) -> (String, String) {
        let charset = config.charset();
        let db = Database::open_in_memory(config).unwrap();
        let result = db
            .query("SELECT hex(?1) AS h, ?1 AS s", &[parse_argument(arg, charset)])
            .unwrap();
        let records = result.output.records().unwrap();
        let hex = match records.get(0, "h") {
            Some(HostValue::Text(t)) => t.to_string_lossy(),
            other => panic!("Expected text, got {:?}", other),
        };
        (hex, render_text(&result.output, charset))
    }

    #[test]
    fn test_non_ascii_argument_without_conversion() {
        let config = Config::default().with_convert_utf8(false);
        let (hex, text) = round_trip("Jörg", config.clone());
        assert_eq!(hex, "4AC3B67267");
        assert!(text.contains("s: Jörg\n"));

        let (hex, text) = round_trip("€", config);
        assert_eq!(hex, "E282AC");
        assert!(text.contains("s: €\n"));
    }

    #[test]
    fn test_non_ascii_argument_with_conversion() {
        let (hex, text) = round_trip("Jörg", Config::default());
        assert_eq!(hex, "4AC3B67267");
        assert!(text.contains("s: Jörg\n"));
    }

    #[test]
    fn test_engine_text_renders_in_identity_mode() {
        let config = Config::default().with_convert_utf8(false);
        let charset = config.charset();
        let db = Database::open_in_memory(config).unwrap();
        let result = db.query("SELECT 'Jörg' AS s", &[]).unwrap();
        assert_eq!(render_text(&result.output, charset), "s: Jörg\n");
    }

    #[test]
    fn test_cli_parses_query() {
        let cli = Cli::try_parse_from([
            "sqlmat", "query", "--typed-blobs", "--json", "db.sqlite", "SELECT ?", "-1",
        ])
        .unwrap();
        match cli.command {
            Commands::Query { sql, args, options, .. } => {
                assert_eq!(sql, "SELECT ?");
                assert_eq!(args, vec!["-1"]);
                assert!(options.typed_blobs);
                assert!(options.json);
                let config = load_config(&options).unwrap();
                assert!(config.typed_blobs);
                assert!(config.convert_utf8);
            }
            _ => panic!("Expected query command"),
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sqlmat.toml");
        std::fs::write(&path, "null_as_nan = true\nconvert_utf8 = true\n").unwrap();
        let options = SessionOptions {
            config: Some(path),
            typed_blobs: false,
            null_as_nan: false,
            no_convert_utf8: true,
            no_unique_fields: false,
            busy_timeout: Some(10),
            json: false,
        };
        let config = load_config(&options).unwrap();
        assert!(config.null_as_nan);
        assert!(!config.convert_utf8);
        assert_eq!(config.busy_timeout_ms, 10);
    }
}
