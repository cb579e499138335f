//! CLI command implementations
//!
//! Each command loads the config, opens the configured backend, performs one
//! operation, closes the store and returns the JSON payload to print.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::{Backend, StoreConfig};
use crate::observability::{DiagnosticSink, Event, JsonLogger};
use crate::store::{open_store, AolConfig, AppendLogStore, Store};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments, run the command and print its response
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let data = run_command(cli.command)?;
    write_response(data)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Init { config, data_dir } => init(&config, &data_dir),
        Command::Get { key, config } => get(&config, &key),
        Command::Put { key, value, config } => put(&config, &key, &value),
        Command::Delete { key, config } => delete(&config, &key),
        Command::Scan { config } => scan(&config),
    }
}

/// Write a default config if none exists, then create the log file.
pub fn init(config_path: &Path, data_dir: &Path) -> CliResult<Value> {
    let created = !config_path.exists();
    let config = if created {
        let config = StoreConfig::new(data_dir);
        config.save(config_path)?;
        config
    } else {
        StoreConfig::load(config_path)?
    };

    with_store(&config, |_| Ok(()))?;

    Ok(json!({
        "config": config_path.display().to_string(),
        "config_created": created,
        "data_dir": config.data_dir.display().to_string(),
    }))
}

pub fn get(config_path: &Path, key: &str) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let value = with_store(&config, |store| Ok(store.get(key)?))?;

    Ok(json!({
        "key": key,
        "value": String::from_utf8_lossy(&value),
    }))
}

pub fn put(config_path: &Path, key: &str, value: &str) -> CliResult<Value> {
    let config = load_config(config_path)?;
    with_store(&config, |store| Ok(store.put(key, value.as_bytes())?))?;

    Ok(json!({ "key": key }))
}

pub fn delete(config_path: &Path, key: &str) -> CliResult<Value> {
    let config = load_config(config_path)?;
    with_store(&config, |store| Ok(store.delete(key)?))?;

    Ok(json!({ "key": key }))
}

/// List every frame of the append log with its offset.
///
/// A terminal scan error is reported in the payload rather than failing the
/// command, so the frames before it are still shown.
pub fn scan(config_path: &Path) -> CliResult<Value> {
    let config = load_config(config_path)?;
    if config.backend != Backend::AppendLog {
        return Err(CliError::config_error(
            "scan is only available for the append_log backend",
        ));
    }

    let store = AppendLogStore::open(
        AolConfig::new(&config.data_dir)
            .with_max_record_size(config.max_record_size)
            .with_async_writes(config.async_writes),
        sink_for(&config),
    )?;

    let mut scanner = store.scan()?;
    let mut frames = Vec::new();
    loop {
        let offset = scanner.offset();
        let Some(record) = scanner.advance() else {
            break;
        };
        frames.push(json!({
            "offset": offset,
            "kind": record.kind().as_str(),
            "key": String::from_utf8_lossy(record.key()),
            "value_len": record.value().len(),
        }));
    }

    let error = scanner.error().map(|err| {
        json!({
            "code": err.code(),
            "message": err.to_string(),
            "offset": scanner.offset(),
        })
    });
    let count = scanner.records_read();
    store.close()?;

    Ok(json!({
        "path": store.path().display().to_string(),
        "count": count,
        "frames": frames,
        "error": error,
    }))
}

fn load_config(config_path: &Path) -> CliResult<StoreConfig> {
    let config = StoreConfig::load(config_path)?;
    sink_for(&config).event(
        Event::ConfigLoaded,
        &[("path", config_path.display().to_string().as_str())],
    );
    Ok(config)
}

/// CLI diagnostics go to stderr so stdout carries only the response.
fn sink_for(config: &StoreConfig) -> Arc<dyn DiagnosticSink> {
    Arc::new(JsonLogger::stderr_only(config.log_level))
}

/// Open the configured store, run `op`, and close the store on every path.
fn with_store<T>(
    config: &StoreConfig,
    op: impl FnOnce(&dyn Store) -> CliResult<T>,
) -> CliResult<T> {
    let store = open_store(config, sink_for(config))?;
    let result = op(store.as_ref());
    store.close()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use crate::observability::Severity;
    use std::fs::{self, OpenOptions};
    use std::io::Write;
    use tempfile::TempDir;

    fn init_quiet(temp_dir: &TempDir) -> std::path::PathBuf {
        let config_path = temp_dir.path().join("kallbazdb.json");
        let mut config = StoreConfig::new(temp_dir.path().join("data"));
        config.log_level = Severity::Error;
        config.save(&config_path).unwrap();
        init(&config_path, &temp_dir.path().join("ignored")).unwrap();
        config_path
    }

    #[test]
    fn test_init_writes_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("kallbazdb.json");
        let data_dir = temp_dir.path().join("data");

        let data = init(&config_path, &data_dir).unwrap();

        assert_eq!(data["config_created"], true);
        assert!(config_path.exists());
        assert!(data_dir.join("store.db").exists());
        assert_eq!(StoreConfig::load(&config_path).unwrap().data_dir, data_dir);
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = init_quiet(&temp_dir);

        let data = init(&config_path, &temp_dir.path().join("other")).unwrap();
        assert_eq!(data["config_created"], false);
        assert!(!temp_dir.path().join("other").exists());
    }

    #[test]
    fn test_put_get_delete() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = init_quiet(&temp_dir);

        put(&config_path, "name", "mohamed").unwrap();
        let data = get(&config_path, "name").unwrap();
        assert_eq!(data["value"], "mohamed");

        delete(&config_path, "name").unwrap();
        let err = get(&config_path, "name").unwrap_err();
        assert_eq!(err.code(), CliErrorCode::NotFound);
    }

    #[test]
    fn test_scan_lists_frames() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = init_quiet(&temp_dir);

        put(&config_path, "name", "mohamed").unwrap();
        delete(&config_path, "name").unwrap();

        let data = scan(&config_path).unwrap();
        assert_eq!(data["count"], 2);
        assert_eq!(data["frames"][0]["offset"], 0);
        assert_eq!(data["frames"][0]["kind"], "VALUE");
        assert_eq!(data["frames"][1]["offset"], 24);
        assert_eq!(data["frames"][1]["kind"], "TOMBSTONE");
        assert!(data["error"].is_null());
    }

    #[test]
    fn test_scan_reports_torn_tail() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = init_quiet(&temp_dir);
        put(&config_path, "name", "mohamed").unwrap();

        let log_path = temp_dir.path().join("data").join("store.db");
        let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
        file.write_all(&[0u8; 3]).unwrap();

        let data = scan(&config_path).unwrap();
        assert_eq!(data["count"], 1);
        assert_eq!(data["error"]["code"], "KALLBAZ_INSUFFICIENT_DATA");
        assert_eq!(data["error"]["offset"], 24);
    }

    #[test]
    fn test_scan_rejects_memory_backend() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("kallbazdb.json");
        let mut config = StoreConfig::new(temp_dir.path());
        config.backend = Backend::Memory;
        config.save(&config_path).unwrap();

        let err = scan(&config_path).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::ConfigError);
    }

    #[test]
    fn test_oversized_put_is_bad_request() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("kallbazdb.json");
        let mut config = StoreConfig::new(temp_dir.path().join("data"));
        config.max_record_size = 4;
        config.log_level = Severity::Error;
        config.save(&config_path).unwrap();

        let err = put(&config_path, "key", "value").unwrap_err();
        assert_eq!(err.code(), CliErrorCode::BadRequest);
        assert_eq!(
            fs::metadata(temp_dir.path().join("data").join("store.db"))
                .unwrap()
                .len(),
            0
        );
    }

    #[test]
    fn test_missing_config_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = get(&temp_dir.path().join("absent.json"), "k").unwrap_err();
        assert_eq!(err.code(), CliErrorCode::ConfigError);
    }
}
