//! CLI command implementations
//!
//! One-shot commands open the store, run exactly one operation, print the
//! result as JSON and close the store. Log lines go to stderr for these so
//! stdout carries only the result.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value as JsonValue};

use crate::observability::{log_event, Event, Logger};
use crate::query::Query;
use crate::rest_api::{ApiServer, FilterParams};
use crate::store::Store;

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{parse_document, parse_pairs, write_json};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = resolve_config(cli.config, cli.db_name, cli.data_dir)?;
    run_command(config, cli.command)
}

/// Loads the configuration file, if any, and applies flag overrides
pub fn resolve_config(
    path: Option<PathBuf>,
    db_name: Option<String>,
    data_dir: Option<PathBuf>,
) -> CliResult<Config> {
    let mut config = match path {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    if let Some(name) = db_name {
        config.db_name = name;
    }
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    config.validate()?;
    Ok(config)
}

/// Run the appropriate command based on CLI args
pub fn run_command(config: Config, cmd: Command) -> CliResult<()> {
    Logger::set_min_severity(config.severity()?);

    match cmd {
        Command::Serve { port } => {
            log_config(&config);
            serve(config, port)
        }
        other => {
            Logger::set_stderr_only(true);
            log_config(&config);
            let output = execute(&config, other)?;
            write_json(&output)
        }
    }
}

fn log_config(config: &Config) {
    let data_dir = config.data_dir.display().to_string();
    log_event(
        Event::ConfigLoaded,
        &[
            ("db", &config.db_name),
            ("data_dir", &data_dir),
            ("log_level", &config.log_level),
        ],
    );
}

/// Runs a one-shot command and returns its JSON result
pub fn execute(config: &Config, cmd: Command) -> CliResult<JsonValue> {
    match cmd {
        Command::Serve { .. } => Err(CliError::invalid_argument(
            "serve is not a one-shot command",
        )),
        Command::Insert { bucket, document } => insert(config, &bucket, &document),
        Command::Find { bucket, filters } => find(config, &bucket, &filters),
        Command::Update {
            bucket,
            changes,
            filters,
        } => update(config, &bucket, &changes, &filters),
        Command::Delete { bucket, filters } => delete(config, &bucket, &filters),
        Command::Buckets => buckets(config),
        Command::Drop => drop_database(config),
    }
}

fn open_store(config: &Config) -> CliResult<Store> {
    Ok(Store::open(config.store_options())?)
}

fn filtered<'a>(
    store: &'a Store,
    bucket: &str,
    config: &Config,
    args: &[String],
) -> CliResult<Query<'a>> {
    let pairs = parse_pairs(args)?;
    let params = FilterParams::parse(&pairs, &config.http.equality_operator)?;

    let mut query = store
        .bucket(bucket)
        .equal(params.filters)
        .select(params.select);
    if let Some(limit) = params.limit {
        query = query.limit(limit);
    }
    Ok(query)
}

/// Insert one document
pub fn insert(config: &Config, bucket: &str, document: &str) -> CliResult<JsonValue> {
    let document = parse_document(document)?;
    let store = open_store(config)?;
    let id = store.bucket(bucket).insert(document)?;
    Ok(json!({ "id": id }))
}

/// Find matching documents
pub fn find(config: &Config, bucket: &str, filters: &[String]) -> CliResult<JsonValue> {
    let store = open_store(config)?;
    let documents = filtered(&store, bucket, config, filters)?.find()?;
    Ok(serde_json::to_value(documents)?)
}

/// Update matching documents
pub fn update(
    config: &Config,
    bucket: &str,
    changes: &str,
    filters: &[String],
) -> CliResult<JsonValue> {
    let changes = parse_document(changes)?;
    let store = open_store(config)?;
    let documents = filtered(&store, bucket, config, filters)?.update(changes)?;
    Ok(serde_json::to_value(documents)?)
}

/// Delete matching documents
pub fn delete(config: &Config, bucket: &str, filters: &[String]) -> CliResult<JsonValue> {
    let store = open_store(config)?;
    let deleted = filtered(&store, bucket, config, filters)?.delete()?;
    Ok(json!({ "deleted": deleted }))
}

/// List buckets
pub fn buckets(config: &Config) -> CliResult<JsonValue> {
    let store = open_store(config)?;
    Ok(serde_json::to_value(store.bucket_names()?)?)
}

/// Remove the database file
pub fn drop_database(config: &Config) -> CliResult<JsonValue> {
    let path = config.store_options().database_path();
    let store = open_store(config)?;
    store.destroy()?;
    Ok(json!({ "dropped": path.display().to_string() }))
}

/// Serve the REST API until interrupted
pub fn serve(config: Config, port: Option<u16>) -> CliResult<()> {
    let mut http = config.http.clone();
    if let Some(port) = port {
        http.port = port;
    }

    let store = Arc::new(open_store(&config)?);
    let server = ApiServer::new(store, http);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir) -> Config {
        resolve_config(None, Some("cli".to_string()), Some(temp_dir.path().to_path_buf()))
            .unwrap()
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_insert_find_update_delete() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir);

        assert_eq!(
            insert(&config, "users", r#"{"name":"Foo","age":10}"#).unwrap(),
            json!({"id": 1})
        );
        assert_eq!(
            insert(&config, "users", r#"{"name":"Bar","age":20}"#).unwrap(),
            json!({"id": 2})
        );

        let found = find(&config, "users", &args(&["eq.age=20", "select=name"])).unwrap();
        assert_eq!(found, json!([{"name": "Bar"}]));

        let updated = update(&config, "users", r#"{"age":21}"#, &args(&["eq.id=2"])).unwrap();
        assert_eq!(updated, json!([{"id": 2, "name": "Bar", "age": 21}]));

        let deleted = delete(&config, "users", &args(&["eq.name=Foo"])).unwrap();
        assert_eq!(deleted, json!({"deleted": 1}));

        assert_eq!(buckets(&config).unwrap(), json!(["users"]));
    }

    #[test]
    fn test_find_unknown_bucket_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir);
        let err = find(&config, "ghosts", &[]).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::StoreFailed);
    }

    #[test]
    fn test_bad_filter_argument() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir);
        insert(&config, "users", r#"{"name":"Foo"}"#).unwrap();

        let err = find(&config, "users", &args(&["name=Foo"])).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidArgument);
    }

    #[test]
    fn test_drop_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir);
        insert(&config, "users", r#"{"name":"Foo"}"#).unwrap();

        let path = config.store_options().database_path();
        assert!(path.exists());
        execute(&config, Command::Drop).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_flags_override_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir);
        assert_eq!(config.db_name, "cli");
        assert_eq!(config.data_dir, temp_dir.path());
    }
}
