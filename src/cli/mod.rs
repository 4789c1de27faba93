//! CLI module for pallas
//!
//! Provides command-line interface for:
//! - serve: run the REST API
//! - insert, find, update, delete: one-shot document operations
//! - buckets: list buckets
//! - drop: remove the database file

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    buckets, delete, drop_database, execute, find, insert, resolve_config, run, run_command,
    serve, update,
};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_document, parse_pairs, write_json};
