//! JSON I/O handling for CLI
//!
//! Results go to stdout as one JSON value per line.

use std::io::{self, Write};

use serde::Serialize;

use crate::document::Document;

use super::errors::{CliError, CliResult};

/// Parse a JSON object argument into a document
pub fn parse_document(text: &str) -> CliResult<Document> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Document::from_json(value)
        .ok_or_else(|| CliError::invalid_argument("document must be a JSON object"))
}

/// Split `key=value` arguments at the first `=`
pub fn parse_pairs(args: &[String]) -> CliResult<Vec<(String, String)>> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| {
                    CliError::invalid_argument(format!("expected key=value, got '{}'", arg))
                })
        })
        .collect()
}

/// Write a JSON result to stdout
pub fn write_json<T: Serialize>(data: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    write_json_to(&mut stdout, data)
}

fn write_json_to<W: Write, T: Serialize>(writer: &mut W, data: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, data)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
