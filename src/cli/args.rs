//! CLI argument definitions using clap
//!
//! Commands:
//! - pallas serve [--port N]
//! - pallas insert <bucket> <json>
//! - pallas find <bucket> [eq.field=value ...] [select=a,b] [limit=n]
//! - pallas update <bucket> <json> [eq.field=value ...]
//! - pallas delete <bucket> [eq.field=value ...]
//! - pallas buckets
//! - pallas drop

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pallas - a document store on an embedded transactional engine
#[derive(Parser, Debug)]
#[command(name = "pallas")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database name, overrides the configuration file
    #[arg(long, global = true)]
    pub db_name: Option<String>,

    /// Data directory, overrides the configuration file
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the REST API
    Serve {
        /// Port to listen on, overrides the configuration file
        #[arg(long)]
        port: Option<u16>,
    },

    /// Insert one JSON object and print its id
    Insert {
        bucket: String,
        /// Document as a JSON object
        document: String,
    },

    /// Print matching documents
    Find {
        bucket: String,
        /// Filters as `<operator>.<field>=<value>`, plus `select=` and `limit=`
        filters: Vec<String>,
    },

    /// Update matching documents and print them
    Update {
        bucket: String,
        /// Changes as a JSON object
        changes: String,
        filters: Vec<String>,
    },

    /// Delete matching documents and print how many were removed
    Delete {
        bucket: String,
        filters: Vec<String>,
    },

    /// List bucket names
    Buckets,

    /// Remove the database file
    Drop,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
