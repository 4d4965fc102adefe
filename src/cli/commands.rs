//! CLI commands and argument parsing

use clap::{Parser, Subcommand};

/// Airtable command-line client
#[derive(Parser, Debug)]
#[command(name = "airtable-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API key (defaults to AIRTABLE_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Base id (defaults to AIRTABLE_BASE)
    #[arg(short, long, global = true)]
    pub base: Option<String>,

    /// Endpoint URL (defaults to AIRTABLE_ENDPOINT_URL or the public API)
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List records of a table
    Select {
        /// Table name
        table: String,

        /// View name or id
        #[arg(long)]
        view: Option<String>,

        /// Filter formula
        #[arg(long)]
        formula: Option<String>,

        /// Maximum records to return
        #[arg(long)]
        max_records: Option<u32>,

        /// Records per page (at most 100)
        #[arg(long)]
        page_size: Option<u32>,

        /// Field to return (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Sort key as `field` or `field:asc|desc` (repeatable)
        #[arg(long)]
        sort: Vec<String>,
    },

    /// Fetch one record
    Find {
        /// Table name
        table: String,
        /// Record id
        id: String,
    },

    /// Create a record
    Create {
        /// Table name
        table: String,

        /// Field values as a JSON object
        #[arg(long)]
        fields_json: String,
    },

    /// Update a record
    Update {
        /// Table name
        table: String,
        /// Record id
        id: String,

        /// Field values as a JSON object
        #[arg(long)]
        fields_json: String,
    },

    /// Delete a record
    Destroy {
        /// Table name
        table: String,
        /// Record id
        id: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Human-readable output
    Pretty,
}
