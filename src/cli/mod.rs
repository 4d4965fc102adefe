//! CLI module
//!
//! Command-line interface over weakly typed records.
//!
//! # Commands
//!
//! - `select` - List records, following pagination
//! - `find` - Fetch one record
//! - `create` - Create a record from a JSON field map
//! - `update` - Patch a record from a JSON field map
//! - `destroy` - Delete a record

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
