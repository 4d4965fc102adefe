//! # Airtable Client
//!
//! An async client for the Airtable REST API that maps records onto typed
//! Rust values.
//!
//! ## Features
//!
//! - **Typed Records**: explicit per-type schemas with field aliases
//! - **Weak Records**: [`RecordItem`] keeps raw fields for ad-hoc access
//! - **Pagination**: `select` follows the `offset` cursor to the end
//! - **Rate Limiting**: five requests per second per client by default
//! - **Pluggable Converters**: swap the date format or any other coercion
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use airtable_client::{Airtable, Configuration, Query, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let airtable = Airtable::new(Configuration::new("keyXXXX"))?;
//!     let movies = airtable.base("appXXXX")?.table::<Movie>("Movies")?;
//!
//!     for movie in movies.select(&Query::with_view("Main View")).await? {
//!         println!("{movie:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Airtable ──► Base ──► Table<T>
//!                          │
//!          ┌───────────────┼────────────────┐
//!          │               │                │
//!   RequestBuilder     Transport       FieldMapper
//!   (URL + params)   (reqwest, rate   (Schema + converters)
//!                     limit, auth)
//!                          │
//!                      classify
//!                 (status → ApiError)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ref_option)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::type_complexity)]
#![allow(clippy::unused_async)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Status and error body classification
pub mod classify;

/// Connection settings
pub mod config;

/// List query parameters
pub mod query;

/// Request construction
pub mod request;

/// Record-to-object mapping
pub mod mapping;

/// Transport and rate limiting
pub mod http;

/// Airtable, Base and Table
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use classify::{ApiError, ErrorKind};
pub use client::{Airtable, Base, Table};
pub use config::Configuration;
pub use mapping::{Attachment, Entity, FieldMapper, RecordItem, Schema, Thumbnail, Thumbnails};
pub use query::{Query, Sort, SortDirection};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
