//! Translate flat, query-string friendly parameters into document-store
//! queries.
//!
//! Two builders share one [`Dictionary`] of public field names to storage
//! paths and one operator grammar (`>`, `>:`, `<`, `<:`, `!`):
//!
//! - [`QueryBuilder`] turns a [`QueryParams`] bag into a [`ChainQuery`]
//!   (filter, sort, skip, limit, projection).
//! - [`AutoQuery`] turns string-encoded stage parameters into an ordered list
//!   of aggregation [`Stage`]s.
//!
//! Neither executes anything; the caller hands the result to its store.

pub mod config;
pub mod dictionary;
pub mod errors;
pub mod logger;
pub mod pipeline;
pub mod query;
pub mod schema;

pub use crate::config::{BuilderConfig, PipelineDefaults};
pub use crate::dictionary::Dictionary;
pub use crate::errors::QueryError;
pub use crate::pipeline::{AutoQuery, Stage};
pub use crate::query::{ChainQuery, QueryBuilder, QueryParams};
pub use crate::schema::{FieldKind, Model, Schema};

/// Initializes logging from the `AUTOQUERY_LOG_*` environment variables.
///
/// # Errors
/// Returns an error if the log appenders cannot be created.
pub fn init() -> Result<(), QueryError> {
    logger::configure_from_env()
}
