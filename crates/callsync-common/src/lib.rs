//! Callsync Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities and error handling for the callsync workspace.
//!
//! # Overview
//!
//! - **Error Handling**: Common error type and result alias
//! - **Logging**: `tracing` subscriber setup shared by every binary
//! - **Time**: The `YYYY-MM-DD HH:MM:SS` format used on the data API wire
//!
//! # Example
//!
//! ```no_run
//! use callsync_common::time::{format_datetime, parse_datetime};
//!
//! fn shift(s: &str) -> callsync_common::Result<String> {
//!     let at = parse_datetime(s)?;
//!     Ok(format_datetime(at + chrono::Duration::hours(1)))
//! }
//! ```

pub mod error;
pub mod logging;
pub mod time;

// Re-export commonly used types
pub use error::{CommonError, Result};
