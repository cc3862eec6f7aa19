//! Callsync Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Pulls call-tracking reports from the data API, validates each row against
//! the declared field catalog, stores rows idempotently and downloads call
//! recordings that are not on disk yet.
//!
//! # Modules
//!
//! - **catalog**: fields requested per report type
//! - **transform**: row validation and suffix-driven type coercion
//! - **rpc**: JSON-RPC transport and data API client
//! - **store**: insert-if-absent persistence (PostgreSQL, in-memory)
//! - **media**: recording location and existence-checked download
//! - **sync**: per-report passes and the two-stream coordinator
//!
//! # Example
//!
//! ```no_run
//! use callsync_ingest::config::SyncWindow;
//! use callsync_ingest::rpc::{DataApiClient, HttpTransport, Target};
//! use callsync_ingest::store::MemoryStore;
//! use callsync_ingest::sync::{ReportSync, SyncCoordinator};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = HttpTransport::new(Target::Uiscom.url())?;
//!     let client = Arc::new(DataApiClient::new(transport, "token"));
//!     let sync = ReportSync::new(client, Arc::new(MemoryStore::new()));
//!
//!     let till = chrono::Local::now().naive_local();
//!     let window = SyncWindow::new(till - chrono::Duration::hours(1), till)?;
//!     let report = SyncCoordinator::new(sync).run(window, CancellationToken::new()).await;
//!     assert!(report.is_success());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod media;
pub mod record;
pub mod rpc;
pub mod shutdown;
pub mod store;
pub mod sync;
pub mod transform;

pub use record::{TypedRecord, Value};
