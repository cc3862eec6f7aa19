//! Report synchronization
//!
//! [`ReportSync`] runs one pass for one report type: a single bounded fetch,
//! then transform and persist each row in arrival order. For call rows the
//! recordings are downloaded by a background task that runs alongside the
//! insert and is joined before the next row starts. The first failure ends the
//! pass.
//!
//! [`SyncCoordinator`] runs the calls and call-legs passes side by side over
//! the same window; a failing stream does not stop the other.

pub mod coordinator;
pub mod pipeline;

pub use coordinator::{SyncCoordinator, SyncReport};
pub use pipeline::ReportSync;

use crate::catalog::{call_legs_catalog, calls_catalog, FieldCatalog};
use crate::media::{DownloadSummary, MediaError};
use crate::rpc::{methods, RpcError};
use crate::store::{StoreError, Table, CALLS_TABLE, CALL_LEGS_TABLE};
use crate::transform::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("RPC call failed: {0}")]
    Rpc(#[from] RpcError),

    #[error("report response has no 'data' field")]
    MissingData,

    #[error("invalid report response: {0}")]
    InvalidResponse(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("media sync failed: {0}")]
    Media(#[from] MediaError),

    #[error("persist failed: {0}")]
    Store(#[from] StoreError),

    #[error("sync cancelled")]
    Cancelled,

    #[error("background task failed: {0}")]
    TaskFailed(String),
}

/// The two report streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Calls,
    CallLegs,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::Calls, ReportKind::CallLegs];

    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::Calls => "calls",
            ReportKind::CallLegs => "call_legs",
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            ReportKind::Calls => methods::GET_CALLS_REPORT,
            ReportKind::CallLegs => methods::GET_CALL_LEGS_REPORT,
        }
    }

    pub fn catalog(&self) -> &'static FieldCatalog {
        match self {
            ReportKind::Calls => calls_catalog(),
            ReportKind::CallLegs => call_legs_catalog(),
        }
    }

    pub fn table(&self) -> &'static Table {
        match self {
            ReportKind::Calls => &CALLS_TABLE,
            ReportKind::CallLegs => &CALL_LEGS_TABLE,
        }
    }

    /// Only call rows reference recordings
    pub fn has_media(&self) -> bool {
        matches!(self, ReportKind::Calls)
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Counters for one finished pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    /// Rows returned by the fetch
    pub fetched: usize,
    /// Rows written by this pass
    pub inserted: usize,
    /// Rows whose id was already stored
    pub existing: usize,
    pub media: DownloadSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_kind_bindings() {
        assert_eq!(ReportKind::Calls.method(), "get.calls_report");
        assert_eq!(ReportKind::CallLegs.method(), "get.call_legs_report");
        assert_eq!(ReportKind::Calls.table().name, "calls");
        assert_eq!(ReportKind::CallLegs.table().name, "call_legs");
        assert!(ReportKind::Calls.catalog().contains("call_records"));
        assert!(ReportKind::Calls.has_media());
        assert!(!ReportKind::CallLegs.has_media());
        assert_eq!(ReportKind::CallLegs.to_string(), "call_legs");
    }
}
