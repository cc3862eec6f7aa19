//! One report pass

use super::{ReportKind, SyncError, SyncStats};
use crate::config::SyncWindow;
use crate::media::{DownloadSummary, MediaSync};
use crate::record::TypedRecord;
use crate::rpc::{DataApiClient, HttpTransport, ReportQuery, RpcTransport};
use crate::store::RecordStore;
use crate::transform::transform;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Rows requested per report call; there is no pagination past this
pub const DEFAULT_PAGE_SIZE: u32 = 10_000;

type MediaTask = JoinHandle<Result<DownloadSummary, SyncError>>;

/// Drives a report pass against a client, a store and optional media sync
pub struct ReportSync<T = HttpTransport> {
    client: Arc<DataApiClient<T>>,
    store: Arc<dyn RecordStore>,
    media: Option<Arc<MediaSync>>,
    page_size: u32,
}

impl<T: RpcTransport> ReportSync<T> {
    pub fn new(client: Arc<DataApiClient<T>>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            client,
            store,
            media: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Download call recordings alongside persistence
    pub fn with_media(mut self, media: Arc<MediaSync>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Fetch `kind` for `window` and persist every row.
    ///
    /// Stops at the first failing row; rows before it stay persisted.
    /// Cancellation is observed while fetching, between rows and inside the
    /// media task.
    pub async fn run(
        &self,
        kind: ReportKind,
        window: &SyncWindow,
        cancel: &CancellationToken,
    ) -> Result<SyncStats, SyncError> {
        let catalog = kind.catalog();
        let query = ReportQuery::new(window.from, window.till, self.page_size, catalog);

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(SyncError::Cancelled),
            response = self.client.report(kind.method(), query) => response?,
        };

        let rows = report_rows(&response)?;
        warn_if_truncated(kind, &response, rows.len());
        info!(report = %kind, rows = rows.len(), "Report fetched");

        let mut stats = SyncStats {
            fetched: rows.len(),
            ..SyncStats::default()
        };

        for (index, row) in rows.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(report = %kind, processed = index, "Sync cancelled between rows");
                return Err(SyncError::Cancelled);
            }

            let record = transform(catalog, row).inspect_err(|e| {
                warn!(report = %kind, row = index, error = %e, "Row failed validation");
            })?;

            let media_task = match &self.media {
                Some(media) if kind.has_media() => {
                    Some(spawn_media(Arc::clone(media), record.clone(), cancel.clone()))
                },
                _ => None,
            };

            let written = match self.store.insert_if_absent(kind.table(), &record).await {
                Ok(written) => written,
                Err(e) => {
                    if let Some(task) = media_task {
                        task.abort();
                    }
                    warn!(report = %kind, id = ?record.id(), error = %e, "Persist failed");
                    return Err(e.into());
                },
            };

            if let Some(task) = media_task {
                stats.media += join_media(task).await.inspect_err(|e| {
                    warn!(report = %kind, id = ?record.id(), error = %e, "Media sync failed");
                })?;
            }

            if written {
                stats.inserted += 1;
            } else {
                stats.existing += 1;
            }
            debug!(report = %kind, id = ?record.id(), written, "Row synced");
        }

        Ok(stats)
    }
}

/// The `data` array of a report result
fn report_rows(response: &serde_json::Value) -> Result<&[serde_json::Value], SyncError> {
    match response.get("data") {
        None => Err(SyncError::MissingData),
        Some(serde_json::Value::Array(rows)) => Ok(rows),
        Some(other) => Err(SyncError::InvalidResponse(format!(
            "'data' is not an array: {other}"
        ))),
    }
}

fn warn_if_truncated(kind: ReportKind, response: &serde_json::Value, returned: usize) {
    let total = response
        .get("metadata")
        .and_then(|m| m.get("total_items"))
        .and_then(serde_json::Value::as_u64);

    if let Some(total) = total.filter(|&t| t > returned as u64) {
        warn!(
            report = %kind,
            total_items = total,
            returned,
            "Report truncated to one page; narrow the window to sync the rest"
        );
    }
}

fn spawn_media(media: Arc<MediaSync>, record: TypedRecord, cancel: CancellationToken) -> MediaTask {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => Err(SyncError::Cancelled),
            summary = media.sync_record(&record) => summary.map_err(SyncError::from),
        }
    })
}

async fn join_media(task: MediaTask) -> Result<DownloadSummary, SyncError> {
    match task.await {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Err(SyncError::Cancelled),
        Err(e) => Err(SyncError::TaskFailed(e.to_string())),
    }
}
