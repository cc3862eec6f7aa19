//! Concurrent report streams

use super::{ReportKind, ReportSync, SyncError, SyncStats};
use crate::config::SyncWindow;
use crate::rpc::{HttpTransport, RpcTransport};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};

/// Outcome of every stream of one run
#[derive(Debug, Default)]
pub struct SyncReport {
    pub streams: Vec<(ReportKind, Result<SyncStats, SyncError>)>,
}

impl SyncReport {
    pub fn get(&self, kind: ReportKind) -> Option<&Result<SyncStats, SyncError>> {
        self.streams.iter().find(|(k, _)| *k == kind).map(|(_, r)| r)
    }

    pub fn failures(&self) -> impl Iterator<Item = (ReportKind, &SyncError)> + '_ {
        self.streams
            .iter()
            .filter_map(|(kind, result)| result.as_ref().err().map(|e| (*kind, e)))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Runs the calls and call-legs streams in parallel
pub struct SyncCoordinator<T = HttpTransport> {
    sync: Arc<ReportSync<T>>,
}

impl<T: RpcTransport + 'static> SyncCoordinator<T> {
    pub fn new(sync: ReportSync<T>) -> Self {
        Self {
            sync: Arc::new(sync),
        }
    }

    /// Run both streams over `window` and wait for both.
    ///
    /// A stream failure is logged and recorded; it does not cancel the other
    /// stream. Only `cancel` stops both.
    pub async fn run(&self, window: SyncWindow, cancel: CancellationToken) -> SyncReport {
        let handles: Vec<_> = ReportKind::ALL
            .into_iter()
            .map(|kind| {
                let sync = Arc::clone(&self.sync);
                let cancel = cancel.clone();
                let span = info_span!("stream", report = %kind);
                let handle = tokio::spawn(
                    async move { sync.run(kind, &window, &cancel).await }.instrument(span),
                );
                (kind, handle)
            })
            .collect();

        let mut report = SyncReport::default();

        for (kind, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(SyncError::TaskFailed(e.to_string())),
            };

            match &result {
                Ok(stats) => info!(
                    report = %kind,
                    fetched = stats.fetched,
                    inserted = stats.inserted,
                    existing = stats.existing,
                    media_downloaded = stats.media.downloaded,
                    media_skipped = stats.media.skipped,
                    "Stream completed"
                ),
                Err(e) => error!(report = %kind, error = %e, "Stream failed"),
            }

            report.streams.push((kind, result));
        }

        report
    }
}
