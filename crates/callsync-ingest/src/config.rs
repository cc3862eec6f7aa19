//! Run configuration

use crate::media::MediaConfig;
use crate::store::DbConfig;
use callsync_common::time::format_datetime;
use callsync_common::CommonError;
use chrono::{Duration, NaiveDateTime};

/// Half-open report window `[from, till)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub from: NaiveDateTime,
    pub till: NaiveDateTime,
}

impl SyncWindow {
    pub fn new(from: NaiveDateTime, till: NaiveDateTime) -> Result<Self, CommonError> {
        if till <= from {
            return Err(CommonError::Config(format!(
                "sync window end {} is not after its start {}",
                format_datetime(till),
                format_datetime(from)
            )));
        }
        Ok(Self { from, till })
    }

    /// `[from, from + interval)` when `from` is given, else `[now - interval, now)`
    pub fn derive(
        from: Option<NaiveDateTime>,
        interval: Duration,
        now: NaiveDateTime,
    ) -> Result<Self, CommonError> {
        if interval <= Duration::zero() {
            return Err(CommonError::Config("interval must be positive".to_string()));
        }

        let overflow = || CommonError::Config("sync window is out of range".to_string());
        match from {
            Some(from) => Self::new(from, from.checked_add_signed(interval).ok_or_else(overflow)?),
            None => Self::new(now.checked_sub_signed(interval).ok_or_else(overflow)?, now),
        }
    }
}

impl std::fmt::Display for SyncWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", format_datetime(self.from), format_datetime(self.till))
    }
}

/// Everything the binary needs for one run
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub access_token: String,
    pub endpoint: String,
    pub page_size: u32,
    pub window: SyncWindow,
    /// `None` disables recording downloads
    pub media: Option<MediaConfig>,
    pub db: DbConfig,
    pub migrate: bool,
    pub dry_run: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use callsync_common::time::parse_datetime;

    #[test]
    fn test_window_ends_now_without_from() {
        let now = parse_datetime("2024-03-01 12:00:00").unwrap();
        let window = SyncWindow::derive(None, Duration::hours(4), now).unwrap();
        assert_eq!(window.from, parse_datetime("2024-03-01 08:00:00").unwrap());
        assert_eq!(window.till, now);
    }

    #[test]
    fn test_window_starts_at_from() {
        let now = parse_datetime("2024-03-05 00:00:00").unwrap();
        let from = parse_datetime("2024-03-01 23:30:00").unwrap();
        let window = SyncWindow::derive(Some(from), Duration::hours(1), now).unwrap();
        assert_eq!(window.till, parse_datetime("2024-03-02 00:30:00").unwrap());
        assert_eq!(window.to_string(), "[2024-03-01 23:30:00, 2024-03-02 00:30:00)");
    }

    #[test]
    fn test_window_rejects_non_positive_interval() {
        let now = parse_datetime("2024-03-01 12:00:00").unwrap();
        assert!(SyncWindow::derive(None, Duration::zero(), now).is_err());
        assert!(SyncWindow::new(now, now).is_err());
    }
}
