//! Call recording media sync
//!
//! - **locator**: derives recording URLs and the date-partitioned folder of a call
//! - **downloader**: materializes each URL once under that folder
//!
//! Layout on disk: `<root>/<yyyy>/<mm>/<dd>/<communication>/<filename>`, where
//! `<communication>` is the communication id, prefixed `out_` for outbound
//! talk recordings and `vm_` for voicemail.

pub mod downloader;
pub mod locator;

pub use downloader::{DownloadSummary, MediaDownloader};
pub use locator::{MediaLocator, MediaPlan};

use crate::record::TypedRecord;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Base URL for talk recordings
pub const DEFAULT_TALK_MEDIA_URL: &str = "https://app.uiscom.ru/system/media/talk/";

/// Base URL for voicemail recordings
pub const DEFAULT_VOICEMAIL_MEDIA_URL: &str = "https://app.uiscom.ru/system/media/voice_mail/";

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("call record has no usable '{field}': {reason}")]
    Record { field: &'static str, reason: String },

    #[error("invalid media URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("filename couldn't be determined for {0}")]
    NoFilename(String),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where recordings go and where they come from
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub root: PathBuf,
    pub talk_base_url: Url,
    pub voicemail_base_url: Url,
}

impl MediaConfig {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, MediaError> {
        Ok(Self {
            root: root.into(),
            talk_base_url: Url::parse(DEFAULT_TALK_MEDIA_URL)?,
            voicemail_base_url: Url::parse(DEFAULT_VOICEMAIL_MEDIA_URL)?,
        })
    }
}

/// Locate and download the recordings of one call
pub struct MediaSync {
    locator: MediaLocator,
    downloader: MediaDownloader,
}

impl MediaSync {
    pub fn new(locator: MediaLocator, downloader: MediaDownloader) -> Self {
        Self {
            locator,
            downloader,
        }
    }

    pub fn from_config(config: MediaConfig) -> Result<Self, MediaError> {
        Ok(Self::new(MediaLocator::new(config), MediaDownloader::new()?))
    }

    /// Returns an empty summary when the call has no recordings
    pub async fn sync_record(&self, record: &TypedRecord) -> Result<DownloadSummary, MediaError> {
        match self.locator.locate(record)? {
            Some(plan) => self.downloader.download_all(&plan.folder, &plan.urls).await,
            None => Ok(DownloadSummary::default()),
        }
    }
}
