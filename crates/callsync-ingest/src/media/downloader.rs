//! Existence-checked recording downloads
//!
//! The server names each recording: a HEAD request reveals the filename
//! (Content-Disposition, else the last path segment). A file of that name
//! already in the folder means the recording is synced and the body is not
//! fetched again. Bodies are streamed to `<name>.part` and renamed on
//! completion, so an interrupted transfer never looks like a finished file.

use super::MediaError;
use futures::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

/// Default timeout for one recording transfer in seconds
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Files written and files found already present
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub skipped: usize,
}

impl std::ops::AddAssign for DownloadSummary {
    fn add_assign(&mut self, other: Self) {
        self.downloaded += other.downloaded;
        self.skipped += other.skipped;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded(PathBuf),
    AlreadyPresent(PathBuf),
}

pub struct MediaDownloader {
    client: Client,
}

impl MediaDownloader {
    pub fn new() -> Result<Self, MediaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS))
            .user_agent(concat!("callsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| MediaError::Http {
                url: String::new(),
                source,
            })?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Download every URL into `folder`, in order, stopping at the first failure.
    ///
    /// Files already written by earlier URLs are left in place on failure.
    pub async fn download_all(
        &self,
        folder: &Path,
        urls: &[Url],
    ) -> Result<DownloadSummary, MediaError> {
        let mut summary = DownloadSummary::default();

        for url in urls {
            match self.download(folder, url).await? {
                DownloadOutcome::Downloaded(_) => summary.downloaded += 1,
                DownloadOutcome::AlreadyPresent(_) => summary.skipped += 1,
            }
        }

        Ok(summary)
    }

    pub async fn download(&self, folder: &Path, url: &Url) -> Result<DownloadOutcome, MediaError> {
        fs::create_dir_all(folder)
            .await
            .map_err(|source| MediaError::CreateDir {
                path: folder.display().to_string(),
                source,
            })?;

        let filename = self.resolve_filename(url).await?;
        let target = folder.join(&filename);

        let exists = fs::try_exists(&target).await.map_err(|source| MediaError::Io {
            path: target.display().to_string(),
            source,
        })?;
        if exists {
            debug!(path = %target.display(), "Recording already present");
            return Ok(DownloadOutcome::AlreadyPresent(target));
        }

        info!(url = %url, path = %target.display(), "Downloading recording");
        self.fetch_to(url, &target).await?;
        Ok(DownloadOutcome::Downloaded(target))
    }

    async fn resolve_filename(&self, url: &Url) -> Result<String, MediaError> {
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|source| MediaError::Http {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(MediaError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition)
            .or_else(|| filename_from_url(response.url()))
            .ok_or_else(|| MediaError::NoFilename(url.to_string()))
    }

    async fn fetch_to(&self, url: &Url, target: &Path) -> Result<(), MediaError> {
        let io_err = |path: &Path| {
            let path = path.display().to_string();
            move |source| MediaError::Io { path, source }
        };
        let http_err = |source| MediaError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url.clone()).send().await.map_err(http_err)?;
        if !response.status().is_success() {
            return Err(MediaError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let part = part_path(target);
        let mut file = fs::File::create(&part).await.map_err(io_err(&part))?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(http_err)?;
            file.write_all(&chunk).await.map_err(io_err(&part))?;
        }

        file.flush().await.map_err(io_err(&part))?;
        drop(file);

        fs::rename(&part, target).await.map_err(io_err(target))?;
        Ok(())
    }
}

fn part_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    target.with_file_name(name)
}

/// Filename parameter of a Content-Disposition header.
///
/// `filename*` (RFC 5987, percent-encoded) is preferred over `filename`.
/// Quoted values may contain `;` and backslash escapes. A malformed header
/// yields `None` so the caller falls back to the URL.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in split_params(header)?.into_iter().skip(1) {
        if param.trim().is_empty() {
            continue;
        }
        let (key, value) = param.split_once('=')?;
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            return None;
        }
        let value = unquote(value.trim())?;

        match key.as_str() {
            "filename*" => {
                let encoded = value.rsplit_once("''").map_or(value.as_str(), |(_, v)| v);
                extended = urlencoding::decode(encoded).ok().map(|v| v.into_owned());
            },
            "filename" => plain = Some(value),
            _ => {},
        }
    }

    extended.or(plain).and_then(|name| sanitize(&name))
}

/// Split on `;` outside quoted-strings; `None` when a quote is left open
fn split_params(header: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (i, c) in header.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                parts.push(&header[start..i]);
                start = i + 1;
            },
            _ => {},
        }
    }

    if quoted {
        return None;
    }
    parts.push(&header[start..]);
    Some(parts)
}

/// Token as-is, or the unescaped content of a quoted-string
fn unquote(value: &str) -> Option<String> {
    let Some(rest) = value.strip_prefix('"') else {
        return (!value.contains('"')).then(|| value.to_string());
    };
    let inner = rest.strip_suffix('"')?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?),
            '"' => return None,
            other => out.push(other),
        }
    }
    Some(out)
}

/// Last non-empty path segment of `url`, percent-decoded
pub fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = urlencoding::decode(segment).ok()?;
    sanitize(&decoded)
}

/// Reduce a suggested name to a bare file name; rejects empty and dot names
fn sanitize(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    match base {
        "" | "." | ".." => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_plain() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="call_42.mp3""#),
            Some("call_42.mp3".to_string())
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename=rec.wav"),
            Some("rec.wav".to_string())
        );
    }

    #[test]
    fn test_content_disposition_extended_wins() {
        let header = r#"attachment; filename="fallback.mp3"; filename*=UTF-8''%D0%B7%D0%B0%D0%BF%D0%B8%D1%81%D1%8C.mp3"#;
        assert_eq!(filename_from_content_disposition(header), Some("запись.mp3".to_string()));
    }

    #[test]
    fn test_content_disposition_strips_directories() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="../../etc/passwd""#),
            Some("passwd".to_string())
        );
        assert_eq!(filename_from_content_disposition("inline"), None);
        assert_eq!(filename_from_content_disposition(r#"attachment; filename="..""#), None);
    }

    #[test]
    fn test_content_disposition_quoted_string() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="rec;2024.mp3""#),
            Some("rec;2024.mp3".to_string())
        );
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="a\"b.mp3""#),
            Some("a\"b.mp3".to_string())
        );
        assert_eq!(
            filename_from_content_disposition(r#"attachment; note="x;y"; filename=rec.mp3;"#),
            Some("rec.mp3".to_string())
        );
    }

    #[test]
    fn test_content_disposition_malformed() {
        assert_eq!(filename_from_content_disposition(r#"attachment; filename="rec.mp3"#), None);
        assert_eq!(filename_from_content_disposition(r#"attachment; filename="a\""#), None);
        assert_eq!(filename_from_content_disposition("attachment; filename"), None);
        assert_eq!(filename_from_content_disposition(r#"attachment; filename="a"b"#), None);
    }

    #[test]
    fn test_filename_from_url() {
        let url = Url::parse("https://media.example/talk/42/abc/").unwrap();
        assert_eq!(filename_from_url(&url), Some("abc".to_string()));

        let url = Url::parse("https://media.example/a/../rec%201.mp3").unwrap();
        assert_eq!(filename_from_url(&url), Some("rec 1.mp3".to_string()));

        let url = Url::parse("https://media.example/").unwrap();
        assert_eq!(filename_from_url(&url), None);
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("/m/2024/03/01/42/rec.mp3")),
            PathBuf::from("/m/2024/03/01/42/rec.mp3.part")
        );
    }

    #[test]
    fn test_summary_add_assign() {
        let mut total = DownloadSummary { downloaded: 1, skipped: 2 };
        total += DownloadSummary { downloaded: 3, skipped: 0 };
        assert_eq!(total, DownloadSummary { downloaded: 4, skipped: 2 });
    }
}
