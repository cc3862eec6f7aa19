//! Command line interface

use crate::config::{SyncConfig, SyncWindow};
use crate::media::{MediaConfig, DEFAULT_TALK_MEDIA_URL, DEFAULT_VOICEMAIL_MEDIA_URL};
use crate::rpc::Target;
use crate::store::DbConfig;
use crate::sync::pipeline::DEFAULT_PAGE_SIZE;
use callsync_common::time::{parse_datetime, parse_duration};
use callsync_common::CommonError;
use chrono::{Duration, NaiveDateTime};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "callsync")]
#[command(author, version, about = "Sync call-tracking reports into PostgreSQL")]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Data API access token
    #[arg(short = 't', long, env = "CALLSYNC_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Data API endpoint: uiscom, comagic or a URL
    #[arg(long, env = "CALLSYNC_TARGET", default_value = "uiscom")]
    pub target: Target,

    /// Database host
    #[arg(short = 's', long, env = "CALLSYNC_DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(short = 'p', long, env = "CALLSYNC_DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    /// Database name
    #[arg(short = 'n', long, env = "CALLSYNC_DB_NAME", default_value = "callsync")]
    pub db_name: String,

    /// Database user
    #[arg(short = 'u', long, env = "CALLSYNC_DB_USER", default_value = "postgres")]
    pub db_user: String,

    /// Database password
    #[arg(
        short = 'w',
        long,
        env = "CALLSYNC_DB_PASSWORD",
        default_value = "",
        hide_env_values = true
    )]
    pub db_password: String,

    /// Maximum database connections
    #[arg(long, env = "CALLSYNC_DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub db_max_connections: u32,

    /// Window length, e.g. 4h, 60m or 12h15m30s
    #[arg(short = 'i', long, default_value = "1h", value_parser = parse_interval)]
    pub interval: Duration,

    /// Window start (YYYY-MM-DD HH:MM:SS); the window ends now when omitted
    #[arg(short = 'f', long, value_parser = parse_from)]
    pub from: Option<NaiveDateTime>,

    /// Recording root folder; empty disables recording downloads
    #[arg(short = 'm', long, env = "CALLSYNC_MEDIA_FOLDER", default_value = "")]
    pub media_folder: String,

    /// Rows requested per report
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Base URL of talk recordings
    #[arg(long, default_value = DEFAULT_TALK_MEDIA_URL)]
    pub talk_media_url: Url,

    /// Base URL of voicemail recordings
    #[arg(long, default_value = DEFAULT_VOICEMAIL_MEDIA_URL)]
    pub voicemail_media_url: Url,

    /// Create the report tables before syncing
    #[arg(long)]
    pub migrate: bool,

    /// Keep rows in memory instead of writing to the database
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: (),
}

impl Cli {
    /// Resolve flags into a run configuration; `now` anchors a window without `--from`
    pub fn into_config(self, now: NaiveDateTime) -> Result<SyncConfig, CommonError> {
        if self.page_size == 0 {
            return Err(CommonError::Config("page size must be at least 1".to_string()));
        }

        let window = SyncWindow::derive(self.from, self.interval, now)?;

        let media = (!self.media_folder.is_empty()).then(|| MediaConfig {
            root: PathBuf::from(self.media_folder),
            talk_base_url: self.talk_media_url,
            voicemail_base_url: self.voicemail_media_url,
        });

        let db = DbConfig::from_parts(
            &self.db_host,
            self.db_port,
            &self.db_name,
            &self.db_user,
            &self.db_password,
        )
        .with_max_connections(self.db_max_connections);

        Ok(SyncConfig {
            access_token: self.token,
            endpoint: self.target.url().to_string(),
            page_size: self.page_size,
            window,
            media,
            db,
            migrate: self.migrate,
            dry_run: self.dry_run,
        })
    }
}

fn parse_interval(value: &str) -> Result<Duration, CommonError> {
    let interval = parse_duration(value)?;
    if interval <= Duration::zero() {
        return Err(CommonError::InvalidDuration(value.to_string()));
    }
    Ok(interval)
}

fn parse_from(value: &str) -> Result<NaiveDateTime, CommonError> {
    parse_datetime(value)
}
