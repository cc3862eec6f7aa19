//! Callsync - call-tracking report sync

use anyhow::{Context, Result};
use callsync_common::logging::{init_logging, LogConfig, LogLevel};
use callsync_ingest::cli::Cli;
use callsync_ingest::media::MediaSync;
use callsync_ingest::rpc::{DataApiClient, HttpTransport};
use callsync_ingest::shutdown::install_signal_handler;
use callsync_ingest::store::{create_pool, MemoryStore, PgStore, RecordStore};
use callsync_ingest::sync::{ReportSync, SyncCoordinator};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("callsync")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    let config = cli.into_config(chrono::Local::now().naive_local())?;
    info!(
        window = %config.window,
        endpoint = %config.endpoint,
        media = config.media.is_some(),
        dry_run = config.dry_run,
        "Starting sync"
    );

    let cancel = install_signal_handler();

    let store: Arc<dyn RecordStore> = if config.dry_run {
        Arc::new(MemoryStore::new())
    } else {
        let pool = create_pool(&config.db)
            .await
            .context("Failed to connect to the database")?;
        let store = PgStore::new(pool);
        if config.migrate {
            store.run_migrations().await?;
        }
        Arc::new(store)
    };

    let transport = HttpTransport::new(config.endpoint.as_str())?;
    let client = Arc::new(DataApiClient::new(transport, config.access_token));

    let mut sync = ReportSync::new(client, store).with_page_size(config.page_size);
    if let Some(media) = config.media {
        sync = sync.with_media(Arc::new(MediaSync::from_config(media)?));
    }

    let report = SyncCoordinator::new(sync).run(config.window, cancel).await;

    let failed: Vec<_> = report.failures().map(|(kind, _)| kind.name()).collect();
    if !failed.is_empty() {
        anyhow::bail!("Sync failed for: {}", failed.join(", "));
    }

    info!("Sync complete");
    Ok(())
}
