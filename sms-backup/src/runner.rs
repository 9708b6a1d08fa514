use anyhow::{Context, Result};
use sms_core::{init_tracing, BroadcastHub, Intent};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use storage::SqliteDocumentStore;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use super::bootstrap::{InitOutcome, SyncReport};
use super::components::{build_components, AppComponents};
use super::config::{AppConfig, StoreBackend};

/// Reads one JSON-encoded [`Intent`] per line and broadcasts it on `hub`.
/// Blank lines and lines starting with `#` are skipped; lines that are not UTF-8 or not a valid
/// intent are logged and skipped. Returns the number of intents broadcast.
pub async fn feed_events<R>(reader: R, hub: &BroadcastHub) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let delivered = AtomicUsize::new(0);
    pump_events(reader, hub, &delivered).await?;
    Ok(delivered.load(Ordering::Relaxed))
}

/// Broadcasts events until EOF, counting each one in `delivered` as it goes.
async fn pump_events<R>(mut reader: R, hub: &BroadcastHub, delivered: &AtomicUsize) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        line_no += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping event that is not valid UTF-8");
                continue;
            }
        };
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let intent: Intent = match serde_json::from_str(line) {
            Ok(intent) => intent,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed event");
                continue;
            }
        };

        let receivers = hub.send_broadcast(&intent);
        debug!(line = line_no, action = %intent.action, receivers, "Event broadcast");
        delivered.fetch_add(1, Ordering::Relaxed);
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
    }
}

/// [`serve_until`] with Ctrl-C as the shutdown signal.
pub async fn serve<R>(
    components: &AppComponents,
    reader: R,
    sync: Option<JoinHandle<SyncReport>>,
    exit_on_eof: bool,
    grace: Duration,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    serve_until(components, reader, sync, exit_on_eof, grace, ctrl_c()).await
}

/// Drives an initialized host: feeds events from `reader` until EOF or `shutdown`, keeps
/// listening after EOF until `shutdown` unless `exit_on_eof`, then drains in-flight work and
/// stops the host. A failing event source ends feeding like EOF does.
/// Returns the number of intents broadcast.
#[instrument(skip(components, reader, sync, shutdown))]
pub async fn serve_until<R, S>(
    components: &AppComponents,
    reader: R,
    sync: Option<JoinHandle<SyncReport>>,
    exit_on_eof: bool,
    grace: Duration,
    shutdown: S,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let delivered = AtomicUsize::new(0);
    let mut interrupted = false;

    tokio::select! {
        res = pump_events(reader, &components.hub, &delivered) => {
            if let Err(e) = res {
                error!(error = %e, "Event source failed, no more events will be read");
            }
        }
        _ = &mut shutdown => {
            info!("Interrupted, shutting down");
            interrupted = true;
        }
    }
    let delivered = delivered.load(Ordering::Relaxed);
    info!(delivered, "step: event source drained");

    if let Some(sync) = sync {
        match sync.await {
            Ok(report) => info!(
                scanned = report.scanned,
                saved = report.saved,
                failed = report.failed,
                "Historical sync report"
            ),
            Err(e) => error!(error = %e, "Historical sync task failed"),
        }
    }

    if !exit_on_eof && !interrupted {
        info!("Listening until Ctrl-C");
        shutdown.await;
    }

    if !components.hub.wait_idle(grace).await {
        warn!(
            pending = components.hub.pending_count(),
            "Shutting down with events still in flight"
        );
    }
    components.service.stop().await;

    Ok(delivered)
}

/// Main entry: validate config, init logging, build components, bootstrap, then serve events
/// from `events` (or stdin).
#[instrument(skip(config))]
pub async fn run_service(
    config: AppConfig,
    events: Option<PathBuf>,
    exit_on_eof: bool,
) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    info!(
        store_backend = %config.base().store_backend,
        collection = %config.collection(),
        "Initializing SMS backup service"
    );

    let components = build_components(&config).await?;

    let sync = match components.controller.initialize().await {
        InitOutcome::Started { sync } => sync,
        InitOutcome::Denied { denied } => {
            warn!(denied = ?denied, "Service not started");
            return Ok(());
        }
    };

    info!("SMS backup service started successfully");

    let grace = config.service().wake_lock_timeout();
    match events {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open events file {}", path.display()))?;
            serve(&components, BufReader::new(file), Some(sync), exit_on_eof, grace).await?;
        }
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            serve(&components, stdin, Some(sync), exit_on_eof, grace).await?;
        }
    }

    Ok(())
}

/// One-shot historical sync without starting the host.
#[instrument(skip(config))]
pub async fn run_sync(config: AppConfig) -> Result<SyncReport> {
    config.validate()?;
    init_tracing(config.log_file())?;

    let components = build_components(&config).await?;
    if let Err(denied) = components.controller.authorize().await {
        anyhow::bail!("Permissions denied: {:?}", denied);
    }

    let report = components.controller.sync_existing().await;
    if let Some(e) = &report.error {
        anyhow::bail!("Error syncing SMS: {}", e);
    }
    Ok(report)
}

/// Reads back the newest documents of the local SQLite mirror.
pub async fn run_list(
    config: AppConfig,
    limit: i64,
) -> Result<Vec<(String, storage::MessageRecord)>> {
    config.validate()?;
    if config.base().store_backend != StoreBackend::Sqlite {
        anyhow::bail!(
            "list is only supported for the sqlite backend (STORE_BACKEND={})",
            config.base().store_backend
        );
    }

    let store = SqliteDocumentStore::new(config.database_url())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open document storage: {}", e))?;
    Ok(store.list(config.collection(), limit).await?)
}
