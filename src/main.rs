//! ParkHub server: shared parking lot with live per-actor views.
//!
//! Loads configuration, wires the crates together and drives the service
//! from a line-oriented console.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt};

use parkhub_core::config::AppConfig;
use parkhub_core::error::AppError;
use parkhub_lot::Lot;
use parkhub_service::{AccessPolicy, ActorDirectory, ParkingService, ServiceSettings};
use parkhub_stats::{StatsEngine, StatsStore};
use parkhub_storage::{JsonDirectoryStore, JsonStatsStore};
use parkhub_view::{MemoryTransport, ViewRegistry};

mod console;

/// ParkHub: reserve, occupy and release shared parking places
#[derive(Debug, Parser)]
#[command(name = "parkhub-server", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let log_guard = match init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        drop(log_guard);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
///
/// Logs go to `logging.file` when set, otherwise to stderr. The returned
/// guard flushes the file writer and must live as long as the process.
fn init_logging(config: &AppConfig) -> Result<Option<WorkerGuard>, AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let (writer, guard, ansi) = match &config.logging.file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().ok_or_else(|| {
                AppError::configuration(format!("logging.file '{}' has no file name", path.display()))
            })?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(file_name.to_string_lossy().into_owned())
                .build(dir)
                .map_err(|e| AppError::configuration(format!("Cannot open log file: {e}")))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), None, true),
    };

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true)
                .init();
        }
    }

    Ok(guard)
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ParkHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Actor directory ──────────────────────────────────
    let directory_store = Arc::new(JsonDirectoryStore::new(&config.storage.users_file));
    let directory = Arc::new(ActorDirectory::load(directory_store).await?);
    let names = directory.snapshot().await;

    // ── Step 2: Statistics, restored from the checkpoint ─────────
    let stats_store = Arc::new(JsonStatsStore::new(&config.storage.data_file));
    let stats = match stats_store.load().await? {
        Some(export) => {
            let stats = StatsEngine::from_export(export);
            stats.update_actor_directory(&names).await;
            stats
        }
        None => StatsEngine::new(names),
    };
    let stats = Arc::new(stats);

    // ── Step 3: Lot, always built fresh ──────────────────────────
    let lot = Lot::new(config.lot.places.iter().map(String::as_str))
        .map_err(|e| AppError::configuration(format!("Invalid lot layout: {e}")))?;
    let lot = Arc::new(lot);

    // ── Step 4: Transport and views ──────────────────────────────
    let transport = MemoryTransport::new();
    let views = Arc::new(ViewRegistry::new(Arc::new(transport.clone())));

    // ── Step 5: Service ──────────────────────────────────────────
    let service = ParkingService::new(
        lot,
        stats,
        views,
        directory,
        AccessPolicy::from_config(&config.access),
        ServiceSettings::from_config(&config.logging),
    )
    .with_stats_store(stats_store);

    tracing::info!(
        places = config.lot.places.len(),
        whitelist = config.access.whitelist,
        "ParkHub ready"
    );

    console::run(&service, &transport).await?;

    tracing::info!("ParkHub stopped");
    Ok(())
}
