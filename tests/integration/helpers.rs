//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use parkhub_core::config::{AccessConfig, AppConfig, LoggingConfig, LotConfig, StorageConfig};
use parkhub_core::types::id::ActorId;
use parkhub_lot::Lot;
use parkhub_service::{AccessPolicy, ActorContext, ActorDirectory, ParkingService, ServiceSettings};
use parkhub_stats::{StatsEngine, StatsStore};
use parkhub_storage::{JsonDirectoryStore, JsonStatsStore};
use parkhub_view::{MemoryTransport, SurfaceRecord, ViewContent, ViewRegistry};

/// Owner id used by [`TestApp::with_owner`].
pub const OWNER: &str = "100";

/// Test application context
pub struct TestApp {
    /// The service under test
    pub service: ParkingService,
    /// Transport backing every view
    pub transport: MemoryTransport,
    /// Application config
    pub config: AppConfig,
    /// Keeps the data directory alive
    pub dir: TempDir,
}

impl TestApp {
    /// Lot `["1", "2"]`, open access, no owner.
    pub async fn new() -> Self {
        Self::with_config(Self::config(&["1", "2"], false, None)).await
    }

    /// Lot `["1", "2"]` with [`OWNER`] as owner.
    pub async fn with_owner() -> Self {
        Self::with_config(Self::config(&["1", "2"], false, Some(OWNER))).await
    }

    /// Build a config whose storage paths are filled in by
    /// [`with_config`](Self::with_config).
    pub fn config(places: &[&str], whitelist: bool, owner: Option<&str>) -> AppConfig {
        AppConfig {
            lot: LotConfig {
                places: places.iter().map(|p| p.to_string()).collect(),
            },
            access: AccessConfig {
                whitelist,
                owner_id: owner.map(str::to_string),
            },
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Wire a service the way the server does, with storage in a temp dir
    /// holding an empty actor directory.
    pub async fn with_config(config: AppConfig) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("users.json"), "{}\n").expect("Failed to seed directory");
        Self::boot(config, dir).await
    }

    /// Wire a service over an existing data directory.
    pub async fn boot(mut config: AppConfig, dir: TempDir) -> Self {
        config.storage.users_file = path_string(dir.path().join("users.json"));
        config.storage.data_file = path_string(dir.path().join("stats.json"));

        let directory_store = Arc::new(JsonDirectoryStore::new(&config.storage.users_file));
        let directory = Arc::new(
            ActorDirectory::load(directory_store)
                .await
                .expect("Failed to load directory"),
        );
        let names = directory.snapshot().await;

        let stats_store = Arc::new(JsonStatsStore::new(&config.storage.data_file));
        let stats = match stats_store.load().await.expect("Failed to load stats") {
            Some(export) => StatsEngine::from_export(export),
            None => StatsEngine::new(names),
        };

        let transport = MemoryTransport::new();
        let service = ParkingService::new(
            Arc::new(Lot::new(config.lot.places.iter().map(String::as_str)).expect("Invalid lot")),
            Arc::new(stats),
            Arc::new(ViewRegistry::new(Arc::new(transport.clone()))),
            directory,
            AccessPolicy::from_config(&config.access),
            ServiceSettings::from_config(&config.logging),
        )
        .with_stats_store(stats_store);

        Self {
            service,
            transport,
            config,
            dir,
        }
    }

    /// Path of the persisted actor directory.
    pub fn users_file(&self) -> PathBuf {
        PathBuf::from(&self.config.storage.users_file)
    }

    /// Path of the statistics checkpoint.
    pub fn data_file(&self) -> PathBuf {
        PathBuf::from(&self.config.storage.data_file)
    }

    /// Start `id` with a full name.
    pub async fn start(&self, id: &str, name: &str) -> ActorContext {
        let ctx = actor(id, name);
        self.service.start(&ctx).await.expect("start failed");
        ctx
    }

    /// Press a button as `ctx`.
    pub async fn tap(&self, ctx: &ActorContext, data: &str) -> String {
        self.service
            .handle_callback(ctx, data)
            .await
            .expect("callback failed")
    }

    /// Content the registry believes `id` sees.
    pub async fn content(&self, id: &str) -> ViewContent {
        self.service
            .views()
            .content(&ActorId::from(id))
            .await
            .expect("actor has no view")
    }

    /// Surfaces that actually exist for `id`, oldest first.
    pub fn surfaces(&self, id: &str) -> Vec<SurfaceRecord> {
        self.transport.surfaces_for(&ActorId::from(id))
    }
}

/// Context for `id` with a full name.
pub fn actor(id: &str, name: &str) -> ActorContext {
    ActorContext::new(id).with_full_name(name)
}

fn path_string(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
