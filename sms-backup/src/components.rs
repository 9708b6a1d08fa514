//! Component factory: builds AppComponents from config. Isolates assembly logic from runner.

use anyhow::Result;
use sms_core::{
    BroadcastHub, Notifier, PermissionGate, PowerManager, PresetPermissions, ProcessPowerManager,
    TracingNotifier,
};
use std::sync::Arc;
use storage::{
    DocumentStore, EmptyInbox, FirestoreConfig, FirestoreStore, InMemoryDocumentStore,
    SmsInbox, SqliteDocumentStore, SqliteInbox, StoreWriter,
};
use tracing::{error, info, instrument};

use crate::bootstrap::SyncController;
use crate::config::{AppConfig, BaseConfig, ServiceConfig, StoreBackend};
use crate::receiver::SmsReceiver;
use crate::service::BackupService;

/// Host-environment collaborators, injected so tests can substitute fakes.
#[derive(Clone)]
pub struct Platform {
    pub notifier: Arc<dyn Notifier>,
    pub permissions: Arc<dyn PermissionGate>,
    pub power: Arc<dyn PowerManager>,
}

impl Platform {
    /// Headless platform: log-rendered notifications, preset permission answers, in-process wake locks.
    pub fn headless(service: &ServiceConfig) -> Self {
        Self {
            notifier: Arc::new(TracingNotifier::new()),
            permissions: Arc::new(PresetPermissions::new(
                service.denied_permissions.iter().copied(),
            )),
            power: Arc::new(ProcessPowerManager::new(service.battery_optimization_exempt)),
        }
    }
}

/// Everything the runner needs, wired together.
#[derive(Clone)]
pub struct AppComponents {
    pub hub: Arc<BroadcastHub>,
    pub writer: StoreWriter,
    pub receiver: Arc<SmsReceiver>,
    pub service: Arc<BackupService>,
    pub controller: SyncController,
    pub platform: Platform,
}

impl AppComponents {
    /// Wires hub, receiver, service and controller around an existing store and inbox.
    pub fn assemble(
        service_config: &ServiceConfig,
        store: Arc<dyn DocumentStore>,
        collection: &str,
        inbox: Arc<dyn SmsInbox>,
        platform: Platform,
    ) -> Self {
        let hub = Arc::new(BroadcastHub::new(service_config.wake_lock_timeout()));
        let writer = StoreWriter::new(store, collection);
        let receiver = Arc::new(SmsReceiver::new(
            writer.clone(),
            platform.notifier.clone(),
            platform.permissions.clone(),
            platform.power.clone(),
            service_config.wake_lock_timeout(),
            service_config.notification_permission_required,
        ));
        let service = Arc::new(BackupService::new(
            hub.clone(),
            receiver.clone(),
            platform.notifier.clone(),
            service_config.heartbeat_interval(),
        ));
        let controller = SyncController::new(
            service.clone(),
            writer.clone(),
            inbox,
            platform.notifier.clone(),
            platform.permissions.clone(),
            platform.power.clone(),
            service_config.notification_permission_required,
        );

        Self {
            hub,
            writer,
            receiver,
            service,
            controller,
            platform,
        }
    }
}

/// Creates the document store selected by STORE_BACKEND.
#[instrument(skip(config))]
pub async fn create_store(config: &BaseConfig) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Firestore => {
            let project_id = config
                .firestore
                .project_id
                .clone()
                .ok_or_else(|| anyhow::anyhow!("FIRESTORE_PROJECT_ID not set"))?;
            let mut firestore = FirestoreConfig::new(&project_id)
                .with_base_url(&config.firestore.base_url)
                .with_api_key(config.firestore.api_key.clone())
                .with_bearer_token(config.firestore.bearer_token.clone());
            firestore.database = config.firestore.database.clone();
            info!(
                project_id = %project_id,
                database = %firestore.database,
                "Using Firestore document store"
            );
            Arc::new(FirestoreStore::new(firestore).map_err(|e| {
                error!(error = %e, "Failed to initialize Firestore store");
                anyhow::anyhow!("Failed to initialize Firestore store: {}", e)
            })?)
        }
        StoreBackend::Sqlite => {
            info!(database_url = %config.database_url, "Using SQLite document store");
            Arc::new(
                SqliteDocumentStore::new(&config.database_url)
                    .await
                    .map_err(|e| {
                        error!(
                            error = %e,
                            database_url = %config.database_url,
                            "Failed to initialize document storage"
                        );
                        anyhow::anyhow!("Failed to initialize document storage: {}", e)
                    })?,
            )
        }
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Arc::new(InMemoryDocumentStore::new())
        }
    };
    Ok(store)
}

/// Opens the on-device inbox from SMS_INBOX_PATH, or an empty inbox when unset.
#[instrument(skip(config))]
pub async fn create_inbox(config: &BaseConfig) -> Result<Arc<dyn SmsInbox>> {
    match &config.inbox_path {
        Some(path) => {
            info!(inbox_path = %path, "Using SQLite SMS inbox");
            let inbox = SqliteInbox::open(path).await.map_err(|e| {
                error!(error = %e, inbox_path = %path, "Failed to open SMS inbox");
                anyhow::anyhow!("Failed to open SMS inbox {}: {}", path, e)
            })?;
            Ok(Arc::new(inbox))
        }
        None => {
            info!("SMS_INBOX_PATH not set, historical sync has no source");
            Ok(Arc::new(EmptyInbox))
        }
    }
}

/// Builds AppComponents from config with the headless platform.
#[instrument(skip(config))]
pub async fn build_components(config: &AppConfig) -> Result<AppComponents> {
    let store = create_store(config.base()).await?;
    let inbox = create_inbox(config.base()).await?;
    let platform = Platform::headless(config.service());
    Ok(AppComponents::assemble(
        config.service(),
        store,
        config.collection(),
        inbox,
        platform,
    ))
}
