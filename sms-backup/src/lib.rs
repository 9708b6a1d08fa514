//! # SMS backup service
//!
//! Wires the event listener, the keep-alive host and the bootstrap/sync controller around a
//! document store. Loads config from env and feeds SMS events from a JSON-lines source.

pub mod bootstrap;
pub mod cli;
pub mod components;
pub mod config;
pub mod receiver;
pub mod runner;
pub mod service;

pub use cli::{load_config, Cli, Commands};

pub use bootstrap::{InitOutcome, SyncController, SyncReport, HISTORY_SYNC_LIMIT};
pub use components::{build_components, create_inbox, create_store, AppComponents, Platform};
pub use config::{AppConfig, BaseConfig, FirestoreSettings, ServiceConfig, StoreBackend};
pub use receiver::{SmsReceiver, BACKUP_CHANNEL_ID};
pub use runner::{feed_events, run_list, run_service, run_sync, serve, serve_until};
pub use service::{BackupService, ServiceState, RECEIVER_PRIORITY, SERVICE_CHANNEL_ID};
