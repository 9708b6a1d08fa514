//! App configuration: BaseConfig (logging + document store + inbox) + ServiceConfig (host behaviour).

mod app_config;
mod base;
mod service;


pub use app_config::AppConfig;
pub use base::{BaseConfig, FirestoreSettings, StoreBackend};
pub use service::ServiceConfig;
