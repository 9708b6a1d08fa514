//! AppConfig: BaseConfig + ServiceConfig. Use load() for env-based loading.

use anyhow::Result;

use super::{BaseConfig, ServiceConfig};

pub struct AppConfig {
    pub base: BaseConfig,
    pub service: ServiceConfig,
}

impl AppConfig {
    /// Load full config from environment variables.
    /// Call validate() after load to check config before init.
    pub fn load() -> Result<Self> {
        let base = BaseConfig::load()?;
        let service = ServiceConfig::load()?;
        Ok(Self { base, service })
    }

    /// Validate config. Call after load() to fail fast before init.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()
    }

    pub fn base(&self) -> &BaseConfig {
        &self.base
    }
    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }

    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }
    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }
    pub fn collection(&self) -> &str {
        &self.base.collection
    }
}
