//! Configuration management module for the trace gateway.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Environment variable overrides
//! - Configuration file support
//! - Component-wise validation
mod blobstore;
mod long_poll;
mod monitoring;
mod server;
mod storage;
pub use blobstore::*;
pub use long_poll::*;
pub use monitoring::*;
pub use server::*;
pub use storage::*;
use std::env;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Prefix of environment variables overriding configuration values,
/// e.g. `TRACE_GATEWAY__SERVER__LISTEN_ADDRESS=127.0.0.1:9000`
pub const ENV_PREFIX: &str = "TRACE_GATEWAY";

/// Main configuration container for the gateway components
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GatewayConfig {
    /// HTTP listener and endpoint paths
    #[serde(default)]
    pub server: ServerConfig,
    /// Long-poll behaviour of the signal endpoint
    #[serde(default)]
    pub long_poll: LongPollConfig,
    /// Versioned signal store
    #[serde(default)]
    pub storage: StorageConfig,
    /// Blob server used by the upload relay
    #[serde(default)]
    pub blobstore: BlobstoreConfig,
    /// Metrics and monitoring settings
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

impl GatewayConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `TRACE_GATEWAY__` prefix (highest priority)
    ///
    /// # Note
    /// This method does NOT validate the configuration. Callers MUST call `validate()`
    /// before using the configuration.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("CONFIG_PATH", "config/gateway.toml");
    /// let cfg = GatewayConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    ///
    /// Must be called after all configuration overrides. A misconfigured
    /// blob server URL or endpoint path fails here, at startup, rather than
    /// on the first request that needs it.
    pub fn validate(self) -> Result<Self> {
        self.server.validate()?;
        self.long_poll.validate()?;
        self.storage.validate()?;
        self.blobstore.validate()?;
        self.monitoring.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}

pub(super) fn invalid(msg: String) -> Error {
    Error::Config(ConfigError::Message(msg))
}
