//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `glowminder.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;

use glowminder_adapter_storage_sqlite_sqlx::Config as StorageConfig;
use glowminder_app::scheduler::{NotFoundPolicy, OverlapPolicy, SchedulerConfig};
use glowminder_domain::conversation::ConversationSettings;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Delivery engine settings.
    pub scheduler: SchedulerSection,
    /// Lamp controller settings.
    pub device: DeviceConfig,
    /// Chat flow settings.
    pub conversation: ConversationConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    /// Seconds between two delivery cycles.
    pub cycle_duration_secs: u64,
    pub not_found_policy: NotFoundPolicy,
    pub overlap: OverlapPolicy,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Base URL of the lamp controller. The virtual lamp is used when unset.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Offset, in minutes east of UTC, at which typed times are read.
    pub utc_offset_minutes: i32,
    pub page_size: u32,
}

impl Config {
    /// Load configuration from `glowminder.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("glowminder.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("GLOWMINDER_HOST") {
            self.server.host = val;
        }
        if let Some(port) = lookup("GLOWMINDER_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = lookup("GLOWMINDER_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = lookup("GLOWMINDER_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("GLOWMINDER_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(secs) = lookup("GLOWMINDER_CYCLE_SECS").and_then(|val| val.parse().ok()) {
            self.scheduler.cycle_duration_secs = secs;
        }
        if let Some(val) = lookup("GLOWMINDER_DEVICE_ENDPOINT") {
            self.device.endpoint = Some(val).filter(|endpoint| !endpoint.is_empty());
        }
        if let Some(secs) = lookup("GLOWMINDER_DEVICE_TIMEOUT_SECS").and_then(|val| val.parse().ok())
        {
            self.device.timeout_secs = secs;
        }
        if let Some(minutes) =
            lookup("GLOWMINDER_UTC_OFFSET_MINUTES").and_then(|val| val.parse().ok())
        {
            self.conversation.utc_offset_minutes = minutes;
        }
        if let Some(size) = lookup("GLOWMINDER_PAGE_SIZE").and_then(|val| val.parse().ok()) {
            self.conversation.page_size = size;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.scheduler.cycle_duration_secs == 0 {
            return Err(ConfigError::Validation(
                "scheduler cycle duration must be non-zero".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database max connections must be non-zero".to_string(),
            ));
        }
        if self.conversation.page_size == 0 {
            return Err(ConfigError::Validation(
                "conversation page size must be non-zero".to_string(),
            ));
        }
        self.utc_offset()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Storage adapter settings.
    #[must_use]
    pub fn storage(&self) -> StorageConfig {
        StorageConfig {
            database_url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            busy_timeout: Duration::from_secs(self.database.busy_timeout_secs),
        }
    }

    #[must_use]
    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            cycle_duration: Duration::from_secs(self.scheduler.cycle_duration_secs),
            not_found_policy: self.scheduler.not_found_policy,
            overlap_policy: self.scheduler.overlap,
        }
    }

    /// Device endpoint and request timeout, if an endpoint is configured.
    #[must_use]
    pub fn device(&self) -> Option<glowminder_adapter_device_http::Config> {
        self.device
            .endpoint
            .as_ref()
            .map(|base_url| glowminder_adapter_device_http::Config {
                base_url: base_url.clone(),
                timeout: Duration::from_secs(self.device.timeout_secs),
            })
    }

    /// Chat flow settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the UTC offset is out of range.
    pub fn conversation(&self) -> Result<ConversationSettings, ConfigError> {
        Ok(ConversationSettings {
            utc_offset: self.utc_offset()?,
            page_size: self.conversation.page_size,
        })
    }

    fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.conversation
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "utc offset of {} minutes is out of range",
                    self.conversation.utc_offset_minutes
                ))
            })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:glowminder.db?mode=rwc".to_string(),
            max_connections: 5,
            busy_timeout_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "glowminderd=info,glowminder=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            cycle_duration_secs: 60,
            not_found_policy: NotFoundPolicy::default(),
            overlap: OverlapPolicy::default(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 5,
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            page_size: 5,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
