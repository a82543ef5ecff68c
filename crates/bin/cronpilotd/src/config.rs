//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `cronpilot.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use cronpilot_app::scheduler::SchedulerConfig;
use cronpilot_domain::time;

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
    /// Cron evaluation settings.
    pub scheduler: SchedulerSection,
    /// AI provider settings.
    pub ai: AiConfig,
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
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Scheduler configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    /// IANA timezone cron expressions are evaluated in.
    pub timezone: String,
    /// Missed fires older than this are not replayed at startup.
    pub backfill_threshold_hours: u32,
}

/// `OpenAI`-compatible provider configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// API root, `/chat/completions` is appended.
    pub base_url: String,
    /// Bearer token. Leave empty to run without AI.
    pub api_key: String,
    /// Default model.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from `cronpilot.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("cronpilot.toml")?;
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

    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(val) = env("CRONPILOT_HOST") {
            self.server.host = val;
        }
        if let Some(port) = env("CRONPILOT_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = env("CRONPILOT_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = env("CRONPILOT_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = env("CRONPILOT_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = env("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = env("CRONPILOT_TIMEZONE") {
            self.scheduler.timezone = val;
        }
        if let Some(val) = env("CRONPILOT_AI_BASE_URL") {
            self.ai.base_url = val;
        }
        if let Some(val) = env("CRONPILOT_AI_MODEL") {
            self.ai.model = val;
        }
        if let Some(val) = env("CRONPILOT_AI_API_KEY").or_else(|| env("OPENAI_API_KEY")) {
            self.ai.api_key = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.scheduler.backfill_threshold_hours == 0 {
            return Err(ConfigError::Validation(
                "backfill threshold must be positive".to_string(),
            ));
        }
        if self.ai.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "AI timeout must be positive".to_string(),
            ));
        }
        self.scheduler_config().map(|_| ())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Scheduler settings with the timezone resolved.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an unknown timezone.
    pub fn scheduler_config(&self) -> Result<SchedulerConfig, ConfigError> {
        let timezone = time::parse_timezone(&self.scheduler.timezone)
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        Ok(SchedulerConfig {
            timezone,
            backfill_threshold: chrono::Duration::hours(i64::from(
                self.scheduler.backfill_threshold_hours,
            )),
        })
    }

    /// Provider settings for the `OpenAI` adapter.
    #[must_use]
    pub fn ai_config(&self) -> cronpilot_adapter_ai_openai::Config {
        cronpilot_adapter_ai_openai::Config {
            base_url: self.ai.base_url.clone(),
            api_key: self.ai.api_key.clone(),
            model: self.ai.model.clone(),
            timeout: Duration::from_secs(self.ai.timeout_secs),
        }
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
            url: "sqlite:cronpilot.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "cronpilotd=info,cronpilot=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            backfill_threshold_hours: 24,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        let defaults = cronpilot_adapter_ai_openai::Config::default();
        Self {
            base_url: defaults.base_url,
            api_key: defaults.api_key,
            model: defaults.model,
            timeout_secs: defaults.timeout.as_secs(),
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
