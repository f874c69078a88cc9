//! Configuration management for the ZAPScan binaries

use serde::{Deserialize, Serialize};
use std::path::Path;
use zapscan_core::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Engine control API connection settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Target and phase polling settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Report output settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Merge with environment variables (ZAPSCAN_ prefix)
    pub fn merge_env(mut self) -> Self {
        // Engine settings
        if let Ok(val) = std::env::var("ZAPSCAN_ENGINE_ENDPOINT") {
            self.engine.endpoint = val;
        }
        if let Ok(val) = std::env::var("ZAPSCAN_ENGINE_API_KEY") {
            self.engine.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("ZAPSCAN_REQUEST_TIMEOUT") {
            if let Ok(n) = val.parse() {
                self.engine.request_timeout_seconds = n;
            }
        }

        // Scan settings
        if let Ok(val) = std::env::var("ZAPSCAN_TARGET") {
            self.scan.target = val;
        }

        // Report settings
        if let Ok(val) = std::env::var("ZAPSCAN_REPORT_DIR") {
            self.report.output_dir = val;
        }
        if let Ok(val) = std::env::var("ZAPSCAN_REPORT_FORMAT") {
            if let Some(format) = ReportFormat::parse(&val) {
                self.report.format = format;
            }
        }

        // Logging
        if let Ok(val) = std::env::var("ZAPSCAN_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("ZAPSCAN_LOG_FORMAT") {
            self.logging.format = val;
        }

        self
    }

    /// Reject settings that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.scan.target.trim().is_empty() {
            return Err(Error::InvalidConfig {
                key: "scan.target".into(),
                message: "must not be empty".into(),
            });
        }

        match url::Url::parse(&self.engine.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(Error::InvalidConfig {
                    key: "engine.endpoint".into(),
                    message: format!("unsupported scheme {}", url.scheme()),
                })
            }
            Err(e) => {
                return Err(Error::InvalidConfig {
                    key: "engine.endpoint".into(),
                    message: e.to_string(),
                })
            }
        }

        if self.engine.request_timeout_seconds == 0 {
            return Err(Error::InvalidConfig {
                key: "engine.request_timeout_seconds".into(),
                message: "must be greater than zero".into(),
            });
        }

        for (key, poll) in [
            ("scan.discovery", self.scan.discovery()),
            ("scan.attack", self.scan.attack()),
            ("scan.spider_only", self.scan.spider_only()),
        ] {
            if poll.max_attempts == 0 {
                return Err(Error::InvalidConfig {
                    key: format!("{}.max_attempts", key),
                    message: "must be greater than zero".into(),
                });
            }
            if poll.interval_seconds == 0 {
                return Err(Error::InvalidConfig {
                    key: format!("{}.interval_seconds", key),
                    message: "must be greater than zero".into(),
                });
            }
        }

        Ok(())
    }
}

/// Engine control API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the engine's control API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key, sent with every call when set
    pub api_key: Option<String>,

    /// Upper bound on a single control call, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_endpoint() -> String {
    String::from("http://localhost:8080")
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Target and phase configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// URL of the asset under test
    #[serde(default = "default_target")]
    pub target: String,

    /// Discovery (spider) polling overrides
    #[serde(default, rename = "discovery")]
    pub discovery_poll: PollOverrides,

    /// Attack (active scan) polling overrides
    #[serde(default, rename = "attack")]
    pub attack_poll: PollOverrides,

    /// Polling overrides for a standalone spider run
    #[serde(default, rename = "spider_only")]
    pub spider_only_poll: PollOverrides,
}

fn default_target() -> String {
    String::from("http://localhost:3000")
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            discovery_poll: PollOverrides::default(),
            attack_poll: PollOverrides::default(),
            spider_only_poll: PollOverrides::default(),
        }
    }
}

impl ScanConfig {
    /// Discovery polling: 20 attempts every 5 seconds unless overridden
    pub fn discovery(&self) -> PhasePoll {
        self.discovery_poll.resolve(PhasePoll {
            max_attempts: 20,
            interval_seconds: 5,
            track_alerts: false,
        })
    }

    /// Attack polling: 60 attempts every 10 seconds unless overridden
    pub fn attack(&self) -> PhasePoll {
        self.attack_poll.resolve(PhasePoll {
            max_attempts: 60,
            interval_seconds: 10,
            track_alerts: true,
        })
    }

    /// Standalone spider polling: 60 attempts every 10 seconds, since the
    /// crawl is the whole run there
    pub fn spider_only(&self) -> PhasePoll {
        self.spider_only_poll.resolve(PhasePoll {
            max_attempts: 60,
            interval_seconds: 10,
            track_alerts: false,
        })
    }
}

/// Per-phase polling settings as written in the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollOverrides {
    pub max_attempts: Option<u32>,
    pub interval_seconds: Option<u64>,
    /// Log the current alert count on every tick
    pub track_alerts: Option<bool>,
}

impl PollOverrides {
    fn resolve(&self, defaults: PhasePoll) -> PhasePoll {
        PhasePoll {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            interval_seconds: self.interval_seconds.unwrap_or(defaults.interval_seconds),
            track_alerts: self.track_alerts.unwrap_or(defaults.track_alerts),
        }
    }
}

/// Resolved polling settings for one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasePoll {
    pub max_attempts: u32,
    pub interval_seconds: u64,
    pub track_alerts: bool,
}

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Plain-text comparison report
    #[default]
    Text,
    /// Full run summary as JSON
    Json,
}

impl ReportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    /// File extension used for reports in this format
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory the report file is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default)]
    pub format: ReportFormat,
}

fn default_output_dir() -> String {
    String::from(".")
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: ReportFormat::Text,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("pretty")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn engine_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.engine.endpoint = endpoint.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.engine.api_key = Some(key.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.config.scan.target = target.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.report.output_dir = dir.into();
        self
    }

    pub fn report_format(mut self, format: ReportFormat) -> Self {
        self.config.report.format = format;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
