//! Emulator configuration.
//!
//! Loaded from a TOML file whose sections map onto the library config
//! structs. Every key has a default, and a missing file means "all defaults".

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tapgate_core::constants::{
    DEFAULT_BASE_URL, DEFAULT_IDLE_TICK_MS, DEFAULT_REQUEST_TIMEOUT_MS, HAZARD_POLL_INTERVAL_MS,
};
use tapgate_endpoint::SchedulerConfig;
use tapgate_network::{AlarmPollerConfig, HttpTransportConfig};

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerSection,
    pub alarm: AlarmSection,
    pub scheduler: SchedulerSection,
    pub link: LinkSection,
    pub logging: LoggingSection,
}

/// Decision service location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlarmSection {
    pub poll_interval_ms: u64,
}

impl Default for AlarmSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: HAZARD_POLL_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerSection {
    pub idle_tick_ms: u64,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            idle_tick_ms: DEFAULT_IDLE_TICK_MS,
        }
    }
}

/// Simulated network association at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkSection {
    pub start_connected: bool,
}

impl Default for LinkSection {
    fn default() -> Self {
        Self {
            start_connected: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// `tracing_subscriber::EnvFilter` directives.
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, using defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.base_url.trim().is_empty() {
            bail!("server.base_url must not be empty");
        }
        if self.server.timeout_ms == 0 {
            bail!("server.timeout_ms must be greater than zero");
        }
        self.alarm_poller_config()?;
        Ok(())
    }

    pub fn http_transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            base_url: self.server.base_url.clone(),
            timeout: Duration::from_millis(self.server.timeout_ms),
        }
    }

    pub fn alarm_poller_config(&self) -> Result<AlarmPollerConfig> {
        AlarmPollerConfig::new(Duration::from_millis(self.alarm.poll_interval_ms))
            .context("Invalid [alarm] section")
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            idle_tick: Duration::from_millis(self.scheduler.idle_tick_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://192.168.137.1:5000/api");
        assert_eq!(config.server.timeout_ms, 5000);
        assert_eq!(config.alarm.poll_interval_ms, 2000);
        assert_eq!(config.scheduler.idle_tick_ms, 20);
        assert!(config.link.start_connected);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_toml_str(
            r#"
            [server]
            base_url = "http://10.0.0.5:8080/api"
            timeout_ms = 1500

            [alarm]
            poll_interval_ms = 5000

            [scheduler]
            idle_tick_ms = 50

            [link]
            start_connected = false

            [logging]
            filter = "tapgate=debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.http_transport_config().base_url, "http://10.0.0.5:8080/api");
        assert_eq!(
            config.http_transport_config().timeout,
            Duration::from_millis(1500)
        );
        assert_eq!(
            config.alarm_poller_config().unwrap().interval(),
            Duration::from_secs(5)
        );
        assert_eq!(config.scheduler_config().idle_tick, Duration::from_millis(50));
        assert!(!config.link.start_connected);
        assert_eq!(config.logging.filter, "tapgate=debug");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [link]
            start_connected = false
            "#,
        )
        .unwrap();

        assert!(!config.link.start_connected);
        assert_eq!(config.server, ServerSection::default());
        assert_eq!(config.alarm, AlarmSection::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[rstest]
    #[case("[alarm]\npoll_interval_ms = 500")]
    #[case("[server]\ntimeout_ms = 0")]
    #[case("[server]\nbase_url = \"\"")]
    #[case("[server]\nbase_uri = \"http://x\"")]
    #[case("[alarm]\npoll_interval_ms = \"fast\"")]
    fn test_invalid_config(#[case] content: &str) {
        assert!(Config::from_toml_str(content).is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("does/not/exist/endpoint.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
