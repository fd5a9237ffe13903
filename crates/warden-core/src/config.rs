//! Runtime configuration
//!
//! Two sources:
//! - environment variables for process-level switches ([`AgentsConfig`])
//! - a TOML file for Budget Guardian thresholds ([`GuardianConfig`])
//!
//! ## Threshold resolution
//!
//! 1. An explicit path (`--config`), if it exists
//! 2. The override in the data dir (~/.local/share/warden/config/guardian.toml)
//! 3. Embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::agents::runtime::DEFAULT_RUN_INTERVAL;
use crate::error::{Error, Result};

/// Embedded default thresholds (compiled into binary)
const DEFAULT_GUARDIAN_CONFIG: &str = include_str!("../config/guardian.toml");

/// Environment variable that starts every agent when the process boots
pub const AUTO_START_ENV: &str = "WARDEN_AUTO_START_AGENTS";

/// Environment variable overriding the Budget Guardian interval (seconds)
pub const GUARDIAN_INTERVAL_ENV: &str = "WARDEN_GUARDIAN_INTERVAL_SECS";

/// Process-level agent settings
#[derive(Debug, Clone, PartialEq)]
pub struct AgentsConfig {
    /// Start all registered agents at startup
    pub auto_start: bool,
    /// Time between Budget Guardian cycles
    pub guardian_interval: Duration,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            auto_start: false,
            guardian_interval: DEFAULT_RUN_INTERVAL,
        }
    }
}

impl AgentsConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(AUTO_START_ENV).ok().as_deref(),
            std::env::var(GUARDIAN_INTERVAL_ENV).ok().as_deref(),
        )
    }

    fn from_vars(auto_start: Option<&str>, interval_secs: Option<&str>) -> Self {
        let auto_start = auto_start
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);

        let guardian_interval = match interval_secs.map(|s| s.trim().parse::<u64>()) {
            Some(Ok(0)) => {
                warn!("{} is 0, using default interval", GUARDIAN_INTERVAL_ENV);
                DEFAULT_RUN_INTERVAL
            }
            Some(Ok(secs)) => Duration::from_secs(secs),
            Some(Err(e)) => {
                warn!(error = %e, "Invalid {}, using default interval", GUARDIAN_INTERVAL_ENV);
                DEFAULT_RUN_INTERVAL
            }
            None => DEFAULT_RUN_INTERVAL,
        };

        Self {
            auto_start,
            guardian_interval,
        }
    }
}

/// Budget overrun projection thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrunConfig {
    pub confidence: f64,
    /// Overrun above this % of the budget is critical
    pub critical_percent: f64,
    /// Overrun above this % of the budget is high
    pub high_percent: f64,
}

impl Default for OverrunConfig {
    fn default() -> Self {
        Self {
            confidence: 0.85,
            critical_percent: 50.0,
            high_percent: 25.0,
        }
    }
}

/// Spending pace thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaceConfig {
    pub confidence: f64,
    /// Spent / expected ratio that counts as an anomaly
    pub anomaly_ratio: f64,
    /// Ratio above which the anomaly is high severity
    pub high_ratio: f64,
    /// Anomalies only fire once more days than this have elapsed
    pub min_days_elapsed: u32,
}

impl Default for PaceConfig {
    fn default() -> Self {
        Self {
            confidence: 0.75,
            anomaly_ratio: 1.5,
            high_ratio: 2.0,
            min_days_elapsed: 7,
        }
    }
}

/// Historical deviation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalConfig {
    pub confidence: f64,
    /// Spend above `average * deviation_multiplier` is an anomaly
    pub deviation_multiplier: f64,
    pub min_days_elapsed: u32,
    /// Full months before the current one used for the average
    pub months_back: u32,
}

impl Default for HistoricalConfig {
    fn default() -> Self {
        Self {
            confidence: 0.70,
            deviation_multiplier: 1.3,
            min_days_elapsed: 14,
            months_back: 3,
        }
    }
}

/// User-defined alert threshold settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub confidence: f64,
    /// Spent % at or above which a threshold breach is high severity
    pub high_percent: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            confidence: 1.0,
            high_percent: 90.0,
        }
    }
}

/// Budget reallocation suggestion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReallocationConfig {
    pub buffer_multiplier: f64,
    pub confidence: f64,
}

impl Default for ReallocationConfig {
    fn default() -> Self {
        Self {
            buffer_multiplier: 1.1,
            confidence: 0.80,
        }
    }
}

/// All Budget Guardian thresholds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    pub overrun: OverrunConfig,
    pub pace: PaceConfig,
    pub historical: HistoricalConfig,
    pub threshold: ThresholdConfig,
    pub reallocation: ReallocationConfig,
}

impl GuardianConfig {
    /// Load thresholds, preferring `path`, then the data-dir override, then
    /// the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        let content = match candidate {
            Some(ref p) if p.exists() => {
                debug!(path = %p.display(), "Loading guardian config");
                fs::read_to_string(p).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", p.display(), e))
                })?
            }
            _ => DEFAULT_GUARDIAN_CONFIG.to_string(),
        };

        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid guardian config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the analysis meaningless
    pub fn validate(&self) -> Result<()> {
        let confidences = [
            ("overrun.confidence", self.overrun.confidence),
            ("pace.confidence", self.pace.confidence),
            ("historical.confidence", self.historical.confidence),
            ("threshold.confidence", self.threshold.confidence),
            ("reallocation.confidence", self.reallocation.confidence),
        ];
        for (key, value) in confidences {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be within [0, 1], got {}",
                    key, value
                )));
            }
        }

        if self.overrun.critical_percent < self.overrun.high_percent {
            return Err(Error::Config(
                "overrun.critical_percent must not be below overrun.high_percent".to_string(),
            ));
        }
        if self.pace.anomaly_ratio <= 0.0 || self.pace.high_ratio < self.pace.anomaly_ratio {
            return Err(Error::Config(
                "pace.anomaly_ratio must be positive and not above pace.high_ratio".to_string(),
            ));
        }
        if self.historical.deviation_multiplier <= 0.0 {
            return Err(Error::Config(
                "historical.deviation_multiplier must be positive".to_string(),
            ));
        }
        if self.historical.months_back == 0 {
            return Err(Error::Config("historical.months_back must be at least 1".to_string()));
        }
        if self.reallocation.buffer_multiplier < 1.0 {
            return Err(Error::Config(
                "reallocation.buffer_multiplier must be at least 1.0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("warden").join("config").join("guardian.toml"))
}
