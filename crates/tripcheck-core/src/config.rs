//! Configuration management for tripcheck.
//!
//! Provides TOML-based run parameters with XDG-compliant paths and
//! environment variable overrides. A loaded [`AppConfig`] is immutable for
//! the duration of a run and is handed to each component explicitly.

use crate::error::{ConfigError, ConfigResult};
use crate::types::DayCounting;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default landing page of the travel-policy purchase flow.
pub const DEFAULT_BASE_URL: &str = "https://digital.harel-group.co.il/travel-policy";

/// Main run configuration.
///
/// This is loaded from `~/.config/tripcheck/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Site under test
    pub site: SiteConfig,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Explicit wait and typing cadence
    pub waits: WaitConfig,
    /// Trip length expectations
    pub trip: TripConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration (default location or `path`) with environment
    /// variable overrides applied, then validate it.
    ///
    /// Supports the following environment variables:
    /// - `TRIPCHECK_BASE_URL`: Override the landing page URL
    /// - `TRIPCHECK_HEADLESS`: Override browser headless mode (true/false)
    /// - `TRIPCHECK_LANG`: Override the browser language
    /// - `TRIPCHECK_EXPLICIT_TIMEOUT_SECS`: Override the default wait timeout
    /// - `TRIPCHECK_SHORT_TIMEOUT_SECS`: Override the short wait timeout
    /// - `TRIPCHECK_COUNT_INCLUSIVE`: Override the day-counting convention (true/false)
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Unparsable values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TRIPCHECK_BASE_URL") {
            tracing::debug!("Override site.base_url from env: {}", url);
            self.site.base_url = url;
        }

        if let Some(headless) = lookup("TRIPCHECK_HEADLESS").and_then(|v| v.parse().ok()) {
            self.browser.headless = headless;
            tracing::debug!("Override browser.headless from env: {}", headless);
        }

        if let Some(lang) = lookup("TRIPCHECK_LANG") {
            tracing::debug!("Override browser.language from env: {}", lang);
            self.browser.language = lang;
        }

        if let Some(secs) = lookup("TRIPCHECK_EXPLICIT_TIMEOUT_SECS").and_then(|v| v.parse().ok())
        {
            self.waits.explicit_timeout_secs = secs;
            tracing::debug!("Override waits.explicit_timeout_secs from env: {}", secs);
        }

        if let Some(secs) = lookup("TRIPCHECK_SHORT_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.waits.short_timeout_secs = secs;
            tracing::debug!("Override waits.short_timeout_secs from env: {}", secs);
        }

        if let Some(inclusive) = lookup("TRIPCHECK_COUNT_INCLUSIVE").and_then(|v| v.parse().ok())
        {
            self.trip.count_inclusive = inclusive;
            tracing::debug!("Override trip.count_inclusive from env: {}", inclusive);
        }
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> ConfigResult<()> {
        url::Url::parse(&self.site.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "site.base_url".to_string(),
            reason: e.to_string(),
        })?;

        if self.waits.explicit_timeout_secs == 0 {
            return Err(invalid("waits.explicit_timeout_secs", "must be positive"));
        }
        if self.waits.short_timeout_secs == 0 {
            return Err(invalid("waits.short_timeout_secs", "must be positive"));
        }
        if self.waits.short_timeout_secs > self.waits.explicit_timeout_secs {
            return Err(invalid(
                "waits.short_timeout_secs",
                "must not exceed waits.explicit_timeout_secs",
            ));
        }
        if self.waits.poll_interval_ms == 0 {
            return Err(invalid("waits.poll_interval_ms", "must be positive"));
        }
        if self.trip.requested_days == 0 {
            return Err(invalid("trip.requested_days", "must be at least one day"));
        }
        if self.trip.tolerance_days < 0 {
            return Err(invalid("trip.tolerance_days", "must not be negative"));
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/tripcheck/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "tripcheck", "tripcheck").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Site under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Landing page of the purchase flow
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Browser launch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// UI language passed to the browser (`--lang`)
    pub language: String,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Start the window maximized (headed mode only)
    pub start_maximized: bool,
    /// Explicit Chrome/Chromium executable; autodetected when unset
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            language: "he".to_string(),
            window_width: 1920,
            window_height: 1080,
            start_maximized: true,
            chrome_path: None,
        }
    }
}

/// Explicit wait and typing cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Default explicit wait budget in seconds
    pub explicit_timeout_secs: u64,
    /// Budget for scoped short waits in seconds
    pub short_timeout_secs: u64,
    /// Delay between readiness re-evaluations in milliseconds
    pub poll_interval_ms: u64,
    /// Delay between keystrokes when typing into masked inputs
    pub keystroke_delay_ms: u64,
    /// Settle time after a hard clear
    pub clear_settle_ms: u64,
}

impl WaitConfig {
    /// Default explicit timeout.
    #[must_use]
    pub fn explicit_timeout(&self) -> Duration {
        Duration::from_secs(self.explicit_timeout_secs)
    }

    /// Short timeout for scoped overrides.
    #[must_use]
    pub fn short_timeout(&self) -> Duration {
        Duration::from_secs(self.short_timeout_secs)
    }

    /// Polling interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Inter-keystroke delay for masked inputs.
    #[must_use]
    pub fn keystroke_delay(&self) -> Duration {
        Duration::from_millis(self.keystroke_delay_ms)
    }

    /// Settle time after clearing an input.
    #[must_use]
    pub fn clear_settle(&self) -> Duration {
        Duration::from_millis(self.clear_settle_ms)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            explicit_timeout_secs: 25,
            short_timeout_secs: 5,
            poll_interval_ms: 250,
            keystroke_delay_ms: 30,
            clear_settle_ms: 50,
        }
    }
}

/// Trip length expectations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripConfig {
    /// Whether the site counts both the departure and the return day
    pub count_inclusive: bool,
    /// Days from today until departure
    pub depart_offset_days: u32,
    /// Trip length the site should display
    pub requested_days: u32,
    /// Accepted difference between displayed and expected length
    pub tolerance_days: i64,
}

impl TripConfig {
    /// Day-counting convention selected by `count_inclusive`.
    #[must_use]
    pub fn counting(&self) -> DayCounting {
        DayCounting::from_inclusive(self.count_inclusive)
    }
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            count_inclusive: true,
            depart_offset_days: 7,
            requested_days: 30,
            tolerance_days: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.site.base_url, DEFAULT_BASE_URL);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.language, "he");
        assert_eq!(config.waits.explicit_timeout_secs, 25);
        assert_eq!(config.waits.short_timeout_secs, 5);
        assert!(config.trip.count_inclusive);
        assert_eq!(config.trip.tolerance_days, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[site]"));
        assert!(toml_str.contains("[waits]"));
        assert!(toml_str.contains("[trip]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");
        fs::write(
            &config_path,
            "[browser]\nheadless = true\n\n[trip]\nrequested_days = 14\n",
        )
        .expect("write config file");

        let config = AppConfig::load_from(&config_path).expect("load config");
        assert!(config.browser.headless);
        assert_eq!(config.trip.requested_days, 14);
        // Untouched sections keep their defaults
        assert_eq!(config.waits.explicit_timeout_secs, 25);
    }

    #[test]
    fn test_load_from_missing_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let err = AppConfig::load_from(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TRIPCHECK_HEADLESS", "true"),
            ("TRIPCHECK_LANG", "en"),
            ("TRIPCHECK_SHORT_TIMEOUT_SECS", "3"),
            ("TRIPCHECK_COUNT_INCLUSIVE", "false"),
            ("TRIPCHECK_EXPLICIT_TIMEOUT_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|key| vars.get(key).map(ToString::to_string));

        assert!(config.browser.headless);
        assert_eq!(config.browser.language, "en");
        assert_eq!(config.waits.short_timeout_secs, 3);
        assert!(!config.trip.count_inclusive);
        assert_eq!(config.trip.counting(), DayCounting::Exclusive);
        // Unparsable values are ignored
        assert_eq!(config.waits.explicit_timeout_secs, 25);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.waits.short_timeout_secs = 30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "waits.short_timeout_secs"
        ));

        let mut config = AppConfig::default();
        config.site.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.trip.requested_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wait_durations() {
        let waits = WaitConfig::default();
        assert_eq!(waits.explicit_timeout(), Duration::from_secs(25));
        assert_eq!(waits.short_timeout(), Duration::from_secs(5));
        assert_eq!(waits.keystroke_delay(), Duration::from_millis(30));
    }
}
