//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `ruletree.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rule storage settings.
    pub rules: RulesConfig,
    /// Rule engine settings.
    pub engine: EngineConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Where rule files live.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Directory holding one JSON file per rule.
    pub dir: PathBuf,
}

/// Polling behaviour of the rule engine.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between two evaluations of all enabled rules.
    pub poll_interval_secs: u64,
    /// Bring trees to canonical form right after loading them.
    pub simplify_on_load: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `ruletree.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("ruletree.toml")?;
        config.apply_env_overrides();
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

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("RULETREE_RULES_DIR") {
            self.rules.dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("RULETREE_POLL_INTERVAL")
            && let Ok(secs) = val.parse()
        {
            self.engine.poll_interval_secs = secs;
        }
        if let Ok(val) = std::env::var("RULETREE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the time between two polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.engine.poll_interval_secs)
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("rules"),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            simplify_on_load: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "ruletreed=info,ruletree=info".to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.rules.dir, PathBuf::from("rules"));
        assert_eq!(config.engine.poll_interval_secs, 60);
        assert!(config.engine.simplify_on_load);
        assert_eq!(config.logging.filter, "ruletreed=info,ruletree=info");
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.engine.poll_interval_secs, 60);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [rules]
            dir = '/var/lib/ruletree'

            [engine]
            poll_interval_secs = 5
            simplify_on_load = false

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.rules.dir, PathBuf::from("/var/lib/ruletree"));
        assert_eq!(config.engine.poll_interval_secs, 5);
        assert!(!config.engine.simplify_on_load);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [engine]
            poll_interval_secs = 10
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.engine.poll_interval_secs, 10);
        assert!(config.engine.simplify_on_load);
        assert_eq!(config.rules.dir, PathBuf::from("rules"));
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.engine.poll_interval_secs, 60);
    }

    #[test]
    fn should_reject_zero_poll_interval() {
        let mut config = Config::default();
        config.engine.poll_interval_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_accept_default_poll_interval() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_convert_poll_interval_to_duration() {
        let mut config = Config::default();
        config.engine.poll_interval_secs = 15;
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
