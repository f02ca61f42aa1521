#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! # Draft Suggestions Settings
//!
//! Configuration is specified in several ways, with later methods overriding earlier ones.
//!
//! 1. A base configuration checked into the repository, in `config/base.yaml`.
//!    This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable
//!    `DRAFT_SUGGESTIONS_ENV`. The settings for that environment are then
//!    loaded from `config/${env}.yaml`, if it exists. The default environment
//!    is "development". A "production" environment is also provided.
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This is the place for the Umbrella API key when
//!    running locally.
//! 4. Environment variables that begin with `DRAFT_SUGGESTIONS_` and use `__`
//!    to separate levels. For example, `UmbrellaSettings::api_key` can be
//!    controlled from the environment variable
//!    `DRAFT_SUGGESTIONS_UMBRELLA__API_KEY`.
//!
//! Tests should use `Settings::load_for_tests` which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if it
//! exists). It does not read from environment variables.
//!
//! Configuration files are canonically YAML files.

mod logging;

pub use logging::{LogFormat, LogLevels, LoggingSettings};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::{fmt, time::Duration};

/// Prefix shared by the environment variables that configure the service.
const ENV_PREFIX: &str = "DRAFT_SUGGESTIONS";

/// Top level settings object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// The environment the service is running in. Should only be set with the
    /// `DRAFT_SUGGESTIONS_ENV` environment variable.
    pub env: String,

    /// Enable additional features to debug the application. This should not be
    /// set to true in production environments.
    pub debug: bool,

    /// Settings for the Suggestions Umbrella dependency.
    pub umbrella: UmbrellaSettings,

    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Settings for talking to the Suggestions Umbrella service.
#[serde_as]
#[derive(Clone, Serialize, Deserialize)]
pub struct UmbrellaSettings {
    /// Absolute URL that content is posted to, such as
    /// `https://upp-suggestions.example.com/content/suggest`.
    pub endpoint: String,

    /// The key sent in the `X-Api-Key` header.
    #[serde(default)]
    pub api_key: String,

    /// Upper bound on a whole request, from connecting until the body has
    /// been read.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "timeout_ms")]
    pub timeout: Duration,

    /// Upper bound on establishing a connection.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "connect_timeout_ms")]
    pub connect_timeout: Duration,
}

impl fmt::Debug for UmbrellaSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UmbrellaSettings")
            .field("endpoint", &self.endpoint)
            .field(
                "api_key",
                &if self.api_key.is_empty() {
                    "<empty>"
                } else {
                    "<redacted>"
                },
            )
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the required
    /// configuration files are missing.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var(format!("{}_ENV", ENV_PREFIX))
            .unwrap_or_else(|_| "development".to_string());

        Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("./config/base"))
            // Merge in an environment specific config.
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables that start with "DRAFT_SUGGESTIONS_"
            // and have "__" to separate levels. For example,
            // `DRAFT_SUGGESTIONS_UMBRELLA__ENDPOINT` maps to
            // `Settings::umbrella::endpoint`.
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override("env", env)?
            .build()?
            .try_deserialize()
    }

    /// Load settings from configuration files for tests.
    ///
    /// `changer` can adjust the loaded settings before they are returned.
    ///
    /// # Panics
    /// If the test configuration files are missing or invalid.
    pub fn load_for_tests<F: FnOnce(&mut Self)>(changer: F) -> Self {
        let mut settings: Self = Config::builder()
            .add_source(File::with_name("../config/base"))
            .add_source(File::with_name("../config/test"))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("../config/local_test").required(false))
            .set_override("env", "test")
            .expect("Could not set env for tests")
            .build()
            .expect("Could not load settings for tests")
            .try_deserialize()
            .expect("Could not convert settings");
        changer(&mut settings);
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::{Settings, UmbrellaSettings};
    use crate::LogFormat;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_settings_load() {
        let settings = Settings::load_for_tests(|_| {});

        assert_eq!(settings.env, "test");
        assert_eq!(
            settings.umbrella.endpoint,
            "http://localhost:8080/content/suggest"
        );
        assert_eq!(settings.umbrella.api_key, "test-api-key");
        assert_eq!(settings.umbrella.timeout, Duration::from_millis(2000));
    }

    #[test]
    fn test_settings_changer_is_applied() {
        let settings = Settings::load_for_tests(|s| {
            s.debug = true;
            s.logging.format = LogFormat::Compact;
        });

        assert!(settings.debug);
        assert!(matches!(settings.logging.format, LogFormat::Compact));
    }

    #[test]
    fn umbrella_settings_read_millisecond_durations() {
        let umbrella: UmbrellaSettings = serde_json::from_value(json!({
            "endpoint": "https://example.com/content/suggest",
            "timeout_ms": 1500,
            "connect_timeout_ms": 250,
        }))
        .expect("valid umbrella settings");

        assert_eq!(umbrella.api_key, "");
        assert_eq!(umbrella.timeout, Duration::from_millis(1500));
        assert_eq!(umbrella.connect_timeout, Duration::from_millis(250));
    }

    #[test]
    fn umbrella_settings_debug_hides_api_key() {
        let settings = Settings::load_for_tests(|s| s.umbrella.api_key = "s3cr3t".to_string());

        let printed = format!("{:?}", settings.umbrella);
        assert!(!printed.contains("s3cr3t"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_settings_ignore_rust_log() {
        std::env::set_var("RUST_LOG", "draft-suggestions=debug");
        let settings = Settings::load_for_tests(|_| {});
        std::env::remove_var("RUST_LOG");

        assert_eq!(settings.logging.levels.directives(), &["WARN".to_string()]);
    }
}
