//! Settings that control how logs are filtered and formatted.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, str::FromStr};
use tracing_subscriber::{filter::Directive, EnvFilter};

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directives applied to log events, such as `INFO` or
    /// `draft_suggestions_client=DEBUG`.
    ///
    /// Config files list them as a sequence. The environment variable
    /// `DRAFT_SUGGESTIONS_LOGGING__LEVELS` replaces that list with a comma
    /// separated string. Loading settings never looks at `RUST_LOG`; the binary
    /// adds it on top with [`LogLevels::with_overrides`] when logging starts.
    ///
    /// ```yaml
    /// # config/local.yaml
    /// logging:
    ///   levels:
    ///     - INFO
    ///     - draft_suggestions_client=DEBUG
    ///     - hyper=WARN
    /// ```
    pub levels: LogLevels,

    /// The format to output logs in.
    pub format: LogFormat,
}

/// Output formats understood by the log subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human oriented output.
    Pretty,

    /// Newline delimited JSON, one object per log event.
    Json,

    /// One short line per log event.
    Compact,
}

/// The shapes `levels` may take in configuration.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevels {
    /// `"INFO,hyper=WARN"`, as environment variables provide it.
    Joined(String),
    /// `["INFO", "hyper=WARN"]`, as config files provide it.
    Listed(Vec<String>),
}

/// An ordered list of `tracing` filter directives.
///
/// Every entry is known to parse as a [`Directive`] and to name targets the
/// way Rust crates do, with underscores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLevels", into = "Vec<String>")]
pub struct LogLevels(Vec<String>);

impl LogLevels {
    /// The directives, in the order they are applied.
    pub fn directives(&self) -> &[String] {
        &self.0
    }

    /// Append the directives in `overrides`, if any, so they take precedence.
    ///
    /// # Errors
    /// If `overrides` holds an invalid directive.
    pub fn with_overrides(&self, overrides: Option<&str>) -> anyhow::Result<Self> {
        let mut levels = self.clone();
        if let Some(overrides) = overrides.filter(|o| !o.trim().is_empty()) {
            let extra: LogLevels = overrides
                .parse()
                .context(format!("parsing log directives {:?}", overrides))?;
            levels.0.extend(extra.0);
        }
        Ok(levels)
    }

    /// Build the filter used by the log subscriber.
    pub fn to_env_filter(&self) -> EnvFilter {
        self.0
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(EnvFilter::default(), EnvFilter::add_directive)
    }
}

impl FromStr for LogLevels {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut directives = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            part.parse::<Directive>()
                .context(format!("invalid log directive {:?}", part))?;
            if part.contains('-') {
                bail!("log target {:?} must use underscores, not hyphens", part);
            }
            directives.push(part.to_string());
        }
        Ok(Self(directives))
    }
}

impl TryFrom<RawLevels> for LogLevels {
    type Error = anyhow::Error;

    fn try_from(raw: RawLevels) -> Result<Self, Self::Error> {
        match raw {
            RawLevels::Joined(joined) => joined.parse(),
            RawLevels::Listed(list) => list.iter().try_fold(Self::default(), |levels, item| {
                levels.with_overrides(Some(item.as_str()))
            }),
        }
    }
}

impl From<LogLevels> for Vec<String> {
    fn from(levels: LogLevels) -> Self {
        levels.0
    }
}
