#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Command line entry point for the draft content suggestions client.
//!
//! - [draft-suggestions-client](../draft_suggestions_client/index.html)
//! - [draft-suggestions-settings](../draft_suggestions_settings/index.html)
//!
//! ```text
//! USAGE: draft-suggestions health
//!        draft-suggestions fetch <content.json>
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use draft_suggestions_client::{Content, RequestContext, SuggestionsApi, UmbrellaClient};
use draft_suggestions_settings::{LogFormat, Settings, UmbrellaSettings};
use tokio::io::AsyncWriteExt;
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// What to do with the Umbrella.
#[derive(Debug, PartialEq)]
enum Command {
    /// Run the synthetic round trip and print the status.
    Health,
    /// Post the content stored in a JSON file and print the raw response.
    Fetch(PathBuf),
}

impl Command {
    /// Parse the arguments that follow the program name.
    fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut args = args.into_iter();
        match (args.next().as_deref(), args.next(), args.next()) {
            (Some("health"), None, _) => Ok(Self::Health),
            (Some("fetch"), Some(path), None) => Ok(Self::Fetch(path.into())),
            _ => bail!("USAGE: draft-suggestions health | draft-suggestions fetch <content.json>"),
        }
    }
}

/// Primary entry point
#[tokio::main]
async fn main() -> Result<()> {
    let command = Command::from_args(std::env::args().skip(1))?;
    let settings = Settings::load().context("Loading settings")?;
    init_logging(&settings)?;

    let transport = build_transport(&settings.umbrella)?;
    let umbrella = UmbrellaClient::from_settings(&settings.umbrella, transport)
        .context("Configuring the Suggestions Umbrella client")?;
    tracing::info!(endpoint = %umbrella.endpoint(), ?command, "Suggestions Umbrella client ready");

    run(command, &umbrella).await
}

/// Execute `command` against `umbrella`.
async fn run(command: Command, umbrella: &dyn SuggestionsApi) -> Result<()> {
    let ctx = RequestContext::new();
    match command {
        Command::Health => {
            umbrella.is_valid().context("Validating configuration")?;
            let status = umbrella
                .is_healthy(&ctx)
                .await
                .context("Checking Suggestions Umbrella health")?;
            println!("{}", status);
        }
        Command::Fetch(path) => {
            let content = read_content(&path)?;
            let suggestions = umbrella
                .fetch_suggestions(&ctx, &content)
                .await
                .context(format!("Fetching suggestions for {}", content.uuid))?;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&suggestions).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

/// Load a [`Content`] record from a JSON file.
fn read_content(path: &Path) -> Result<Content> {
    let raw = std::fs::read(path).context(format!("Reading {}", path.display()))?;
    serde_json::from_slice(&raw).context(format!("Parsing content from {}", path.display()))
}

/// The transport shared by every client built by this binary.
fn build_transport(settings: &UmbrellaSettings) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.timeout)
        .build()
        .context("Unable to create the Reqwest client")
}

/// Set up logging, based on settings and the `RUST_LOG` environment variable.
fn init_logging(settings: &Settings) -> Result<()> {
    LogTracer::init()?;
    let env_filter = log_filter(settings, std::env::var("RUST_LOG").ok().as_deref())?;
    let builder = tracing_subscriber::fmt::Subscriber::builder().with_writer(std::io::stderr);

    match settings.logging.format {
        LogFormat::Pretty => {
            let subscriber = builder.pretty().finish().with(env_filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = builder.json().finish().with(env_filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = builder.compact().finish().with(env_filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

/// The filter for log events: the configured levels, with `rust_log` taking
/// precedence.
fn log_filter(settings: &Settings, rust_log: Option<&str>) -> Result<EnvFilter> {
    let levels = settings
        .logging
        .levels
        .with_overrides(rust_log)
        .context("Applying RUST_LOG")?;
    Ok(levels.to_env_filter())
}

#[cfg(test)]
mod tests {
    use super::{log_filter, read_content, run, Command};
    use draft_suggestions_client::{RequestContext, SuggestionsApi, UmbrellaClient};
    use draft_suggestions_settings::Settings;
    use httpmock::prelude::*;
    use std::path::PathBuf;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::from_args(args(&["health"])).unwrap(), Command::Health);
        assert_eq!(
            Command::from_args(args(&["fetch", "draft.json"])).unwrap(),
            Command::Fetch(PathBuf::from("draft.json"))
        );
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(Command::from_args(args(&[])).is_err());
        assert!(Command::from_args(args(&["fetch"])).is_err());
        assert!(Command::from_args(args(&["health", "extra"])).is_err());
        assert!(Command::from_args(args(&["suggest", "draft.json"])).is_err());
    }

    #[test]
    fn reads_content_files() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!(
            "draft-suggestions-content-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"uuid": "9d5e441e", "title": "Wall Street stocks"}"#)?;

        let content = read_content(&path);
        std::fs::remove_file(&path)?;

        let content = content?;
        assert_eq!(content.uuid, "9d5e441e");
        assert_eq!(content.title, "Wall Street stocks");
        assert_eq!(content.body, "");
        Ok(())
    }

    #[test]
    fn rust_log_is_applied_on_top_of_configured_levels() {
        let settings = Settings::load_for_tests(|_| {});

        let filter = log_filter(&settings, Some("draft_suggestions_client=trace"))
            .expect("valid RUST_LOG");
        let rendered = filter.to_string().to_lowercase();
        assert!(rendered.contains("draft_suggestions_client=trace"), "{}", rendered);
        assert!(rendered.contains("warn"), "{}", rendered);

        assert!(log_filter(&settings, Some("draft-suggestions=debug")).is_err());
        assert!(log_filter(&settings, None).is_ok());
    }

    #[tokio::test]
    async fn health_command_reports_remote_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/content/suggest");
                then.status(502);
            })
            .await;

        let umbrella = UmbrellaClient::new(
            server.url("/content/suggest"),
            "12345",
            reqwest::Client::new(),
        )
        .expect("valid endpoint");

        let error = run(Command::Health, &umbrella)
            .await
            .expect_err("502 is unhealthy");
        assert!(format!("{:#}", error).contains("502"));
    }

    #[tokio::test]
    async fn health_command_succeeds_against_healthy_umbrella() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/content/suggest");
                then.status(200).body(r#"{"suggestions":[]}"#);
            })
            .await;

        let umbrella = UmbrellaClient::new(
            server.url("/content/suggest"),
            "12345",
            reqwest::Client::new(),
        )?;

        assert!(umbrella.is_healthy(&RequestContext::new()).await.is_ok());
        run(Command::Health, &umbrella).await?;
        mock.assert_hits_async(2).await;
        Ok(())
    }
}
