//! The Suggestions Umbrella client.

use anyhow::Context;
use async_trait::async_trait;
use draft_suggestions_settings::UmbrellaSettings;
use reqwest::{header::HeaderValue, Method, StatusCode};
use uuid::Uuid;

use crate::{
    content::Content,
    errors::SuggestionsError,
    request::{new_http_request, validate_endpoint, RequestContext, REQUEST_ID_HEADER},
};

/// Header carrying the Umbrella API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Status reported by a successful health check.
pub const HEALTHY_MESSAGE: &str = "suggestions umbrella service is healthy";

/// Something that can get suggestions for draft content, and report on the
/// dependency it gets them from.
#[async_trait]
pub trait SuggestionsApi: Send + Sync {
    /// Post `content` to the suggestions service and return the raw response
    /// body.
    ///
    /// # Errors
    /// See [`SuggestionsError`] for how failures are classified. No partial
    /// result is ever returned.
    async fn fetch_suggestions(
        &self,
        ctx: &RequestContext,
        content: &Content,
    ) -> Result<Vec<u8>, SuggestionsError>;

    /// The URL content is posted to.
    fn endpoint(&self) -> &str;

    /// Check the configured endpoint without touching the network.
    ///
    /// # Errors
    /// Returns [`SuggestionsError::Configuration`] for an unusable endpoint.
    fn is_valid(&self) -> Result<(), SuggestionsError>;

    /// Perform a full round trip with a synthetic content record.
    ///
    /// This is a real call to the remote service every time it is invoked.
    ///
    /// # Errors
    /// Whatever [`fetch_suggestions`](Self::fetch_suggestions) failed with.
    async fn is_healthy(&self, ctx: &RequestContext) -> Result<String, SuggestionsError>;
}

/// Talks to the Suggestions Umbrella over HTTP.
///
/// Cloning is cheap, and clones share the transport.
#[derive(Clone)]
pub struct UmbrellaClient {
    /// The URL content is posted to.
    endpoint: String,
    /// Sent as [`API_KEY_HEADER`].
    api_key: String,
    /// Shared transport, owned by whoever built it.
    transport: reqwest::Client,
}

impl std::fmt::Debug for UmbrellaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UmbrellaClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl UmbrellaClient {
    /// Make a client for `endpoint`.
    ///
    /// # Errors
    /// Returns [`SuggestionsError::Configuration`] if `endpoint` is not a
    /// valid absolute URL. Nothing is sent over the network.
    pub fn new<E, K>(
        endpoint: E,
        api_key: K,
        transport: reqwest::Client,
    ) -> Result<Self, SuggestionsError>
    where
        E: Into<String>,
        K: Into<String>,
    {
        let client = Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            transport,
        };
        client.is_valid()?;
        Ok(client)
    }

    /// Make a client from the `umbrella` section of the settings.
    ///
    /// # Errors
    /// The same as [`UmbrellaClient::new`].
    pub fn from_settings(
        settings: &UmbrellaSettings,
        transport: reqwest::Client,
    ) -> Result<Self, SuggestionsError> {
        Self::new(&settings.endpoint, &settings.api_key, transport)
    }
}

#[async_trait]
impl SuggestionsApi for UmbrellaClient {
    async fn fetch_suggestions(
        &self,
        ctx: &RequestContext,
        content: &Content,
    ) -> Result<Vec<u8>, SuggestionsError> {
        let body = serde_json::to_vec(content).map_err(SuggestionsError::Serialization)?;

        let mut request =
            new_http_request(&self.transport, ctx, Method::POST, &self.endpoint, body)?;
        request.headers_mut().insert(
            API_KEY_HEADER,
            self.api_key
                .parse::<HeaderValue>()
                .context("API key is not a valid header value")
                .map_err(SuggestionsError::Request)?,
        );

        tracing::debug!(
            r#type = "suggestions.umbrella.request",
            endpoint = %self.endpoint,
            content_uuid = %content.uuid,
            transaction_id = ?request.headers().get(REQUEST_ID_HEADER),
            "Requesting suggestions"
        );

        // The response is dropped on every return below, which releases the
        // connection back to the transport.
        let response = self
            .transport
            .execute(request)
            .await
            .context(format!("Posting content to {}", self.endpoint))
            .map_err(SuggestionsError::Transport)?;

        let status = response.status();
        tracing::debug!(
            r#type = "suggestions.umbrella.response",
            status = status.as_u16(),
            "Suggestions Umbrella responded"
        );

        if status != StatusCode::OK {
            return Err(SuggestionsError::Remote { status });
        }

        let suggestions = response
            .bytes()
            .await
            .context("Reading suggestions")
            .map_err(SuggestionsError::BodyRead)?;

        Ok(suggestions.to_vec())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn is_valid(&self) -> Result<(), SuggestionsError> {
        validate_endpoint(&self.endpoint)
    }

    async fn is_healthy(&self, ctx: &RequestContext) -> Result<String, SuggestionsError> {
        let content = Content::with_uuid(Uuid::new_v4().to_string());
        self.fetch_suggestions(ctx, &content).await?;
        Ok(HEALTHY_MESSAGE.to_string())
    }
}
