//! Helpers shared by every outbound call: endpoint validation, and building
//! requests that carry the standard identity headers.

use std::time::Duration;

use anyhow::{anyhow, Context};
use rand::{distributions::Alphanumeric, Rng};
use reqwest::{header, Method, Request, Url};

use crate::errors::SuggestionsError;

/// Header carrying the transaction id used to correlate logs across services.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("draft-content-suggestions/", env!("CARGO_PKG_VERSION"));

/// Per-call information supplied by the caller.
///
/// The transaction id is propagated as [`REQUEST_ID_HEADER`]. When the
/// caller has none, a fresh `tid_` prefixed id is generated for the call.
///
/// The deadline bounds the whole exchange. When it expires the call fails
/// with [`SuggestionsError::Transport`]. Dropping the future returned by a
/// client call also aborts the request.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    /// Correlation id of the operation this call is part of.
    transaction_id: Option<String>,
    /// Upper bound on the duration of the call.
    deadline: Option<Duration>,
}

impl RequestContext {
    /// A context with no transaction id and no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing transaction id.
    #[must_use]
    pub fn with_transaction_id<S: Into<String>>(mut self, transaction_id: S) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    /// Give up on the call once `deadline` has elapsed.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The transaction id supplied by the caller, if any.
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    /// The deadline supplied by the caller, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

/// Generate a new transaction id, such as `tid_q2mvv0c1kz`.
pub fn new_transaction_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    format!("tid_{}", suffix.to_lowercase())
}

/// Check that `endpoint` is a usable absolute URL.
///
/// # Errors
/// Returns [`SuggestionsError::Configuration`] if the endpoint is empty, does
/// not parse, is not `http` or `https`, or has no host.
pub fn validate_endpoint(endpoint: &str) -> Result<(), SuggestionsError> {
    parse_endpoint(endpoint)
        .map(|_| ())
        .map_err(SuggestionsError::Configuration)
}

/// Parse `endpoint` and apply the checks of [`validate_endpoint`].
fn parse_endpoint(endpoint: &str) -> anyhow::Result<Url> {
    if endpoint.trim().is_empty() {
        return Err(anyhow!("endpoint is empty"));
    }

    let url = Url::parse(endpoint).context(format!("parsing endpoint {:?}", endpoint))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("unsupported scheme {:?} in {:?}", other, endpoint)),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(anyhow!("endpoint {:?} has no host", endpoint));
    }

    Ok(url)
}

/// Build a request through `transport`, decorated with the standard identity
/// headers and the deadline from `ctx`.
///
/// # Errors
/// Returns [`SuggestionsError::Request`] if the URL is malformed or the
/// request cannot be assembled.
pub fn new_http_request(
    transport: &reqwest::Client,
    ctx: &RequestContext,
    method: Method,
    url: &str,
    body: Vec<u8>,
) -> Result<Request, SuggestionsError> {
    let url = parse_endpoint(url).map_err(SuggestionsError::Request)?;

    let transaction_id = ctx
        .transaction_id()
        .map_or_else(new_transaction_id, str::to_string);

    let mut builder = transport
        .request(method, url)
        .header(REQUEST_ID_HEADER, transaction_id)
        .header(header::USER_AGENT, USER_AGENT)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body);

    if let Some(deadline) = ctx.deadline() {
        builder = builder.timeout(deadline);
    }

    builder
        .build()
        .context("building request")
        .map_err(SuggestionsError::Request)
}
