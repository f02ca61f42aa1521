//! Errors the Suggestions Umbrella client can return.

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while configuring the client or while
/// exchanging a request with the Suggestions Umbrella.
///
/// None of these are retried by the client. Use [`is_transient`] and
/// [`status`] to tell network trouble apart from configuration mistakes and
/// failures reported by the Umbrella itself.
///
/// [`is_transient`]: SuggestionsError::is_transient
/// [`status`]: SuggestionsError::status
#[derive(Debug, Error)]
pub enum SuggestionsError {
    /// The endpoint is empty or is not an absolute HTTP(S) URL.
    #[error("The Suggestions Umbrella endpoint is not configured correctly: {0}")]
    Configuration(#[source] anyhow::Error),

    /// The content could not be encoded as JSON.
    #[error("The draft content could not be serialized: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The HTTP request could not be built.
    #[error("The request to the Suggestions Umbrella could not be built: {0}")]
    Request(#[source] anyhow::Error),

    /// The exchange failed below HTTP: refused connection, DNS, timeout or an
    /// expired deadline.
    #[error("There was a network error while calling the Suggestions Umbrella: {0}")]
    Transport(#[source] anyhow::Error),

    /// The Umbrella answered with something other than `200 OK`.
    #[error("Suggestions Umbrella endpoint fails with response code: {}", .status.as_u16())]
    Remote {
        /// The status code that was received.
        status: StatusCode,
    },

    /// The response was `200 OK` but its body could not be read completely.
    #[error("Failed reading the response body from Suggestions Umbrella endpoint: {0}")]
    BodyRead(#[source] anyhow::Error),
}

impl SuggestionsError {
    /// Whether the failure happened on the network, and may go away by itself.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The status code the Umbrella answered with, if it answered with an error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Remote { status } => Some(*status),
            _ => None,
        }
    }
}
