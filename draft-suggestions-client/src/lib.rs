#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! A client for the Suggestions Umbrella service.
//!
//! Draft content is posted to the Umbrella, and whatever it answers with is
//! handed back to the caller untouched. The payload is never parsed here.
//!
//! The HTTP transport is owned by the caller. Build one `reqwest::Client`,
//! configure its timeouts and TLS once, and pass clones of it to every
//! [`UmbrellaClient`] that needs it.
//!
//! ```no_run
//! # async fn example() -> Result<(), draft_suggestions_client::SuggestionsError> {
//! use draft_suggestions_client::{Content, RequestContext, SuggestionsApi, UmbrellaClient};
//!
//! let transport = reqwest::Client::new();
//! let umbrella = UmbrellaClient::new(
//!     "https://example.com/content/suggest",
//!     "my-api-key",
//!     transport,
//! )?;
//!
//! let content = Content {
//!     uuid: "9d5e441e-0b02-11e8-8eb7-42f857ea9f09".to_string(),
//!     title: "Wall Street stocks".to_string(),
//!     ..Content::default()
//! };
//! let suggestions: Vec<u8> = umbrella
//!     .fetch_suggestions(&RequestContext::new(), &content)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod content;
mod errors;
pub mod request;
mod umbrella;

pub use crate::content::Content;
pub use crate::errors::SuggestionsError;
pub use crate::request::{validate_endpoint, RequestContext};
pub use crate::umbrella::{SuggestionsApi, UmbrellaClient, HEALTHY_MESSAGE};
