//! Provider gateway contract.
//!
//! The controller talks to every chat-completion backend through one
//! capability: send a system prompt plus the accumulated history, get a
//! single reply back. kurso-interaction provides the implementation; the
//! trait lives here so the core does not depend on any wire protocol.

use async_trait::async_trait;
use thiserror::Error;

use crate::message::Message;
use crate::settings::{Provider, Settings};

/// Failure reported by a provider adapter.
///
/// The four kinds mirror how a request can go wrong, in order: rejected
/// before any network call, failed in transit, rejected by the service, or
/// answered with an unusable body. All render as one human-readable message.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// No usable API key in settings; detected before any network call.
    #[error("{} API key is not configured", .provider.display_name())]
    MissingApiKey { provider: Provider },

    /// The request could not be sent or the response could not be read.
    #[error("{} request failed: {message}", .provider.display_name())]
    Transport { provider: Provider, message: String },

    /// Non-success HTTP status; `message` is extracted best-effort from the
    /// error payload.
    #[error("{message}")]
    Api {
        provider: Provider,
        status: u16,
        message: String,
    },

    /// Success status but the response body was missing the expected reply
    /// fields. Never coerced to an empty reply.
    #[error("Unexpected response format from {}", .provider.display_name())]
    MalformedResponse { provider: Provider },
}

impl ProviderError {
    /// The provider the failure came from.
    pub fn provider(&self) -> Provider {
        match self {
            ProviderError::MissingApiKey { provider }
            | ProviderError::Transport { provider, .. }
            | ProviderError::Api { provider, .. }
            | ProviderError::MalformedResponse { provider } => *provider,
        }
    }

    /// True for the configuration-error kind.
    pub fn is_config(&self) -> bool {
        matches!(self, ProviderError::MissingApiKey { .. })
    }
}

/// A uniform chat-completion capability over the configured provider.
///
/// One invocation performs exactly one external network call. Adapters hold
/// no state between calls.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Sends the conversation to the provider named in `settings` and
    /// returns the assistant's reply text.
    async fn send_chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        settings: &Settings,
    ) -> Result<String, ProviderError>;
}
