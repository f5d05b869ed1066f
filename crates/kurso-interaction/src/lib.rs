//! Provider API clients for kurso.
//!
//! One client per chat-completion protocol, and `ApiGateway`, the
//! `ChatGateway` implementation that dispatches on the configured provider
//! tag. Adding a provider means adding one client module and one match arm.

pub mod anthropic_api_client;
pub mod gemini_api_client;
pub mod openai_api_client;
pub mod supported_models;

use async_trait::async_trait;
use tracing::debug;

use kurso_core::message::Message;
use kurso_core::provider::{ChatGateway, ProviderError};
use kurso_core::settings::{Provider, Settings};

pub use anthropic_api_client::AnthropicApiClient;
pub use gemini_api_client::GeminiApiClient;
pub use openai_api_client::OpenAiApiClient;
pub use supported_models::{ModelInfo, available_models};

/// Routes each exchange to the client for the provider named in settings.
///
/// Clients are constructed per call and hold no state between calls; the
/// gateway itself is freely shareable.
#[derive(Debug, Default, Clone)]
pub struct ApiGateway;

impl ApiGateway {
    /// Creates the gateway.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatGateway for ApiGateway {
    async fn send_chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        settings: &Settings,
    ) -> Result<String, ProviderError> {
        if !settings.is_configured() {
            return Err(ProviderError::MissingApiKey {
                provider: settings.provider,
            });
        }

        debug!(
            provider = %settings.provider,
            model = %settings.model,
            turns = messages.len(),
            "sending chat request"
        );

        let api_key = settings.api_key.clone();
        let model = settings.model.clone();

        match settings.provider {
            Provider::Anthropic => {
                AnthropicApiClient::new(api_key, model)
                    .send(system_prompt, messages)
                    .await
            }
            Provider::OpenAi => {
                OpenAiApiClient::new(api_key, model)
                    .send(system_prompt, messages)
                    .await
            }
            Provider::Google => {
                GeminiApiClient::new(api_key, model)
                    .send(system_prompt, messages)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_settings_fail_before_any_network_call() {
        let gateway = ApiGateway::new();
        let settings = Settings::new(Provider::OpenAi, "short");

        let err = gateway
            .send_chat("prompt", &[Message::user("hi")], &settings)
            .await
            .unwrap_err();

        assert!(err.is_config());
        assert_eq!(err.to_string(), "OpenAI API key is not configured");
    }
}
