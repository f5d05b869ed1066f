//! AnthropicApiClient - direct REST client for the Claude Messages API.
//!
//! The system prompt travels as the top-level `system` field; history
//! messages keep their roles unchanged.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use kurso_core::message::Message;
use kurso_core::provider::ProviderError;
use kurso_core::settings::Provider;

const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// How many characters of an unparseable error body survive into the error
/// message.
const ERROR_PREVIEW_LEN: usize = 100;

/// Stateless client for one exchange with the Claude HTTP API.
pub struct AnthropicApiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicApiClient {
    /// Creates a new client with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Sends the conversation and returns the assistant's reply text.
    pub async fn send(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<String, ProviderError> {
        let request = build_request(&self.model, system_prompt, messages);

        let response = self
            .client
            .post(BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| ProviderError::Transport {
                provider: Provider::Anthropic,
                message: err.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        let parsed: CreateMessageResponse =
            response
                .json()
                .await
                .map_err(|_| ProviderError::MalformedResponse {
                    provider: Provider::Anthropic,
                })?;

        extract_reply(parsed)
    }
}

fn build_request(model: &str, system_prompt: &str, messages: &[Message]) -> CreateMessageRequest {
    CreateMessageRequest {
        model: model.to_string(),
        max_tokens: MAX_TOKENS,
        system: system_prompt.to_string(),
        messages: messages
            .iter()
            .map(|message| WireMessage {
                role: message.role.as_str(),
                content: message.content.clone(),
            })
            .collect(),
    }
}

fn extract_reply(response: CreateMessageResponse) -> Result<String, ProviderError> {
    response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or(ProviderError::MalformedResponse {
            provider: Provider::Anthropic,
        })
}

fn map_http_error(status: StatusCode, body: &str) -> ProviderError {
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(wrapper) => wrapper
            .error
            .and_then(|error| error.message)
            .unwrap_or_else(|| "Anthropic API error".to_string()),
        Err(_) if body.trim().is_empty() => "Anthropic API error".to_string(),
        Err(_) => body.chars().take(ERROR_PREVIEW_LEN).collect(),
    };

    ProviderError::Api {
        provider: Provider::Anthropic,
        status: status.as_u16(),
        message,
    }
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<WireMessage>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_places_system_prompt_top_level() {
        let messages = vec![Message::user("Начинаем!"), Message::assistant("Привет")];
        let request = build_request("claude-sonnet-4-20250514", "будь наставником", &messages);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "claude-sonnet-4-20250514");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["system"], "будь наставником");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Начинаем!");
        assert_eq!(body["messages"][1]["role"], "assistant");
    }

    #[test]
    fn reply_comes_from_first_content_block() {
        let response: CreateMessageResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"ответ"},{"type":"text","text":"хвост"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_reply(response).unwrap(), "ответ");
    }

    #[test]
    fn missing_reply_shape_is_malformed() {
        let response: CreateMessageResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        let err = extract_reply(response).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }

    #[test]
    fn http_error_prefers_structured_message() {
        let err = map_http_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
        );
        assert_eq!(err.to_string(), "invalid x-api-key");
    }

    #[test]
    fn http_error_falls_back_to_generic_then_preview() {
        let err = map_http_error(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":{}}"#);
        assert_eq!(err.to_string(), "Anthropic API error");

        let long_body = "x".repeat(500);
        let err = map_http_error(StatusCode::BAD_GATEWAY, &long_body);
        assert_eq!(err.to_string().chars().count(), ERROR_PREVIEW_LEN);
    }
}
