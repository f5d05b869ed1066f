//! OpenAiApiClient - direct REST client for the Chat Completions API.
//!
//! The system prompt becomes a synthesized leading message with role
//! `system`; history messages follow unchanged.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use kurso_core::message::Message;
use kurso_core::provider::ProviderError;
use kurso_core::settings::Provider;

const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 4096;
const ERROR_PREVIEW_LEN: usize = 100;

/// Stateless client for one exchange with the OpenAI HTTP API.
pub struct OpenAiApiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiApiClient {
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
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| ProviderError::Transport {
                provider: Provider::OpenAi,
                message: err.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        let parsed: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|_| ProviderError::MalformedResponse {
                    provider: Provider::OpenAi,
                })?;

        extract_reply(parsed)
    }
}

fn build_request(model: &str, system_prompt: &str, messages: &[Message]) -> ChatCompletionRequest {
    let mut wire_messages = Vec::with_capacity(messages.len() + 1);
    wire_messages.push(WireMessage {
        role: "system",
        content: system_prompt.to_string(),
    });
    wire_messages.extend(messages.iter().map(|message| WireMessage {
        role: message.role.as_str(),
        content: message.content.clone(),
    }));

    ChatCompletionRequest {
        model: model.to_string(),
        messages: wire_messages,
        max_tokens: MAX_TOKENS,
    }
}

fn extract_reply(response: ChatCompletionResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ProviderError::MalformedResponse {
            provider: Provider::OpenAi,
        })
}

fn map_http_error(status: StatusCode, body: &str) -> ProviderError {
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(wrapper) => wrapper
            .error
            .and_then(|error| error.message)
            .unwrap_or_else(|| "OpenAI API error".to_string()),
        Err(_) if body.trim().is_empty() => "OpenAI API error".to_string(),
        Err(_) => body.chars().take(ERROR_PREVIEW_LEN).collect(),
    };

    ProviderError::Api {
        provider: Provider::OpenAi,
        status: status.as_u16(),
        message,
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}
