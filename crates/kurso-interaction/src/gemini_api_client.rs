//! GeminiApiClient - direct REST client for the Gemini generateContent API.
//!
//! Gemini has no separate system slot in this call shape: the system prompt
//! is prepended to the first user turn as a bracketed preamble, and the
//! `assistant` role is renamed to `model`. The API key travels as a URL
//! query parameter.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use kurso_core::message::{Message, MessageRole};
use kurso_core::provider::ProviderError;
use kurso_core::settings::Provider;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MAX_OUTPUT_TOKENS: u32 = 4096;
const ERROR_PREVIEW_LEN: usize = 100;

/// Stateless client for one exchange with the Gemini HTTP API.
pub struct GeminiApiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiApiClient {
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
        let request = build_request(system_prompt, messages);
        let url = format!(
            "{BASE_URL}/{model}:generateContent?key={api_key}",
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| ProviderError::Transport {
                provider: Provider::Google,
                message: err.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|_| ProviderError::MalformedResponse {
                    provider: Provider::Google,
                })?;

        extract_reply(parsed)
    }
}

fn build_request(system_prompt: &str, messages: &[Message]) -> GenerateContentRequest {
    let mut contents: Vec<Content> = messages
        .iter()
        .map(|message| Content {
            role: match message.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            },
            parts: vec![Part {
                text: message.content.clone(),
            }],
        })
        .collect();

    // The system prompt rides inside the first user turn.
    if let Some(first) = contents.first_mut() {
        if first.role == "user" {
            if let Some(part) = first.parts.first_mut() {
                part.text = format!(
                    "[System Instructions]\n{system_prompt}\n\n[User Message]\n{}",
                    part.text
                );
            }
        }
    }

    GenerateContentRequest {
        contents,
        generation_config: GenerationConfig {
            max_output_tokens: MAX_OUTPUT_TOKENS,
        },
    }
}

fn extract_reply(response: GenerateContentResponse) -> Result<String, ProviderError> {
    response
        .candidates
        .into_iter()
        .flatten()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or(ProviderError::MalformedResponse {
            provider: Provider::Google,
        })
}

fn map_http_error(status: StatusCode, body: &str) -> ProviderError {
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(wrapper) => wrapper
            .error
            .and_then(|error| error.message)
            .unwrap_or_else(|| "Google API error".to_string()),
        Err(_) if body.trim().is_empty() => "Google API error".to_string(),
        Err(_) => body.chars().take(ERROR_PREVIEW_LEN).collect(),
    };

    ProviderError::Api {
        provider: Provider::Google,
        status: status.as_u16(),
        message,
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
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
    fn request_renames_assistant_to_model() {
        let messages = vec![
            Message::user("вопрос"),
            Message::assistant("ответ"),
            Message::user("ещё вопрос"),
        ];
        let request = build_request("будь наставником", &messages);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["role"], "user");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[test]
    fn system_prompt_is_prepended_to_first_user_turn() {
        let messages = vec![Message::user("Начинаем!"), Message::assistant("Привет")];
        let request = build_request("будь наставником", &messages);
        let body = serde_json::to_value(&request).unwrap();

        let first_text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert_eq!(
            first_text,
            "[System Instructions]\nбудь наставником\n\n[User Message]\nНачинаем!"
        );
        // Later turns are untouched.
        assert_eq!(body["contents"][1]["parts"][0]["text"], "Привет");
    }

    #[test]
    fn reply_comes_from_first_candidate_first_part() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"ответ"},{"text":"хвост"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_reply(response).unwrap(), "ответ");
    }

    #[test]
    fn empty_candidates_are_malformed() {
        for body in [r#"{}"#, r#"{"candidates":[]}"#, r#"{"candidates":[{}]}"#] {
            let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
            let err = extract_reply(response).unwrap_err();
            assert!(matches!(err, ProviderError::MalformedResponse { .. }));
        }
    }

    #[test]
    fn http_error_truncates_unparseable_body() {
        let err = map_http_error(
            StatusCode::FORBIDDEN,
            r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#,
        );
        assert_eq!(err.to_string(), "API key not valid");

        let html = format!("<html>{}</html>", "x".repeat(300));
        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, &html);
        assert_eq!(err.to_string().chars().count(), ERROR_PREVIEW_LEN);
    }
}
