//! Provider selection and API settings.
//!
//! Settings are mutated only through an explicit save; readers always get
//! the stored value or the documented defaults.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// An API key shorter than or equal to this many bytes is treated as
/// not configured.
pub const API_KEY_MIN_LEN: usize = 10;

/// The supported chat-completion backends.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Provider {
    Anthropic,
    OpenAi,
    Google,
}

impl Provider {
    /// Human-facing vendor name, used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Anthropic => "Anthropic",
            Provider::OpenAi => "OpenAI",
            Provider::Google => "Google",
        }
    }

    /// The model id used when settings carry none for this provider.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-sonnet-4-20250514",
            Provider::OpenAi => "gpt-4o",
            Provider::Google => "gemini-1.5-flash",
        }
    }
}

/// User-facing configuration: which backend to talk to and with what key.
///
/// The serialized field names are part of the persisted `settings` layout
/// and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub provider: Provider,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
}

impl Settings {
    /// Creates settings for a provider with its default model.
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: provider.default_model().to_string(),
        }
    }

    /// Returns true when an API key is present and long enough to be
    /// plausibly real.
    pub fn is_configured(&self) -> bool {
        self.api_key.len() > API_KEY_MIN_LEN
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(Provider::Anthropic, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn default_settings_use_anthropic() {
        let settings = Settings::default();
        assert_eq!(settings.provider, Provider::Anthropic);
        assert_eq!(settings.model, "claude-sonnet-4-20250514");
        assert!(!settings.is_configured());
    }

    #[test]
    fn configured_requires_key_longer_than_ten() {
        let mut settings = Settings::new(Provider::OpenAi, "x".repeat(20));
        settings.model = "m1".to_string();
        assert!(settings.is_configured());

        settings.api_key = "short".to_string();
        assert!(!settings.is_configured());
    }

    #[test]
    fn provider_tags_round_trip_lowercase() {
        for (tag, provider) in [
            ("anthropic", Provider::Anthropic),
            ("openai", Provider::OpenAi),
            ("google", Provider::Google),
        ] {
            assert_eq!(Provider::from_str(tag).unwrap(), provider);
            assert_eq!(provider.to_string(), tag);
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, format!("\"{tag}\""));
        }
    }

    #[test]
    fn settings_serialize_with_camel_case_keys() {
        let settings = Settings::new(Provider::Google, "k".repeat(16));
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["provider"], "google");
        assert_eq!(value["apiKey"], "k".repeat(16));
        assert_eq!(value["model"], "gemini-1.5-flash");
    }
}
