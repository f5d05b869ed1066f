//! Supported LLM models per provider.
//!
//! This is the directory behind the settings UI's model picker and the
//! per-provider defaults. The first entry of each list is that provider's
//! default model and must match `Provider::default_model`.
//!
//! # How to Add or Update Model Versions
//!
//! When a provider releases a new model, update these locations:
//!
//! 1. The model list below for the provider.
//! 2. `Provider::default_model` in `kurso-core/src/settings.rs` if the
//!    default changes.
//! 3. Re-run the workspace tests; `default_model_is_listed` pins the two
//!    locations together.

use kurso_core::settings::Provider;

/// A selectable model: wire id plus human-facing label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
}

static ANTHROPIC_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "claude-sonnet-4-20250514",
        name: "Claude Sonnet 4",
    },
    ModelInfo {
        id: "claude-opus-4-20250514",
        name: "Claude Opus 4",
    },
    ModelInfo {
        id: "claude-3-5-sonnet-20241022",
        name: "Claude 3.5 Sonnet",
    },
];

static OPENAI_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gpt-4o",
        name: "GPT-4o",
    },
    ModelInfo {
        id: "gpt-4o-mini",
        name: "GPT-4o Mini",
    },
    ModelInfo {
        id: "gpt-4-turbo",
        name: "GPT-4 Turbo",
    },
];

static GOOGLE_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gemini-1.5-flash",
        name: "Gemini 1.5 Flash",
    },
    ModelInfo {
        id: "gemini-1.5-pro",
        name: "Gemini 1.5 Pro",
    },
    ModelInfo {
        id: "gemini-2.0-flash-exp",
        name: "Gemini 2.0 Flash",
    },
];

/// The models selectable for a provider, default first.
pub fn available_models(provider: Provider) -> &'static [ModelInfo] {
    match provider {
        Provider::Anthropic => ANTHROPIC_MODELS,
        Provider::OpenAi => OPENAI_MODELS,
        Provider::Google => GOOGLE_MODELS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn default_model_is_listed() {
        for provider in Provider::iter() {
            let models = available_models(provider);
            assert!(!models.is_empty());
            assert_eq!(models[0].id, provider.default_model());
        }
    }
}
