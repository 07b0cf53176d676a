//! Provider configuration

use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// A selectable model with its pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOption {
    pub id: String,
    pub name: String,
    pub context_window: u32,
    pub cost_per_1k_input: f64,
    pub cost_per_1k_output: f64,
}

/// Models the Anthropic provider knows how to price.
pub fn anthropic_models() -> Vec<ModelOption> {
    vec![
        ModelOption {
            id: "claude-sonnet-4-5-20250929".to_string(),
            name: "Claude Sonnet 4.5".to_string(),
            context_window: 200_000,
            cost_per_1k_input: 0.003,
            cost_per_1k_output: 0.015,
        },
        ModelOption {
            id: "claude-haiku-3-5-20241022".to_string(),
            name: "Claude Haiku 3.5".to_string(),
            context_window: 200_000,
            cost_per_1k_input: 0.0008,
            cost_per_1k_output: 0.004,
        },
    ]
}

/// Connection settings for the annotation provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Read settings from the environment, falling back to defaults for
    /// everything but the key. A missing key is left empty; providers report
    /// it as an auth failure on first use.
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: env::var("SCHOLIA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: env::var("SCHOLIA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Catalog entry for the configured model, or the default model when the
    /// id is unknown.
    pub fn model_option(&self) -> ModelOption {
        let mut models = anthropic_models();
        models
            .iter()
            .position(|m| m.id == self.model)
            .map(|at| models.swap_remove(at))
            .unwrap_or_else(|| anthropic_models().remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProviderConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_model_option_lookup() {
        let mut config = ProviderConfig::default();
        config.model = "claude-haiku-3-5-20241022".to_string();
        assert_eq!(config.model_option().name, "Claude Haiku 3.5");

        config.model = "no-such-model".to_string();
        assert_eq!(config.model_option().id, DEFAULT_MODEL);
    }
}
