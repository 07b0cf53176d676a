//! Provider trait
//!
//! Defines the provider trait annotation backends implement.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotations::{Annotation, AnnotationMode};
use crate::config::{ModelOption, ProviderConfig};
use crate::extract::ExtractedContent;

/// Errors from annotation providers
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid API key")]
    InvalidApiKey,
    #[error("rate limited by the provider")]
    RateLimited,
    #[error("request failed: {0}")]
    Request(String),
    #[error("provider error {0}: {1}")]
    Api(u16, String),
}

/// Token counts reported by the provider for one request
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A completed one-shot generation
#[derive(Debug, Clone)]
pub struct AnnotationResponse {
    pub annotations: Vec<Annotation>,
    pub usage: TokenUsage,
}

/// One page's worth of material to annotate
#[derive(Debug, Clone)]
pub struct AnnotationRequest {
    pub page: ExtractedContent,
    /// Commentary styles to generate; order is preserved in the prompt.
    pub modes: Vec<AnnotationMode>,
    /// Passage the reader selected, when annotating a selection rather
    /// than the whole page.
    pub selected_text: Option<String>,
    /// Free-form notes about the reader, included in the prompt verbatim.
    pub reader_context: Option<String>,
}

impl AnnotationRequest {
    pub fn for_page(page: ExtractedContent, modes: Vec<AnnotationMode>) -> Self {
        Self {
            page,
            modes,
            selected_text: None,
            reader_context: None,
        }
    }
}

/// Annotation provider trait
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short identifier, e.g. "anthropic"
    fn id(&self) -> &str;

    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Models this provider can serve
    fn models(&self) -> Vec<ModelOption>;

    /// Generate annotations for a page in one round trip.
    async fn generate_annotations(
        &self,
        request: &AnnotationRequest,
        config: &ProviderConfig,
    ) -> Result<AnnotationResponse, ProviderError>;

    /// Generate annotations for a page, invoking `on_annotation` for each
    /// complete one as it arrives. Annotations surfaced before a mid-stream
    /// failure are already delivered; the caller keeps them.
    async fn stream_annotations(
        &self,
        request: &AnnotationRequest,
        config: &ProviderConfig,
        on_annotation: &mut (dyn FnMut(Annotation) + Send),
    ) -> Result<TokenUsage, ProviderError>;

    /// Cheap round trip to verify the key and model are usable.
    async fn test_connection(&self, config: &ProviderConfig) -> bool;
}

/// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    pub annotations: Vec<Annotation>,
    pub usage: TokenUsage,
    pub fail_after: Option<usize>,
}

#[cfg(test)]
#[async_trait]
impl LlmProvider for MockProvider {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock"
    }

    fn models(&self) -> Vec<ModelOption> {
        Vec::new()
    }

    async fn generate_annotations(
        &self,
        _request: &AnnotationRequest,
        _config: &ProviderConfig,
    ) -> Result<AnnotationResponse, ProviderError> {
        Ok(AnnotationResponse {
            annotations: self.annotations.clone(),
            usage: self.usage,
        })
    }

    async fn stream_annotations(
        &self,
        _request: &AnnotationRequest,
        _config: &ProviderConfig,
        on_annotation: &mut (dyn FnMut(Annotation) + Send),
    ) -> Result<TokenUsage, ProviderError> {
        for (i, annotation) in self.annotations.iter().enumerate() {
            if self.fail_after == Some(i) {
                return Err(ProviderError::Request("connection dropped".to_string()));
            }
            on_annotation(annotation.clone());
        }
        Ok(self.usage)
    }

    async fn test_connection(&self, _config: &ProviderConfig) -> bool {
        true
    }
}
