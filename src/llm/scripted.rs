//! Scripted provider
//!
//! Replays a prepared JSONL transcript as if a model had streamed it.
//! Lets the demo binary and integration tests exercise the full anchor
//! and highlight pipeline without network access or an API key.

use async_trait::async_trait;

use crate::annotations::Annotation;
use crate::config::{anthropic_models, ModelOption, ProviderConfig};
use crate::llm::{
    AnnotationLineParser, AnnotationRequest, AnnotationResponse, LlmProvider, ProviderError,
    TokenUsage,
};

/// Replays canned annotation output
pub struct ScriptedProvider {
    script: String,
    chunk_size: usize,
}

impl ScriptedProvider {
    pub fn new(script: &str) -> Self {
        Self {
            script: script.to_string(),
            chunk_size: 24,
        }
    }

    /// Override the delta size the script is replayed in. Small chunks
    /// exercise the mid-line buffering paths.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn chunks(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut rest = self.script.as_str();
        while !rest.is_empty() {
            // Round up to the next char boundary so a chunk is never empty.
            let mut end = self.chunk_size.min(rest.len());
            while end < rest.len() && !rest.is_char_boundary(end) {
                end += 1;
            }
            let (head, tail) = rest.split_at(end);
            out.push(head);
            rest = tail;
        }
        out
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    fn name(&self) -> &str {
        "Scripted (offline)"
    }

    fn models(&self) -> Vec<ModelOption> {
        anthropic_models()
    }

    async fn generate_annotations(
        &self,
        request: &AnnotationRequest,
        config: &ProviderConfig,
    ) -> Result<AnnotationResponse, ProviderError> {
        let mut annotations = Vec::new();
        let mut collect = |annotation: Annotation| annotations.push(annotation);
        let usage = self
            .stream_annotations(request, config, &mut collect)
            .await?;
        Ok(AnnotationResponse { annotations, usage })
    }

    async fn stream_annotations(
        &self,
        request: &AnnotationRequest,
        _config: &ProviderConfig,
        on_annotation: &mut (dyn FnMut(Annotation) + Send),
    ) -> Result<TokenUsage, ProviderError> {
        let mut parser = AnnotationLineParser::new();
        for chunk in self.chunks() {
            for annotation in parser.push(chunk) {
                on_annotation(annotation);
            }
        }
        for annotation in parser.finish() {
            on_annotation(annotation);
        }

        // Rough byte-based token estimate so the usage tracker has
        // something to show offline.
        Ok(TokenUsage {
            input_tokens: (request.page.content.len() / 4) as u64,
            output_tokens: (self.script.len() / 4) as u64,
        })
    }

    async fn test_connection(&self, _config: &ProviderConfig) -> bool {
        true
    }
}
