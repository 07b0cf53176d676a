//! Anthropic Messages API provider
//!
//! Streams annotations over SSE so each note can be anchored as soon as
//! its line is complete, instead of waiting for the whole response.

use async_trait::async_trait;
use futures::StreamExt;

use crate::annotations::Annotation;
use crate::config::{anthropic_models, ModelOption, ProviderConfig};
use crate::llm::prompt::build_annotation_prompt;
use crate::llm::{
    AnnotationLineParser, AnnotationRequest, AnnotationResponse, LlmProvider, ProviderError,
    TokenUsage,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

/// Anthropic (Claude) annotation provider
pub struct AnthropicProvider {
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for AnthropicProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn id(&self) -> &str {
        "anthropic"
    }

    fn name(&self) -> &str {
        "Anthropic (Claude)"
    }

    fn models(&self) -> Vec<ModelOption> {
        anthropic_models()
    }

    async fn generate_annotations(
        &self,
        request: &AnnotationRequest,
        config: &ProviderConfig,
    ) -> Result<AnnotationResponse, ProviderError> {
        let prompt = build_annotation_prompt(request);
        let body = serde_json::json!({
            "model": config.model,
            "max_tokens": MAX_TOKENS,
            "system": prompt.system,
            "messages": [{"role": "user", "content": prompt.user}],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", config.base_url))
            .header("x-api-key", &config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let text = data["content"][0]["text"].as_str().unwrap_or("");
        let mut parser = AnnotationLineParser::new();
        let mut annotations = parser.push(text);
        annotations.extend(parser.finish());

        Ok(AnnotationResponse {
            annotations,
            usage: TokenUsage {
                input_tokens: data["usage"]["input_tokens"].as_u64().unwrap_or(0),
                output_tokens: data["usage"]["output_tokens"].as_u64().unwrap_or(0),
            },
        })
    }

    async fn stream_annotations(
        &self,
        request: &AnnotationRequest,
        config: &ProviderConfig,
        on_annotation: &mut (dyn FnMut(Annotation) + Send),
    ) -> Result<TokenUsage, ProviderError> {
        let prompt = build_annotation_prompt(request);
        let body = serde_json::json!({
            "model": config.model,
            "max_tokens": MAX_TOKENS,
            "system": prompt.system,
            "messages": [{"role": "user", "content": prompt.user}],
            "stream": true,
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", config.base_url))
            .header("x-api-key", &config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut parser = AnnotationLineParser::new();
        let mut usage = TokenUsage::default();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ProviderError::Request(e.to_string()))?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(pos) = buffer.find('\n') {
                let line: String = buffer.drain(..=pos).collect();
                handle_sse_line(line.trim(), &mut parser, &mut usage, on_annotation);
            }
        }

        for annotation in parser.finish() {
            on_annotation(annotation);
        }

        tracing::debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "annotation stream complete"
        );
        Ok(usage)
    }

    async fn test_connection(&self, config: &ProviderConfig) -> bool {
        let body = serde_json::json!({
            "model": config.model,
            "max_tokens": 10,
            "messages": [{"role": "user", "content": "Reply with ok."}],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", config.base_url))
            .header("x-api-key", &config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await;

        matches!(response, Ok(r) if r.status().is_success())
    }
}

/// Dispatch one SSE line. Text deltas feed the line parser; usage events
/// update the running totals; everything else is ignored.
fn handle_sse_line(
    line: &str,
    parser: &mut AnnotationLineParser,
    usage: &mut TokenUsage,
    on_annotation: &mut (dyn FnMut(Annotation) + Send),
) {
    let data = match line.strip_prefix("data: ") {
        Some(data) => data,
        None => return,
    };
    if data == "[DONE]" {
        return;
    }
    let event: serde_json::Value = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(_) => return,
    };

    match event["type"].as_str() {
        Some("content_block_delta") => {
            if let Some(text) = event["delta"]["text"].as_str() {
                for annotation in parser.push(text) {
                    on_annotation(annotation);
                }
            }
        }
        Some("message_start") => {
            if let Some(tokens) = event["message"]["usage"]["input_tokens"].as_u64() {
                usage.input_tokens = tokens;
            }
        }
        Some("message_delta") => {
            if let Some(tokens) = event["usage"]["output_tokens"].as_u64() {
                usage.output_tokens = tokens;
            }
        }
        _ => {}
    }
}

fn api_error(status: u16, body: &str) -> ProviderError {
    if status == 401 {
        return ProviderError::InvalidApiKey;
    }
    if status == 429 {
        return ProviderError::RateLimited;
    }
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    ProviderError::Api(status, message)
}
