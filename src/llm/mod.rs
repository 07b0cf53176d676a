//! LLM Module
//!
//! Generates margin annotations for extracted page content.
//!
//! Providers stream their output as JSONL, one annotation object per line.
//! The line parser releases each annotation the moment its line completes,
//! so callers can anchor notes while the model is still writing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scholia::llm::{AnnotationRequest, AnthropicProvider, LlmProvider};
//!
//! let provider = AnthropicProvider::new();
//! let request = AnnotationRequest::for_page(page, modes);
//!
//! let usage = provider
//!     .stream_annotations(&request, &config, &mut |annotation| {
//!         // anchor and display the note
//!     })
//!     .await?;
//! ```

mod anthropic;
mod parser;
mod prompt;
mod provider;
mod scripted;

pub use anthropic::AnthropicProvider;
pub use parser::AnnotationLineParser;
pub use prompt::{build_annotation_prompt, PromptPair};
pub use provider::{AnnotationRequest, AnnotationResponse, LlmProvider, ProviderError, TokenUsage};
pub use scripted::ScriptedProvider;

#[cfg(test)]
pub use provider::MockProvider;
