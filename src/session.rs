//! Annotation session
//!
//! Drives one page's annotation run end to end: extract the content, ask
//! the provider for notes, anchor each note to the page, and record token
//! usage. The session owns the highlight manager, so hover and reposition
//! wiring stays attached across runs.
//!
//! Overlapping runs cannot happen on one session; `annotate` holds the
//! exclusive borrow for the whole run.

use thiserror::Error;

use crate::annotations::{Annotation, AnnotationMode};
use crate::config::ProviderConfig;
use crate::dom::Document;
use crate::extract::extract_page;
use crate::highlight::{HighlightManager, OverlaySurface};
use crate::layout::LayoutEngine;
use crate::llm::{AnnotationRequest, LlmProvider, ProviderError, TokenUsage};
use crate::usage::{UsageTotals, UsageTracker};

/// Errors from an annotation run
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("page has no annotatable text")]
    NothingToAnnotate,
    #[error("provider failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Outcome of one annotation run
#[derive(Debug, Clone, Copy)]
pub struct AnnotateOutcome {
    /// Annotations anchored to the page
    pub accepted: usize,
    /// Annotations rejected (anchor not found, or duplicate id)
    pub dropped: usize,
    pub usage: TokenUsage,
}

/// One page's annotation controller
pub struct AnnotationSession {
    provider: Box<dyn LlmProvider>,
    config: ProviderConfig,
    manager: HighlightManager<OverlaySurface>,
    usage: UsageTracker,
    reader_context: Option<String>,
}

impl AnnotationSession {
    pub fn new(provider: Box<dyn LlmProvider>, config: ProviderConfig) -> Self {
        Self {
            provider,
            config,
            manager: HighlightManager::new(OverlaySurface::new()),
            usage: UsageTracker::new(),
            reader_context: None,
        }
    }

    /// Attach free-form reader context included in every prompt.
    pub fn set_reader_context(&mut self, context: Option<String>) {
        self.reader_context = context;
    }

    /// Run one annotation pass over the page.
    ///
    /// Highlights from a previous run are cleared first. Annotations the
    /// provider delivered before a mid-stream failure stay anchored; the
    /// failure is still reported.
    pub async fn annotate(
        &mut self,
        doc: &Document,
        layout: &dyn LayoutEngine,
        url: &str,
        modes: Vec<AnnotationMode>,
    ) -> Result<AnnotateOutcome, SessionError> {
        let page = extract_page(doc, url).ok_or(SessionError::NothingToAnnotate)?;
        let mut request = AnnotationRequest::for_page(page, modes);
        request.reader_context = self.reader_context.clone();

        if self.manager.count() > 0 {
            self.manager.clear();
        }

        let mut arrived: Vec<Annotation> = Vec::new();
        let mut collect = |annotation: Annotation| arrived.push(annotation);
        let streamed = self
            .provider
            .stream_annotations(&request, &self.config, &mut collect)
            .await;

        let mut accepted = 0;
        let mut dropped = 0;
        for annotation in arrived {
            if self.manager.add_annotation(doc, layout, annotation) {
                accepted += 1;
            } else {
                dropped += 1;
            }
        }

        let usage = match streamed {
            Ok(usage) => usage,
            Err(err) => {
                tracing::warn!(
                    accepted,
                    error = %err,
                    "provider failed mid-stream, keeping anchored annotations"
                );
                return Err(err.into());
            }
        };

        self.usage.record(usage.input_tokens, usage.output_tokens);
        tracing::info!(accepted, dropped, "annotation run complete");
        Ok(AnnotateOutcome {
            accepted,
            dropped,
            usage,
        })
    }

    /// The highlight state this session owns.
    pub fn manager(&self) -> &HighlightManager<OverlaySurface> {
        &self.manager
    }

    /// Mutable manager access for host event wiring: frame ticks, pointer
    /// moves, visibility toggles.
    pub fn manager_mut(&mut self) -> &mut HighlightManager<OverlaySurface> {
        &mut self.manager
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Lifetime token totals priced for the configured model.
    pub fn usage_totals(&self) -> UsageTotals {
        self.usage.totals(&self.config.model_option())
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FlowLayout;
    use crate::llm::MockProvider;

    fn page() -> Document {
        Document::parse(
            "<body><p>The quick brown fox jumps over the lazy dog.</p>\
             <p>Victory has a thousand fathers.</p></body>",
        )
        .unwrap()
    }

    fn session(provider: MockProvider) -> AnnotationSession {
        AnnotationSession::new(Box::new(provider), ProviderConfig::default())
    }

    #[tokio::test]
    async fn test_run_anchors_good_notes_and_drops_bad_ones() {
        let doc = page();
        let layout = FlowLayout::new(800.0);
        let mut session = session(MockProvider {
            annotations: vec![
                Annotation::new(None, "alliteration", "quick brown fox"),
                Annotation::new(None, "hallucinated", "no such passage"),
            ],
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 40,
            },
            fail_after: None,
        });

        let outcome = session
            .annotate(&doc, &layout, "https://example.com", Vec::new())
            .await
            .unwrap();

        assert_eq!(outcome.accepted, 1);
        assert_eq!(outcome.dropped, 1);
        assert_eq!(session.manager().count(), 1);
        assert_eq!(session.usage_totals().input_tokens, 100);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_keeps_delivered_anchors() {
        let doc = page();
        let layout = FlowLayout::new(800.0);
        let mut session = session(MockProvider {
            annotations: vec![
                Annotation::new(None, "first", "quick brown fox"),
                Annotation::new(None, "never delivered", "lazy dog"),
            ],
            usage: TokenUsage::default(),
            fail_after: Some(1),
        });

        let result = session
            .annotate(&doc, &layout, "https://example.com", Vec::new())
            .await;

        assert!(matches!(result, Err(SessionError::Provider(_))));
        assert_eq!(session.manager().count(), 1);
        assert_eq!(session.usage().history().len(), 0);
    }

    #[tokio::test]
    async fn test_empty_page_refuses_to_run() {
        let doc = Document::parse("<body><script>code()</script></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut session = session(MockProvider {
            annotations: Vec::new(),
            usage: TokenUsage::default(),
            fail_after: None,
        });

        let result = session
            .annotate(&doc, &layout, "https://example.com", Vec::new())
            .await;
        assert!(matches!(result, Err(SessionError::NothingToAnnotate)));
    }

    #[tokio::test]
    async fn test_new_run_replaces_previous_highlights() {
        let doc = page();
        let layout = FlowLayout::new(800.0);
        // The mock replays the same annotation (same id) each run; without
        // the clear, the second run would be rejected as a duplicate.
        let mut session = session(MockProvider {
            annotations: vec![Annotation::new(None, "note", "thousand fathers")],
            usage: TokenUsage::default(),
            fail_after: None,
        });

        let first = session
            .annotate(&doc, &layout, "u", Vec::new())
            .await
            .unwrap();
        let second = session
            .annotate(&doc, &layout, "u", Vec::new())
            .await
            .unwrap();

        assert_eq!(first.accepted, 1);
        assert_eq!(second.accepted, 1);
        assert_eq!(session.manager().count(), 1);
    }
}
