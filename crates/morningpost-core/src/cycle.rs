//! Cycle controller — one fetch → render → deliver pass.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Recipient;
use crate::error::Result;
use crate::pipeline::{DeliveryReport, RecipientPipeline};
use crate::render::unresolved;
use crate::store::RecordStore;
use crate::traits::SourceAdapter;

/// Address used for the synthetic preview recipient.
pub const PREVIEW_ADDRESS: &str = "preview@localhost";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No recipients configured; nothing was fetched or sent.
    Skipped,
    /// Preview mode: the rendered message, not sent.
    Preview(String),
    Delivered(DeliveryReport),
}

pub struct CycleController {
    sources: Vec<Arc<dyn SourceAdapter>>,
    pipeline: RecipientPipeline,
    recipients: Vec<Recipient>,
    preview: bool,
}

impl CycleController {
    pub fn new(
        sources: Vec<Arc<dyn SourceAdapter>>,
        pipeline: RecipientPipeline,
        recipients: Vec<Recipient>,
    ) -> Self {
        Self {
            sources,
            pipeline,
            recipients,
            preview: false,
        }
    }

    /// Render once for the first recipient's location and return it
    /// instead of delivering.
    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// Run one full cycle.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let Some(first) = self.recipients.first() else {
            tracing::info!("📭 No recipients configured, skipping cycle");
            return Ok(CycleOutcome::Skipped);
        };

        let started = Instant::now();
        tracing::info!(
            "🔄 Cycle started: {} source(s), {} recipient(s)",
            self.sources.len(),
            self.recipients.len()
        );

        let base = RecordStore::gather(&self.sources).await?;

        if self.preview {
            let preview = Recipient {
                email: PREVIEW_ADDRESS.into(),
                local: first.local.clone(),
            };
            let html = self.pipeline.personalize(&base, &preview).await?;
            let left = unresolved(&html);
            if !left.is_empty() {
                tracing::debug!("Unresolved placeholders: {}", left.join(", "));
            }
            return Ok(CycleOutcome::Preview(html));
        }

        let report = self.pipeline.deliver_all(base, &self.recipients).await?;
        tracing::info!(
            "✅ Cycle finished in {}ms: {} delivered, {} failed",
            started.elapsed().as_millis(),
            report.delivered.len(),
            report.failed.len()
        );
        Ok(CycleOutcome::Delivered(report))
    }
}
