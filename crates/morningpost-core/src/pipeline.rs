//! Recipient pipeline — weather → snapshot → render → deliver, one task per
//! recipient.
//!
//! Each task works on its own snapshot of the shared base store (base
//! records plus that recipient's weather), so there is no shared mutable
//! state and no lock around rendering.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::Recipient;
use crate::error::{MorningPostError, Result};
use crate::render::render;
use crate::store::RecordStore;
use crate::traits::{Notifier, WeatherSource};

/// Store key of the per-recipient weather record.
pub const WEATHER_KEY: &str = "weather";

/// Outcome of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    /// `(address, reason)`; only filled when fail-fast is off.
    pub failed: Vec<(String, String)>,
}

impl DeliveryReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone)]
pub struct RecipientPipeline {
    template: Arc<str>,
    weather: Arc<dyn WeatherSource>,
    notifier: Arc<dyn Notifier>,
    max_concurrent: usize,
    fail_fast: bool,
}

impl RecipientPipeline {
    pub fn new(
        template: Arc<str>,
        weather: Arc<dyn WeatherSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            template,
            weather,
            notifier,
            max_concurrent: 4,
            fail_fast: true,
        }
    }

    /// Cap on recipients processed at once.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    /// When off, delivery failures are reported instead of aborting the run.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Render the message for one recipient without sending it.
    pub async fn personalize(&self, base: &RecordStore, recipient: &Recipient) -> Result<String> {
        let weather = self.weather.fetch_for(&recipient.local).await?;
        let snapshot = base.with_record(WEATHER_KEY, weather);
        Ok(render(&self.template, &snapshot))
    }

    /// Personalize and deliver for every recipient concurrently.
    ///
    /// A weather fetch failure always aborts the run. A delivery failure
    /// aborts it only in fail-fast mode.
    pub async fn deliver_all(
        &self,
        base: RecordStore,
        recipients: &[Recipient],
    ) -> Result<DeliveryReport> {
        let base = Arc::new(base);
        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for recipient in recipients.iter().cloned() {
            let pipeline = self.clone();
            let base = Arc::clone(&base);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| MorningPostError::delivery(&recipient.email, e))?;
                let message = pipeline.personalize(&base, &recipient).await?;
                let sent = pipeline.notifier.deliver(&message, &recipient.email).await;
                Ok::<_, MorningPostError>((recipient.email, sent))
            });
        }

        let mut report = DeliveryReport::default();
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|e| MorningPostError::delivery("<task>", format!("task aborted: {e}")))
                .and_then(|inner| inner);
            let (email, sent) = match outcome {
                Ok(pair) => pair,
                Err(e) => {
                    tasks.abort_all();
                    return Err(e);
                }
            };
            match sent {
                Ok(()) => {
                    tracing::info!("📤 Delivered to {email}");
                    report.delivered.push(email);
                }
                Err(e) if self.fail_fast => {
                    tracing::error!("❌ Delivery to {email} failed: {e}");
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("⚠️ Delivery to {email} failed, continuing: {e}");
                    report.failed.push((email, e.to_string()));
                }
            }
        }

        Ok(report)
    }
}
