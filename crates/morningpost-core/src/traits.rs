//! Seams to the outside world: content sources and the notifier.

use async_trait::async_trait;

use crate::error::Result;
use crate::record::Record;

/// One content source, fetched once per cycle.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Key the record is stored under, e.g. `"poem"`.
    fn name(&self) -> &str;

    /// Fetch and parse the source. Any error is fatal to the cycle.
    async fn fetch(&self) -> Result<Record>;
}

/// Per-recipient weather, keyed by the recipient's location.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_for(&self, local: &str) -> Result<Record>;
}

/// Delivers one rendered message to one address.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, message: &str, to: &str) -> Result<()>;
}
