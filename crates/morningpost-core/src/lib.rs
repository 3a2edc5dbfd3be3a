//! # MorningPost Core
//!
//! Aggregation and rendering pipeline for the daily digest mail.
//!
//! ```text
//! CycleController::run_cycle
//!   ├── RecordStore::gather      all sources fetched in parallel
//!   └── RecipientPipeline        one task per recipient (bounded)
//!         ├── WeatherSource::fetch_for(local)
//!         ├── base.with_record("weather", ..)   private snapshot
//!         ├── render(template, snapshot)        {{source.field}}
//!         └── Notifier::deliver
//! ```

pub mod config;
pub mod cycle;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod store;
pub mod traits;

pub use config::{MorningPostConfig, Recipient, RunMode};
pub use cycle::{CycleController, CycleOutcome};
pub use error::{MorningPostError, Result};
pub use pipeline::{DeliveryReport, RecipientPipeline, WEATHER_KEY};
pub use record::{FieldValue, IntoRecord, Record};
pub use render::render;
pub use store::RecordStore;
pub use traits::{Notifier, SourceAdapter, WeatherSource};
