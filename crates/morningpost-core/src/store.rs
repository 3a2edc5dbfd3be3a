//! Record store — every record of one cycle, keyed by source name.
//!
//! Stores are cheap to clone (records sit behind `Arc`) and are never shared
//! mutably: a per-recipient view is a fresh store built with
//! [`RecordStore::with_record`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{MorningPostError, Result};
use crate::record::Record;
use crate::traits::SourceAdapter;

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: BTreeMap<String, Arc<Record>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every adapter concurrently and collect one record per adapter.
    ///
    /// All fetches are spawned before any is awaited. The call returns once
    /// every fetch has finished; a single failure fails the whole build.
    pub async fn gather(adapters: &[Arc<dyn SourceAdapter>]) -> Result<Self> {
        let mut names: Vec<String> = Vec::with_capacity(adapters.len());
        for adapter in adapters {
            let name = adapter.name().to_string();
            if names.contains(&name) {
                return Err(MorningPostError::Config(format!(
                    "source '{name}' registered twice"
                )));
            }
            names.push(name);
        }

        let started = Instant::now();
        let handles: Vec<_> = adapters
            .iter()
            .map(|adapter| {
                let adapter = Arc::clone(adapter);
                tokio::spawn(async move {
                    let t = Instant::now();
                    let result = adapter.fetch().await;
                    tracing::debug!(
                        "📥 Source '{}' finished in {}ms",
                        adapter.name(),
                        t.elapsed().as_millis()
                    );
                    result
                })
            })
            .collect();

        let results = futures::future::join_all(handles).await;

        let mut store = Self::new();
        for (name, joined) in names.into_iter().zip(results) {
            let fetched = joined
                .map_err(|e| MorningPostError::fetch(&name, format!("task aborted: {e}")))?;
            let record = fetched?;
            store.insert(name, record);
        }

        tracing::info!(
            "📦 Gathered {} source(s) in {}ms",
            store.len(),
            started.elapsed().as_millis()
        );
        Ok(store)
    }

    /// Add or replace the record under `name`.
    pub fn insert(&mut self, name: impl Into<String>, record: Record) {
        self.records.insert(name.into(), Arc::new(record));
    }

    /// A copy of this store with `record` added under `name`. `self` is
    /// left untouched.
    pub fn with_record(&self, name: &str, record: Record) -> Self {
        let mut snapshot = self.clone();
        snapshot.insert(name, record);
        snapshot
    }

    pub fn get(&self, name: &str) -> Option<&Record> {
        self.records.get(name).map(Arc::as_ref)
    }

    /// `(source name, record)` pairs in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.records
            .iter()
            .map(|(name, record)| (name.as_str(), record.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowSource {
        name: &'static str,
        delay_ms: u64,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SourceAdapter for SlowSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self) -> Result<Record> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            Ok(Record::builder(self.name).field("Value", self.name).build())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl SourceAdapter for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn fetch(&self) -> Result<Record> {
            Err(MorningPostError::fetch("broken", "status 500"))
        }
    }

    fn slow(name: &'static str, delay_ms: u64, calls: &Arc<AtomicUsize>) -> Arc<dyn SourceAdapter> {
        Arc::new(SlowSource {
            name,
            delay_ms,
            calls: Arc::clone(calls),
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_gather_one_entry_per_source() {
        let calls = Arc::new(AtomicUsize::new(0));
        let adapters = vec![slow("one", 5, &calls), slow("poem", 5, &calls), slow("english", 5, &calls)];
        let store = RecordStore::gather(&adapters).await.unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            store.get("poem").and_then(|r| r.get("Value")).map(|v| v.render()),
            Some("poem".to_string())
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_gather_runs_fetches_in_parallel() {
        let calls = Arc::new(AtomicUsize::new(0));
        let adapters = vec![
            slow("a", 300, &calls),
            slow("b", 300, &calls),
            slow("c", 300, &calls),
            slow("d", 300, &calls),
        ];
        let started = Instant::now();
        RecordStore::gather(&adapters).await.unwrap();
        let elapsed = started.elapsed();
        // Sequential would take ~1200ms.
        assert!(elapsed < Duration::from_millis(900), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn test_gather_fails_on_any_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![slow("one", 1, &calls), Arc::new(BrokenSource)];
        let err = RecordStore::gather(&adapters).await.unwrap_err();
        assert!(matches!(err, MorningPostError::Fetch { ref source_name, .. } if source_name == "broken"));
    }

    #[tokio::test]
    async fn test_gather_rejects_duplicate_names() {
        let calls = Arc::new(AtomicUsize::new(0));
        let adapters = vec![slow("one", 1, &calls), slow("one", 1, &calls)];
        let err = RecordStore::gather(&adapters).await.unwrap_err();
        assert!(matches!(err, MorningPostError::Config(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_with_record_leaves_base_untouched() {
        let mut base = RecordStore::new();
        base.insert("one", Record::builder("one").field("Sentence", "hi").build());
        let view = base.with_record("weather", Record::builder("weather").field("Temp", "21").build());
        assert_eq!(base.len(), 1);
        assert!(base.get("weather").is_none());
        assert_eq!(view.len(), 2);
        assert!(view.get("weather").is_some());
    }
}
