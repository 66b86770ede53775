use crate::dataset::{convert_entry, DatasetSource};
use crate::error::DutyError;
use crate::model::TariffEntry;
use crate::parsing::normalize_code;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Tuning for a [`TariffStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long a loaded snapshot is considered fresh. `initialize` is a
    /// no-op within this window.
    pub freshness: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            freshness: Duration::from_secs(60 * 60),
        }
    }
}

/// One immutable view of the dataset. Lookups hold an `Arc` to it, so a
/// refresh never exposes a half-built index.
#[derive(Debug)]
struct Snapshot {
    entries: HashMap<String, Arc<TariffEntry>>,
    loaded_at: Instant,
    source: String,
    data_last_updated: Option<String>,
    hts_revision: Option<String>,
}

/// Cached tariff records keyed by canonical 8-digit code.
///
/// Cheap to share behind an `Arc`; lookups only take a read lock long enough
/// to clone the current snapshot handle.
#[derive(Debug, Default)]
pub struct TariffStore {
    config: StoreConfig,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl TariffStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            snapshot: RwLock::new(None),
        }
    }

    /// Load the dataset unless a fresh snapshot is already cached.
    pub fn initialize(&self, source: &dyn DatasetSource) -> Result<(), DutyError> {
        if let Some(current) = self.current() {
            if current.loaded_at.elapsed() < self.config.freshness {
                debug!(source = %current.source, "tariff snapshot still fresh, skipping load");
                return Ok(());
            }
        }
        self.refresh(source)
    }

    /// Reload from `source` and swap the snapshot in one step.
    ///
    /// On failure the previous snapshot, if any, stays in place.
    pub fn refresh(&self, source: &dyn DatasetSource) -> Result<(), DutyError> {
        let dataset = source.load()?;
        let total = dataset.tariffs.len();

        let mut entries = HashMap::with_capacity(total);
        for raw in dataset.tariffs {
            let entry = convert_entry(raw);
            if entry.code.chars().all(|c| c == '0') {
                warn!("skipping tariff record without a classification code");
                continue;
            }
            if entries.contains_key(&entry.code) {
                warn!(code = %entry.code, "duplicate tariff code, keeping first record");
                continue;
            }
            entries.insert(entry.code.clone(), Arc::new(entry));
        }

        if entries.is_empty() {
            return Err(DutyError::DataUnavailable(format!(
                "no usable tariff records in {}",
                source.source_name()
            )));
        }

        info!(
            source = source.source_name(),
            records = total,
            indexed = entries.len(),
            revision = dataset.hts_revision.as_deref().unwrap_or("unknown"),
            "tariff snapshot loaded"
        );

        let snapshot = Arc::new(Snapshot {
            entries,
            loaded_at: Instant::now(),
            source: source.source_name().to_string(),
            data_last_updated: dataset.data_last_updated,
            hts_revision: dataset.hts_revision,
        });
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Some(snapshot);
        Ok(())
    }

    /// Exact-match lookup after normalizing `raw_code` to 8 digits.
    pub fn find_by_code(&self, raw_code: &str) -> Result<Option<Arc<TariffEntry>>, DutyError> {
        let snapshot = self.require()?;
        let code = normalize_code(raw_code);
        Ok(snapshot.entries.get(&code).cloned())
    }

    pub fn is_initialized(&self) -> bool {
        self.current().is_some()
    }

    pub fn len(&self) -> usize {
        self.current().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Publication date carried by the loaded dataset.
    pub fn last_updated(&self) -> Result<Option<String>, DutyError> {
        Ok(self.require()?.data_last_updated.clone())
    }

    pub fn hts_revision(&self) -> Result<Option<String>, DutyError> {
        Ok(self.require()?.hts_revision.clone())
    }

    fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn require(&self) -> Result<Arc<Snapshot>, DutyError> {
        self.current()
            .ok_or_else(|| DutyError::DataUnavailable("tariff store is not initialized".into()))
    }
}
