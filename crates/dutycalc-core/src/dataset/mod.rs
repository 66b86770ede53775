pub mod convert;
pub mod schema;

use crate::error::DutyError;
use schema::TariffDataset;
use std::path::{Path, PathBuf};

pub use convert::convert_entry;

/// Trait for places a tariff dataset can be fetched from.
pub trait DatasetSource: Send + Sync {
    /// Fetch and decode the full dataset.
    ///
    /// Absent, unreadable or malformed data is reported as
    /// [`DutyError::DataUnavailable`].
    fn load(&self) -> Result<TariffDataset, DutyError>;

    /// Name of this source (for diagnostics).
    fn source_name(&self) -> &str;
}

/// Dataset read from a JSON file on each load.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    name: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for JsonFileSource {
    fn load(&self) -> Result<TariffDataset, DutyError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            DutyError::DataUnavailable(format!("cannot read {}: {e}", self.path.display()))
        })?;
        parse_dataset_str(&content)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Dataset held as JSON text, e.g. embedded or fetched by the caller.
#[derive(Debug, Clone)]
pub struct JsonStrSource {
    json: String,
}

impl JsonStrSource {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

impl DatasetSource for JsonStrSource {
    fn load(&self) -> Result<TariffDataset, DutyError> {
        parse_dataset_str(&self.json)
    }

    fn source_name(&self) -> &str {
        "inline-json"
    }
}

/// Already-decoded dataset, mostly for tests and embedding.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    dataset: TariffDataset,
}

impl InMemorySource {
    pub fn new(dataset: TariffDataset) -> Self {
        Self { dataset }
    }
}

impl DatasetSource for InMemorySource {
    fn load(&self) -> Result<TariffDataset, DutyError> {
        validate_dataset(&self.dataset)?;
        Ok(self.dataset.clone())
    }

    fn source_name(&self) -> &str {
        "in-memory"
    }
}

/// Parse a dataset from JSON text.
pub fn parse_dataset_str(json: &str) -> Result<TariffDataset, DutyError> {
    let json = json.trim_start_matches('\u{feff}');
    let dataset: TariffDataset = serde_json::from_str(json)
        .map_err(|e| DutyError::DataUnavailable(format!("malformed tariff dataset: {e}")))?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

/// A dataset without records cannot answer any lookup.
pub fn validate_dataset(dataset: &TariffDataset) -> Result<(), DutyError> {
    if dataset.tariffs.is_empty() {
        return Err(DutyError::DataUnavailable(
            "tariff dataset contains no records".into(),
        ));
    }
    Ok(())
}
