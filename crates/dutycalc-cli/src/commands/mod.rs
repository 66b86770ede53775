pub mod calc;
pub mod compare;
pub mod lookup;
pub mod policy;

use dutycalc_core::dataset::JsonFileSource;
use dutycalc_core::error::DutyError;
use dutycalc_core::policy::builtin;
use dutycalc_core::policy::schema::PolicyDef;
use dutycalc_core::store::TariffStore;
use std::path::PathBuf;
use tracing::debug;

/// Global options shared by every subcommand.
pub struct Context {
    pub dataset: Option<PathBuf>,
    pub policy: Option<PathBuf>,
}

impl Context {
    pub fn open_store(&self) -> Result<TariffStore, DutyError> {
        let path = self.dataset.as_ref().ok_or_else(|| {
            DutyError::DataUnavailable(
                "no dataset given. Pass --dataset or set DUTYCALC_DATASET".into(),
            )
        })?;
        debug!(dataset = %path.display(), "opening tariff dataset");
        let store = TariffStore::default();
        store.initialize(&JsonFileSource::new(path))?;
        Ok(store)
    }

    pub fn load_policy(&self) -> Result<PolicyDef, DutyError> {
        match self.policy {
            Some(ref path) => dutycalc_core::policy::load_policy(path),
            None => Ok(builtin::default_policy().clone()),
        }
    }
}
