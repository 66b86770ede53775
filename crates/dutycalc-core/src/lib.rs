pub mod dataset;
pub mod duty;
pub mod error;
pub mod model;
pub mod parsing;
pub mod policy;
pub mod store;

use chrono::{DateTime, Utc};
use duty::{DutyCalculationResult, DutyRequest, ToggleComparison};
use error::DutyError;
use policy::schema::PolicyDef;
use store::TariffStore;
use tracing::debug;

/// Main API entry point: look up the request's code and estimate duty and fees.
///
/// Fails only when the store has no dataset. An unknown code or a
/// non-positive value yields a zero result explaining why.
pub fn estimate_duty(
    store: &TariffStore,
    policy: &PolicyDef,
    request: &DutyRequest,
) -> Result<DutyCalculationResult, DutyError> {
    estimate_duty_at(store, policy, request, Utc::now())
}

/// [`estimate_duty`] with reciprocal-tariff expiry judged at `now`.
pub fn estimate_duty_at(
    store: &TariffStore,
    policy: &PolicyDef,
    request: &DutyRequest,
    now: DateTime<Utc>,
) -> Result<DutyCalculationResult, DutyError> {
    let entry = store.find_by_code(&request.code)?;
    if entry.is_none() {
        debug!(code = %request.code, "no tariff record for code");
    }
    Ok(duty::calculate_duty(entry.as_deref(), request, policy, now))
}

/// Compare the four reciprocal-tariff toggle combinations for one line.
///
/// Returns `None` when the code has no tariff record.
pub fn compare_duty(
    store: &TariffStore,
    policy: &PolicyDef,
    request: &DutyRequest,
) -> Result<Option<ToggleComparison>, DutyError> {
    compare_duty_at(store, policy, request, Utc::now())
}

pub fn compare_duty_at(
    store: &TariffStore,
    policy: &PolicyDef,
    request: &DutyRequest,
    now: DateTime<Utc>,
) -> Result<Option<ToggleComparison>, DutyError> {
    let Some(entry) = store.find_by_code(&request.code)? else {
        return Ok(None);
    };
    Ok(Some(duty::compare_reciprocal_toggles(
        &entry, request, policy, now,
    )))
}
