use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Component type identifiers as they appear in results.
pub mod kinds {
    pub const MFN: &str = "MFN";
    pub const FTA: &str = "FTA";
    pub const COLUMN_2: &str = "Column 2";
    pub const TRADE_ACTION: &str = "Trade Action";
    pub const SPECIAL_PROVISION: &str = "Special Provision";
    pub const SECTION_301: &str = "section_301";
    pub const SECTION_232: &str = "section_232";
    pub const ADDITIONAL_DUTY: &str = "Additional Duty";
    pub const RECIPROCAL_TARIFF: &str = "reciprocal_tariff";
    pub const FENTANYL: &str = "fentanyl";
    pub const IEEPA_TARIFF: &str = "ieepa_tariff";

    /// Types counted as reciprocal when comparing toggle scenarios.
    pub const RECIPROCAL_FAMILY: &[&str] = &[RECIPROCAL_TARIFF, FENTANYL, IEEPA_TARIFF];
}

/// One applied rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyComponent {
    #[serde(rename = "type")]
    pub kind: String,
    /// Percentage points.
    pub rate: Decimal,
    pub amount: Decimal,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeLine {
    /// Percentage points.
    pub rate: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fees {
    pub mpf: FeeLine,
    pub hmf: FeeLine,
}

/// Itemized duty estimate for one shipment line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyCalculationResult {
    /// Duty plus statutory fees.
    pub amount: Decimal,
    pub duty_only: Decimal,
    /// Sum of applied rates in percentage points.
    pub total_rate: Decimal,
    pub components: Vec<DutyComponent>,
    pub breakdown: Vec<String>,
    pub fees: Fees,
    pub hts_code: String,
    pub description: String,
    pub effective_date: String,
    pub expiration_date: String,
}

impl DutyCalculationResult {
    /// Zero result carrying a single explanatory line.
    pub fn empty(hts_code: &str, reason: &str) -> Self {
        Self {
            amount: Decimal::ZERO,
            duty_only: Decimal::ZERO,
            total_rate: Decimal::ZERO,
            components: Vec::new(),
            breakdown: vec![reason.to_string()],
            fees: Fees::default(),
            hts_code: hts_code.to_string(),
            description: String::new(),
            effective_date: String::new(),
            expiration_date: String::new(),
        }
    }

    /// Total amount of components whose type is one of `kinds`.
    pub fn amount_of(&self, kinds: &[&str]) -> Decimal {
        self.components
            .iter()
            .filter(|c| kinds.contains(&c.kind.as_str()))
            .map(|c| c.amount)
            .sum()
    }

    pub fn has_component(&self, kind: &str) -> bool {
        self.components.iter().any(|c| c.kind == kind)
    }
}

/// Round to cents, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// "$1234.50"
pub fn format_money(value: Decimal) -> String {
    format!("${}", round_money(value))
}

/// Rate without trailing zeros ("6.5", "25").
pub fn format_rate(rate: Decimal) -> String {
    rate.normalize().to_string()
}
