use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A tariff dataset as published: metadata plus one record per 8-digit code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffDataset {
    #[serde(default)]
    pub data_last_updated: Option<String>,
    #[serde(default)]
    pub hts_revision: Option<String>,
    pub tariffs: Vec<RawTariffEntry>,
}

/// One tariff record with the field names of the published dataset.
///
/// Numeric fields may arrive as JSON numbers or strings, so they are kept as
/// raw values and converted leniently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTariffEntry {
    /// Missing codes deserialize as null and are skipped by the store.
    #[serde(default, alias = "\u{feff}hts8", alias = "HTS Number")]
    pub hts8: Value,
    #[serde(default, alias = "Description")]
    pub brief_description: Option<String>,

    #[serde(default)]
    pub mfn_text_rate: Option<String>,
    /// Fraction (0.065 = 6.5%).
    #[serde(default)]
    pub mfn_ad_val_rate: Option<Value>,

    #[serde(default)]
    pub col2_text_rate: Option<String>,
    /// Fraction.
    #[serde(default)]
    pub col2_ad_val_rate: Option<Value>,
    #[serde(default)]
    pub column2_countries: Option<Vec<String>>,
    #[serde(default)]
    pub ntr_suspended_countries: Option<Vec<String>>,

    #[serde(default)]
    pub has_special_trade_action: Option<bool>,
    /// Percentage points.
    #[serde(default)]
    pub trade_action_rate: Option<Value>,
    #[serde(default)]
    pub trade_action_countries: Option<Vec<String>>,
    #[serde(default)]
    pub trade_action_label: Option<String>,

    /// Legacy free-text surcharge note.
    #[serde(default)]
    pub additional_duty: Option<String>,

    #[serde(default)]
    pub is_chapter_99: Option<bool>,
    /// Percentage points.
    #[serde(default)]
    pub chapter_99_additional_rate: Option<Value>,
    #[serde(default)]
    pub chapter_99_duty_text: Option<String>,
    #[serde(default)]
    pub chapter_99_type: Option<String>,

    #[serde(default)]
    pub additive_duties: Option<Vec<RawAdditiveDuty>>,
    #[serde(default)]
    pub reciprocal_tariffs: Option<Vec<RawReciprocalTariff>>,
    #[serde(default)]
    pub ieepa_tariffs: Option<Vec<RawIeepaTariff>>,

    #[serde(default)]
    pub begin_effect_date: Option<String>,
    #[serde(default)]
    pub end_effective_date: Option<String>,

    /// Everything else, including the sparse `<program>_indicator` and
    /// `<program>_ad_val_rate` FTA fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// `"all"` or a list of country codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCountries {
    Keyword(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAdditiveDuty {
    #[serde(rename = "type", default)]
    pub duty_type: String,
    #[serde(default)]
    pub name: String,
    /// Percentage points.
    #[serde(default)]
    pub rate: Option<Value>,
    #[serde(default)]
    pub rate_uk: Option<Value>,
    #[serde(default)]
    pub countries: Option<RawCountries>,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReciprocalTariff {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub rate: Option<Value>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub effective: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIeepaTariff {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub rate: Option<Value>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub legal_status: Option<String>,
}
