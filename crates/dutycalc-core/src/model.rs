use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Free-trade-agreement programs that can carry a preferential override rate.
///
/// The serialized key doubles as the field prefix in the raw dataset
/// (`korea_indicator`, `korea_ad_val_rate`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FtaProgram {
    Usmca,
    NaftaCanada,
    NaftaMexico,
    Mexico,
    Korea,
    Australia,
    Chile,
    Colombia,
    Panama,
    Peru,
    Singapore,
    Morocco,
    Jordan,
    IsraelFta,
    Bahrain,
    Oman,
    Japan,
}

impl FtaProgram {
    pub const ALL: [FtaProgram; 17] = [
        FtaProgram::Usmca,
        FtaProgram::NaftaCanada,
        FtaProgram::NaftaMexico,
        FtaProgram::Mexico,
        FtaProgram::Korea,
        FtaProgram::Australia,
        FtaProgram::Chile,
        FtaProgram::Colombia,
        FtaProgram::Panama,
        FtaProgram::Peru,
        FtaProgram::Singapore,
        FtaProgram::Morocco,
        FtaProgram::Jordan,
        FtaProgram::IsraelFta,
        FtaProgram::Bahrain,
        FtaProgram::Oman,
        FtaProgram::Japan,
    ];

    /// Field prefix used by the raw dataset for this program.
    pub fn field_prefix(&self) -> &'static str {
        match self {
            FtaProgram::Usmca => "usmca",
            FtaProgram::NaftaCanada => "nafta_canada",
            FtaProgram::NaftaMexico => "nafta_mexico",
            FtaProgram::Mexico => "mexico",
            FtaProgram::Korea => "korea",
            FtaProgram::Australia => "australia",
            FtaProgram::Chile => "chile",
            FtaProgram::Colombia => "colombia",
            FtaProgram::Panama => "panama",
            FtaProgram::Peru => "peru",
            FtaProgram::Singapore => "singapore",
            FtaProgram::Morocco => "morocco",
            FtaProgram::Jordan => "jordan",
            FtaProgram::IsraelFta => "israel_fta",
            FtaProgram::Bahrain => "bahrain",
            FtaProgram::Oman => "oman",
            FtaProgram::Japan => "japan",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<FtaProgram> {
        FtaProgram::ALL
            .iter()
            .copied()
            .find(|p| p.field_prefix() == prefix)
    }
}

impl fmt::Display for FtaProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtaProgram::Usmca => write!(f, "USMCA"),
            FtaProgram::NaftaCanada => write!(f, "NAFTA Canada"),
            FtaProgram::NaftaMexico => write!(f, "NAFTA Mexico"),
            other => write!(f, "{}", other.field_prefix().replace('_', " ").to_uppercase()),
        }
    }
}

/// A program-specific preferential rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtaOverride {
    /// Special-program indicator from the schedule (e.g. "S", "A+"). Empty means inactive.
    pub indicator: String,
    /// Override rate in percentage points.
    pub ad_val_rate: Option<Decimal>,
}

impl FtaOverride {
    pub fn is_active(&self) -> bool {
        !self.indicator.trim().is_empty()
    }
}

/// Countries a surcharge is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyCountries {
    All,
    Only(BTreeSet<String>),
}

impl DutyCountries {
    pub fn matches(&self, country: &str) -> bool {
        match self {
            DutyCountries::All => true,
            DutyCountries::Only(set) => set.contains(country),
        }
    }
}

pub const SECTION_301_TYPE: &str = "section_301";
pub const SECTION_232_TYPE: &str = "section_232";

/// A surcharge that stacks on top of the base rate (Section 232, Section 301, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditiveDuty {
    /// Raw duty type as it appears in the dataset (e.g. "section_301").
    pub duty_type: String,
    pub name: String,
    /// Rate in percentage points.
    pub rate: Decimal,
    /// Reduced rate for United Kingdom shipments (Section 232 only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_uk: Option<Decimal>,
    pub countries: DutyCountries,
    pub label: String,
}

impl AdditiveDuty {
    pub fn is_section_301(&self) -> bool {
        self.duty_type == SECTION_301_TYPE
    }

    pub fn is_section_232(&self) -> bool {
        self.duty_type == SECTION_232_TYPE
    }

    /// True when the reciprocal-tariff pass already charges this duty.
    pub fn duplicates_reciprocal(&self) -> bool {
        let label = self.label.to_lowercase();
        let name = self.name.to_lowercase();
        self.duty_type == "fentanyl"
            || self.duty_type == "reciprocal_tariff"
            || label.contains("fentanyl")
            || label.contains("reciprocal tariff")
            || name.contains("fentanyl")
            || name.contains("reciprocal tariff")
            || name.contains("ieepa")
    }
}

/// A country-specific, possibly time-bounded surcharge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReciprocalTariff {
    pub country: String,
    /// Rate in percentage points.
    pub rate: Decimal,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

impl ReciprocalTariff {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| now > expires)
    }

    pub fn is_active_for(&self, country: &str, now: DateTime<Utc>) -> bool {
        self.country == country && !self.is_expired(now)
    }
}

/// An emergency-powers tariff (Canada/Mexico) that yields to Section 232.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IeepaTariff {
    pub country: String,
    pub rate: Decimal,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeAction {
    pub rate: Decimal,
    pub countries: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Chapter 99 provision whose whole duty is a single additional rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialProvision {
    pub additional_rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duty_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duty_text: Option<String>,
}

/// The MFN (column 1 general) rate as published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MfnRate {
    /// Ad-valorem rate in percentage points, when the dataset carries it pre-parsed.
    pub ad_valorem: Option<Decimal>,
    /// Rate text as printed in the schedule ("Free", "6.5%", "2.5¢/kg + 3%").
    pub text: Option<String>,
}

/// One classification's tariff facts, keyed by its canonical 8-digit code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TariffEntry {
    pub code: String,
    pub description: String,
    pub mfn: MfnRate,
    /// Column 2 rate in percentage points.
    pub column2_rate: Option<Decimal>,
    pub ntr_suspended_countries: BTreeSet<String>,
    pub column2_countries: BTreeSet<String>,
    pub trade_action: Option<TradeAction>,
    pub fta_overrides: BTreeMap<FtaProgram, FtaOverride>,
    pub additive_duties: Vec<AdditiveDuty>,
    pub reciprocal_tariffs: Vec<ReciprocalTariff>,
    pub ieepa_tariffs: Vec<IeepaTariff>,
    /// Back-compat free text carrying a Section 301 or country surcharge.
    pub legacy_additional_duty: Option<String>,
    pub chapter99: Option<SpecialProvision>,
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
}

impl TariffEntry {
    pub fn has_structured_section_301(&self) -> bool {
        self.additive_duties.iter().any(|d| d.is_section_301())
    }

    /// Whether an unexpired reciprocal tariff targets `country`.
    pub fn has_active_reciprocal_for(&self, country: &str, now: DateTime<Utc>) -> bool {
        self.reciprocal_tariffs
            .iter()
            .any(|rt| rt.is_active_for(country, now))
    }
}
