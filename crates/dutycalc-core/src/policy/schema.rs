use crate::model::{FtaProgram, TariffEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Country-level tables the duty engine consults.
///
/// Kept as data so that a schedule change (a new FTA partner, a new chapter 99
/// heading) is a policy edit rather than an engine change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDef {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,

    /// Country code -> FTA programs to try, in order.
    pub fta_programs: BTreeMap<String, Vec<FtaProgram>>,

    /// Chapter 99 applicability rules. The first rule matching the entry decides.
    #[serde(default)]
    pub special_provisions: Vec<SpecialProvisionRule>,

    /// Countries charged column 2 even when the entry lists none.
    #[serde(default)]
    pub legacy_column2_countries: Vec<String>,

    #[serde(default)]
    pub usmca_partners: Vec<String>,
    /// Substring of a reciprocal-tariff note that signals a USMCA-origin exemption.
    #[serde(default = "default_usmca_marker")]
    pub usmca_exemption_marker: String,

    /// Country whose legacy duty text may carry a Section 301 rate.
    #[serde(default)]
    pub legacy_section_301_country: Option<String>,
    /// Countries whose legacy duty text is charged under a fixed label.
    #[serde(default)]
    pub legacy_partner_surcharges: Vec<LegacyPartnerSurcharge>,

    /// Countries treated as another country for surcharges (HK -> CN).
    #[serde(default)]
    pub surcharge_country_aliases: BTreeMap<String, String>,

    /// Country codes that get the Section 232 UK rate.
    #[serde(default)]
    pub uk_countries: Vec<String>,
}

fn default_usmca_marker() -> String {
    "USMCA-origin goods exempt".into()
}

/// When a chapter 99 provision applies, keyed on code and description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialProvisionRule {
    /// Exact canonical code.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub code_prefix: Option<String>,
    /// All of these must appear in the description (case-insensitive).
    #[serde(default)]
    pub description_contains: Vec<String>,
    /// Country of origin the provision applies to.
    pub country: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl SpecialProvisionRule {
    pub fn matches_entry(&self, entry: &TariffEntry) -> bool {
        if let Some(ref code) = self.code {
            if &entry.code != code {
                return false;
            }
        }
        if let Some(ref prefix) = self.code_prefix {
            if !entry.code.starts_with(prefix.as_str()) {
                return false;
            }
        }
        let description = entry.description.to_lowercase();
        self.description_contains
            .iter()
            .all(|needle| description.contains(&needle.to_lowercase()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyPartnerSurcharge {
    pub country: String,
    pub label: String,
}

impl PolicyDef {
    /// FTA programs to try for `country`, in order.
    pub fn programs_for(&self, country: &str) -> &[FtaProgram] {
        self.fta_programs
            .get(country)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether a chapter 99 entry's flat rate applies to `country`.
    ///
    /// Entries without a matching rule never apply.
    pub fn special_provision_applies(&self, entry: &TariffEntry, country: &str) -> bool {
        entry.chapter99.is_some()
            && self
                .special_provisions
                .iter()
                .find(|rule| rule.matches_entry(entry))
                .is_some_and(|rule| rule.country == country)
    }

    pub fn is_legacy_column2_country(&self, country: &str) -> bool {
        self.legacy_column2_countries.iter().any(|c| c == country)
    }

    pub fn is_usmca_partner(&self, country: &str) -> bool {
        self.usmca_partners.iter().any(|c| c == country)
    }

    /// Whether a reciprocal-tariff note advertises the USMCA-origin exemption.
    pub fn note_mentions_usmca_exemption(&self, note: &str) -> bool {
        note.to_lowercase()
            .contains(&self.usmca_exemption_marker.to_lowercase())
    }

    pub fn is_uk(&self, country: &str) -> bool {
        self.uk_countries.iter().any(|c| c == country)
    }

    /// Country used when matching surcharges (HK and MO ship under CN rules).
    pub fn surcharge_country<'a>(&'a self, country: &'a str) -> &'a str {
        self.surcharge_country_aliases
            .get(country)
            .map(String::as_str)
            .unwrap_or(country)
    }

    pub fn legacy_partner_label(&self, country: &str) -> Option<&str> {
        self.legacy_partner_surcharges
            .iter()
            .find(|p| p.country == country)
            .map(|p| p.label.as_str())
    }

    pub fn is_legacy_section_301_country(&self, country: &str) -> bool {
        self.legacy_section_301_country.as_deref() == Some(country)
    }
}
