use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)%").expect("percent pattern is valid"));

// Longer unit names come first so "liter" is not read as "l".
static PER_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\$?)(\d+(?:\.\d+)?)(¢?)\s*(?:/|\s)?\s*(liter|sqm|pair|head|each|unit|doz|ton|No\.|kg|lb|cm|ml|oz|pr|g|m|l)",
    )
    .expect("per-unit pattern is valid")
});

const SPECIAL_MARKERS: &[(&str, &str)] = &[
    ("gsp", "GSP"),
    ("usmca", "USMCA"),
    ("fta", "FTA"),
    ("preferential", "Preferential"),
    ("special", "Special"),
];

/// A specific (per-unit) duty such as "2.5¢/kg".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerUnitRate {
    pub amount: Decimal,
    /// "$", "¢" or empty when the text carries no currency marker.
    pub currency: String,
    pub unit: String,
}

impl std::fmt::Display for PerUnitRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.currency.as_str() {
            "$" => write!(f, "${}/{}", self.amount, self.unit),
            "¢" => write!(f, "{}¢/{}", self.amount, self.unit),
            _ => write!(f, "{}/{}", self.amount, self.unit),
        }
    }
}

/// Structured view of a printed rate of duty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRate {
    /// Ad-valorem part in percentage points (0 when absent).
    pub ad_valorem_percent: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_unit: Option<PerUnitRate>,
    /// Preferential-program marker found in the text (GSP, USMCA, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special: Option<String>,
}

/// Parse a rate of duty as printed in the schedule.
///
/// Handles formats like:
/// - "Free" -> 0%
/// - "6.5%" -> 6.5%
/// - "2.5¢/kg + 3%" -> 3% plus a 2.5¢/kg specific part
/// - "$1.20/doz" -> specific part only
///
/// Unparseable text degrades to a zero rate.
pub fn parse_rate_text(text: &str) -> ParsedRate {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("free") {
        return ParsedRate::default();
    }

    let lower = text.to_lowercase();
    let special = SPECIAL_MARKERS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, name)| name.to_string());

    let ad_valorem_percent = PERCENT_RE
        .captures(text)
        .and_then(|caps| Decimal::from_str(&caps[1]).ok())
        .unwrap_or(Decimal::ZERO);

    let per_unit = PER_UNIT_RE.captures(text).and_then(|caps| {
        let amount = Decimal::from_str(&caps[2]).ok()?;
        let currency = if !caps[1].is_empty() {
            "$".to_string()
        } else if !caps[3].is_empty() {
            "¢".to_string()
        } else {
            String::new()
        };
        Some(PerUnitRate {
            amount,
            currency,
            unit: caps[4].to_string(),
        })
    });

    ParsedRate {
        ad_valorem_percent,
        per_unit,
        special,
    }
}

/// Parse a decimal that may be written in plain or scientific notation.
pub fn parse_decimal_lenient(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Read a JSON number or numeric string as an exact decimal.
///
/// Numbers go through their shortest textual form, so `0.065` stays `0.065`.
pub fn decimal_from_json(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => parse_decimal_lenient(&n.to_string()),
        serde_json::Value::String(s) => parse_decimal_lenient(s),
        _ => None,
    }
}
