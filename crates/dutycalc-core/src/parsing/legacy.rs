use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

static LEGACY_RATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").expect("legacy rate pattern is valid"));

/// Rate recovered from a free-text `additional_duty` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyDuty {
    /// First percentage in the text, in percentage points.
    pub rate: Decimal,
    /// Whether the text names the Section 301 statute.
    pub mentions_section_301: bool,
}

/// Parse a legacy additional-duty note.
///
/// Returns `None` when the text carries no percentage.
pub fn parse_legacy_additional_duty(text: &str) -> Option<LegacyDuty> {
    let caps = LEGACY_RATE_RE.captures(text)?;
    let rate = Decimal::from_str(&caps[1]).ok()?;
    Some(LegacyDuty {
        rate,
        mentions_section_301: text.to_lowercase().contains("301"),
    })
}
