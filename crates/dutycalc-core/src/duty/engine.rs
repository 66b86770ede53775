use crate::duty::fees::statutory_fees;
use crate::duty::outcome::{
    format_money, format_rate, kinds, DutyCalculationResult, DutyComponent, Fees,
};
use crate::model::{FtaProgram, TariffEntry};
use crate::parsing::{format_display_date, parse_legacy_additional_duty, parse_rate_text};
use crate::policy::schema::PolicyDef;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Caller toggles for surcharge layering. Both default to off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyOptions {
    /// Layer Section 301 on top of an active reciprocal tariff instead of
    /// letting the reciprocal tariff supersede it.
    #[serde(default)]
    pub prefer_reciprocal_additive: bool,
    /// Leave reciprocal and IEEPA tariffs out entirely.
    #[serde(default)]
    pub exclude_reciprocal_tariff: bool,
}

/// One shipment line to estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyRequest {
    /// Classification code in any format ("8501.10.40", "850110").
    pub code: String,
    pub declared_value: Decimal,
    /// Two-letter country of origin, compared case-sensitively.
    pub country: String,
    #[serde(default)]
    pub options: DutyOptions,
}

impl DutyRequest {
    pub fn new(code: impl Into<String>, declared_value: Decimal, country: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            declared_value,
            country: country.into(),
            options: DutyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DutyOptions) -> Self {
        self.options = options;
        self
    }
}

/// Running totals while rates are layered onto one entry.
struct Ledger {
    declared_value: Decimal,
    total_rate: Decimal,
    components: Vec<DutyComponent>,
    breakdown: Vec<String>,
    overflowed: bool,
}

impl Ledger {
    fn new(declared_value: Decimal) -> Self {
        Self {
            declared_value,
            total_rate: Decimal::ZERO,
            components: Vec::new(),
            breakdown: Vec::new(),
            overflowed: false,
        }
    }

    fn apply(&mut self, kind: &str, rate: Decimal, label: impl Into<String>, line: String) {
        let rate = rate.normalize();
        let (Some(amount), Some(total_rate)) = (
            percent_of(self.declared_value, rate),
            self.total_rate.checked_add(rate),
        ) else {
            self.overflowed = true;
            return;
        };
        self.total_rate = total_rate;
        self.components.push(DutyComponent {
            kind: kind.to_string(),
            rate,
            amount,
            label: label.into(),
        });
        self.breakdown.push(line);
    }

    fn note(&mut self, line: String) {
        self.breakdown.push(line);
    }

    fn has_component(&self, kind: &str) -> bool {
        self.components.iter().any(|c| c.kind == kind)
    }

    /// Duty, fees and their sum, or `None` if any of them overflows.
    fn totals(&self) -> Option<(Decimal, Fees, Decimal)> {
        if self.overflowed {
            return None;
        }
        let duty_only = percent_of(self.declared_value, self.total_rate)?;
        let fees = statutory_fees(self.declared_value)?;
        let amount = duty_only
            .checked_add(fees.mpf.amount)?
            .checked_add(fees.hmf.amount)?;
        Some((duty_only, fees, amount))
    }

    fn finish(mut self, entry: &TariffEntry) -> DutyCalculationResult {
        let Some((duty_only, fees, amount)) = self.totals() else {
            warn!(code = %entry.code, value = %self.declared_value, "duty arithmetic overflowed");
            return DutyCalculationResult::empty(&entry.code, "Invalid declared value");
        };

        self.breakdown
            .push(format!("Base Duty Amount: {}", format_money(duty_only)));
        self.breakdown.push(format!(
            "Merchandise Processing Fee ({}%): {}",
            fees.mpf.rate,
            format_money(fees.mpf.amount)
        ));
        self.breakdown.push(format!(
            "Harbor Maintenance Fee ({}%): {}",
            fees.hmf.rate,
            format_money(fees.hmf.amount)
        ));
        self.breakdown
            .push(format!("Total Duty & Fees: {}", format_money(amount)));

        DutyCalculationResult {
            amount,
            duty_only,
            total_rate: self.total_rate.normalize(),
            components: self.components,
            breakdown: self.breakdown,
            fees,
            hts_code: entry.code.clone(),
            description: entry.description.clone(),
            effective_date: format_display_date(entry.effective_date.as_deref()),
            expiration_date: format_display_date(entry.expiration_date.as_deref()),
        }
    }
}

/// `value * rate / 100`, unrounded.
fn percent_of(value: Decimal, rate: Decimal) -> Option<Decimal> {
    value.checked_mul(rate)?.checked_div(Decimal::ONE_HUNDRED)
}

/// Estimate duty and fees for one entry.
///
/// `entry` is `None` when the lookup upstream found nothing. Invalid input
/// and missing entries produce a zero result with an explanatory line rather
/// than an error. `now` is only used to expire reciprocal tariffs.
pub fn calculate_duty(
    entry: Option<&TariffEntry>,
    request: &DutyRequest,
    policy: &PolicyDef,
    now: DateTime<Utc>,
) -> DutyCalculationResult {
    if request.declared_value <= Decimal::ZERO {
        return DutyCalculationResult::empty(&request.code, "Invalid declared value");
    }
    let Some(entry) = entry else {
        return DutyCalculationResult::empty(&request.code, "No HTS code match found");
    };

    let country = request.country.as_str();
    let mut ledger = Ledger::new(request.declared_value);

    if let Some(ref provision) = entry.chapter99 {
        if policy.special_provision_applies(entry, country) {
            debug!(code = %entry.code, country, "chapter 99 provision applies");
            let rate = provision.additional_rate;
            let shown = format_rate(rate);
            let label = provision
                .duty_type
                .clone()
                .unwrap_or_else(|| "Chapter 99 Additional Duty".into());
            let heading = provision.duty_type.as_deref().unwrap_or("Special Provision");
            ledger.apply(
                kinds::SPECIAL_PROVISION,
                rate,
                label,
                format!("{heading}: {shown}%"),
            );
            ledger.note(
                provision
                    .duty_text
                    .clone()
                    .unwrap_or_else(|| format!("Additional duty of {shown}%")),
            );
            return ledger.finish(entry);
        }
    }

    apply_base_rate(&mut ledger, entry, country, policy);
    apply_additive_duties(&mut ledger, entry, request, policy, now);
    apply_legacy_duty(&mut ledger, entry, request, policy, now);
    if request.options.exclude_reciprocal_tariff {
        debug!(code = %entry.code, "reciprocal tariffs excluded by caller");
    } else {
        apply_reciprocal_tariffs(&mut ledger, entry, country, policy, now);
        apply_ieepa_tariffs(&mut ledger, entry, country, policy);
    }

    ledger.finish(entry)
}

/// Pick exactly one base rate, first match wins.
fn apply_base_rate(ledger: &mut Ledger, entry: &TariffEntry, country: &str, policy: &PolicyDef) {
    if let Some(col2) = entry.column2_rate {
        if entry.ntr_suspended_countries.contains(country) {
            let label = "Column 2 Rate (NTR Suspended)";
            ledger.apply(kinds::COLUMN_2, col2, label, format!("{label}: {}%", format_rate(col2)));
            return;
        }
    }

    if let Some(ref action) = entry.trade_action {
        if action.countries.contains(country) {
            let label = action.label.as_deref().unwrap_or("Trade Action Rate");
            ledger.apply(
                kinds::TRADE_ACTION,
                action.rate,
                label,
                format!("{label}: {}%", format_rate(action.rate)),
            );
            return;
        }
    }

    if let Some(col2) = entry.column2_rate {
        if entry.column2_countries.contains(country) || policy.is_legacy_column2_country(country) {
            let label = "Column 2 Rate";
            ledger.apply(kinds::COLUMN_2, col2, label, format!("{label}: {}%", format_rate(col2)));
            return;
        }
    }

    if let Some((program, rate)) = fta_rate(entry, country, policy) {
        debug!(code = %entry.code, %program, "FTA override selected");
        let name = program.to_string();
        let line = format!("{name} FTA Rate: {}%", format_rate(rate));
        ledger.apply(kinds::FTA, rate, name, line);
        return;
    }

    let parsed = entry.mfn.text.as_deref().map(parse_rate_text);
    let rate = entry
        .mfn
        .ad_valorem
        .or_else(|| parsed.as_ref().map(|p| p.ad_valorem_percent))
        .unwrap_or(Decimal::ZERO);
    let shown = entry
        .mfn
        .text
        .clone()
        .unwrap_or_else(|| format!("{}%", format_rate(rate)));
    ledger.apply(
        kinds::MFN,
        rate,
        "Most Favored Nation",
        format!("MFN Rate: {shown}"),
    );
    let Some(parsed) = parsed else {
        return;
    };
    if let Some(per_unit) = parsed.per_unit {
        ledger.note(format!(
            "  (Specific duty {per_unit} not included: quantity not provided)"
        ));
    }
    if let Some(special) = parsed.special {
        ledger.note(format!("  ({special} rate named in MFN text, not applied)"));
    }
}

fn fta_rate(entry: &TariffEntry, country: &str, policy: &PolicyDef) -> Option<(FtaProgram, Decimal)> {
    policy.programs_for(country).iter().find_map(|program| {
        let over = entry.fta_overrides.get(program)?;
        if !over.is_active() {
            return None;
        }
        over.ad_val_rate.map(|rate| (*program, rate))
    })
}

/// Surcharges keyed to either the origin or its alias apply to the shipment.
fn surcharge_matches(tariff_country: &str, country: &str, surcharge_country: &str) -> bool {
    tariff_country == surcharge_country || tariff_country == country
}

/// Section 301 yields to an active reciprocal tariff unless the caller prefers both.
fn section_301_allowed(
    entry: &TariffEntry,
    request: &DutyRequest,
    surcharge_country: &str,
    now: DateTime<Utc>,
) -> bool {
    let country = request.country.as_str();
    request.options.prefer_reciprocal_additive
        || !(entry.has_active_reciprocal_for(surcharge_country, now)
            || entry.has_active_reciprocal_for(country, now))
}

fn apply_additive_duties(
    ledger: &mut Ledger,
    entry: &TariffEntry,
    request: &DutyRequest,
    policy: &PolicyDef,
    now: DateTime<Utc>,
) {
    let country = request.country.as_str();
    let surcharge_country = policy.surcharge_country(country);

    for duty in &entry.additive_duties {
        if !duty.countries.matches(surcharge_country) && !duty.countries.matches(country) {
            continue;
        }
        if duty.duplicates_reciprocal() {
            debug!(label = %duty.label, "additive duty charged by reciprocal pass, skipped");
            continue;
        }
        if duty.is_section_301() && !section_301_allowed(entry, request, surcharge_country, now) {
            debug!(label = %duty.label, "section 301 superseded by reciprocal tariff");
            continue;
        }

        let (rate, label) = match duty.rate_uk {
            Some(uk_rate) if duty.is_section_232() && policy.is_uk(country) => {
                (uk_rate, format!("{} (UK rate)", duty.label))
            }
            _ => (duty.rate, duty.label.clone()),
        };
        let line = format!("{label}: +{}%", format_rate(rate));
        ledger.apply(&duty.duty_type, rate, label, line);
    }
}

/// Free-text surcharges on records that predate structured additive duties.
fn apply_legacy_duty(
    ledger: &mut Ledger,
    entry: &TariffEntry,
    request: &DutyRequest,
    policy: &PolicyDef,
    now: DateTime<Utc>,
) {
    if entry.has_structured_section_301() {
        return;
    }
    let Some(ref text) = entry.legacy_additional_duty else {
        return;
    };
    let Some(legacy) = parse_legacy_additional_duty(text) else {
        warn!(code = %entry.code, text = %text, "no rate in legacy additional duty");
        return;
    };

    let country = request.country.as_str();
    let surcharge_country = policy.surcharge_country(country);
    let line = |label: &str| format!("{label}: +{}%", format_rate(legacy.rate));

    if policy.is_legacy_section_301_country(surcharge_country) && legacy.mentions_section_301 {
        if section_301_allowed(entry, request, surcharge_country, now) {
            ledger.apply(kinds::SECTION_301, legacy.rate, "Section 301", line("Section 301"));
        } else {
            debug!(code = %entry.code, "legacy section 301 superseded by reciprocal tariff");
        }
    } else if let Some(label) = policy.legacy_partner_label(country) {
        ledger.apply(kinds::ADDITIONAL_DUTY, legacy.rate, label, line(label));
    }
}

fn reciprocal_kind(label: &str) -> &'static str {
    let lower = label.to_lowercase();
    if lower.contains("fentanyl") {
        kinds::FENTANYL
    } else if lower.contains("ieepa") {
        kinds::IEEPA_TARIFF
    } else {
        kinds::RECIPROCAL_TARIFF
    }
}

fn apply_reciprocal_tariffs(
    ledger: &mut Ledger,
    entry: &TariffEntry,
    country: &str,
    policy: &PolicyDef,
    now: DateTime<Utc>,
) {
    let surcharge_country = policy.surcharge_country(country);
    for tariff in &entry.reciprocal_tariffs {
        if !surcharge_matches(&tariff.country, country, surcharge_country) {
            continue;
        }
        if tariff.is_expired(now) {
            debug!(label = %tariff.label, expires = ?tariff.expires, "reciprocal tariff expired");
            continue;
        }

        let line = format!("{}: +{}%", tariff.label, format_rate(tariff.rate));
        ledger.apply(reciprocal_kind(&tariff.label), tariff.rate, tariff.label.clone(), line);

        if let Some(ref note) = tariff.note {
            ledger.note(format!("  ({note})"));
            if policy.is_usmca_partner(country) && policy.note_mentions_usmca_exemption(note) {
                // Display only. Origin qualification is not evaluated here.
                ledger.note(
                    "  (USMCA-origin goods may qualify for exemption; duty still included above)"
                        .to_string(),
                );
            }
        }
    }
}

fn apply_ieepa_tariffs(ledger: &mut Ledger, entry: &TariffEntry, country: &str, policy: &PolicyDef) {
    let surcharge_country = policy.surcharge_country(country);
    for tariff in &entry.ieepa_tariffs {
        if !surcharge_matches(&tariff.country, country, surcharge_country) {
            continue;
        }
        if ledger.has_component(kinds::SECTION_232) {
            ledger.note(format!(
                "{}: Not applied (Section 232 takes precedence)",
                tariff.label
            ));
            continue;
        }

        let line = format!("{}: +{}%", tariff.label, format_rate(tariff.rate));
        ledger.apply(kinds::IEEPA_TARIFF, tariff.rate, tariff.label.clone(), line);
        if let Some(ref note) = tariff.note {
            ledger.note(format!("  ({note})"));
        }
        if let Some(ref status) = tariff.legal_status {
            ledger.note(format!("  ({status})"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AdditiveDuty, DutyCountries, FtaOverride, IeepaTariff, MfnRate, ReciprocalTariff,
        SpecialProvision, TradeAction,
    };
    use crate::policy::builtin::default_policy;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::collections::{BTreeMap, BTreeSet};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn mfn_entry(rate: Decimal, text: &str) -> TariffEntry {
        TariffEntry {
            code: "85011040".into(),
            description: "Electric motors".into(),
            mfn: MfnRate {
                ad_valorem: Some(rate),
                text: Some(text.into()),
            },
            ..Default::default()
        }
    }

    fn calc(entry: &TariffEntry, value: Decimal, country: &str) -> DutyCalculationResult {
        calc_with(entry, value, country, DutyOptions::default())
    }

    fn calc_with(
        entry: &TariffEntry,
        value: Decimal,
        country: &str,
        options: DutyOptions,
    ) -> DutyCalculationResult {
        let request = DutyRequest::new(entry.code.clone(), value, country).with_options(options);
        calculate_duty(Some(entry), &request, default_policy(), now())
    }

    fn section_301(rate: Decimal) -> AdditiveDuty {
        AdditiveDuty {
            duty_type: "section_301".into(),
            name: "Section 301 List 3".into(),
            rate,
            rate_uk: None,
            countries: DutyCountries::Only(BTreeSet::from(["CN".to_string()])),
            label: "Section 301 List 3".into(),
        }
    }

    fn reciprocal(country: &str, rate: Decimal) -> ReciprocalTariff {
        ReciprocalTariff {
            country: country.into(),
            rate,
            label: "Reciprocal Tariff".into(),
            note: None,
            expires: None,
        }
    }

    #[test]
    fn test_invalid_value() {
        let entry = mfn_entry(dec!(6.5), "6.5%");
        for value in [dec!(-5), Decimal::ZERO] {
            let r = calc(&entry, value, "DE");
            assert_eq!(r.amount, Decimal::ZERO);
            assert_eq!(r.breakdown, vec!["Invalid declared value"]);
            assert_eq!(r.fees.mpf.amount, Decimal::ZERO);
        }
    }

    #[test]
    fn test_missing_entry() {
        let request = DutyRequest::new("0000", dec!(100), "DE");
        let r = calculate_duty(None, &request, default_policy(), now());
        assert_eq!(r.breakdown, vec!["No HTS code match found"]);
        assert_eq!(r.hts_code, "0000");
    }

    #[test]
    fn test_mfn_base_rate() {
        let r = calc(&mfn_entry(dec!(6.5), "6.5%"), dec!(1000), "DE");
        assert_eq!(r.components.len(), 1);
        assert_eq!(r.components[0].kind, "MFN");
        assert_eq!(r.components[0].label, "Most Favored Nation");
        assert_eq!(r.components[0].amount, dec!(65.00));
        assert_eq!(r.breakdown[0], "MFN Rate: 6.5%");
        assert_eq!(r.amount, dec!(94.00));
        assert_eq!(
            r.breakdown.last().map(String::as_str),
            Some("Total Duty & Fees: $94.00")
        );
    }

    #[test]
    fn test_fee_lines_in_breakdown() {
        let r = calc(&mfn_entry(dec!(6.5), "6.5%"), dec!(1000), "DE");
        assert!(r
            .breakdown
            .contains(&"Merchandise Processing Fee (0.3464%): $27.75".to_string()));
        assert!(r
            .breakdown
            .contains(&"Harbor Maintenance Fee (0.125%): $1.25".to_string()));
        assert!(r.breakdown.contains(&"Base Duty Amount: $65.00".to_string()));
    }

    #[test]
    fn test_mfn_parsed_from_text_when_not_precomputed() {
        let mut entry = mfn_entry(dec!(0), "4.4%");
        entry.mfn.ad_valorem = None;
        let r = calc(&entry, dec!(1000), "DE");
        assert_eq!(r.components[0].rate, dec!(4.4));
        assert_eq!(r.duty_only, dec!(44.00));
    }

    #[test]
    fn test_amounts_are_not_rounded() {
        let r = calc(&mfn_entry(dec!(6.5), "6.5%"), dec!(10000.50), "DE");
        assert_eq!(r.components[0].amount, dec!(650.03250));
        assert_eq!(r.duty_only, dec!(650.03250));
        assert_eq!(r.fees.mpf.amount, dec!(34.641732));
        assert_eq!(r.fees.hmf.amount, dec!(12.500625));
        assert_eq!(r.amount, dec!(697.174857));
        assert!(r.breakdown.contains(&"Base Duty Amount: $650.03".to_string()));
        assert_eq!(
            r.breakdown.last().map(String::as_str),
            Some("Total Duty & Fees: $697.17")
        );
    }

    #[test]
    fn test_overflowing_value_is_soft_error() {
        let r = calc(&mfn_entry(dec!(6.5), "6.5%"), Decimal::MAX / dec!(2), "DE");
        assert_eq!(r.amount, Decimal::ZERO);
        assert!(r.components.is_empty());
        assert_eq!(r.breakdown, vec!["Invalid declared value"]);
    }

    #[test]
    fn test_special_program_marker_noted() {
        let r = calc(&mfn_entry(Decimal::ZERO, "Free (GSP)"), dec!(1000), "DE");
        assert_eq!(r.total_rate, Decimal::ZERO);
        assert_eq!(r.breakdown[1], "  (GSP rate named in MFN text, not applied)");
    }

    #[test]
    fn test_specific_duty_note() {
        let mut entry = mfn_entry(dec!(3), "2.5¢/kg + 3%");
        entry.mfn.ad_valorem = None;
        let r = calc(&entry, dec!(1000), "DE");
        assert_eq!(r.components[0].rate, dec!(3));
        assert!(r.breakdown[1].contains("2.5¢/kg"));
    }

    #[test]
    fn test_fta_override() {
        let mut entry = mfn_entry(dec!(6.5), "6.5%");
        entry.fta_overrides.insert(
            FtaProgram::Korea,
            FtaOverride {
                indicator: "KR".into(),
                ad_val_rate: Some(Decimal::ZERO),
            },
        );
        let r = calc(&entry, dec!(1000), "KR");
        assert_eq!(r.components.len(), 1);
        assert_eq!(r.components[0].kind, "FTA");
        assert_eq!(r.components[0].label, "KOREA");
        assert_eq!(r.breakdown[0], "KOREA FTA Rate: 0%");
        assert_eq!(r.duty_only, Decimal::ZERO);
    }

    #[test]
    fn test_inactive_fta_falls_back_to_mfn() {
        let mut entry = mfn_entry(dec!(6.5), "6.5%");
        entry.fta_overrides.insert(
            FtaProgram::Korea,
            FtaOverride {
                indicator: String::new(),
                ad_val_rate: Some(Decimal::ZERO),
            },
        );
        let r = calc(&entry, dec!(1000), "KR");
        assert_eq!(r.components[0].kind, "MFN");
    }

    #[test]
    fn test_first_fta_program_wins() {
        let mut entry = mfn_entry(dec!(6.5), "6.5%");
        entry.fta_overrides = BTreeMap::from([
            (
                FtaProgram::Mexico,
                FtaOverride {
                    indicator: "MX".into(),
                    ad_val_rate: Some(dec!(2)),
                },
            ),
            (
                FtaProgram::Usmca,
                FtaOverride {
                    indicator: "S".into(),
                    ad_val_rate: Some(dec!(1)),
                },
            ),
        ]);
        let r = calc(&entry, dec!(1000), "MX");
        assert_eq!(r.components[0].label, "USMCA");
        assert_eq!(r.components[0].rate, dec!(1));
    }

    #[test]
    fn test_trade_action_beats_fta() {
        let mut entry = mfn_entry(dec!(6.5), "6.5%");
        entry.trade_action = Some(TradeAction {
            rate: dec!(35),
            countries: BTreeSet::from(["KR".to_string()]),
            label: Some("Safeguard Action".into()),
        });
        entry.fta_overrides.insert(
            FtaProgram::Korea,
            FtaOverride {
                indicator: "KR".into(),
                ad_val_rate: Some(Decimal::ZERO),
            },
        );
        let r = calc(&entry, dec!(1000), "KR");
        assert_eq!(r.components.len(), 1);
        assert_eq!(r.components[0].kind, "Trade Action");
        assert_eq!(r.components[0].label, "Safeguard Action");
        assert_eq!(r.total_rate, dec!(35));
    }

    #[test]
    fn test_ntr_suspended_beats_trade_action() {
        let mut entry = mfn_entry(dec!(6.5), "6.5%");
        entry.column2_rate = Some(dec!(35));
        entry.ntr_suspended_countries = BTreeSet::from(["RU".to_string()]);
        entry.trade_action = Some(TradeAction {
            rate: dec!(50),
            countries: BTreeSet::from(["RU".to_string()]),
            label: None,
        });
        let r = calc(&entry, dec!(1000), "RU");
        assert_eq!(r.components[0].label, "Column 2 Rate (NTR Suspended)");
        assert_eq!(r.components[0].kind, "Column 2");
        assert_eq!(r.total_rate, dec!(35));
    }

    #[test]
    fn test_trade_action_default_label() {
        let mut entry = mfn_entry(dec!(6.5), "6.5%");
        entry.trade_action = Some(TradeAction {
            rate: dec!(10),
            countries: BTreeSet::from(["BY".to_string()]),
            label: None,
        });
        let r = calc(&entry, dec!(1000), "BY");
        assert_eq!(r.breakdown[0], "Trade Action Rate: 10%");
    }

    #[test]
    fn test_column2_listed_and_legacy_countries() {
        let mut entry = mfn_entry(dec!(6.5), "6.5%");
        entry.column2_rate = Some(dec!(45));
        entry.column2_countries = BTreeSet::from(["BY".to_string()]);
        assert_eq!(calc(&entry, dec!(1000), "BY").components[0].label, "Column 2 Rate");
        assert_eq!(calc(&entry, dec!(1000), "KP").components[0].label, "Column 2 Rate");
        assert_eq!(calc(&entry, dec!(1000), "DE").components[0].kind, "MFN");
    }

    #[test]
    fn test_ntr_suspended_without_column2_rate() {
        let mut entry = mfn_entry(dec!(6.5), "6.5%");
        entry.ntr_suspended_countries = BTreeSet::from(["RU".to_string()]);
        let r = calc(&entry, dec!(1000), "RU");
        assert_eq!(r.components[0].kind, "MFN");
    }

    #[test]
    fn test_section_232_stacks_for_all() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.additive_duties.push(AdditiveDuty {
            duty_type: "section_232".into(),
            name: "Steel".into(),
            rate: dec!(25),
            rate_uk: None,
            countries: DutyCountries::All,
            label: "Section 232 Steel".into(),
        });
        let r = calc(&entry, dec!(1000), "CN");
        assert_eq!(r.components.len(), 2);
        assert_eq!(r.components[1].amount, dec!(250.00));
        assert_eq!(r.breakdown[1], "Section 232 Steel: +25%");
        assert_eq!(r.duty_only, dec!(250.00));
        assert_eq!(r.amount, dec!(279.00));
    }

    #[test]
    fn test_section_232_uk_rate() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.additive_duties.push(AdditiveDuty {
            duty_type: "section_232".into(),
            name: "Steel".into(),
            rate: dec!(50),
            rate_uk: Some(dec!(25)),
            countries: DutyCountries::All,
            label: "Section 232 Steel".into(),
        });
        let uk = calc(&entry, dec!(1000), "GB");
        assert_eq!(uk.components[1].rate, dec!(25));
        assert_eq!(uk.components[1].label, "Section 232 Steel (UK rate)");
        let de = calc(&entry, dec!(1000), "DE");
        assert_eq!(de.components[1].rate, dec!(50));
    }

    #[test]
    fn test_section_301_yields_to_reciprocal() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.additive_duties.push(section_301(dec!(25)));
        entry.reciprocal_tariffs.push(reciprocal("CN", dec!(10)));

        let off = calc(&entry, dec!(1000), "CN");
        assert!(!off.has_component("section_301"));
        assert!(off.has_component("reciprocal_tariff"));
        assert_eq!(off.total_rate, dec!(10));

        let on = calc_with(
            &entry,
            dec!(1000),
            "CN",
            DutyOptions {
                prefer_reciprocal_additive: true,
                exclude_reciprocal_tariff: false,
            },
        );
        assert!(on.has_component("section_301"));
        assert!(on.has_component("reciprocal_tariff"));
        assert_eq!(on.total_rate, dec!(35));
    }

    #[test]
    fn test_section_301_applies_without_reciprocal() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.additive_duties.push(section_301(dec!(25)));
        let r = calc(&entry, dec!(1000), "CN");
        assert!(r.has_component("section_301"));
    }

    #[test]
    fn test_expired_reciprocal_never_applies_and_frees_301() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.additive_duties.push(section_301(dec!(25)));
        let mut rt = reciprocal("CN", dec!(34));
        rt.expires = Some(Utc.with_ymd_and_hms(2025, 5, 14, 0, 0, 0).unwrap());
        entry.reciprocal_tariffs.push(rt);

        for prefer in [false, true] {
            let r = calc_with(
                &entry,
                dec!(1000),
                "CN",
                DutyOptions {
                    prefer_reciprocal_additive: prefer,
                    exclude_reciprocal_tariff: false,
                },
            );
            assert!(!r.has_component("reciprocal_tariff"));
            assert!(r.has_component("section_301"));
        }
    }

    #[test]
    fn test_hong_kong_uses_china_surcharges() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.reciprocal_tariffs.push(reciprocal("CN", dec!(10)));
        entry.additive_duties.push(section_301(dec!(25)));
        let r = calc_with(
            &entry,
            dec!(1000),
            "HK",
            DutyOptions {
                prefer_reciprocal_additive: true,
                exclude_reciprocal_tariff: false,
            },
        );
        assert_eq!(r.total_rate, dec!(35));
    }

    #[test]
    fn test_reciprocal_keyed_to_alias_origin_supersedes_section_301() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.additive_duties.push(section_301(dec!(25)));
        entry.reciprocal_tariffs.push(reciprocal("HK", dec!(10)));
        let r = calc(&entry, dec!(1000), "HK");
        assert!(!r.has_component(kinds::SECTION_301));
        assert!(r.has_component(kinds::RECIPROCAL_TARIFF));
        assert_eq!(r.total_rate, dec!(10));
    }

    #[test]
    fn test_duplicate_fentanyl_additive_skipped() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.additive_duties.push(AdditiveDuty {
            duty_type: "fentanyl".into(),
            name: "Fentanyl".into(),
            rate: dec!(20),
            rate_uk: None,
            countries: DutyCountries::Only(BTreeSet::from(["CN".to_string()])),
            label: "Fentanyl Tariff".into(),
        });
        let mut rt = reciprocal("CN", dec!(20));
        rt.label = "Fentanyl Tariff".into();
        entry.reciprocal_tariffs.push(rt);
        let r = calc(&entry, dec!(1000), "CN");
        assert_eq!(r.total_rate, dec!(20));
        assert_eq!(r.components[1].kind, "fentanyl");
    }

    #[test]
    fn test_exclude_reciprocal() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.reciprocal_tariffs.push(reciprocal("CN", dec!(10)));
        entry.ieepa_tariffs.push(IeepaTariff {
            country: "CN".into(),
            rate: dec!(20),
            label: "IEEPA China".into(),
            note: None,
            legal_status: None,
        });
        let r = calc_with(
            &entry,
            dec!(1000),
            "CN",
            DutyOptions {
                prefer_reciprocal_additive: false,
                exclude_reciprocal_tariff: true,
            },
        );
        assert_eq!(r.components.len(), 1);
        assert_eq!(r.total_rate, Decimal::ZERO);
    }

    #[test]
    fn test_reciprocal_note_and_usmca_line() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        let mut rt = reciprocal("CA", dec!(25));
        rt.note = Some("USMCA-origin goods exempt".into());
        entry.reciprocal_tariffs.push(rt);
        let r = calc(&entry, dec!(1000), "CA");
        assert_eq!(r.total_rate, dec!(25));
        assert_eq!(r.breakdown[1], "Reciprocal Tariff: +25%");
        assert_eq!(r.breakdown[2], "  (USMCA-origin goods exempt)");
        assert!(r.breakdown[3].contains("USMCA-origin goods may qualify"));
    }

    #[test]
    fn test_ieepa_yields_to_section_232() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.additive_duties.push(AdditiveDuty {
            duty_type: "section_232".into(),
            name: "Aluminum".into(),
            rate: dec!(50),
            rate_uk: None,
            countries: DutyCountries::All,
            label: "Section 232 Aluminum".into(),
        });
        entry.ieepa_tariffs.push(IeepaTariff {
            country: "CA".into(),
            rate: dec!(35),
            label: "IEEPA Canada".into(),
            note: None,
            legal_status: None,
        });
        let r = calc(&entry, dec!(1000), "CA");
        assert!(!r.has_component("ieepa_tariff"));
        assert!(r
            .breakdown
            .contains(&"IEEPA Canada: Not applied (Section 232 takes precedence)".to_string()));
        assert_eq!(r.total_rate, dec!(50));
    }

    #[test]
    fn test_ieepa_applies_with_notes() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.ieepa_tariffs.push(IeepaTariff {
            country: "MX".into(),
            rate: dec!(25),
            label: "IEEPA Mexico".into(),
            note: Some("Non-USMCA goods".into()),
            legal_status: Some("Under litigation".into()),
        });
        let r = calc(&entry, dec!(1000), "MX");
        assert!(r.has_component("ieepa_tariff"));
        assert!(r.breakdown.contains(&"  (Non-USMCA goods)".to_string()));
        assert!(r.breakdown.contains(&"  (Under litigation)".to_string()));
    }

    #[test]
    fn test_legacy_section_301_text() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.legacy_additional_duty = Some("Section 301 List 3: 25%".into());
        let r = calc(&entry, dec!(1000), "CN");
        assert_eq!(r.components[1].kind, "section_301");
        assert_eq!(r.breakdown[1], "Section 301: +25%");

        entry.reciprocal_tariffs.push(reciprocal("CN", dec!(10)));
        let superseded = calc(&entry, dec!(1000), "CN");
        assert!(!superseded.has_component("section_301"));
    }

    #[test]
    fn test_legacy_skipped_when_structured_301_present() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.additive_duties.push(section_301(dec!(25)));
        entry.legacy_additional_duty = Some("Section 301: 25%".into());
        let r = calc(&entry, dec!(1000), "CN");
        assert_eq!(r.total_rate, dec!(25));
        assert_eq!(r.components.len(), 2);
    }

    #[test]
    fn test_legacy_canadian_surcharge() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.legacy_additional_duty = Some("Softwood lumber 14.4%".into());
        let r = calc(&entry, dec!(1000), "CA");
        assert_eq!(r.components[1].label, "Canadian Lumber Tariff");
        assert_eq!(r.components[1].kind, "Additional Duty");
        let de = calc(&entry, dec!(1000), "DE");
        assert_eq!(de.components.len(), 1);
    }

    #[test]
    fn test_legacy_text_without_rate_ignored() {
        let mut entry = mfn_entry(Decimal::ZERO, "Free");
        entry.legacy_additional_duty = Some("Section 301 duties may apply".into());
        let r = calc(&entry, dec!(1000), "CN");
        assert_eq!(r.components.len(), 1);
    }

    #[test]
    fn test_chapter99_short_circuit() {
        let mut entry = mfn_entry(dec!(6.5), "6.5%");
        entry.code = "99030110".into();
        entry.chapter99 = Some(SpecialProvision {
            additional_rate: dec!(25),
            duty_type: Some("IEEPA Canada".into()),
            duty_text: None,
        });
        entry.additive_duties.push(AdditiveDuty {
            duty_type: "section_232".into(),
            name: "Steel".into(),
            rate: dec!(25),
            rate_uk: None,
            countries: DutyCountries::All,
            label: "Section 232 Steel".into(),
        });

        let r = calc(&entry, dec!(1000), "CA");
        assert_eq!(r.components.len(), 1);
        assert_eq!(r.components[0].kind, "Special Provision");
        assert_eq!(r.components[0].label, "IEEPA Canada");
        assert_eq!(r.breakdown[0], "IEEPA Canada: 25%");
        assert_eq!(r.breakdown[1], "Additional duty of 25%");
        assert_eq!(r.amount, dec!(279.00));

        let mx = calc(&entry, dec!(1000), "MX");
        assert_eq!(mx.components[0].kind, "MFN");
        assert_eq!(mx.total_rate, dec!(31.5));
    }

    #[test]
    fn test_result_echoes_entry_metadata() {
        let mut entry = mfn_entry(dec!(6.5), "6.5%");
        entry.effective_date = Some("7/1/20".into());
        let r = calc(&entry, dec!(1000), "DE");
        assert_eq!(r.hts_code, "85011040");
        assert_eq!(r.description, "Electric motors");
        assert_eq!(r.effective_date, "7/1/2020");
        assert_eq!(r.expiration_date, "");
    }
}
