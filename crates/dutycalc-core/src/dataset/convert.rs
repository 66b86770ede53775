use super::schema::{RawAdditiveDuty, RawCountries, RawTariffEntry};
use crate::model::{
    AdditiveDuty, DutyCountries, FtaOverride, FtaProgram, IeepaTariff, MfnRate, ReciprocalTariff,
    SpecialProvision, TariffEntry, TradeAction,
};
use crate::parsing::{decimal_from_json, normalize_code, parse_instant};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Raw code text of a record (codes occasionally arrive as JSON numbers).
pub fn raw_code_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Convert a published record into a typed entry with a canonical code.
///
/// Rates stored as fractions (MFN, column 2, FTA) are scaled to percentage
/// points. Unparseable numbers are logged and treated as absent.
pub fn convert_entry(raw: RawTariffEntry) -> TariffEntry {
    let code = normalize_code(&raw_code_text(&raw.hts8));

    let mfn = MfnRate {
        ad_valorem: fraction_field(&code, "mfn_ad_val_rate", raw.mfn_ad_val_rate.as_ref()),
        text: raw.mfn_text_rate.filter(|t| !t.trim().is_empty()),
    };

    // A zero column 2 rate is treated as no column 2 rate at all.
    let column2_rate = fraction_field(&code, "col2_ad_val_rate", raw.col2_ad_val_rate.as_ref())
        .filter(|r| !r.is_zero());

    let trade_action = if raw.has_special_trade_action.unwrap_or(false) {
        Some(TradeAction {
            rate: percent_field(&code, "trade_action_rate", raw.trade_action_rate.as_ref())
                .unwrap_or(Decimal::ZERO),
            countries: country_set(raw.trade_action_countries),
            label: raw.trade_action_label,
        })
    } else {
        None
    };

    let chapter99 = if raw.is_chapter_99.unwrap_or(false) {
        percent_field(
            &code,
            "chapter_99_additional_rate",
            raw.chapter_99_additional_rate.as_ref(),
        )
        .map(|additional_rate| SpecialProvision {
            additional_rate,
            duty_type: raw.chapter_99_type,
            duty_text: raw.chapter_99_duty_text,
        })
    } else {
        None
    };

    let additive_duties = raw
        .additive_duties
        .unwrap_or_default()
        .into_iter()
        .map(|d| convert_additive(&code, d))
        .collect();

    let reciprocal_tariffs = raw
        .reciprocal_tariffs
        .unwrap_or_default()
        .into_iter()
        .filter(|rt| has_country(&code, "reciprocal_tariffs", &rt.country))
        .map(|rt| {
            let expires = rt.expires.as_deref().and_then(|text| {
                let parsed = parse_instant(text);
                if parsed.is_none() {
                    warn!(code = %code, expires = text, "unparseable expiry, tariff treated as open-ended");
                }
                parsed
            });
            ReciprocalTariff {
                rate: percent_field(&code, "reciprocal_tariffs.rate", rt.rate.as_ref())
                    .unwrap_or(Decimal::ZERO),
                country: rt.country,
                label: rt.label,
                note: rt.note.filter(|n| !n.trim().is_empty()),
                expires,
            }
        })
        .collect();

    let ieepa_tariffs = raw
        .ieepa_tariffs
        .unwrap_or_default()
        .into_iter()
        .filter(|t| has_country(&code, "ieepa_tariffs", &t.country))
        .map(|t| IeepaTariff {
            rate: percent_field(&code, "ieepa_tariffs.rate", t.rate.as_ref())
                .unwrap_or(Decimal::ZERO),
            country: t.country,
            label: t.label,
            note: t.note.filter(|n| !n.trim().is_empty()),
            legal_status: t.legal_status.filter(|s| !s.trim().is_empty()),
        })
        .collect();

    let fta_overrides = fta_overrides(&code, &raw.extra);

    TariffEntry {
        description: raw.brief_description.unwrap_or_default(),
        mfn,
        column2_rate,
        ntr_suspended_countries: country_set(raw.ntr_suspended_countries),
        column2_countries: country_set(raw.column2_countries),
        trade_action,
        fta_overrides,
        additive_duties,
        reciprocal_tariffs,
        ieepa_tariffs,
        legacy_additional_duty: raw.additional_duty.filter(|t| !t.trim().is_empty()),
        chapter99,
        effective_date: raw.begin_effect_date,
        expiration_date: raw.end_effective_date,
        code,
    }
}

fn convert_additive(code: &str, raw: RawAdditiveDuty) -> AdditiveDuty {
    let countries = match raw.countries {
        Some(RawCountries::Keyword(k)) if k.eq_ignore_ascii_case("all") => DutyCountries::All,
        Some(RawCountries::Keyword(k)) => DutyCountries::Only(BTreeSet::from([k])),
        Some(RawCountries::List(list)) => DutyCountries::Only(list.into_iter().collect()),
        None => {
            warn!(code = %code, label = %raw.label, "additive duty without countries never applies");
            DutyCountries::Only(BTreeSet::new())
        }
    };
    AdditiveDuty {
        rate: percent_field(code, "additive_duties.rate", raw.rate.as_ref())
            .unwrap_or(Decimal::ZERO),
        rate_uk: percent_field(code, "additive_duties.rate_uk", raw.rate_uk.as_ref()),
        duty_type: raw.duty_type,
        name: raw.name,
        countries,
        label: raw.label,
    }
}

/// Collect `<program>_indicator` / `<program>_ad_val_rate` pairs into typed overrides.
fn fta_overrides(code: &str, extra: &BTreeMap<String, Value>) -> BTreeMap<FtaProgram, FtaOverride> {
    let mut overrides = BTreeMap::new();
    for program in FtaProgram::ALL {
        let prefix = program.field_prefix();
        let indicator = extra.get(&format!("{prefix}_indicator"));
        let rate_field = format!("{prefix}_ad_val_rate");
        let rate = extra.get(&rate_field);
        if indicator.is_none() && rate.is_none() {
            continue;
        }
        overrides.insert(
            program,
            FtaOverride {
                indicator: indicator.map(indicator_text).unwrap_or_default(),
                ad_val_rate: fraction_field(code, &rate_field, rate),
            },
        );
    }
    overrides
}

fn indicator_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Bool(true) => "Y".to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn has_country(code: &str, field: &str, country: &str) -> bool {
    if country.trim().is_empty() {
        warn!(code = %code, field, "tariff without country dropped");
        return false;
    }
    true
}

fn country_set(list: Option<Vec<String>>) -> BTreeSet<String> {
    list.unwrap_or_default().into_iter().collect()
}

fn percent_field(code: &str, field: &str, value: Option<&Value>) -> Option<Decimal> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    let parsed = decimal_from_json(value);
    if parsed.is_none() {
        warn!(code = %code, field, value = %value, "unparseable rate ignored");
    }
    parsed
}

fn fraction_field(code: &str, field: &str, value: Option<&Value>) -> Option<Decimal> {
    let fraction = percent_field(code, field, value)?;
    let percent = fraction.checked_mul(HUNDRED);
    if percent.is_none() {
        warn!(code = %code, field, "rate out of range ignored");
    }
    percent
}
