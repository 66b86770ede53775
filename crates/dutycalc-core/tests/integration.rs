//! Integration tests for estimate_duty() and compare_duty() against the
//! sample dataset shipped in `data/`.
//!
//! The store is loaded through the public DatasetSource implementations and
//! the embedded default policy, the same way the CLI wires them. Estimates are
//! taken at a fixed instant so the sample's reciprocal-tariff expiries stay put.

use dutycalc_core::dataset::{DatasetSource, JsonFileSource, JsonStrSource};
use dutycalc_core::duty::{DutyOptions, DutyRequest};
use dutycalc_core::error::DutyError;
use dutycalc_core::policy::builtin::default_policy;
use dutycalc_core::store::TariffStore;
use chrono::{DateTime, TimeZone, Utc};
use dutycalc_core::{compare_duty, compare_duty_at, estimate_duty, estimate_duty_at};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::PathBuf;

const SAMPLE: &str = include_str!("../../../data/sample-tariffs.json");

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn store() -> TariffStore {
    let store = TariffStore::default();
    store.initialize(&JsonStrSource::new(SAMPLE)).unwrap();
    store
}

fn estimate(code: &str, value: Decimal, country: &str) -> dutycalc_core::duty::DutyCalculationResult {
    estimate_with(code, value, country, DutyOptions::default())
}

fn estimate_with(
    code: &str,
    value: Decimal,
    country: &str,
    options: DutyOptions,
) -> dutycalc_core::duty::DutyCalculationResult {
    let request = DutyRequest::new(code, value, country).with_options(options);
    estimate_duty_at(&store(), default_policy(), &request, as_of()).unwrap()
}

fn kinds(result: &dutycalc_core::duty::DutyCalculationResult) -> Vec<&str> {
    result.components.iter().map(|c| c.kind.as_str()).collect()
}

const PREFER: DutyOptions = DutyOptions {
    prefer_reciprocal_additive: true,
    exclude_reciprocal_tariff: false,
};

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------
#[test]
fn store_loads_sample_from_file() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/sample-tariffs.json");
    let source = JsonFileSource::new(&path);
    let store = TariffStore::default();
    store.initialize(&source).unwrap();
    assert_eq!(store.len(), 8);
    assert_eq!(store.hts_revision().unwrap().as_deref(), Some("2025 Revision 17"));
    assert!(source.source_name().ends_with("sample-tariffs.json"));
}

#[test]
fn lookup_accepts_partial_and_punctuated_codes() {
    let store = store();
    assert!(store.find_by_code("8501.10.40").unwrap().is_some());
    assert!(store.find_by_code("990301100").unwrap().is_some());
    assert!(store.find_by_code("\u{feff}72083600").unwrap().is_some());
}

#[test]
fn bom_prefixed_field_name_is_indexed() {
    let entry = store().find_by_code("99030110").unwrap().unwrap();
    assert!(entry.chapter99.is_some());
}

#[test]
fn estimate_without_dataset_is_an_error() {
    let request = DutyRequest::new("85011040", dec!(1000), "DE");
    let err = estimate_duty(&TariffStore::default(), default_policy(), &request).unwrap_err();
    assert!(matches!(err, DutyError::DataUnavailable(_)));
}

// ---------------------------------------------------------------------------
// Soft results
// ---------------------------------------------------------------------------
#[test]
fn negative_value_is_a_zero_result() {
    let r = estimate("85011040", dec!(-5), "DE");
    assert_eq!(r.amount, Decimal::ZERO);
    assert!(!r.breakdown.is_empty());
    assert_eq!(r.breakdown[0], "Invalid declared value");
}

#[test]
fn unknown_code_is_a_zero_result() {
    let r = estimate("0101.21", dec!(1000), "DE");
    assert_eq!(r.amount, Decimal::ZERO);
    assert_eq!(r.breakdown, vec!["No HTS code match found"]);
}

// ---------------------------------------------------------------------------
// Base rates
// ---------------------------------------------------------------------------
#[test]
fn mfn_rate_for_non_preference_country() {
    let r = estimate("85011040", dec!(1000), "DE");
    assert_eq!(kinds(&r), vec!["MFN"]);
    assert_eq!(r.duty_only, dec!(40.00));
    assert_eq!(r.fees.mpf.amount, dec!(27.75));
    assert_eq!(r.fees.hmf.amount, dec!(1.25));
    assert_eq!(r.amount, dec!(69.00));
    assert_eq!(r.effective_date, "7/1/2020");
    assert_eq!(r.expiration_date, "12/31/1999");
}

#[test]
fn fta_partner_gets_preferential_rate() {
    let r = estimate("85011040", dec!(1000), "KR");
    assert_eq!(kinds(&r), vec!["FTA"]);
    assert_eq!(r.breakdown[0], "KOREA FTA Rate: 0%");
    assert_eq!(r.amount, dec!(29.00));
}

#[test]
fn listed_column2_country() {
    let r = estimate("85011040", dec!(1000), "CU");
    assert_eq!(r.components[0].label, "Column 2 Rate");
    assert_eq!(r.total_rate, dec!(35));
}

#[test]
fn ntr_suspended_country_pays_column2() {
    let r = estimate("61091000", dec!(1000), "RU");
    assert_eq!(r.components.len(), 1);
    assert_eq!(r.components[0].label, "Column 2 Rate (NTR Suspended)");
    assert_eq!(r.total_rate, dec!(90));
}

#[test]
fn trade_action_country() {
    let r = estimate("04061008", dec!(1000), "RU");
    assert_eq!(kinds(&r), vec!["Trade Action"]);
    assert_eq!(r.breakdown[0], "Russia Trade Action: 35%");
    let cl = estimate("04061008", dec!(1000), "CL");
    assert_eq!(kinds(&cl), vec!["FTA"]);
}

#[test]
fn specific_duty_is_noted_not_charged() {
    let r = estimate("20091100", dec!(1000), "DE");
    assert_eq!(r.breakdown[0], "MFN Rate: 7.85¢/liter");
    assert!(r.breakdown[1].contains("7.85¢/liter"));
    assert_eq!(r.duty_only, Decimal::ZERO);
}

// ---------------------------------------------------------------------------
// Surcharges
// ---------------------------------------------------------------------------
#[test]
fn china_reciprocal_supersedes_section_301_by_default() {
    let r = estimate("85011040", dec!(1000), "CN");
    // MFN 4% + truce reciprocal 10%. The expired 34% rate and the fentanyl
    // duplicate are not charged.
    assert_eq!(kinds(&r), vec!["MFN", "reciprocal_tariff"]);
    assert_eq!(r.total_rate, dec!(14));
    assert_eq!(r.amount, dec!(169.00));
    assert!(r.breakdown.contains(&"  (Truce rate)".to_string()));
}

#[test]
fn china_with_preference_layers_section_301() {
    let r = estimate_with("85011040", dec!(1000), "CN", PREFER);
    assert_eq!(kinds(&r), vec!["MFN", "section_301", "reciprocal_tariff"]);
    assert_eq!(r.total_rate, dec!(39));
    assert_eq!(r.amount, dec!(419.00));
}

#[test]
fn section_301_returns_once_truce_rate_expires() {
    let request = DutyRequest::new("85011040", dec!(1000), "CN");
    let later = Utc.with_ymd_and_hms(2036, 1, 1, 0, 0, 0).unwrap();
    let r = estimate_duty_at(&store(), default_policy(), &request, later).unwrap();
    assert_eq!(kinds(&r), vec!["MFN", "section_301"]);
    assert_eq!(r.amount, dec!(319.00));
}

#[test]
fn macau_follows_china_surcharges() {
    let r = estimate_with("85011040", dec!(1000), "MO", PREFER);
    assert_eq!(r.total_rate, dec!(39));
}

#[test]
fn section_232_with_uk_rate() {
    let de = estimate("72083600", dec!(1000), "DE");
    assert_eq!(de.total_rate, dec!(50));
    let gb = estimate("72083600", dec!(1000), "GB");
    assert_eq!(gb.total_rate, dec!(25));
    assert_eq!(gb.components[1].label, "Section 232 Steel (50%) (UK rate)");
}

#[test]
fn ieepa_does_not_stack_on_section_232() {
    let r = estimate("72083600", dec!(1000), "CA");
    assert!(!r.has_component("ieepa_tariff"));
    assert!(r
        .breakdown
        .contains(&"IEEPA Canada: Not applied (Section 232 takes precedence)".to_string()));
    assert_eq!(r.components[0].label, "USMCA");
}

#[test]
fn legacy_section_301_text_for_china() {
    let r = estimate("61091000", dec!(1000), "CN");
    assert_eq!(kinds(&r), vec!["MFN", "section_301"]);
    assert_eq!(r.total_rate, dec!(24));
    assert_eq!(r.breakdown[1], "Section 301: +7.5%");
}

#[test]
fn canadian_lumber_with_usmca_note() {
    let r = estimate("44071100", dec!(1000), "CA");
    assert_eq!(kinds(&r), vec!["MFN", "Additional Duty", "reciprocal_tariff"]);
    assert_eq!(r.total_rate, dec!(39.4));
    assert!(r.breakdown.iter().any(|l| l.contains("USMCA-origin goods may qualify")));
    // 394.00 + 27.75 + 1.25
    assert_eq!(r.amount, dec!(423.00));
}

#[test]
fn excluding_reciprocal_tariffs() {
    let r = estimate_with(
        "44071100",
        dec!(1000),
        "CA",
        DutyOptions {
            prefer_reciprocal_additive: false,
            exclude_reciprocal_tariff: true,
        },
    );
    assert_eq!(kinds(&r), vec!["MFN", "Additional Duty"]);
}

// ---------------------------------------------------------------------------
// Chapter 99
// ---------------------------------------------------------------------------
#[test]
fn chapter99_applies_only_to_its_country() {
    let ca = estimate("9903.01.10", dec!(1000), "CA");
    assert_eq!(kinds(&ca), vec!["Special Provision"]);
    assert_eq!(
        ca.breakdown[1],
        "The duty provided in the applicable subheading + 35%"
    );
    assert_eq!(ca.amount, dec!(379.00));

    let de = estimate("9903.01.10", dec!(1000), "DE");
    assert_eq!(kinds(&de), vec!["MFN"]);
    assert_eq!(de.duty_only, Decimal::ZERO);
}

#[test]
fn chapter99_aluminum_mexico() {
    let mx = estimate("99038507", dec!(1000), "MX");
    assert_eq!(mx.components[0].label, "Chapter 99 Additional Duty");
    assert_eq!(mx.breakdown[0], "Special Provision: 25%");
    let ca = estimate("99038507", dec!(1000), "CA");
    assert_eq!(kinds(&ca), vec!["MFN"]);
}

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------
#[test]
fn processing_fee_bounds() {
    assert_eq!(estimate("85011040", dec!(1000), "KR").fees.mpf.amount, dec!(27.75));
    assert_eq!(estimate("85011040", dec!(50000), "KR").fees.mpf.amount, dec!(173.20));
    assert_eq!(estimate("85011040", dec!(500000), "KR").fees.mpf.amount, dec!(538.40));
    assert_eq!(estimate("85011040", dec!(500000), "KR").fees.hmf.amount, dec!(625.00));
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------
#[test]
fn compare_toggles_for_china() {
    let request = DutyRequest::new("85011040", dec!(1000), "CN");
    let cmp = compare_duty_at(&store(), default_policy(), &request, as_of())
        .unwrap()
        .unwrap();
    assert_eq!(cmp.toggle_off.with_rt, dec!(169.00));
    assert_eq!(cmp.toggle_on.with_rt, dec!(419.00));
    assert_eq!(cmp.toggle_off.rt_amount, dec!(100.00));
    assert_eq!(cmp.toggle_on.section_301_amount, dec!(250.00));
}

#[test]
fn compare_unknown_code() {
    let request = DutyRequest::new("00000001", dec!(1000), "CN");
    assert!(compare_duty(&store(), default_policy(), &request)
        .unwrap()
        .is_none());
}
