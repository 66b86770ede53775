use dutycalc_core::duty::outcome::{format_money, format_rate};
use dutycalc_core::duty::{DutyCalculationResult, DutyRequest};
use dutycalc_core::model::{DutyCountries, TariffEntry};
use std::collections::BTreeSet;

pub fn print_result(request: &DutyRequest, result: &DutyCalculationResult) {
    if result.components.is_empty() {
        println!("=== {} ===\n", request.code);
        for line in &result.breakdown {
            println!("  {line}");
        }
        return;
    }

    println!("=== {} {} ===\n", result.hts_code, result.description);
    println!(
        "  Origin: {}   Declared value: {}",
        request.country,
        format_money(request.declared_value)
    );
    if !result.effective_date.is_empty() || !result.expiration_date.is_empty() {
        println!(
            "  Effective: {}   Expires: {}",
            or_dash(&result.effective_date),
            or_dash(&result.expiration_date)
        );
    }
    println!();

    let width = result
        .components
        .iter()
        .map(|c| c.label.len())
        .max()
        .unwrap_or(10)
        .max("Component".len());

    println!(
        "  {:<width$}  {:<18}  {:>8}  {:>12}",
        "Component", "Type", "Rate", "Amount"
    );
    println!("  {}", "-".repeat(width + 18 + 8 + 12 + 6));
    for c in &result.components {
        println!(
            "  {:<width$}  {:<18}  {:>8}  {:>12}",
            c.label,
            c.kind,
            format!("{}%", format_rate(c.rate)),
            format_money(c.amount)
        );
    }
    println!("  {}", "-".repeat(width + 18 + 8 + 12 + 6));
    println!(
        "  {:<width$}  {:<18}  {:>8}  {:>12}",
        "Duty",
        "",
        format!("{}%", format_rate(result.total_rate)),
        format_money(result.duty_only)
    );
    println!(
        "  {:<width$}  {:<18}  {:>8}  {:>12}",
        "MPF",
        "",
        format!("{}%", result.fees.mpf.rate),
        format_money(result.fees.mpf.amount)
    );
    println!(
        "  {:<width$}  {:<18}  {:>8}  {:>12}",
        "HMF",
        "",
        format!("{}%", result.fees.hmf.rate),
        format_money(result.fees.hmf.amount)
    );
    println!(
        "  {:<width$}  {:<18}  {:>8}  {:>12}\n",
        "Total",
        "",
        "",
        format_money(result.amount)
    );

    println!("  Breakdown:");
    for line in &result.breakdown {
        println!("    {line}");
    }
}

pub fn print_entry(entry: &TariffEntry) {
    println!("=== {} ===\n", entry.code);
    println!("  {}\n", entry.description);

    let mfn = match (&entry.mfn.text, entry.mfn.ad_valorem) {
        (Some(text), _) => text.clone(),
        (None, Some(rate)) => format!("{}%", format_rate(rate)),
        (None, None) => "-".to_string(),
    };
    println!("  MFN rate:        {mfn}");
    if let Some(col2) = entry.column2_rate {
        println!(
            "  Column 2 rate:   {}% ({})",
            format_rate(col2),
            join(&entry.column2_countries)
        );
    }
    if !entry.ntr_suspended_countries.is_empty() {
        println!("  NTR suspended:   {}", join(&entry.ntr_suspended_countries));
    }
    if let Some(ref action) = entry.trade_action {
        println!(
            "  Trade action:    {}% {} ({})",
            format_rate(action.rate),
            action.label.as_deref().unwrap_or(""),
            join(&action.countries)
        );
    }
    if let Some(ref provision) = entry.chapter99 {
        println!(
            "  Chapter 99:      {}% {}",
            format_rate(provision.additional_rate),
            provision.duty_type.as_deref().unwrap_or("")
        );
    }

    if !entry.fta_overrides.is_empty() {
        println!("\n  FTA programs:");
        for (program, over) in &entry.fta_overrides {
            let rate = over
                .ad_val_rate
                .map(|r| format!("{}%", format_rate(r)))
                .unwrap_or_else(|| "-".into());
            let status = if over.is_active() { "" } else { " (inactive)" };
            println!("    {:<14} {:>8}  [{}]{}", program.to_string(), rate, over.indicator, status);
        }
    }

    if !entry.additive_duties.is_empty() {
        println!("\n  Additive duties:");
        for duty in &entry.additive_duties {
            let countries = match duty.countries {
                DutyCountries::All => "all".to_string(),
                DutyCountries::Only(ref set) => join(set),
            };
            println!(
                "    {:<32} {:>6}%  {} ({})",
                duty.label,
                format_rate(duty.rate),
                duty.duty_type,
                countries
            );
        }
    }

    if !entry.reciprocal_tariffs.is_empty() {
        println!("\n  Reciprocal tariffs:");
        for rt in &entry.reciprocal_tariffs {
            let expires = rt
                .expires
                .map(|e| format!(" until {}", e.format("%Y-%m-%d")))
                .unwrap_or_default();
            println!(
                "    {:<32} {:>6}%  {}{}",
                rt.label,
                format_rate(rt.rate),
                rt.country,
                expires
            );
        }
    }

    if !entry.ieepa_tariffs.is_empty() {
        println!("\n  IEEPA tariffs:");
        for t in &entry.ieepa_tariffs {
            println!("    {:<32} {:>6}%  {}", t.label, format_rate(t.rate), t.country);
        }
    }

    if let Some(ref text) = entry.legacy_additional_duty {
        println!("\n  Additional duty: {text}");
    }
    println!();
}

fn join(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        return "-".into();
    }
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}
