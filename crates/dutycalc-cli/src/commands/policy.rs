use dutycalc_core::error::DutyError;
use dutycalc_core::policy::builtin;
use std::path::Path;

use super::Context;

pub fn list() -> Result<(), DutyError> {
    println!("Available built-in policies:\n");
    for name in builtin::PRESETS {
        let p = builtin::load_preset(name)?;
        println!("  {:<8} {} (v{})", name, p.name, p.version);
        if let Some(ref desc) = p.description {
            println!("           {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn show(ctx: &Context) -> Result<(), DutyError> {
    match ctx.policy {
        Some(_) => {
            let p = ctx.load_policy()?;
            println!("{}", serde_json::to_string_pretty(&p)?);
        }
        None => print!("{}", builtin::default_policy_json()),
    }
    Ok(())
}

pub fn schema() -> Result<(), DutyError> {
    print!(
        r#"JSON Policy Schema
==================

A policy file holds the country tables the duty engine consults when it
picks a base rate and layers surcharges. Pass it with `--policy FILE`
(or DUTYCALC_POLICY); without one the built-in policy is used.

Top-level fields:
  name          (string, required)  Human-readable name of the policy
  version       (string, required)  Version identifier (e.g., "2025.1")
  description   (string, optional)  What this policy covers
  fta_programs  (object, required)  Map of country code -> ordered list of
                                    FTA program keys. The first program with
                                    an active indicator and a rate on the
                                    tariff record wins.
                                    Keys: usmca, nafta_canada, nafta_mexico,
                                    mexico, korea, australia, chile, colombia,
                                    panama, peru, singapore, morocco, jordan,
                                    israel_fta, bahrain, oman, japan
  special_provisions
                (array, optional)   Chapter 99 applicability rules (see below).
                                    The first rule matching a record decides.
  legacy_column2_countries
                (array, optional)   Countries charged the column 2 rate even
                                    when the record lists no column 2 countries.
  usmca_partners
                (array, optional)   Countries that get the USMCA exemption note.
  usmca_exemption_marker
                (string, optional)  Note text that signals the exemption.
                                    Default: "USMCA-origin goods exempt"
  legacy_section_301_country
                (string, optional)  Country whose free-text duty note may carry
                                    a Section 301 rate.
  legacy_partner_surcharges
                (array, optional)   {{ "country", "label" }} pairs charging the
                                    free-text duty note under a fixed label.
  surcharge_country_aliases
                (object, optional)  Country -> country used when matching
                                    surcharges (e.g. "HK": "CN").
  uk_countries  (array, optional)   Countries that get the Section 232 UK rate.

Each rule in "special_provisions":
  code          (string)            Exact 8-digit code
  code_prefix   (string)            Code prefix (one of code/code_prefix required)
  description_contains
                (array, optional)   Words that must all appear in the record's
                                    description (case-insensitive)
  country       (string, required)  Country the provision applies to
  note          (string, optional)  Explanation

Country codes are two upper-case letters and compared exactly.

Example:
{{
  "name": "My policy",
  "version": "1.0",
  "fta_programs": {{
    "KR": ["korea"],
    "MX": ["usmca", "mexico"]
  }},
  "special_provisions": [
    {{ "code": "99030110", "country": "CA" }},
    {{ "code_prefix": "990385", "description_contains": ["aluminum", "mexico"], "country": "MX" }}
  ],
  "legacy_column2_countries": ["CU", "KP"],
  "surcharge_country_aliases": {{ "HK": "CN" }}
}}
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), DutyError> {
    let p = dutycalc_core::policy::load_policy(file)?;

    println!("Policy '{}' (v{}) is valid.", p.name, p.version);
    println!("  FTA countries: {}", p.fta_programs.len());
    println!("  Chapter 99 rules: {}", p.special_provisions.len());

    let mut warnings = Vec::new();
    for partner in &p.usmca_partners {
        if !p.fta_programs.contains_key(partner) {
            warnings.push(format!("USMCA partner '{partner}' has no FTA programs"));
        }
    }
    for (i, rule) in p.special_provisions.iter().enumerate() {
        if rule.code.is_none() && rule.description_contains.is_empty() {
            warnings.push(format!(
                "special_provisions[{i}] matches every code under prefix '{}'",
                rule.code_prefix.as_deref().unwrap_or_default()
            ));
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
