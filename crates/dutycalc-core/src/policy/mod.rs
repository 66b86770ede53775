pub mod builtin;
pub mod schema;

use crate::error::DutyError;
use schema::PolicyDef;
use std::collections::BTreeSet;
use std::path::Path;

/// Load a rate policy from a JSON file.
pub fn load_policy(path: &Path) -> Result<PolicyDef, DutyError> {
    let content = std::fs::read_to_string(path).map_err(|e| DutyError::PolicyLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_policy(&content, path)
}

/// Parse a rate policy from a JSON string read from `source`.
pub fn parse_policy(json: &str, source: &Path) -> Result<PolicyDef, DutyError> {
    let policy: PolicyDef = serde_json::from_str(json).map_err(|e| DutyError::PolicyLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_policy(&policy)?;
    Ok(policy)
}

/// Parse a rate policy from a JSON string (no file path context).
pub fn parse_policy_str(json: &str) -> Result<PolicyDef, DutyError> {
    let policy: PolicyDef = serde_json::from_str(json).map_err(DutyError::Json)?;
    validate_policy(&policy)?;
    Ok(policy)
}

fn is_country_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase())
}

fn check_country(code: &str, field: &str) -> Result<(), DutyError> {
    if !is_country_code(code) {
        return Err(DutyError::PolicyInvalid(format!(
            "{field}: '{code}' is not a two-letter upper-case country code"
        )));
    }
    Ok(())
}

/// Validate that a policy is well-formed.
pub fn validate_policy(policy: &PolicyDef) -> Result<(), DutyError> {
    if policy.name.trim().is_empty() {
        return Err(DutyError::PolicyInvalid("name must not be empty".into()));
    }
    if policy.version.trim().is_empty() {
        return Err(DutyError::PolicyInvalid("version must not be empty".into()));
    }

    for (country, programs) in &policy.fta_programs {
        check_country(country, "fta_programs")?;
        if programs.is_empty() {
            return Err(DutyError::PolicyInvalid(format!(
                "fta_programs: country '{country}' lists no programs"
            )));
        }
        let unique: BTreeSet<_> = programs.iter().collect();
        if unique.len() != programs.len() {
            return Err(DutyError::PolicyInvalid(format!(
                "fta_programs: country '{country}' lists a program twice"
            )));
        }
    }

    for (i, rule) in policy.special_provisions.iter().enumerate() {
        if rule.code.is_none() && rule.code_prefix.is_none() {
            return Err(DutyError::PolicyInvalid(format!(
                "special_provisions[{i}]: needs a code or a code_prefix"
            )));
        }
        let code_ok = |c: &String| !c.is_empty() && c.len() <= 8 && c.chars().all(|d| d.is_ascii_digit());
        if rule.code.as_ref().is_some_and(|c| !code_ok(c) || c.len() != 8)
            || rule.code_prefix.as_ref().is_some_and(|c| !code_ok(c))
        {
            return Err(DutyError::PolicyInvalid(format!(
                "special_provisions[{i}]: codes must be digits (exact codes 8 long)"
            )));
        }
        check_country(&rule.country, &format!("special_provisions[{i}]"))?;
    }

    for c in &policy.legacy_column2_countries {
        check_country(c, "legacy_column2_countries")?;
    }
    for c in &policy.usmca_partners {
        check_country(c, "usmca_partners")?;
    }
    if !policy.usmca_partners.is_empty() && policy.usmca_exemption_marker.trim().is_empty() {
        return Err(DutyError::PolicyInvalid(
            "usmca_exemption_marker must not be empty".into(),
        ));
    }
    if let Some(ref c) = policy.legacy_section_301_country {
        check_country(c, "legacy_section_301_country")?;
    }
    for partner in &policy.legacy_partner_surcharges {
        check_country(&partner.country, "legacy_partner_surcharges")?;
        if partner.label.trim().is_empty() {
            return Err(DutyError::PolicyInvalid(format!(
                "legacy_partner_surcharges: '{}' has an empty label",
                partner.country
            )));
        }
    }
    for (from, to) in &policy.surcharge_country_aliases {
        check_country(from, "surcharge_country_aliases")?;
        check_country(to, "surcharge_country_aliases")?;
        if policy.surcharge_country_aliases.contains_key(to) {
            return Err(DutyError::PolicyInvalid(format!(
                "surcharge_country_aliases: '{from}' -> '{to}' chains to another alias"
            )));
        }
    }
    for c in &policy.uk_countries {
        check_country(c, "uk_countries")?;
    }

    Ok(())
}
