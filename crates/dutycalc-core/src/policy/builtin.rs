use crate::error::DutyError;
use crate::policy::schema::PolicyDef;
use std::sync::LazyLock;

const DEFAULT_POLICY_JSON: &str = include_str!("../../../../policy/default-policy.json");

static DEFAULT_POLICY: LazyLock<PolicyDef> = LazyLock::new(|| {
    serde_json::from_str(DEFAULT_POLICY_JSON).expect("embedded default-policy.json is valid")
});

/// Available built-in policies.
pub const PRESETS: &[&str] = &["default"];

/// The embedded policy for the current U.S. schedule.
pub fn default_policy() -> &'static PolicyDef {
    &DEFAULT_POLICY
}

/// Raw JSON of the embedded policy, for `policy show`.
pub fn default_policy_json() -> &'static str {
    DEFAULT_POLICY_JSON
}

/// Load a built-in policy by name.
pub fn load_preset(name: &str) -> Result<PolicyDef, DutyError> {
    match name {
        "default" => Ok(default_policy().clone()),
        _ => Err(DutyError::PolicyInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}
