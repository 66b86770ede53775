use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DutyError {
    #[error("tariff data unavailable: {0}")]
    DataUnavailable(String),

    #[error("failed to load rate policy from {path}: {reason}")]
    PolicyLoad { path: PathBuf, reason: String },

    #[error("invalid rate policy: {0}")]
    PolicyInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
