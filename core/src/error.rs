use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid threshold configuration for rule '{rule}': {reason}")]
    Config { rule: String, reason: String },

    #[error("Record view '{view}' unavailable: {reason}")]
    DataUnavailable { view: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AuditResult<T> = Result<T, AuditError>;
