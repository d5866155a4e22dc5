use crate::policy::PolicyTopicEntry;
use crate::types::ValidationIssue;
use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Text failed validation even after best-effort correction.
    #[error("Validation failed with {} issue(s)", .issues.len())]
    Validation { issues: Vec<ValidationIssue> },

    /// Policy negotiation exhausted or a non-exemptible finding was hit.
    /// Carries the full finding list so callers can render remediation UI.
    #[error("Policy rejected after {attempts} attempt(s): {} finding(s)", .findings.len())]
    PolicyRejected {
        findings: Vec<PolicyTopicEntry>,
        attempts: u32,
    },

    /// The mutation lifecycle ran out of time between attempts. Distinct
    /// from `PolicyRejected`: the platform never gave a final verdict.
    #[error("Mutation deadline exceeded after {attempts} attempt(s)")]
    DeadlineExceeded { attempts: u32 },

    /// Network/service failure unrelated to content policy. Not retried
    /// here; backoff is the caller's concern.
    #[error("Transient platform error: {0}")]
    Transient(String),

    #[error("Credentials invalid: {0}")]
    CredentialInvalid(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
