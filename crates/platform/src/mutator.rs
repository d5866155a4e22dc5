//! Policy-violation-driven retry state machine for platform mutations.
//!
//! Submit → Classify → Exempt → Retry, as explicit iteration with an
//! attempt counter (no recursion), bounded by an attempt ceiling. Only
//! ad-level (text-bearing) mutations enter the retry loop: campaign-level
//! policy findings are treated as non-retryable and ad-group mutations
//! have no policy branch at all.

use std::sync::Arc;
use std::time::Instant;

use adsync_core::{SyncError, SyncResult};
use tracing::{info, warn};

use crate::client::{AdsPlatformClient, MutateResponse, MutationEntity, MutationOperation, PlatformError};

/// Terminal `Accepted` result of one mutation lifecycle.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub response: MutateResponse,
    /// Total submissions made, including the accepted one.
    pub attempts: u32,
    /// Exemptions accumulated across the lifecycle.
    pub exemptions_applied: usize,
}

pub struct PolicyRetryMutator {
    client: Arc<dyn AdsPlatformClient>,
    customer_id: String,
    max_attempts: u32,
}

impl PolicyRetryMutator {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    pub fn new(client: Arc<dyn AdsPlatformClient>, customer_id: impl Into<String>) -> Self {
        Self {
            client,
            customer_id: customer_id.into(),
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Push one mutation, negotiating past exemptible policy findings.
    ///
    /// The optional deadline is honored between attempts only; an
    /// in-flight submit is never interrupted. The mutator owns the
    /// operation's exemption state for the duration of this call.
    pub fn push(
        &self,
        mut operation: MutationOperation,
        deadline: Option<Instant>,
    ) -> SyncResult<MutationOutcome> {
        let retryable = matches!(operation.entity, MutationEntity::Ad { .. });
        let entity_key = operation.entity_key().to_string();
        let mut attempt: u32 = 1;

        loop {
            let result = self.client.mutate(&self.customer_id, &operation);

            let findings = match result {
                Ok(response) => {
                    info!(
                        entity_key = %entity_key,
                        attempts = attempt,
                        exemptions = operation.exemptions.len(),
                        "Mutation accepted"
                    );
                    return Ok(MutationOutcome {
                        response,
                        attempts: attempt,
                        exemptions_applied: operation.exemptions.len(),
                    });
                }
                Err(PlatformError::PolicyFindings(findings)) => findings,
                // Non-policy failures propagate unchanged; backoff for
                // transient errors is the caller's concern.
                Err(PlatformError::Transient(msg)) => return Err(SyncError::Transient(msg)),
                Err(PlatformError::CredentialInvalid(msg)) => {
                    return Err(SyncError::CredentialInvalid(msg))
                }
            };

            let exemptible: Vec<_> = findings.iter().filter(|f| f.is_exemptible()).collect();

            if !retryable || exemptible.is_empty() {
                warn!(
                    entity_key = %entity_key,
                    attempts = attempt,
                    findings = findings.len(),
                    exemptible = exemptible.len(),
                    "Mutation rejected, not negotiable"
                );
                return Err(SyncError::PolicyRejected {
                    findings,
                    attempts: attempt,
                });
            }

            if attempt >= self.max_attempts {
                warn!(
                    entity_key = %entity_key,
                    attempts = attempt,
                    "Mutation rejected, attempt ceiling reached"
                );
                return Err(SyncError::PolicyRejected {
                    findings,
                    attempts: attempt,
                });
            }

            // Exempt: grow the cumulative set, never shrink it.
            let keys: Vec<_> = exemptible.iter().map(|f| f.exemption_key()).collect();
            operation.add_exemptions(keys);

            // Cancellation takes effect here, between attempts. Reported
            // as its own error: the platform never gave a final verdict.
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    warn!(entity_key = %entity_key, attempts = attempt, "Deadline reached between attempts");
                    return Err(SyncError::DeadlineExceeded { attempts: attempt });
                }
            }

            info!(
                entity_key = %entity_key,
                attempt,
                exemptions = operation.exemptions.len(),
                "Policy findings exempted, retrying"
            );
            attempt += 1;
        }
    }
}
