//! External ads-platform client boundary and the policy-retry mutator.
//!
//! The client trait hides the real wire protocol; the sandbox
//! implementation simulates the platform's policy engine for local runs
//! and tests.

pub mod client;
pub mod mutator;

pub use client::{
    AdsPlatformClient, MutateResponse, MutationEntity, MutationKind, MutationOperation,
    PlatformError, PolicyRule, SandboxAdsClient,
};
pub use mutator::{MutationOutcome, PolicyRetryMutator};
