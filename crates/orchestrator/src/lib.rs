//! Batch persistence of generated campaign structures: validate and trim
//! text, deduplicate assets by content hash, then write assets and usage
//! edges as one logical step.

pub mod orchestrator;

pub use orchestrator::{AdGroupSummary, PersistSummary, SyncOrchestrator};
