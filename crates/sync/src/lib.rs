//! Conflict-resolving inbound sync: merges platform-authoritative batches
//! into the local store without clobbering dirty local edits.

pub mod entities;
pub mod merge;
pub mod reconcile;

pub use merge::{merge_record, DualAuthority, SyncedEntity};
pub use reconcile::{ReconcileEngine, ReconcileSummary};
