//! Pure merge policy for the dual-authority model.
//!
//! A field is either platform-authoritative (serving status and friends,
//! always adopted) or local-authority (name, status), where a dirty local
//! edit wins over the incoming platform value. The policy is a plain
//! function over `(platform value, prior local value, dirty flag)` so it
//! can be unit-tested without a live store. Only the one dirty/not-dirty
//! axis is modeled; this is not a CRDT.

use adsync_core::types::SyncMeta;
use chrono::{DateTime, Utc};

/// One local-authority field awaiting resolution.
#[derive(Debug, Clone)]
pub struct DualAuthority<T> {
    pub platform: T,
    pub local: T,
    pub is_dirty: bool,
}

impl<T> DualAuthority<T> {
    /// Local wins while the dirty flag is set; otherwise the platform
    /// value is adopted.
    pub fn resolve(self) -> T {
        if self.is_dirty {
            self.local
        } else {
            self.platform
        }
    }
}

/// Implemented by every platform-synced record the reconcile engine
/// handles (campaigns, ad groups, ads).
pub trait SyncedEntity: Clone + Send + Sync + 'static {
    /// Platform-assigned identity.
    fn key(&self) -> &str;

    fn meta(&self) -> &SyncMeta;
    fn meta_mut(&mut self) -> &mut SyncMeta;

    /// Resolve the entity's local-authority fields against the prior
    /// record. `self` holds the incoming platform values.
    fn resolve_local_fields(&mut self, old: &Self);
}

/// Single-pass three-way merge of one incoming platform record against the
/// prior local record, if any.
///
/// First insert stamps `first_synced_at` and starts clean. Updates resolve
/// local-authority fields via the dirty flag, always carry forward
/// `internal_notes` (never sourced from the platform), and refresh
/// `last_synced_at`. The dirty flag survives the merge: it is only cleared
/// when the local edit is explicitly pushed back out.
pub fn merge_record<T: SyncedEntity>(mut incoming: T, old: Option<&T>, now: DateTime<Utc>) -> T {
    use adsync_core::types::SyncStatus;

    match old {
        None => {
            let meta = incoming.meta_mut();
            meta.first_synced_at = Some(now);
            meta.last_synced_at = Some(now);
            meta.sync_status = SyncStatus::Synced;
            meta.is_dirty = false;
            meta.internal_notes = None;
        }
        Some(old) => {
            incoming.resolve_local_fields(old);
            let old_meta = old.meta().clone();
            let meta = incoming.meta_mut();
            meta.internal_notes = old_meta.internal_notes;
            meta.first_synced_at = old_meta.first_synced_at;
            meta.is_dirty = old_meta.is_dirty;
            meta.last_synced_at = Some(now);
            meta.sync_status = SyncStatus::Synced;
        }
    }

    incoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsync_core::types::{Campaign, EntityStatus, ServingStatus, SyncStatus};

    fn campaign(key: &str, name: &str) -> Campaign {
        Campaign {
            key: key.to_string(),
            customer_id: "123".to_string(),
            name: name.to_string(),
            status: EntityStatus::Enabled,
            advertising_channel_type: "SEARCH".to_string(),
            start_date: None,
            end_date: None,
            serving_status: ServingStatus::Serving,
            meta: SyncMeta::default(),
        }
    }

    #[test]
    fn test_resolve_prefers_local_when_dirty() {
        let field = DualAuthority {
            platform: "Remote".to_string(),
            local: "Local".to_string(),
            is_dirty: true,
        };
        assert_eq!(field.resolve(), "Local");

        let field = DualAuthority {
            platform: "Remote".to_string(),
            local: "Local".to_string(),
            is_dirty: false,
        };
        assert_eq!(field.resolve(), "Remote");
    }

    #[test]
    fn test_first_insert_stamps_sync_metadata() {
        let now = Utc::now();
        let merged = merge_record(campaign("c1", "Launch"), None, now);
        assert_eq!(merged.meta.first_synced_at, Some(now));
        assert_eq!(merged.meta.last_synced_at, Some(now));
        assert_eq!(merged.meta.sync_status, SyncStatus::Synced);
        assert!(!merged.meta.is_dirty);
    }

    #[test]
    fn test_dirty_name_survives_merge() {
        let now = Utc::now();
        let mut old = campaign("c1", "Local");
        old.meta.is_dirty = true;
        old.meta.internal_notes = Some("edited by hand".to_string());

        let merged = merge_record(campaign("c1", "Remote"), Some(&old), now);
        assert_eq!(merged.name, "Local");
        assert_eq!(merged.meta.sync_status, SyncStatus::Synced);
        assert!(merged.meta.is_dirty);
        assert_eq!(merged.meta.internal_notes.as_deref(), Some("edited by hand"));
    }

    #[test]
    fn test_clean_record_adopts_platform_values() {
        let now = Utc::now();
        let old = campaign("c1", "Local");
        let merged = merge_record(campaign("c1", "Remote"), Some(&old), now);
        assert_eq!(merged.name, "Remote");
    }

    #[test]
    fn test_serving_status_always_platform() {
        // Read-only field: overwritten even when the record is dirty.
        let now = Utc::now();
        let mut old = campaign("c1", "Local");
        old.meta.is_dirty = true;
        old.serving_status = ServingStatus::Suspended;

        let mut incoming = campaign("c1", "Remote");
        incoming.serving_status = ServingStatus::Serving;

        let merged = merge_record(incoming, Some(&old), now);
        assert_eq!(merged.serving_status, ServingStatus::Serving);
        assert_eq!(merged.name, "Local");
    }
}
