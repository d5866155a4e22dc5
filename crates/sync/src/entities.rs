//! `SyncedEntity` implementations for the platform-synced record types.
//!
//! Local-authority fields per entity mirror the merge rule: name and
//! status are user-editable and dirty-protected; everything else is
//! platform-authoritative and adopted as-is.

use adsync_core::types::{Ad, AdGroup, Campaign, SyncMeta};

use crate::merge::{DualAuthority, SyncedEntity};

impl SyncedEntity for Campaign {
    fn key(&self) -> &str {
        &self.key
    }

    fn meta(&self) -> &SyncMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.meta
    }

    fn resolve_local_fields(&mut self, old: &Self) {
        let is_dirty = old.meta.is_dirty;
        self.name = DualAuthority {
            platform: std::mem::take(&mut self.name),
            local: old.name.clone(),
            is_dirty,
        }
        .resolve();
        self.status = DualAuthority {
            platform: self.status,
            local: old.status,
            is_dirty,
        }
        .resolve();
        // serving_status, dates, channel type: platform-authoritative.
    }
}

impl SyncedEntity for AdGroup {
    fn key(&self) -> &str {
        &self.key
    }

    fn meta(&self) -> &SyncMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.meta
    }

    fn resolve_local_fields(&mut self, old: &Self) {
        let is_dirty = old.meta.is_dirty;
        self.name = DualAuthority {
            platform: std::mem::take(&mut self.name),
            local: old.name.clone(),
            is_dirty,
        }
        .resolve();
        self.status = DualAuthority {
            platform: self.status,
            local: old.status,
            is_dirty,
        }
        .resolve();
    }
}

impl SyncedEntity for Ad {
    fn key(&self) -> &str {
        &self.key
    }

    fn meta(&self) -> &SyncMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.meta
    }

    fn resolve_local_fields(&mut self, old: &Self) {
        // Ads carry no editable name; status is the only local-authority
        // field. Text content lives in linked assets.
        self.status = DualAuthority {
            platform: self.status,
            local: old.status,
            is_dirty: old.meta.is_dirty,
        }
        .resolve();
    }
}
