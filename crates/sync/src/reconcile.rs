//! Batch upsert of platform-origin records into the local store.

use adsync_core::{SyncError, SyncResult};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

use crate::merge::{merge_record, SyncedEntity};

/// Counts for one applied reconcile batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub updated: usize,
    /// Records skipped because the stored copy was synced more recently
    /// than this batch was observed (out-of-order delivery).
    pub skipped_stale: usize,
}

/// Local store of one platform-synced collection, reconciled in atomic
/// batches. Per-key upsert atomicity comes from the backing map; batch
/// atomicity comes from resolving every record before applying any.
pub struct ReconcileEngine<T: SyncedEntity> {
    records: DashMap<String, T>,
}

impl<T: SyncedEntity> ReconcileEngine<T> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Merge a platform-origin batch into the store. `observed_at` is the
    /// snapshot time of the batch; records whose stored copy carries a
    /// newer `last_synced_at` are skipped instead of regressed.
    ///
    /// Two-phase: the whole batch is resolved first, then applied, so a
    /// malformed record rejects the batch without partial application.
    /// Records within one batch are independent and order-insensitive.
    pub fn reconcile(
        &self,
        batch: Vec<T>,
        observed_at: DateTime<Utc>,
    ) -> SyncResult<ReconcileSummary> {
        let mut resolved = Vec::with_capacity(batch.len());
        let mut summary = ReconcileSummary::default();

        for incoming in batch {
            if incoming.key().is_empty() {
                return Err(SyncError::Store(
                    "record with empty key in reconcile batch".into(),
                ));
            }

            let old = self.records.get(incoming.key()).map(|r| r.clone());
            if let Some(stored_at) = old.as_ref().and_then(|o| o.meta().last_synced_at) {
                if stored_at > observed_at {
                    debug!(key = incoming.key(), "Skipping stale record");
                    summary.skipped_stale += 1;
                    continue;
                }
            }

            if old.is_some() {
                summary.updated += 1;
            } else {
                summary.inserted += 1;
            }
            resolved.push(merge_record(incoming, old.as_ref(), observed_at));
        }

        for record in resolved {
            self.records.insert(record.key().to_string(), record);
        }

        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            skipped_stale = summary.skipped_stale,
            "Reconcile batch applied"
        );
        Ok(summary)
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.records.get(key).map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Apply a local edit: mutate the record, mark it dirty, and flag it
    /// pending outbound sync. The dirty flag protects the edited fields
    /// from the next inbound reconcile.
    pub fn apply_local_edit(
        &self,
        key: &str,
        edit: impl FnOnce(&mut T),
    ) -> SyncResult<()> {
        use adsync_core::types::SyncStatus;

        let mut record = self
            .records
            .get_mut(key)
            .ok_or_else(|| SyncError::Store(format!("no record with key {key}")))?;
        edit(record.value_mut());
        let meta = record.meta_mut();
        meta.is_dirty = true;
        meta.sync_status = SyncStatus::Pending;
        Ok(())
    }

    /// Clear the dirty flag after the local edit was pushed back out.
    pub fn mark_clean(&self, key: &str) -> SyncResult<()> {
        use adsync_core::types::SyncStatus;

        let mut record = self
            .records
            .get_mut(key)
            .ok_or_else(|| SyncError::Store(format!("no record with key {key}")))?;
        let meta = record.meta_mut();
        meta.is_dirty = false;
        meta.sync_status = SyncStatus::Synced;
        Ok(())
    }
}

impl<T: SyncedEntity> Default for ReconcileEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsync_core::types::{
        Ad, AdGroup, AdType, Campaign, EntityStatus, ServingStatus, SyncMeta, SyncStatus,
    };
    use chrono::Duration;

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

    fn ad_group(key: &str, name: &str, status: EntityStatus) -> AdGroup {
        AdGroup {
            key: key.to_string(),
            campaign_key: "c1".to_string(),
            name: name.to_string(),
            status,
            cpc_bid_micros: Some(250_000),
            meta: SyncMeta::default(),
        }
    }

    fn ad(key: &str, status: EntityStatus, final_urls: &[&str]) -> Ad {
        Ad {
            key: key.to_string(),
            ad_group_key: "ag1".to_string(),
            ad_type: AdType::ResponsiveSearchAd,
            status,
            final_urls: final_urls.iter().map(|u| u.to_string()).collect(),
            meta: SyncMeta::default(),
        }
    }

    #[test]
    fn test_insert_then_update() {
        let engine = ReconcileEngine::new();
        let now = Utc::now();

        let summary = engine.reconcile(vec![campaign("c1", "First")], now).unwrap();
        assert_eq!(summary.inserted, 1);

        let later = now + Duration::seconds(5);
        let summary = engine
            .reconcile(vec![campaign("c1", "Renamed")], later)
            .unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(engine.get("c1").unwrap().name, "Renamed");
    }

    #[test]
    fn test_dirty_protection_across_reconcile() {
        let engine = ReconcileEngine::new();
        let now = Utc::now();
        engine.reconcile(vec![campaign("c1", "Original")], now).unwrap();

        engine
            .apply_local_edit("c1", |c| c.name = "Local".to_string())
            .unwrap();
        assert_eq!(engine.get("c1").unwrap().meta.sync_status, SyncStatus::Pending);

        let later = now + Duration::seconds(5);
        engine.reconcile(vec![campaign("c1", "Remote")], later).unwrap();

        let stored = engine.get("c1").unwrap();
        assert_eq!(stored.name, "Local");
        assert_eq!(stored.meta.sync_status, SyncStatus::Synced);
        assert!(stored.meta.is_dirty);
    }

    #[test]
    fn test_clean_record_takes_remote_name() {
        let engine = ReconcileEngine::new();
        let now = Utc::now();
        engine.reconcile(vec![campaign("c1", "Original")], now).unwrap();

        let later = now + Duration::seconds(5);
        engine.reconcile(vec![campaign("c1", "Remote")], later).unwrap();
        assert_eq!(engine.get("c1").unwrap().name, "Remote");
    }

    #[test]
    fn test_ad_group_dirty_rename_survives_reconcile() {
        let engine: ReconcileEngine<AdGroup> = ReconcileEngine::new();
        let now = Utc::now();
        engine
            .reconcile(vec![ad_group("ag1", "Original", EntityStatus::Enabled)], now)
            .unwrap();

        engine
            .apply_local_edit("ag1", |g| g.name = "Renamed Locally".to_string())
            .unwrap();

        let later = now + Duration::seconds(5);
        engine
            .reconcile(vec![ad_group("ag1", "Remote", EntityStatus::Paused)], later)
            .unwrap();

        let stored = engine.get("ag1").unwrap();
        assert_eq!(stored.name, "Renamed Locally");
        // Status is local-authority too, so the dirty flag pins it.
        assert_eq!(stored.status, EntityStatus::Enabled);
        assert!(stored.meta.is_dirty);
    }

    #[test]
    fn test_ad_dirty_status_pinned_but_urls_follow_platform() {
        let engine: ReconcileEngine<Ad> = ReconcileEngine::new();
        let now = Utc::now();
        engine
            .reconcile(
                vec![ad("ad1", EntityStatus::Enabled, &["https://example.com/a"])],
                now,
            )
            .unwrap();

        engine
            .apply_local_edit("ad1", |a| a.status = EntityStatus::Paused)
            .unwrap();

        let later = now + Duration::seconds(5);
        engine
            .reconcile(
                vec![ad("ad1", EntityStatus::Enabled, &["https://example.com/b"])],
                later,
            )
            .unwrap();

        let stored = engine.get("ad1").unwrap();
        // Status is the ad's only local-authority field.
        assert_eq!(stored.status, EntityStatus::Paused);
        // Everything else adopts the platform copy, dirty or not.
        assert_eq!(stored.final_urls, vec!["https://example.com/b".to_string()]);
        assert!(stored.meta.is_dirty);
    }

    #[test]
    fn test_clean_ad_adopts_platform_status() {
        let engine: ReconcileEngine<Ad> = ReconcileEngine::new();
        let now = Utc::now();
        engine
            .reconcile(
                vec![ad("ad1", EntityStatus::Enabled, &["https://example.com"])],
                now,
            )
            .unwrap();

        let later = now + Duration::seconds(5);
        engine
            .reconcile(
                vec![ad("ad1", EntityStatus::Removed, &["https://example.com"])],
                later,
            )
            .unwrap();
        assert_eq!(engine.get("ad1").unwrap().status, EntityStatus::Removed);
    }

    #[test]
    fn test_out_of_order_batch_skipped() {
        let engine = ReconcileEngine::new();
        let now = Utc::now();
        engine.reconcile(vec![campaign("c1", "Fresh")], now).unwrap();

        let earlier = now - Duration::minutes(10);
        let summary = engine
            .reconcile(vec![campaign("c1", "StaleName")], earlier)
            .unwrap();
        assert_eq!(summary.skipped_stale, 1);
        assert_eq!(engine.get("c1").unwrap().name, "Fresh");
    }

    #[test]
    fn test_malformed_record_rejects_whole_batch() {
        let engine = ReconcileEngine::new();
        let now = Utc::now();

        let result = engine.reconcile(vec![campaign("c1", "Fine"), campaign("", "NoKey")], now);
        assert!(result.is_err());
        // Nothing applied: batch is atomic.
        assert!(engine.is_empty());
    }

    #[test]
    fn test_mark_clean_after_outbound_push() {
        let engine = ReconcileEngine::new();
        let now = Utc::now();
        engine.reconcile(vec![campaign("c1", "Original")], now).unwrap();
        engine
            .apply_local_edit("c1", |c| c.name = "Local".to_string())
            .unwrap();
        engine.mark_clean("c1").unwrap();

        let later = now + Duration::seconds(5);
        engine.reconcile(vec![campaign("c1", "Remote")], later).unwrap();
        assert_eq!(engine.get("c1").unwrap().name, "Remote");
    }
}
