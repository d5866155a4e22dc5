//! Deduplicating asset store keyed by content hash, plus usage edges.

use adsync_core::types::{Asset, AssetLink, AssetType, FieldRole};
use adsync_core::{SyncError, SyncResult};
use chrono::Utc;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Deterministic identity for an asset: SHA-256 hex over the UTF-8 bytes
/// of `"{asset_type}:{text}"`. No salt and no normalization — casing and
/// whitespace are preserved so brand-literal variants stay distinct.
/// Stable across processes and versions.
pub fn asset_hash(asset_type: AssetType, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{asset_type}:{text}").as_bytes());
    hex::encode(hasher.finalize())
}

/// In-process content-addressed store. The dedup invariant (at most one
/// record per hash) is enforced here, before any backing-store call, so it
/// does not depend on a particular store's upsert semantics.
pub struct AssetStore {
    assets: DashMap<String, Asset>,
    links: DashMap<(String, String, FieldRole), AssetLink>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self {
            assets: DashMap::new(),
            links: DashMap::new(),
        }
    }

    /// Build an asset record for `(asset_type, text)` with its computed
    /// identity. The store exclusively owns identity generation.
    pub fn make_asset(&self, asset_type: AssetType, text: impl Into<String>) -> Asset {
        let text = text.into();
        let now = Utc::now();
        Asset {
            hash: asset_hash(asset_type, &text),
            text,
            asset_type,
            created_at: now,
            last_seen_at: now,
        }
    }

    /// Insert-if-absent by content hash. An existing identity only has its
    /// `last_seen_at` refreshed; text and type are immutable for a given
    /// hash. Idempotent: re-submitting the same batch any number of times
    /// yields the same store state.
    pub fn upsert_batch(&self, batch: &[Asset]) -> SyncResult<()> {
        for asset in batch {
            if asset.hash.is_empty() {
                return Err(SyncError::Store("asset with empty hash in batch".into()));
            }
        }

        let now = Utc::now();
        let mut inserted = 0usize;
        let mut refreshed = 0usize;
        for asset in batch {
            match self.assets.entry(asset.hash.clone()) {
                dashmap::mapref::entry::Entry::Occupied(mut existing) => {
                    existing.get_mut().last_seen_at = now;
                    refreshed += 1;
                }
                dashmap::mapref::entry::Entry::Vacant(slot) => {
                    slot.insert(asset.clone());
                    inserted += 1;
                }
            }
        }

        debug!(inserted, refreshed, "Asset batch upserted");
        Ok(())
    }

    /// Upsert edges by their natural key `(from, to, field_role)`.
    /// `pinned_field` always takes the newest value — links carry no
    /// local-wins protection, only core entities do.
    pub fn upsert_links(&self, links: &[AssetLink]) -> SyncResult<()> {
        for link in links {
            if link.from_key.is_empty() || link.to_hash.is_empty() {
                return Err(SyncError::Store("link with empty endpoint in batch".into()));
            }
        }

        for link in links {
            self.links.insert(link.natural_key(), link.clone());
        }

        debug!(count = links.len(), "Asset links upserted");
        Ok(())
    }

    pub fn get(&self, hash: &str) -> Option<Asset> {
        self.assets.get(hash).map(|a| a.clone())
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// All usage edges originating from one document.
    pub fn links_from(&self, from_key: &str) -> Vec<AssetLink> {
        self.links
            .iter()
            .filter(|e| e.value().from_key == from_key)
            .map(|e| e.value().clone())
            .collect()
    }

    /// All usage edges pointing at one asset.
    pub fn links_to(&self, hash: &str) -> Vec<AssetLink> {
        self.links
            .iter()
            .filter(|e| e.value().to_hash == hash)
            .map(|e| e.value().clone())
            .collect()
    }
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new()
    }
}
