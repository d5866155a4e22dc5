//! Persistence pipeline for generated campaign structures.

use std::collections::HashMap;
use std::sync::Arc;

use adsync_asset_store::AssetStore;
use adsync_core::types::{
    Asset, AssetLink, AssetType, FieldRole, GeneratedAdGroup, GeneratedStructure, ValidationIssue,
};
use adsync_core::{SyncError, SyncResult};
use adsync_validation::{enforce_limit, validate_field, validate_rsa_batch, RsaLimits};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Per-ad-group accounting for one persistence run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdGroupSummary {
    pub name: String,
    /// Document key the usage edges hang off.
    pub ad_group_key: String,
    pub headlines_kept: usize,
    pub headlines_dropped: usize,
    pub descriptions_kept: usize,
    pub descriptions_dropped: usize,
}

/// Result of persisting one generated structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistSummary {
    pub campaign_name: String,
    /// Distinct assets written, after in-batch dedup.
    pub assets_stored: usize,
    pub links_written: usize,
    pub ad_groups: Vec<AdGroupSummary>,
    /// Non-fatal findings: candidates that were trimmed or dropped.
    pub issues: Vec<ValidationIssue>,
}

/// Composes validation, dedup, and the asset store into one persistence
/// step per generated structure.
pub struct SyncOrchestrator {
    store: Arc<AssetStore>,
    limits: RsaLimits,
}

struct CulledTexts {
    kept: Vec<String>,
    dropped: usize,
}

impl SyncOrchestrator {
    pub fn new(store: Arc<AssetStore>) -> Self {
        Self {
            store,
            limits: RsaLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RsaLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Persist a generated campaign structure: trim oversized text, drop
    /// unusable candidates, deduplicate assets by content hash within the
    /// batch, then write assets and usage edges. Fails without persisting
    /// anything when an ad group cannot meet the platform minimums after
    /// correction — a partial graph is never acceptable.
    pub fn persist_generated_structure(
        &self,
        structure: &GeneratedStructure,
    ) -> SyncResult<PersistSummary> {
        // The in-batch dedup point: one map keyed by content hash collapses
        // repeats across every ad group before any store call.
        let mut batch: HashMap<String, Asset> = HashMap::new();
        let mut links: Vec<AssetLink> = Vec::new();
        let mut issues: Vec<ValidationIssue> = Vec::new();
        let mut summaries: Vec<AdGroupSummary> = Vec::new();

        for group in &structure.ad_groups {
            let ad_group_key = format!("AdGroups/{}", Uuid::new_v4());

            let headlines = self.cull(
                &group.headlines,
                self.limits.headline_width,
                self.limits.max_headlines,
                &format!("{}/headlines", group.name),
                &mut issues,
            );
            let descriptions = self.cull(
                &group.descriptions,
                self.limits.description_width,
                self.limits.max_descriptions,
                &format!("{}/descriptions", group.name),
                &mut issues,
            );

            let path1 = group
                .path1
                .as_deref()
                .map(|p| enforce_limit(p, self.limits.path_width));
            let path2 = group
                .path2
                .as_deref()
                .map(|p| enforce_limit(p, self.limits.path_width));

            // Correction is done; anything still invalid escalates.
            let remaining = validate_rsa_batch(
                &headlines.kept,
                &descriptions.kept,
                path1.as_deref(),
                path2.as_deref(),
                &self.limits,
            );
            if !remaining.is_empty() {
                issues.extend(remaining);
                return Err(SyncError::Validation { issues });
            }

            for (texts, role) in [
                (&headlines.kept, FieldRole::Headline),
                (&descriptions.kept, FieldRole::Description),
            ] {
                for text in texts {
                    let asset = self.store.make_asset(AssetType::Text, text.clone());
                    let hash = asset.hash.clone();
                    batch.entry(hash.clone()).or_insert(asset);
                    links.push(AssetLink {
                        from_key: ad_group_key.clone(),
                        to_hash: hash,
                        field_role: role,
                        pinned_field: None,
                    });
                }
            }

            debug!(
                ad_group = %group.name,
                headlines = headlines.kept.len(),
                descriptions = descriptions.kept.len(),
                "Ad group culled and hashed"
            );

            summaries.push(AdGroupSummary {
                name: group.name.clone(),
                ad_group_key,
                headlines_kept: headlines.kept.len(),
                headlines_dropped: headlines.dropped,
                descriptions_kept: descriptions.kept.len(),
                descriptions_dropped: descriptions.dropped,
            });
        }

        let assets: Vec<Asset> = batch.into_values().collect();

        // Assets first, then edges; failure of either aborts the step so
        // the graph never holds links without assets or vice versa.
        self.store.upsert_batch(&assets)?;
        self.store.upsert_links(&links)?;

        info!(
            campaign = %structure.campaign_name,
            assets = assets.len(),
            links = links.len(),
            trimmed = issues.len(),
            "Generated structure persisted"
        );

        Ok(PersistSummary {
            campaign_name: structure.campaign_name.clone(),
            assets_stored: assets.len(),
            links_written: links.len(),
            ad_groups: summaries,
            issues,
        })
    }

    /// Trim every candidate to the width budget, drop candidates that are
    /// unusable even after correction, and cap the survivors at the
    /// platform maximum.
    fn cull(
        &self,
        candidates: &[String],
        width_limit: usize,
        max_count: usize,
        field: &str,
        issues: &mut Vec<ValidationIssue>,
    ) -> CulledTexts {
        let mut kept = Vec::new();
        let mut dropped = 0usize;

        for (i, candidate) in candidates.iter().enumerate() {
            let corrected = enforce_limit(candidate, width_limit);
            if corrected != *candidate {
                issues.push(ValidationIssue::new(
                    format!("{field}[{i}]"),
                    "trimmed to width budget".to_string(),
                ));
            }
            if validate_field(field, &corrected, width_limit).is_empty() {
                kept.push(corrected);
            } else {
                dropped += 1;
                issues.push(ValidationIssue::new(
                    format!("{field}[{i}]"),
                    "dropped: unusable after correction".to_string(),
                ));
            }
        }

        if kept.len() > max_count {
            for _ in max_count..kept.len() {
                issues.push(ValidationIssue::new(
                    field,
                    "dropped: over platform count maximum".to_string(),
                ));
            }
            dropped += kept.len() - max_count;
            kept.truncate(max_count);
        }

        CulledTexts { kept, dropped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsync_asset_store::asset_hash;
    use adsync_core::types::GeneratedAdGroup as Group;
    use adsync_validation::display_width;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn structure(ad_groups: Vec<Group>) -> GeneratedStructure {
        GeneratedStructure {
            campaign_name: "Webinar HR Transformation".to_string(),
            ad_groups,
        }
    }

    fn valid_group(name: &str) -> Group {
        Group {
            name: name.to_string(),
            headlines: strings(&["Transform HR Now", "Unlock AI Potential", "Join Us Today"]),
            descriptions: strings(&[
                "Join our webinar on HR transformation.",
                "Download the whitepaper today.",
            ]),
            path1: None,
            path2: None,
            final_urls: vec!["https://example.com".to_string()],
        }
    }

    #[test]
    fn test_persist_valid_structure() {
        let store = Arc::new(AssetStore::new());
        let orchestrator = SyncOrchestrator::new(store.clone());

        let summary = orchestrator
            .persist_generated_structure(&structure(vec![valid_group("Target HR Managers")]))
            .unwrap();

        assert_eq!(summary.assets_stored, 5);
        assert_eq!(summary.links_written, 5);
        assert_eq!(store.asset_count(), 5);
        assert_eq!(store.link_count(), 5);
        assert!(summary.issues.is_empty());
    }

    #[test]
    fn test_shared_headline_collapses_to_one_asset() {
        let store = Arc::new(AssetStore::new());
        let orchestrator = SyncOrchestrator::new(store.clone());

        let mut a = valid_group("Group A");
        let mut b = valid_group("Group B");
        a.headlines[0] = "Buy Now".to_string();
        b.headlines = strings(&["Buy Now", "Other Headline", "Third Headline"]);
        b.descriptions = strings(&["Some other description.", "And one more description."]);

        orchestrator
            .persist_generated_structure(&structure(vec![a, b]))
            .unwrap();

        let hash = asset_hash(AssetType::Text, "Buy Now");
        assert!(store.get(&hash).is_some());
        // One asset record, two distinct usage edges.
        assert_eq!(store.links_to(&hash).len(), 2);
    }

    #[test]
    fn test_oversized_headlines_are_trimmed_to_budget() {
        let store = Arc::new(AssetStore::new());
        let orchestrator = SyncOrchestrator::new(store.clone());

        let mut group = valid_group("Oversized");
        // 20 over-budget candidates; only 15 survive the count cap.
        group.headlines = (0..20)
            .map(|i| format!("Headline number {i:02} padded to len"))
            .collect();
        for h in &group.headlines {
            assert!(display_width(h) > 30);
        }

        let summary = orchestrator
            .persist_generated_structure(&structure(vec![group]))
            .unwrap();

        assert_eq!(summary.ad_groups[0].headlines_kept, 15);
        for link in store.links_from(&summary.ad_groups[0].ad_group_key) {
            if link.field_role == FieldRole::Headline {
                let asset = store.get(&link.to_hash).unwrap();
                assert!(display_width(&asset.text) <= 30);
            }
        }
    }

    #[test]
    fn test_too_few_valid_headlines_reports_validation_error() {
        let store = Arc::new(AssetStore::new());
        let orchestrator = SyncOrchestrator::new(store.clone());

        let mut group = valid_group("Empty after trim");
        // Whitespace-only candidates trim to nothing and get dropped.
        group.headlines = strings(&["   ", "  ", "Only Valid One"]);

        let err = orchestrator
            .persist_generated_structure(&structure(vec![group]))
            .unwrap_err();
        assert!(matches!(err, SyncError::Validation { .. }));
        // Nothing persisted on failure.
        assert_eq!(store.asset_count(), 0);
        assert_eq!(store.link_count(), 0);
    }

    #[test]
    fn test_persist_is_idempotent_per_content() {
        let store = Arc::new(AssetStore::new());
        let orchestrator = SyncOrchestrator::new(store.clone());
        let s = structure(vec![valid_group("Repeat")]);

        orchestrator.persist_generated_structure(&s).unwrap();
        orchestrator.persist_generated_structure(&s).unwrap();

        // Same content hashes both times: still five assets. Links double
        // because each run mints a fresh ad-group key.
        assert_eq!(store.asset_count(), 5);
        assert_eq!(store.link_count(), 10);
    }

    #[test]
    fn test_custom_limits_tighten_the_count_cap() {
        let store = Arc::new(AssetStore::new());
        let limits = RsaLimits {
            max_headlines: 3,
            ..RsaLimits::default()
        };
        let orchestrator = SyncOrchestrator::new(store.clone()).with_limits(limits);

        let mut group = valid_group("Tight budget");
        group.headlines = (0..6).map(|i| format!("Headline {i}")).collect();

        let summary = orchestrator
            .persist_generated_structure(&structure(vec![group]))
            .unwrap();
        assert_eq!(summary.ad_groups[0].headlines_kept, 3);
        assert_eq!(summary.ad_groups[0].headlines_dropped, 3);
    }

    #[test]
    fn test_paths_are_trimmed_not_rejected() {
        let store = Arc::new(AssetStore::new());
        let orchestrator = SyncOrchestrator::new(store.clone());

        let mut group = valid_group("Paths");
        group.path1 = Some("far-too-long-display-path".to_string());

        let summary = orchestrator
            .persist_generated_structure(&structure(vec![group]))
            .unwrap();
        assert_eq!(summary.assets_stored, 5);
    }
}
