//! Ads-platform client trait, mutation types, and the sandbox client.

use adsync_core::policy::{ExemptionKey, PolicyCategory, PolicyTopicEntry};
use adsync_core::types::{Ad, AdGroup, Campaign};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
}

/// Entity payload of one mutation. Ad mutations carry their text fields
/// inline because that is what the policy engine inspects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MutationEntity {
    Campaign(Campaign),
    AdGroup(AdGroup),
    Ad {
        ad: Ad,
        headlines: Vec<String>,
        descriptions: Vec<String>,
    },
}

/// An intended create/update against the external platform.
///
/// The exemption set starts empty and grows monotonically across retry
/// attempts; the entity key is stable so repeated submission converges on
/// the platform side instead of duplicating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationOperation {
    pub kind: MutationKind,
    pub entity: MutationEntity,
    pub exemptions: Vec<ExemptionKey>,
}

impl MutationOperation {
    pub fn new(kind: MutationKind, entity: MutationEntity) -> Self {
        Self {
            kind,
            entity,
            exemptions: Vec::new(),
        }
    }

    /// Stable identity of the mutated entity.
    pub fn entity_key(&self) -> &str {
        match &self.entity {
            MutationEntity::Campaign(c) => &c.key,
            MutationEntity::AdGroup(g) => &g.key,
            MutationEntity::Ad { ad, .. } => &ad.key,
        }
    }

    pub fn collection(&self) -> &'static str {
        match &self.entity {
            MutationEntity::Campaign(_) => "campaigns",
            MutationEntity::AdGroup(_) => "adGroups",
            MutationEntity::Ad { .. } => "adGroupAds",
        }
    }

    /// Text the platform's policy engine inspects.
    pub fn text_fields(&self) -> Vec<&str> {
        match &self.entity {
            MutationEntity::Campaign(c) => vec![c.name.as_str()],
            MutationEntity::AdGroup(g) => vec![g.name.as_str()],
            MutationEntity::Ad {
                headlines,
                descriptions,
                ..
            } => headlines
                .iter()
                .chain(descriptions.iter())
                .map(|s| s.as_str())
                .collect(),
        }
    }

    /// Merge exemption keys into the cumulative set. Once added, a key is
    /// never dropped within the same mutation lifecycle.
    pub fn add_exemptions(&mut self, keys: impl IntoIterator<Item = ExemptionKey>) {
        for key in keys {
            if !self.exemptions.contains(&key) {
                self.exemptions.push(key);
            }
        }
    }

    pub fn has_exemption(&self, key: &ExemptionKey) -> bool {
        self.exemptions.contains(key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutateResponse {
    pub resource_name: String,
}

/// Structured failure from the platform boundary.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("policy findings rejected the operation ({} entries)", .0.len())]
    PolicyFindings(Vec<PolicyTopicEntry>),

    #[error("transient platform error: {0}")]
    Transient(String),

    #[error("credentials invalid: {0}")]
    CredentialInvalid(String),
}

/// Client boundary for the external ads platform. One `mutate` call is
/// one network submission against a stateful system; implementations must
/// treat the operation's entity key as the convergence identity.
pub trait AdsPlatformClient: Send + Sync {
    fn mutate(
        &self,
        customer_id: &str,
        operation: &MutationOperation,
    ) -> Result<MutateResponse, PlatformError>;
}

// ─── Sandbox client ─────────────────────────────────────────────────────────

/// One phrase the simulated policy engine flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    pub phrase: String,
    pub topic: String,
    pub category: PolicyCategory,
}

/// Simulated ads platform with a configurable policy table.
///
/// A flagged phrase produces a policy finding unless the operation carries
/// a matching exemption; prohibited-class findings reject regardless of
/// exemptions. Accepted operations are recorded by entity key so repeated
/// submissions upsert rather than duplicate.
pub struct SandboxAdsClient {
    rules: Vec<PolicyRule>,
    accepted: DashMap<String, MutateResponse>,
    submissions: DashMap<String, u32>,
}

impl SandboxAdsClient {
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self {
            rules,
            accepted: DashMap::new(),
            submissions: DashMap::new(),
        }
    }

    /// How many times an entity key was submitted, accepted or not.
    pub fn submission_count(&self, entity_key: &str) -> u32 {
        self.submissions
            .get(entity_key)
            .map(|c| *c)
            .unwrap_or_default()
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    fn findings_for(&self, operation: &MutationOperation) -> Vec<PolicyTopicEntry> {
        let mut findings = Vec::new();
        for text in operation.text_fields() {
            let lower = text.to_lowercase();
            for rule in &self.rules {
                if lower.contains(&rule.phrase.to_lowercase()) {
                    findings.push(PolicyTopicEntry {
                        topic: rule.topic.clone(),
                        violating_text: text.to_string(),
                        category: rule.category,
                    });
                }
            }
        }
        findings
    }
}

impl AdsPlatformClient for SandboxAdsClient {
    fn mutate(
        &self,
        customer_id: &str,
        operation: &MutationOperation,
    ) -> Result<MutateResponse, PlatformError> {
        let key = operation.entity_key().to_string();
        *self.submissions.entry(key.clone()).or_insert(0) += 1;

        debug!(
            customer_id,
            entity_key = %key,
            exemptions = operation.exemptions.len(),
            "Sandbox mutate"
        );

        // Findings not yet covered by an exemption come back in the
        // rejection; prohibited findings are never covered.
        let uncovered: Vec<PolicyTopicEntry> = self
            .findings_for(operation)
            .into_iter()
            .filter(|f| !f.is_exemptible() || !operation.has_exemption(&f.exemption_key()))
            .collect();

        if !uncovered.is_empty() {
            return Err(PlatformError::PolicyFindings(uncovered));
        }

        let response = MutateResponse {
            resource_name: format!(
                "customers/{customer_id}/{}/{key}",
                operation.collection()
            ),
        };
        self.accepted.insert(key, response.clone());
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsync_core::types::{EntityStatus, ServingStatus, SyncMeta};

    fn campaign_op(name: &str) -> MutationOperation {
        MutationOperation::new(
            MutationKind::Create,
            MutationEntity::Campaign(Campaign {
                key: "c1".to_string(),
                customer_id: "123".to_string(),
                name: name.to_string(),
                status: EntityStatus::Enabled,
                advertising_channel_type: "SEARCH".to_string(),
                start_date: None,
                end_date: None,
                serving_status: ServingStatus::Unknown,
                meta: SyncMeta::default(),
            }),
        )
    }

    #[test]
    fn test_clean_operation_accepted() {
        let client = SandboxAdsClient::new(vec![PolicyRule {
            phrase: "miracle cure".to_string(),
            topic: "HEALTH_CLAIMS".to_string(),
            category: PolicyCategory::Limited,
        }]);

        let response = client.mutate("123", &campaign_op("Webinar Launch")).unwrap();
        assert_eq!(response.resource_name, "customers/123/campaigns/c1");
        assert_eq!(client.submission_count("c1"), 1);
    }

    #[test]
    fn test_flagged_phrase_produces_finding() {
        let client = SandboxAdsClient::new(vec![PolicyRule {
            phrase: "miracle cure".to_string(),
            topic: "HEALTH_CLAIMS".to_string(),
            category: PolicyCategory::Limited,
        }]);

        let err = client
            .mutate("123", &campaign_op("The Miracle Cure Webinar"))
            .unwrap_err();
        match err {
            PlatformError::PolicyFindings(findings) => {
                assert_eq!(findings.len(), 1);
                assert_eq!(findings[0].topic, "HEALTH_CLAIMS");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_exemption_covers_limited_finding() {
        let client = SandboxAdsClient::new(vec![PolicyRule {
            phrase: "miracle cure".to_string(),
            topic: "HEALTH_CLAIMS".to_string(),
            category: PolicyCategory::Limited,
        }]);

        let mut op = campaign_op("The Miracle Cure Webinar");
        let findings = match client.mutate("123", &op).unwrap_err() {
            PlatformError::PolicyFindings(f) => f,
            other => panic!("unexpected error: {other}"),
        };
        op.add_exemptions(findings.iter().map(|f| f.exemption_key()));

        assert!(client.mutate("123", &op).is_ok());
    }

    #[test]
    fn test_prohibited_finding_ignores_exemptions() {
        let client = SandboxAdsClient::new(vec![PolicyRule {
            phrase: "firearms".to_string(),
            topic: "WEAPONS".to_string(),
            category: PolicyCategory::Prohibited,
        }]);

        let mut op = campaign_op("Discount Firearms Depot");
        let findings = match client.mutate("123", &op).unwrap_err() {
            PlatformError::PolicyFindings(f) => f,
            other => panic!("unexpected error: {other}"),
        };
        op.add_exemptions(findings.iter().map(|f| f.exemption_key()));

        assert!(client.mutate("123", &op).is_err());
    }

    #[test]
    fn test_add_exemptions_deduplicates() {
        let mut op = campaign_op("anything");
        let key = ExemptionKey {
            topic: "T".to_string(),
            violating_text: "x".to_string(),
        };
        op.add_exemptions([key.clone(), key.clone()]);
        op.add_exemptions([key]);
        assert_eq!(op.exemptions.len(), 1);
    }
}
