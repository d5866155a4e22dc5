//! Content-policy finding types shared between the platform client and the
//! retry mutator.

use serde::{Deserialize, Serialize};

/// Platform-defined class of a policy topic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyCategory {
    /// Never acceptable. Findings in this class cannot be exempted.
    Prohibited,
    /// Acceptable with an explicit exemption attached to the mutation.
    Limited,
    Unknown,
}

/// One policy finding extracted from a rejection response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyTopicEntry {
    pub topic: String,
    pub violating_text: String,
    pub category: PolicyCategory,
}

impl PolicyTopicEntry {
    /// Whether the platform would accept this finding given an exemption.
    pub fn is_exemptible(&self) -> bool {
        self.category != PolicyCategory::Prohibited
    }

    /// The exemption key that authorizes this exact finding.
    pub fn exemption_key(&self) -> ExemptionKey {
        ExemptionKey {
            topic: self.topic.clone(),
            violating_text: self.violating_text.clone(),
        }
    }
}

/// Signed acknowledgment attached to a mutation, authorizing the platform
/// to accept specific otherwise-rejected content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExemptionKey {
    pub topic: String,
    pub violating_text: String,
}
