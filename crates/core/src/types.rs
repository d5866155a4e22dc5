use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a platform-synced entity, as reported by the
/// external ads platform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Enabled,
    Paused,
    Removed,
    Unknown,
}

/// Read-only serving state. Platform-authoritative; local edits to this
/// field are meaningless and always overwritten on sync.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
    Serving,
    Pending,
    Suspended,
    Ended,
    Unknown,
}

impl Default for ServingStatus {
    fn default() -> Self {
        ServingStatus::Unknown
    }
}

/// Local view of how a record relates to the platform copy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Synced,
    Pending,
    Conflict,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdType {
    ResponsiveSearchAd,
    /// Legacy format, read-only on the platform side.
    ExpandedTextAd,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Text,
    Image,
    Video,
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssetType::Text => "TEXT",
            AssetType::Image => "IMAGE",
            AssetType::Video => "VIDEO",
        };
        f.write_str(label)
    }
}

/// Which ad field an asset is linked into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldRole {
    Headline,
    Description,
}

/// Local-authority sync metadata carried by every platform-synced entity.
///
/// `is_dirty` marks a local edit that must survive inbound syncs until the
/// edit is pushed back out and the flag is explicitly cleared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncMeta {
    pub sync_status: SyncStatus,
    pub is_dirty: bool,
    pub internal_notes: Option<String>,
    pub first_synced_at: Option<DateTime<Utc>>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Default for SyncMeta {
    fn default() -> Self {
        Self {
            sync_status: SyncStatus::Pending,
            is_dirty: false,
            internal_notes: None,
            first_synced_at: None,
            last_synced_at: None,
        }
    }
}

/// Campaign vertex.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    /// Platform-assigned identity (document key).
    pub key: String,
    pub customer_id: String,
    pub name: String,
    pub status: EntityStatus,
    pub advertising_channel_type: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub serving_status: ServingStatus,
    #[serde(flatten)]
    pub meta: SyncMeta,
}

/// Ad group vertex. Belongs to exactly one campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdGroup {
    pub key: String,
    pub campaign_key: String,
    pub name: String,
    pub status: EntityStatus,
    pub cpc_bid_micros: Option<i64>,
    #[serde(flatten)]
    pub meta: SyncMeta,
}

/// Ad vertex. Text content lives in linked assets, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ad {
    pub key: String,
    pub ad_group_key: String,
    pub ad_type: AdType,
    pub status: EntityStatus,
    pub final_urls: Vec<String>,
    #[serde(flatten)]
    pub meta: SyncMeta,
}

/// Deduplicated text asset. Identity is the content hash of
/// `(asset_type, text)` — the store is content-addressed, so the hash is
/// the primary key and content is immutable for a given identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub hash: String,
    pub text: String,
    pub asset_type: AssetType,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Usage edge from an ad-group/ad document to an asset, keyed by
/// `(from, to, field_role)`. `pinned_field` is last-write-wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetLink {
    pub from_key: String,
    pub to_hash: String,
    pub field_role: FieldRole,
    pub pinned_field: Option<String>,
}

impl AssetLink {
    /// Natural key of the edge. Two links with the same natural key are
    /// the same edge and upsert over each other.
    pub fn natural_key(&self) -> (String, String, FieldRole) {
        (self.from_key.clone(), self.to_hash.clone(), self.field_role)
    }
}

/// A single validation finding, structured so callers can build
/// field-level remediation output instead of parsing strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ─── Generated structure (AI collaborator input) ────────────────────────────

/// Campaign structure produced by the copy-generation collaborator.
/// Untrusted: always re-validated before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedStructure {
    pub campaign_name: String,
    pub ad_groups: Vec<GeneratedAdGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedAdGroup {
    pub name: String,
    pub headlines: Vec<String>,
    pub descriptions: Vec<String>,
    #[serde(default)]
    pub path1: Option<String>,
    #[serde(default)]
    pub path2: Option<String>,
    #[serde(default)]
    pub final_urls: Vec<String>,
}
