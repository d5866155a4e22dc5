//! AdSync Express — campaign/asset synchronization against a policy-gated
//! ads platform.
//!
//! Main entry point: loads configuration, wires the asset store,
//! orchestrator, mutator, and reconcile engines, then runs one sync cycle
//! over a demo structure (the generation collaborator is simulated here).

use std::sync::Arc;
use std::time::{Duration, Instant};

use adsync_asset_store::AssetStore;
use adsync_core::config::AppConfig;
use adsync_core::policy::PolicyCategory;
use adsync_core::types::{
    Ad, AdType, Campaign, EntityStatus, FieldRole, GeneratedAdGroup, GeneratedStructure,
    ServingStatus, SyncMeta,
};
use adsync_core::SyncError;
use adsync_orchestrator::SyncOrchestrator;
use adsync_platform::{
    MutationEntity, MutationKind, MutationOperation, PolicyRetryMutator, PolicyRule,
    SandboxAdsClient,
};
use adsync_sync::ReconcileEngine;
use adsync_validation::RsaLimits;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "adsync")]
#[command(about = "Campaign/asset synchronization against a policy-gated ads platform")]
#[command(version)]
struct Cli {
    /// Customer account to mutate (overrides config)
    #[arg(long, env = "ADSYNC__PLATFORM__CUSTOMER_ID")]
    customer_id: Option<String>,

    /// Attempt ceiling for policy negotiation (overrides config)
    #[arg(long, env = "ADSYNC__PLATFORM__MAX_MUTATE_ATTEMPTS")]
    max_attempts: Option<u32>,

    /// Persist locally but skip the platform push
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn demo_structure() -> GeneratedStructure {
    GeneratedStructure {
        campaign_name: "Webinar HR Transformation".to_string(),
        ad_groups: vec![
            GeneratedAdGroup {
                name: "Target HR Managers".to_string(),
                headlines: vec![
                    "Transform HR Now".to_string(),
                    "Join The Live Webinar".to_string(),
                    "Best Ever HR Insights".to_string(),
                ],
                descriptions: vec![
                    "Join our webinar on HR transformation.".to_string(),
                    "Practical guidance from practitioners.".to_string(),
                ],
                path1: Some("webinar".to_string()),
                path2: Some("hr".to_string()),
                final_urls: vec!["https://example.com/webinar".to_string()],
            },
            GeneratedAdGroup {
                name: "Target CTOs".to_string(),
                headlines: vec![
                    "Transform HR Now".to_string(),
                    "Unlock AI Potential".to_string(),
                    "For Technical Leaders".to_string(),
                ],
                descriptions: vec![
                    "Technical deep dive for CTOs.".to_string(),
                    "Automate HR workflows with AI.".to_string(),
                ],
                path1: None,
                path2: None,
                final_urls: vec!["https://example.com/cto".to_string()],
            },
        ],
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adsync=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("AdSync Express starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(customer_id) = cli.customer_id {
        config.platform.customer_id = customer_id;
    }
    if let Some(max_attempts) = cli.max_attempts {
        config.platform.max_mutate_attempts = max_attempts;
    }

    info!(
        node_id = %config.node_id,
        customer_id = %config.platform.customer_id,
        max_attempts = config.platform.max_mutate_attempts,
        dry_run = cli.dry_run,
        "Configuration loaded"
    );

    // Wire the store and engines. The platform client is the sandbox with
    // a demo policy table; a real deployment injects the wire client here.
    let store = Arc::new(AssetStore::new());
    let orchestrator =
        SyncOrchestrator::new(store.clone()).with_limits(RsaLimits::from(&config.validation));
    let client = Arc::new(SandboxAdsClient::new(vec![
        PolicyRule {
            phrase: "best ever".to_string(),
            topic: "UNSUBSTANTIATED_CLAIMS".to_string(),
            category: PolicyCategory::Limited,
        },
        PolicyRule {
            phrase: "firearms".to_string(),
            topic: "WEAPONS".to_string(),
            category: PolicyCategory::Prohibited,
        },
    ]));
    let mutator = PolicyRetryMutator::new(client.clone(), config.platform.customer_id.clone())
        .with_max_attempts(config.platform.max_mutate_attempts);
    let campaigns: ReconcileEngine<Campaign> = ReconcileEngine::new();

    // 1. Persist the generated structure (validate, trim, dedup).
    let structure = demo_structure();
    let summary = orchestrator.persist_generated_structure(&structure)?;
    info!(
        assets = summary.assets_stored,
        links = summary.links_written,
        trimmed = summary.issues.len(),
        "Structure persisted"
    );

    if cli.dry_run {
        info!("Dry run, skipping platform push");
        return Ok(());
    }

    // 2. Push one ad mutation per ad group, negotiating policy findings.
    let deadline = Instant::now() + Duration::from_millis(config.platform.mutate_deadline_ms);
    for (i, group) in summary.ad_groups.iter().enumerate() {
        let links = store.links_from(&group.ad_group_key);
        let texts_for = |role: FieldRole| -> Vec<String> {
            links
                .iter()
                .filter(|l| l.field_role == role)
                .filter_map(|l| store.get(&l.to_hash).map(|a| a.text))
                .collect()
        };

        let operation = MutationOperation::new(
            MutationKind::Create,
            MutationEntity::Ad {
                ad: Ad {
                    key: format!("ad-{i}"),
                    ad_group_key: group.ad_group_key.clone(),
                    ad_type: AdType::ResponsiveSearchAd,
                    status: EntityStatus::Enabled,
                    final_urls: structure.ad_groups[i].final_urls.clone(),
                    meta: SyncMeta::default(),
                },
                headlines: texts_for(FieldRole::Headline),
                descriptions: texts_for(FieldRole::Description),
            },
        );

        match mutator.push(operation, Some(deadline)) {
            Ok(outcome) => info!(
                ad_group = %group.name,
                resource = %outcome.response.resource_name,
                attempts = outcome.attempts,
                exemptions = outcome.exemptions_applied,
                "Ad pushed"
            ),
            Err(SyncError::PolicyRejected { findings, attempts }) => {
                for finding in &findings {
                    warn!(
                        ad_group = %group.name,
                        topic = %finding.topic,
                        text = %finding.violating_text,
                        "Unresolved policy finding"
                    );
                }
                error!(ad_group = %group.name, attempts, "Ad rejected by policy");
            }
            Err(SyncError::DeadlineExceeded { attempts }) => {
                warn!(ad_group = %group.name, attempts, "Ad push abandoned at deadline");
            }
            Err(e) => return Err(e.into()),
        }
    }

    // 3. Reconcile the platform echo of the campaign into the local store.
    let platform_batch = vec![Campaign {
        key: "c1".to_string(),
        customer_id: config.platform.customer_id.clone(),
        name: structure.campaign_name.clone(),
        status: EntityStatus::Enabled,
        advertising_channel_type: "SEARCH".to_string(),
        start_date: None,
        end_date: None,
        serving_status: ServingStatus::Pending,
        meta: SyncMeta::default(),
    }];
    let reconciled = campaigns.reconcile(platform_batch, Utc::now())?;
    info!(
        inserted = reconciled.inserted,
        updated = reconciled.updated,
        skipped_stale = reconciled.skipped_stale,
        "Campaign batch reconciled"
    );

    info!(accepted = client.accepted_count(), "Sync cycle complete");
    Ok(())
}
