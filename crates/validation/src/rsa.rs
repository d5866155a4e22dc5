//! Batch validation for responsive-search-ad asset sets.

use adsync_core::config::ValidationConfig;
use adsync_core::types::ValidationIssue;
use serde::{Deserialize, Serialize};

use crate::width::{display_width, validate_field};

/// Platform budgets for one responsive search ad.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsaLimits {
    pub headline_width: usize,
    pub description_width: usize,
    pub min_headlines: usize,
    pub max_headlines: usize,
    pub min_descriptions: usize,
    pub max_descriptions: usize,
    pub path_width: usize,
}

impl Default for RsaLimits {
    fn default() -> Self {
        Self {
            headline_width: 30,
            description_width: 90,
            min_headlines: 3,
            max_headlines: 15,
            min_descriptions: 2,
            max_descriptions: 4,
            path_width: 15,
        }
    }
}

impl From<&ValidationConfig> for RsaLimits {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            headline_width: config.headline_width,
            description_width: config.description_width,
            min_headlines: config.min_headlines,
            max_headlines: config.max_headlines,
            min_descriptions: config.min_descriptions,
            max_descriptions: config.max_descriptions,
            path_width: config.path_width,
        }
    }
}

/// Validate a complete RSA asset set: per-field width budgets plus count
/// bounds and optional display-path segments.
pub fn validate_rsa_batch(
    headlines: &[String],
    descriptions: &[String],
    path1: Option<&str>,
    path2: Option<&str>,
    limits: &RsaLimits,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if headlines.len() < limits.min_headlines {
        issues.push(ValidationIssue::new(
            "headlines",
            format!(
                "minimum {} headlines required (got {})",
                limits.min_headlines,
                headlines.len()
            ),
        ));
    }
    if headlines.len() > limits.max_headlines {
        issues.push(ValidationIssue::new(
            "headlines",
            format!(
                "maximum {} headlines allowed (got {})",
                limits.max_headlines,
                headlines.len()
            ),
        ));
    }

    if descriptions.len() < limits.min_descriptions {
        issues.push(ValidationIssue::new(
            "descriptions",
            format!(
                "minimum {} descriptions required (got {})",
                limits.min_descriptions,
                descriptions.len()
            ),
        ));
    }
    if descriptions.len() > limits.max_descriptions {
        issues.push(ValidationIssue::new(
            "descriptions",
            format!(
                "maximum {} descriptions allowed (got {})",
                limits.max_descriptions,
                descriptions.len()
            ),
        ));
    }

    for (i, headline) in headlines.iter().enumerate() {
        issues.extend(validate_field(
            &format!("headline[{i}]"),
            headline,
            limits.headline_width,
        ));
    }

    for (i, description) in descriptions.iter().enumerate() {
        issues.extend(validate_field(
            &format!("description[{i}]"),
            description,
            limits.description_width,
        ));
    }

    for (name, path) in [("path1", path1), ("path2", path2)] {
        if let Some(path) = path {
            if display_width(path) > limits.path_width {
                issues.push(ValidationIssue::new(
                    name,
                    format!("exceeds {} character units", limits.path_width),
                ));
            }
        }
    }

    issues
}
