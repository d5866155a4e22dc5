use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `ADSYNC__` and TOML config files.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// External ads-platform settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_customer_id")]
    pub customer_id: String,
    /// Attempt ceiling for the policy-exemption retry loop.
    #[serde(default = "default_max_mutate_attempts")]
    pub max_mutate_attempts: u32,
    /// Overall deadline for one mutation lifecycle, checked between
    /// attempts only.
    #[serde(default = "default_mutate_deadline_ms")]
    pub mutate_deadline_ms: u64,
}

/// Copy-generation collaborator settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_headline_count")]
    pub headline_count: usize,
    #[serde(default = "default_description_count")]
    pub description_count: usize,
}

/// Ad-text budgets. Defaults track the platform's published RSA limits;
/// overridable for accounts with relaxed betas.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_headline_width")]
    pub headline_width: usize,
    #[serde(default = "default_description_width")]
    pub description_width: usize,
    #[serde(default = "default_min_headlines")]
    pub min_headlines: usize,
    #[serde(default = "default_max_headlines")]
    pub max_headlines: usize,
    #[serde(default = "default_min_descriptions")]
    pub min_descriptions: usize,
    #[serde(default = "default_max_descriptions")]
    pub max_descriptions: usize,
    #[serde(default = "default_path_width")]
    pub path_width: usize,
}

// Default functions
fn default_node_id() -> String {
    "sync-01".to_string()
}
fn default_customer_id() -> String {
    "0000000000".to_string()
}
fn default_max_mutate_attempts() -> u32 {
    3
}
fn default_mutate_deadline_ms() -> u64 {
    30_000
}
fn default_language() -> String {
    "de".to_string()
}
fn default_headline_count() -> usize {
    15
}
fn default_description_count() -> usize {
    4
}
fn default_headline_width() -> usize {
    30
}
fn default_description_width() -> usize {
    90
}
fn default_min_headlines() -> usize {
    3
}
fn default_max_headlines() -> usize {
    15
}
fn default_min_descriptions() -> usize {
    2
}
fn default_max_descriptions() -> usize {
    4
}
fn default_path_width() -> usize {
    15
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            customer_id: default_customer_id(),
            max_mutate_attempts: default_max_mutate_attempts(),
            mutate_deadline_ms: default_mutate_deadline_ms(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            headline_count: default_headline_count(),
            description_count: default_description_count(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            headline_width: default_headline_width(),
            description_width: default_description_width(),
            min_headlines: default_min_headlines(),
            max_headlines: default_max_headlines(),
            min_descriptions: default_min_descriptions(),
            max_descriptions: default_max_descriptions(),
            path_width: default_path_width(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            platform: PlatformConfig::default(),
            generation: GenerationConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("ADSYNC")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.platform.max_mutate_attempts, 3);
        assert_eq!(config.generation.headline_count, 15);
        assert_eq!(config.generation.description_count, 4);
    }

    #[test]
    fn test_validation_defaults_match_platform_limits() {
        let validation = ValidationConfig::default();
        assert_eq!(validation.headline_width, 30);
        assert_eq!(validation.description_width, 90);
        assert_eq!(validation.min_headlines, 3);
        assert_eq!(validation.max_headlines, 15);
        assert_eq!(validation.min_descriptions, 2);
        assert_eq!(validation.max_descriptions, 4);
        assert_eq!(validation.path_width, 15);
    }
}
