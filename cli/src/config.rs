//! Configuration for the visualization pipeline.

use embedviz_analysis::ClusterConfig;
use embedviz_report::{DEFAULT_MAX_LEN, ExportConfig};

use crate::error::{PipelineError, Result};

/// Set to `false` or `0` to skip opening the browser.
pub const ENV_OPEN_BROWSER: &str = "EMBEDVIZ_OPEN_BROWSER";

/// Configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// K-means settings.
    pub cluster: ClusterConfig,

    /// Output file and browser settings.
    pub export: ExportConfig,

    /// Maximum length of point labels.
    pub label_max_len: usize,
}

impl PipelineConfig {
    /// Set the clustering configuration.
    pub fn with_cluster(mut self, config: ClusterConfig) -> Self {
        self.cluster = config;
        self
    }

    /// Set the export configuration.
    pub fn with_export(mut self, config: ExportConfig) -> Self {
        self.export = config;
        self
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_OPEN_BROWSER) {
            config.export.open_browser = parse_bool(&raw).ok_or_else(|| {
                PipelineError::Config(format!("{ENV_OPEN_BROWSER} must be a boolean, got {raw:?}"))
            })?;
        }
        Ok(config)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            export: ExportConfig::default(),
            label_max_len: DEFAULT_MAX_LEN,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
