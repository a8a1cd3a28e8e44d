use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::LabelOrder;
use crate::ensembl::BatchOptions;
use crate::error::VisError;
use crate::queries::WIKIDATA_ENDPOINT;
use crate::reshape::{DEFAULT_BUBBLE_TOP_N, DEFAULT_HEATMAP_TOP_N, PipelineOptions};
use crate::similarity::{DEFAULT_THRESHOLD, SimilarityOptions};

pub const CONFIG_FILE: &str = "ortholog-vis.json";
pub const DEFAULT_USER_AGENT: &str = concat!("ortholog-vis/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub similarity_threshold: Option<f64>,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub label_order: Option<LabelOrder>,
    #[serde(default)]
    pub normalize_rows: Option<bool>,
    #[serde(default)]
    pub prefetch: Option<bool>,
    #[serde(default)]
    pub ensembl_chunk_size: Option<usize>,
    #[serde(default)]
    pub ensembl_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub endpoint: String,
    pub user_agent: String,
    pub similarity_threshold: f64,
    pub bubble_top_n: usize,
    pub heatmap_top_n: usize,
    pub label_order: LabelOrder,
    pub normalize_rows: bool,
    pub prefetch: bool,
    pub ensembl_chunk_size: usize,
    pub ensembl_delay: Duration,
    pub source: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let batch = BatchOptions::default();
        Self {
            schema_version: 1,
            endpoint: WIKIDATA_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            similarity_threshold: DEFAULT_THRESHOLD,
            bubble_top_n: DEFAULT_BUBBLE_TOP_N,
            heatmap_top_n: DEFAULT_HEATMAP_TOP_N,
            label_order: LabelOrder::default(),
            normalize_rows: false,
            prefetch: true,
            ensembl_chunk_size: batch.chunk_size,
            ensembl_delay: batch.delay,
            source: None,
        }
    }
}

impl ResolvedConfig {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            similarity: SimilarityOptions {
                threshold: self.similarity_threshold,
            },
            label_order: self.label_order,
            normalize_rows: self.normalize_rows,
            bubble_top_n: self.bubble_top_n,
            heatmap_top_n: self.heatmap_top_n,
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            chunk_size: self.ensembl_chunk_size,
            delay: self.ensembl_delay,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, VisError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => match Self::locate() {
                Ok(found) => found,
                Err(VisError::MissingConfig) => {
                    debug!("no config file found, using defaults");
                    return Self::resolve_config(Config::default());
                }
                Err(err) => return Err(err),
            },
        };

        let content = fs::read_to_string(&config_path)
            .map_err(|_| VisError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| VisError::ConfigParse(err.to_string()))?;
        debug!(path = %config_path.display(), "loaded config");

        let mut resolved = Self::resolve_config(config)?;
        resolved.source = Some(config_path);
        Ok(resolved)
    }

    pub fn locate() -> Result<PathBuf, VisError> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Ok(local);
        }
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("ortholog-vis").join(CONFIG_FILE))
            .filter(|path| path.exists())
            .ok_or(VisError::MissingConfig)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, VisError> {
        let defaults = ResolvedConfig::default();

        let similarity_threshold = config
            .similarity_threshold
            .unwrap_or(defaults.similarity_threshold);
        if !(0.0..=1.0).contains(&similarity_threshold) {
            return Err(VisError::ConfigValue(format!(
                "similarity_threshold must be within [0, 1], got {similarity_threshold}"
            )));
        }

        if config.top_n == Some(0) {
            return Err(VisError::ConfigValue("top_n must be at least 1".to_string()));
        }
        if config.ensembl_chunk_size == Some(0) {
            return Err(VisError::ConfigValue(
                "ensembl_chunk_size must be at least 1".to_string(),
            ));
        }

        let endpoint = config.endpoint.unwrap_or(defaults.endpoint);
        if endpoint.trim().is_empty() {
            return Err(VisError::ConfigValue("endpoint must not be empty".to_string()));
        }

        Ok(ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(defaults.schema_version),
            endpoint,
            user_agent: config.user_agent.unwrap_or(defaults.user_agent),
            similarity_threshold,
            bubble_top_n: config.top_n.unwrap_or(defaults.bubble_top_n),
            heatmap_top_n: config.top_n.unwrap_or(defaults.heatmap_top_n),
            label_order: config.label_order.unwrap_or(defaults.label_order),
            normalize_rows: config.normalize_rows.unwrap_or(defaults.normalize_rows),
            prefetch: config.prefetch.unwrap_or(defaults.prefetch),
            ensembl_chunk_size: config
                .ensembl_chunk_size
                .unwrap_or(defaults.ensembl_chunk_size),
            ensembl_delay: config
                .ensembl_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.ensembl_delay),
            source: None,
        })
    }
}
