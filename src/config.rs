//! Configuration loader and validator for the artwork rater.
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::model::ArtworkId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub gateway: Gateway,
    pub seed: Vec<SeedEntry>,
}

/// Remote service endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gateway {
    pub artwork_base_url: String,
    pub rating_url: String,
    pub image_base_url: String,
    pub user_agent: String,
}

/// One artwork listed at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedEntry {
    pub id: u32,
    /// Never fetch metadata for this artwork.
    #[serde(default)]
    pub disabled: bool,
}

impl Config {
    /// Seed as `(id, metadata_load_disabled)` pairs. Assumes `validate` passed.
    pub fn seed_entries(&self) -> Vec<(ArtworkId, bool)> {
        self.seed
            .iter()
            .filter_map(|s| ArtworkId::new(s.id).map(|id| (id, s.disabled)))
            .collect()
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory,
///   falling back to the built-in example when that file does not exist.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let content = match path {
        Some(p) => fs::read_to_string(p)?,
        None => {
            let default = Path::new("config.yaml");
            if default.exists() {
                fs::read_to_string(default)?
            } else {
                example().to_string()
            }
        }
    };
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !is_http_url(&cfg.gateway.artwork_base_url) {
        return Err(ConfigError::Invalid("gateway.artwork_base_url must be an http(s) URL"));
    }
    if !cfg.gateway.artwork_base_url.ends_with('/') {
        return Err(ConfigError::Invalid("gateway.artwork_base_url must end with '/'"));
    }
    if !is_http_url(&cfg.gateway.rating_url) {
        return Err(ConfigError::Invalid("gateway.rating_url must be an http(s) URL"));
    }
    if !is_http_url(&cfg.gateway.image_base_url) {
        return Err(ConfigError::Invalid("gateway.image_base_url must be an http(s) URL"));
    }
    if cfg.gateway.user_agent.trim().is_empty() {
        return Err(ConfigError::Invalid("gateway.user_agent must be non-empty"));
    }

    let mut seen = HashSet::new();
    for entry in &cfg.seed {
        if entry.id == 0 {
            return Err(ConfigError::Invalid("seed ids must be positive"));
        }
        if !seen.insert(entry.id) {
            return Err(ConfigError::Invalid("seed ids must be unique"));
        }
    }

    Ok(())
}

/// Returns the reference configuration, including the default seed list.
pub fn example() -> &'static str {
    r#"gateway:
  artwork_base_url: "https://api.artic.edu/api/v1/"
  rating_url: "https://v0867.mocklab.io/rating"
  image_base_url: "https://www.artic.edu/iiif/2/"
  user_agent: "art-rater/0.1"

seed:
  - id: 27992
  - id: 27998
  - id: 27999
  - id: 27997
    disabled: true
  - id: 27993
"#
}
