//! Library configuration.
//!
//! This module holds the settings for the HTTP registry backend and the tag
//! lister, with sensible defaults layered under an optional YAML file.

use crate::error::{Result, ScoutError};
use config::{Config as ConfigRs, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;


/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub enrichment: Enrichment,
    #[serde(default)]
    pub registries: Registries,
}

impl Config {
    /// Parses a `Config` from a YAML string.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagscout::Config;
    ///
    /// let config = Config::from_yaml_str("enrichment:\n  concurrency: 2\n").unwrap();
    /// assert_eq!(config.enrichment.concurrency, 2);
    /// assert!(config.enrichment.fetch_metadata);
    /// ```
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = Self::defaults()?.add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder, None)
    }

    /// Loads a `Config` from an optional file path.
    ///
    /// Without a path the defaults are returned. A given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Self::defaults()?;

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).required(true));
        }

        Self::from_builder(builder, path)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = ConfigRs::try_from(&Config::default()).map_err(|e| {
            ScoutError::config_with_source("Failed to build default configuration", None, e)
        })?;

        Ok(ConfigRs::builder().add_source(defaults))
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: Option<&Path>,
    ) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                ScoutError::config_with_source(
                    "Failed to deserialize configuration".to_string(),
                    path.map(|p| p.display().to_string()),
                    e,
                )
            })
    }
}

/// Network settings for the HTTP backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Per-request timeout in seconds. 0 leaves timing out to the caller's
    /// cancellation token.
    #[serde(default)]
    pub timeout: u64,

    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: 0,
            max_idle_per_host: default_max_idle_per_host(),
        }
    }
}

fn default_max_idle_per_host() -> usize {
    10
}

/// Tag metadata enrichment settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enrichment {
    #[serde(default = "default_fetch_metadata")]
    pub fetch_metadata: bool,

    /// Maximum number of tags enriched at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Platform picked out of multi-platform image indexes.
    #[serde(default)]
    pub platform: PlatformSelector,
}

impl Default for Enrichment {
    fn default() -> Self {
        Self {
            fetch_metadata: default_fetch_metadata(),
            concurrency: default_concurrency(),
            platform: PlatformSelector::default(),
        }
    }
}

fn default_fetch_metadata() -> bool {
    true
}

fn default_concurrency() -> usize {
    8
}

/// OS/architecture pair used to resolve an image index to one image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformSelector {
    #[serde(default = "default_os")]
    pub os: String,

    #[serde(default = "default_architecture")]
    pub architecture: String,
}

impl Default for PlatformSelector {
    fn default() -> Self {
        Self {
            os: default_os(),
            architecture: default_architecture(),
        }
    }
}

fn default_os() -> String {
    "linux".to_string()
}

fn default_architecture() -> String {
    "amd64".to_string()
}

/// Per-registry settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Registries {
    /// Hosts (with optional port) reached over plain http.
    #[serde(default)]
    pub insecure: Vec<String>,
}
