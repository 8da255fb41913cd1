//! OCI specification data structures.
//!
//! Manifests and indexes are deserialized with the `oci-spec` types. Image
//! configuration blobs are read leniently into [`ImageConfig`], keeping only
//! the fields tag enrichment needs.

pub use oci_spec::image::{Descriptor, ImageIndex, ImageManifest};

use crate::error::{Result, ScoutError};
use chrono::{DateTime, Utc};
use serde::Deserialize;


/// Media types accepted when fetching manifests.
pub const MANIFEST_ACCEPT: &str = "application/vnd.oci.image.manifest.v1+json, \
     application/vnd.oci.image.index.v1+json, \
     application/vnd.docker.distribution.manifest.v2+json, \
     application/vnd.docker.distribution.manifest.list.v2+json";

/// Represents either a single-platform image manifest or a multi-platform image index.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum ManifestOrIndex {
    /// A single-platform image manifest
    Manifest(ImageManifest),
    /// A multi-platform image index (or Docker manifest list)
    Index(ImageIndex),
}

impl ManifestOrIndex {
    /// Parse manifest bytes, automatically detecting whether it's a Manifest or Index.
    ///
    /// The `mediaType` field decides when present; otherwise the shape of the
    /// document does (`manifests` for an index, `layers`/`config` for a
    /// manifest).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| ScoutError::validation_with_source("Failed to parse manifest JSON", e))?;

        let media_type = value
            .get("mediaType")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let is_index = if media_type.contains("index") || media_type.contains("list") {
            true
        } else if media_type.contains("manifest") {
            false
        } else if value.get("manifests").is_some() {
            true
        } else if value.get("layers").is_some() || value.get("config").is_some() {
            false
        } else {
            return Err(ScoutError::validation(
                "Unable to determine if content is a manifest or index",
            ));
        };

        if is_index {
            let index: ImageIndex = serde_json::from_value(value).map_err(|e| {
                ScoutError::validation_with_source("Failed to parse image index", e)
            })?;
            Ok(ManifestOrIndex::Index(index))
        } else {
            let manifest: ImageManifest = serde_json::from_value(value).map_err(|e| {
                ScoutError::validation_with_source("Failed to parse image manifest", e)
            })?;
            Ok(ManifestOrIndex::Manifest(manifest))
        }
    }

    /// Find a manifest descriptor for a specific platform.
    ///
    /// Always `None` for a single-platform manifest.
    pub fn find_platform(&self, os: &str, arch: &str) -> Option<&Descriptor> {
        match self {
            ManifestOrIndex::Manifest(_) => None,
            ManifestOrIndex::Index(index) => index.manifests().iter().find(|desc| {
                desc.platform().as_ref().is_some_and(|p| {
                    p.os().to_string() == os && p.architecture().to_string() == arch
                })
            }),
        }
    }
}

/// The parts of an image configuration blob that describe a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    pub architecture: String,
    pub os: String,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawImageConfig {
    #[serde(default)]
    architecture: String,
    #[serde(default)]
    os: String,
    #[serde(default)]
    created: Option<String>,
}

impl ImageConfig {
    /// Parses an image configuration blob.
    ///
    /// A missing or non-RFC 3339 `created` field yields `created: None`
    /// instead of an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: RawImageConfig = serde_json::from_slice(bytes).map_err(|e| {
            ScoutError::validation_with_source("Failed to parse image configuration", e)
        })?;

        let created = raw.created.as_deref().and_then(|ts| {
            DateTime::parse_from_rfc3339(ts)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        });

        Ok(Self {
            architecture: raw.architecture,
            os: raw.os,
            created,
        })
    }
}
