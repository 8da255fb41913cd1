//! The tag record produced by a listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;


/// One published tag and whatever metadata could be resolved for it.
///
/// `tag` is always set. Every other field is filled independently and may be
/// `None` on its own: a failed config lookup does not clear a resolved digest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageTag {
    pub tag: String,

    /// Content digest, e.g. `sha256:...`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    /// Build time taken from the image configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ImageTag {
    /// Creates a record carrying only the tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Returns true if no metadata beyond the tag name is present.
    pub fn is_bare(&self) -> bool {
        self.sha.is_none()
            && self.architecture.is_none()
            && self.os.is_none()
            && self.timestamp.is_none()
    }

    /// Returns true if every metadata field is present.
    pub fn is_complete(&self) -> bool {
        self.sha.is_some()
            && self.architecture.is_some()
            && self.os.is_some()
            && self.timestamp.is_some()
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;

        if let (Some(os), Some(arch)) = (&self.os, &self.architecture) {
            write!(f, " {}/{}", os, arch)?;
        }
        if let Some(sha) = &self.sha {
            write!(f, " {}", sha)?;
        }

        Ok(())
    }
}
