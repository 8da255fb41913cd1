//! OCI image reference parsing.
//!
//! Two shapes of reference are used while listing tags: a bare repository
//! (`host/repo/image`) for the tag list call, and a tag-qualified reference
//! (`host/repo/image:tag`) for each metadata lookup. Both wrap
//! `oci_spec::distribution::Reference` so the registry naming rules live in
//! one place.

use crate::error::{Result, ScoutError};
use oci_spec::distribution::Reference as OciReference;
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
mod tests;

fn parse(s: &str) -> Result<OciReference> {
    OciReference::from_str(s).map_err(|e| ScoutError::Validation {
        message: format!("Invalid image reference '{}': {}", s, e),
        source: Some(Box::new(e)),
    })
}

/// A repository reference without tag or digest, e.g. `ghcr.io/user/repo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef(OciReference);

impl FromStr for RepositoryRef {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        let reference = parse(s)?;

        let last_component = s.rsplit('/').next().unwrap_or(s);
        if reference.digest().is_some() || last_component.contains(':') {
            return Err(ScoutError::validation(format!(
                "Repository reference '{}' must not carry a tag or digest",
                s
            )));
        }

        Ok(RepositoryRef(reference))
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.registry(), self.repository())
    }
}

impl RepositoryRef {
    /// Returns the registry part of the reference.
    pub fn registry(&self) -> &str {
        self.0.registry()
    }

    /// Returns the repository path inside the registry.
    pub fn repository(&self) -> &str {
        self.0.repository()
    }
}

/// A tag-qualified reference, e.g. `ghcr.io/user/repo:latest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedRef(OciReference);

impl FromStr for TaggedRef {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        let reference = parse(s)?;

        if reference.tag().is_none() {
            return Err(ScoutError::validation(format!(
                "Reference '{}' has no tag",
                s
            )));
        }

        Ok(TaggedRef(reference))
    }
}

impl fmt::Display for TaggedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.registry(), self.repository(), self.tag())
    }
}

impl TaggedRef {
    /// Returns the registry part of the reference.
    pub fn registry(&self) -> &str {
        self.0.registry()
    }

    /// Returns the repository path inside the registry.
    pub fn repository(&self) -> &str {
        self.0.repository()
    }

    /// Returns the tag.
    pub fn tag(&self) -> &str {
        // Presence is checked on construction.
        self.0.tag().unwrap_or_default()
    }
}
