//! OCI Content Digest validation and computation.
//!
//! This module wraps `oci_spec::image::Digest` so digests parsed from
//! registry responses and digests computed locally share one type and one
//! error path.

use crate::error::{Result, ScoutError};
use oci_spec::image::Digest as OciDigest;
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;
use std::str::FromStr;


const SHA256_PREFIX: &str = "sha256:";

/// Represents a content digest, wrapping the `oci_spec::image::Digest` type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(OciDigest);

impl FromStr for Digest {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        let oci_digest = OciDigest::from_str(s).map_err(|e| ScoutError::Validation {
            message: format!("Invalid digest format: {}", e),
            source: Some(Box::new(e)),
        })?;
        Ok(Digest(oci_digest))
    }
}

impl From<OciDigest> for Digest {
    fn from(digest: OciDigest) -> Self {
        Digest(digest)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Digest {
    /// Computes the SHA-256 digest of `bytes`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagscout::Digest;
    ///
    /// let digest = Digest::sha256_of(b"").unwrap();
    /// assert_eq!(
    ///     digest.to_string(),
    ///     "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    /// );
    /// ```
    pub fn sha256_of(bytes: &[u8]) -> Result<Self> {
        let hash = Sha256::digest(bytes);
        Self::from_str(&format!("{}{:x}", SHA256_PREFIX, hash))
    }

    /// Returns the hex-encoded hash part of the digest.
    pub fn hex(&self) -> &str {
        self.0.digest()
    }

    /// Returns true if the digest uses the sha256 algorithm.
    pub fn is_sha256(&self) -> bool {
        self.to_string().starts_with(SHA256_PREFIX)
    }

    /// Checks that `bytes` hash to this digest.
    ///
    /// Only sha256 digests can be verified; any other algorithm is reported
    /// as a validation error rather than silently accepted.
    pub fn verify(&self, bytes: &[u8]) -> Result<()> {
        if !self.is_sha256() {
            return Err(ScoutError::validation(format!(
                "Unsupported digest algorithm in {}. Only sha256 is supported",
                self
            )));
        }

        let computed = Self::sha256_of(bytes)?;
        if computed != *self {
            return Err(ScoutError::validation(format!(
                "Digest mismatch: expected {}, computed {}",
                self, computed
            )));
        }

        Ok(())
    }
}
