//! Registry backend capability.
//!
//! The tag lister never speaks HTTP itself. It resolves references, lists
//! tags and fetches images through [`RegistryBackend`], and reads per-image
//! metadata through [`ImageHandle`]. [`HttpBackend`] implements both against
//! the OCI Distribution API; tests substitute in-memory backends.

use crate::client::Client;
use crate::config::{Config, PlatformSelector};
use crate::digest::Digest;
use crate::error::{Result, ScoutError};
use crate::oci::{ImageConfig, ImageManifest, ManifestOrIndex};
use crate::reference::{RepositoryRef, TaggedRef};
use async_trait::async_trait;
use std::future::Future;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};


/// Operations a registry must offer for tags to be listed and described.
#[async_trait]
pub trait RegistryBackend: Send + Sync {
    /// Handle to one resolved image.
    type Image: ImageHandle;

    /// Parses a `host/repo/image` string into a repository reference.
    fn resolve_repository(&self, source: &str) -> Result<RepositoryRef> {
        RepositoryRef::from_str(source)
    }

    /// Lists the raw tag names of a repository, in registry order.
    async fn list_tags(
        &self,
        repository: &RepositoryRef,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>>;

    /// Parses a `host/repo/image:tag` string into a tagged reference.
    fn resolve_tagged(&self, source: &str) -> Result<TaggedRef> {
        TaggedRef::from_str(source)
    }

    /// Fetches the image a tag points at.
    async fn fetch_image(
        &self,
        reference: &TaggedRef,
        cancel: &CancellationToken,
    ) -> Result<Self::Image>;
}

/// Metadata accessors of a fetched image.
#[async_trait]
pub trait ImageHandle: Send + Sync {
    /// Content digest of the image manifest.
    fn digest(&self) -> Result<Digest>;

    /// Architecture, OS and creation time from the image configuration.
    async fn config(&self, cancel: &CancellationToken) -> Result<ImageConfig>;
}

/// Runs `future` unless `cancel` fires first.
pub async fn cancellable<T, F>(cancel: &CancellationToken, operation: &str, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ScoutError::cancelled(operation)),
        result = future => result,
    }
}

/// Registry backend speaking the OCI Distribution API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    platform: PlatformSelector,
}

impl HttpBackend {
    /// Creates a backend with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(&Config::default())
    }

    /// Creates a backend from `config`.
    pub fn with_config(config: &Config) -> Result<Self> {
        Ok(Self {
            client: Client::with_config(config)?,
            platform: config.enrichment.platform.clone(),
        })
    }

    /// Returns the platform used to pick an image out of an index.
    pub fn platform(&self) -> &PlatformSelector {
        &self.platform
    }

    async fn resolve_manifest(&self, reference: &TaggedRef) -> Result<(ImageManifest, Vec<u8>)> {
        let registry = reference.registry();
        let repository = reference.repository();

        let response = self
            .client
            .fetch_manifest(registry, repository, reference.tag())
            .await?;

        let index = match ManifestOrIndex::from_bytes(&response.bytes)? {
            ManifestOrIndex::Manifest(manifest) => return Ok((manifest, response.bytes)),
            index => index,
        };

        let child = index
            .find_platform(&self.platform.os, &self.platform.architecture)
            .map(|descriptor| Digest::from(descriptor.digest().clone()))
            .ok_or_else(|| {
                ScoutError::not_found(
                    "platform",
                    format!(
                        "{}/{} in {}",
                        self.platform.os, self.platform.architecture, reference
                    ),
                )
            })?;

        debug!(%reference, child = %child, "resolving index entry");

        let response = self
            .client
            .fetch_manifest(registry, repository, &child.to_string())
            .await?;
        child.verify(&response.bytes)?;

        match ManifestOrIndex::from_bytes(&response.bytes)? {
            ManifestOrIndex::Manifest(manifest) => Ok((manifest, response.bytes)),
            ManifestOrIndex::Index(_) => Err(ScoutError::validation(format!(
                "Index entry {} of {} is itself an index",
                child, reference
            ))),
        }
    }
}

#[async_trait]
impl RegistryBackend for HttpBackend {
    type Image = RemoteImage;

    async fn list_tags(
        &self,
        repository: &RepositoryRef,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        cancellable(
            cancel,
            "list tags",
            self.client
                .fetch_tags(repository.registry(), repository.repository()),
        )
        .await
    }

    #[instrument(skip(self, reference, cancel), fields(reference = %reference))]
    async fn fetch_image(
        &self,
        reference: &TaggedRef,
        cancel: &CancellationToken,
    ) -> Result<RemoteImage> {
        let (manifest, manifest_bytes) =
            cancellable(cancel, "fetch image", self.resolve_manifest(reference)).await?;

        Ok(RemoteImage {
            client: self.client.clone(),
            registry: reference.registry().to_string(),
            repository: reference.repository().to_string(),
            manifest,
            manifest_bytes,
        })
    }
}

/// A single-platform image fetched over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteImage {
    client: Client,
    registry: String,
    repository: String,
    manifest: ImageManifest,
    manifest_bytes: Vec<u8>,
}

impl RemoteImage {
    /// Returns the parsed manifest.
    pub fn manifest(&self) -> &ImageManifest {
        &self.manifest
    }
}

#[async_trait]
impl ImageHandle for RemoteImage {
    fn digest(&self) -> Result<Digest> {
        Digest::sha256_of(&self.manifest_bytes)
    }

    async fn config(&self, cancel: &CancellationToken) -> Result<ImageConfig> {
        let digest = Digest::from(self.manifest.config().digest().clone());

        let blob = cancellable(
            cancel,
            "fetch image config",
            self.client
                .fetch_blob(&self.registry, &self.repository, &digest),
        )
        .await?;

        ImageConfig::from_bytes(&blob)
    }
}
