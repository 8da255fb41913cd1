//! Tag enumeration for a single image.
//!
//! [`TagLister`] asks a [`RegistryBackend`] for the tags of
//! `host/repo/image` and, when metadata fetching is enabled, looks up every
//! tag's digest, platform and build time. A tag whose lookup fails is still
//! returned, carrying whatever could be resolved.

use crate::backend::{HttpBackend, ImageHandle, RegistryBackend};
use crate::config::Config;
use crate::error::Result;
use crate::path::split_path;
use crate::tag::ImageTag;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};


const DEFAULT_CONCURRENCY: usize = 8;

/// A source of image tags that a poller can choose among.
#[async_trait]
pub trait TagSource: Send + Sync {
    /// Short identifier of the implementation.
    fn name(&self) -> &'static str;

    /// Returns true if this source can serve images on `host`.
    fn is_host(&self, host: &str) -> bool;

    /// Lists the tags of `host/repo/image`.
    async fn list_tags(
        &self,
        cancel: &CancellationToken,
        host: &str,
        repo: &str,
        image: &str,
    ) -> Result<Vec<ImageTag>>;

    /// Splits an image path into `(repo, image)`.
    fn repo_image_from_path(&self, path: &str) -> (String, String);
}

/// Result of looking up one tag's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TagOutcome {
    /// Every lookup succeeded.
    Resolved(ImageTag),
    /// The image was fetched but its digest or config was not.
    Partial(ImageTag),
    /// The image could not be addressed or fetched.
    Unresolved(ImageTag),
}

impl TagOutcome {
    pub(crate) fn into_tag(self) -> ImageTag {
        match self {
            Self::Resolved(tag) | Self::Partial(tag) | Self::Unresolved(tag) => tag,
        }
    }
}

/// Lists image tags through a registry backend.
///
/// # Examples
///
/// ```no_run
/// use libtagscout::TagLister;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run() -> libtagscout::Result<()> {
/// let lister = TagLister::new()?;
/// let tags = lister
///     .list_tags(&CancellationToken::new(), "ghcr.io", "acme", "api")
///     .await?;
///
/// for tag in tags {
///     println!("{}", tag);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TagLister<B = HttpBackend> {
    backend: B,
    fetch_metadata: bool,
    concurrency: usize,
}

impl TagLister<HttpBackend> {
    /// Creates a lister over HTTP with metadata fetching enabled.
    pub fn new() -> Result<Self> {
        Self::with_config(&Config::default())
    }

    /// Creates a lister over HTTP configured from `config`.
    pub fn with_config(config: &Config) -> Result<Self> {
        Ok(Self::with_backend(HttpBackend::with_config(config)?)
            .fetch_metadata(config.enrichment.fetch_metadata)
            .concurrency(config.enrichment.concurrency))
    }
}

impl<B: RegistryBackend> TagLister<B> {
    /// Creates a lister over an arbitrary backend with metadata fetching
    /// enabled.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            fetch_metadata: true,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Enables or disables the per-tag metadata lookup.
    pub fn fetch_metadata(mut self, enabled: bool) -> Self {
        self.fetch_metadata = enabled;
        self
    }

    /// Sets how many tags are looked up at once. Zero is treated as one.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn name(&self) -> &'static str {
        "oci-registry"
    }

    /// Any OCI registry is served, so every host matches.
    pub fn is_host(&self, _host: &str) -> bool {
        true
    }

    pub fn repo_image_from_path(&self, path: &str) -> (String, String) {
        split_path(path)
    }

    /// Lists the tags of `host/repo/image` in registry order.
    ///
    /// Fails only if the repository cannot be addressed or its tag list
    /// cannot be fetched. Metadata lookups that fail leave the affected
    /// fields unset.
    #[instrument(skip(self, cancel))]
    pub async fn list_tags(
        &self,
        cancel: &CancellationToken,
        host: &str,
        repo: &str,
        image: &str,
    ) -> Result<Vec<ImageTag>> {
        let source = format!("{}/{}/{}", host, repo, image);
        let repository = self.backend.resolve_repository(&source)?;
        let raw = self.backend.list_tags(&repository, cancel).await?;

        debug!(%repository, count = raw.len(), "listed tags");

        if !self.fetch_metadata {
            return Ok(raw.into_iter().map(ImageTag::new).collect());
        }

        let lookups: Vec<_> = raw
            .into_iter()
            .map(|tag| self.enrich(&source, tag, cancel))
            .collect();
        let outcomes: Vec<TagOutcome> = stream::iter(lookups)
            .buffered(self.concurrency)
            .collect()
            .await;

        let unresolved = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, TagOutcome::Unresolved(_)))
            .count();
        let partial = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, TagOutcome::Partial(_)))
            .count();
        debug!(%repository, partial, unresolved, "resolved tag metadata");

        Ok(outcomes.into_iter().map(TagOutcome::into_tag).collect())
    }

    async fn enrich(&self, source: &str, tag: String, cancel: &CancellationToken) -> TagOutcome {
        let mut record = ImageTag::new(tag);

        let reference = match self
            .backend
            .resolve_tagged(&format!("{}:{}", source, record.tag))
        {
            Ok(reference) => reference,
            Err(e) => {
                debug!(tag = %record.tag, error = %e, "invalid tagged reference");
                return TagOutcome::Unresolved(record);
            }
        };

        let image = match self.backend.fetch_image(&reference, cancel).await {
            Ok(image) => image,
            Err(e) => {
                debug!(%reference, error = %e, "failed to fetch image");
                return TagOutcome::Unresolved(record);
            }
        };

        let mut resolved = true;

        match image.digest() {
            Ok(digest) => record.sha = Some(digest.to_string()),
            Err(e) => {
                debug!(%reference, error = %e, "failed to compute digest");
                resolved = false;
            }
        }

        match image.config(cancel).await {
            Ok(config) => {
                record.architecture = Some(config.architecture).filter(|a| !a.is_empty());
                record.os = Some(config.os).filter(|os| !os.is_empty());
                record.timestamp = config.created;
            }
            Err(e) => {
                debug!(%reference, error = %e, "failed to fetch image config");
                resolved = false;
            }
        }

        if resolved {
            TagOutcome::Resolved(record)
        } else {
            TagOutcome::Partial(record)
        }
    }
}

#[async_trait]
impl<B: RegistryBackend> TagSource for TagLister<B> {
    fn name(&self) -> &'static str {
        TagLister::name(self)
    }

    fn is_host(&self, host: &str) -> bool {
        TagLister::is_host(self, host)
    }

    async fn list_tags(
        &self,
        cancel: &CancellationToken,
        host: &str,
        repo: &str,
        image: &str,
    ) -> Result<Vec<ImageTag>> {
        TagLister::list_tags(self, cancel, host, repo, image).await
    }

    fn repo_image_from_path(&self, path: &str) -> (String, String) {
        TagLister::repo_image_from_path(self, path)
    }
}
