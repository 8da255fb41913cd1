//! Tagscout - Registry Tag Discovery Library
//!
//! Tagscout lists the published tags of a container image on any
//! OCI-compliant registry and, optionally, resolves each tag's content
//! digest, platform and build time.
//!
//! # Quick Start
//!
//! ```no_run
//! use libtagscout::TagLister;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let lister = TagLister::new()?;
//!     let (repo, image) = lister.repo_image_from_path("library/nginx");
//!
//!     let tags = lister
//!         .list_tags(&CancellationToken::new(), "docker.io", &repo, &image)
//!         .await?;
//!     for tag in tags {
//!         println!("{}", tag);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Behaviour
//!
//! - Tags are returned in the order the registry lists them
//! - A tag whose metadata cannot be resolved is still returned, with the
//!   unresolved fields left empty
//! - Only failing to address the repository or to fetch its tag list fails
//!   the call
//!
//! # Main Types
//!
//! - [`TagLister`] - Lists and describes tags
//! - [`TagSource`] - Interface for choosing among several listers
//! - [`ImageTag`] - One tag and its metadata
//! - [`RegistryBackend`] - Registry capability a lister runs against
//! - [`HttpBackend`] - OCI Distribution API implementation of that capability
//! - [`Config`] - Network, enrichment and registry settings

#![warn(clippy::all)]

/// Returns the libtagscout crate version.
///
/// # Examples
///
/// ```
/// let version = libtagscout::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub use backend::{HttpBackend, ImageHandle, RegistryBackend, RemoteImage};
pub use config::Config;
pub use digest::Digest;
pub use error::{Result, ScoutError};
pub use lister::{TagLister, TagSource};
pub use oci::ImageConfig;
pub use path::split_path;
pub use reference::{RepositoryRef, TaggedRef};
pub use tag::ImageTag;

pub mod backend;
pub mod config;
pub mod error;
pub mod lister;
pub mod path;
pub mod tag;

// Registry plumbing used by HttpBackend
#[doc(hidden)]
pub mod auth;
#[doc(hidden)]
pub mod client;
#[doc(hidden)]
pub mod digest;
#[doc(hidden)]
pub mod oci;
#[doc(hidden)]
pub mod reference;
