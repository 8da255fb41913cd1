//! HTTP client for OCI registry communication.
//!
//! This module provides a thin HTTP client built on reqwest for the parts of
//! the OCI Distribution Specification v2 API that tag discovery needs: tag
//! listing, manifest fetching and blob fetching. A single client serves any
//! number of registries; the registry host is passed per call.

use crate::auth::{AuthChallenge, TokenResponse};
use crate::config::Config;
use crate::digest::Digest;
use crate::error::{Result, ScoutError};
use crate::oci::MANIFEST_ACCEPT;
use reqwest::header::{ACCEPT, HeaderMap, LINK, WWW_AUTHENTICATE};
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument, trace};

#[cfg(test)]
mod tests;

/// Endpoint serving the `docker.io` registry.
const DOCKER_HUB_URL: &str = "https://registry-1.docker.io";

/// Response from the tags list API endpoint.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    /// List of tag names; some registries send `null` for an empty repository
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// A manifest as returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestResponse {
    /// Raw manifest bytes, exactly as served
    pub bytes: Vec<u8>,
    /// The Docker-Content-Digest header value, if the registry sent one
    pub digest: Option<String>,
}

/// HTTP client for OCI registry operations.
#[derive(Debug, Clone)]
pub struct Client {
    /// The underlying HTTP client
    http_client: ReqwestClient,
    /// Hosts reached over plain http in addition to the loopback defaults
    insecure: Vec<String>,
}

impl Client {
    /// Creates a new client with default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagscout::client::Client;
    ///
    /// let client = Client::new().unwrap();
    /// assert_eq!(client.base_url("ghcr.io"), "https://ghcr.io");
    /// ```
    pub fn new() -> Result<Self> {
        Self::with_config(&Config::default())
    }

    /// Creates a new client from the network and registry sections of `config`.
    pub fn with_config(config: &Config) -> Result<Self> {
        let mut builder = ReqwestClient::builder()
            .pool_max_idle_per_host(config.network.max_idle_per_host)
            .user_agent(concat!("tagscout/", env!("CARGO_PKG_VERSION")));

        if config.network.timeout > 0 {
            builder = builder.timeout(Duration::from_secs(config.network.timeout));
        }

        let http_client = builder
            .build()
            .map_err(|e| ScoutError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            insecure: config.registries.insecure.clone(),
        })
    }

    /// Returns the base URL for a registry host.
    ///
    /// `docker.io` is served from `registry-1.docker.io`. Loopback hosts,
    /// `.local`/`.localhost` names and configured insecure hosts use plain
    /// http; everything else uses https.
    pub fn base_url(&self, registry: &str) -> String {
        match registry {
            "docker.io" | "index.docker.io" => DOCKER_HUB_URL.to_string(),
            r if r.starts_with("http://") || r.starts_with("https://") => {
                r.trim_end_matches('/').to_string()
            }
            r if self.is_insecure(r) => format!("http://{}", r),
            r => format!("https://{}", r),
        }
    }

    fn is_insecure(&self, registry: &str) -> bool {
        if self.insecure.iter().any(|host| host == registry) {
            return true;
        }

        let host = match registry.strip_prefix('[') {
            Some(rest) => rest.split(']').next().unwrap_or(rest),
            None => registry.split(':').next().unwrap_or(registry),
        };

        matches!(host, "localhost" | "127.0.0.1" | "::1")
            || host.ends_with(".localhost")
            || host.ends_with(".local")
    }

    /// Fetches every tag of a repository, following pagination links.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The registry is unreachable
    /// - The repository does not exist
    /// - The registry denies anonymous access
    /// - The response cannot be parsed as valid JSON
    pub async fn fetch_tags(&self, registry: &str, repository: &str) -> Result<Vec<String>> {
        self.fetch_tags_paginated(registry, repository, None).await
    }

    /// Fetches every tag of a repository with an optional page size.
    ///
    /// `limit` only bounds the size of each page; all pages are still read.
    #[instrument(skip(self))]
    pub async fn fetch_tags_paginated(
        &self,
        registry: &str,
        repository: &str,
        limit: Option<usize>,
    ) -> Result<Vec<String>> {
        let base_url = self.base_url(registry);
        let mut all_tags = Vec::new();
        let mut url = format!("{}/v2/{}/tags/list", base_url, repository);

        if let Some(n) = limit {
            url.push_str(&format!("?n={}", n));
        }
        let mut visited = HashSet::from([url.clone()]);

        loop {
            let response = self.get(&url, repository, None).await?;

            // Read the Link header before the body consumes the response
            let next = Self::extract_next_link(response.headers());

            let response = Self::check_response_status(response).await?;

            let tags_response: TagsResponse = response.json().await.map_err(|e| {
                ScoutError::validation_with_source("Failed to parse tags response", e)
            })?;

            let page = tags_response.tags.unwrap_or_default();
            trace!(count = page.len(), url = %url, "received tag page");
            all_tags.extend(page);

            let next_url = match next {
                Some(next) if next.starts_with("http://") || next.starts_with("https://") => next,
                Some(path) => format!("{}{}", base_url, path),
                None => break,
            };

            // Each page URL is followed at most once
            if !visited.insert(next_url.clone()) {
                return Err(ScoutError::validation(format!(
                    "Pagination link {} was already followed",
                    next_url
                )));
            }
            url = next_url;
        }

        debug!(count = all_tags.len(), "listed tags");
        Ok(all_tags)
    }

    /// Fetches a manifest by tag or digest.
    ///
    /// When the registry sends a Docker-Content-Digest header, the body is
    /// verified against it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The registry is unreachable
    /// - The repository or reference does not exist
    /// - The body does not match the advertised digest
    #[instrument(skip(self))]
    pub async fn fetch_manifest(
        &self,
        registry: &str,
        repository: &str,
        reference: &str,
    ) -> Result<ManifestResponse> {
        let url = format!(
            "{}/v2/{}/manifests/{}",
            self.base_url(registry),
            repository,
            reference
        );

        let response = self.get(&url, repository, Some(MANIFEST_ACCEPT)).await?;

        let digest = response
            .headers()
            .get("Docker-Content-Digest")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let response = Self::check_response_status(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ScoutError::network_with_source("Failed to read manifest response", e))?
            .to_vec();

        if let Some(advertised) = &digest {
            Digest::from_str(advertised)?.verify(&bytes)?;
        }

        Ok(ManifestResponse { bytes, digest })
    }

    /// Fetches a blob and verifies it against its digest.
    ///
    /// Redirects to storage backends are followed by reqwest.
    #[instrument(skip(self, digest), fields(digest = %digest))]
    pub async fn fetch_blob(
        &self,
        registry: &str,
        repository: &str,
        digest: &Digest,
    ) -> Result<Vec<u8>> {
        let url = format!(
            "{}/v2/{}/blobs/{}",
            self.base_url(registry),
            repository,
            digest
        );

        let response = self.get(&url, repository, None).await?;
        let response = Self::check_response_status(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ScoutError::network_with_source("Failed to read blob response", e))?
            .to_vec();

        digest.verify(&bytes)?;

        Ok(bytes)
    }

    /// Sends a GET request, answering a Bearer challenge with an anonymous token.
    async fn get(&self, url: &str, repository: &str, accept: Option<&str>) -> Result<Response> {
        let response = self.send(url, accept, None).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let challenge = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .and_then(|header| AuthChallenge::parse(header).ok());

        match challenge {
            Some(challenge) if challenge.is_bearer() => {
                let token = self.fetch_token(&challenge, repository).await?;
                self.send(url, accept, Some(&token)).await
            }
            _ => Ok(response),
        }
    }

    async fn send(&self, url: &str, accept: Option<&str>, token: Option<&str>) -> Result<Response> {
        let mut request = self.http_client.get(url);

        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        request
            .send()
            .await
            .map_err(|e| Self::translate_reqwest_error(e, url))
    }

    async fn fetch_token(&self, challenge: &AuthChallenge, repository: &str) -> Result<String> {
        debug!(realm = %challenge.realm, "requesting anonymous token");

        let response = self
            .http_client
            .get(&challenge.realm)
            .query(&challenge.token_query(repository))
            .send()
            .await
            .map_err(|e| Self::translate_reqwest_error(e, &challenge.realm))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::authentication(
                format!("Token request to {} was rejected", challenge.realm),
                Some(status.as_u16()),
            ));
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            ScoutError::validation_with_source("Failed to parse token response", e)
        })?;

        token_response.into_token()
    }

    /// Extracts the next page URL from the Link header.
    ///
    /// Format: `</v2/<name>/tags/list?n=100&last=tag99>; rel="next"`
    fn extract_next_link(headers: &HeaderMap) -> Option<String> {
        let link_str = headers.get(LINK)?.to_str().ok()?;

        link_str
            .split(',')
            .map(str::trim)
            .filter(|part| part.contains("rel=\"next\"") || part.contains("rel='next'"))
            .find_map(|part| {
                let start = part.find('<')?;
                let end = part.find('>')?;
                (start < end).then(|| part[start + 1..end].to_string())
            })
    }

    /// Translates a reqwest error into a ScoutError.
    fn translate_reqwest_error(error: reqwest::Error, url: &str) -> ScoutError {
        if error.is_timeout() {
            ScoutError::network_with_source(format!("Request to {} timed out", url), error)
        } else if error.is_connect() {
            ScoutError::network_with_source(format!("Failed to connect to {}", url), error)
        } else {
            ScoutError::network_with_source(
                format!("Network error communicating with {}", url),
                error,
            )
        }
    }

    /// Checks the HTTP response status and translates errors to ScoutError.
    async fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("(unable to read response body)"));

        match status {
            StatusCode::UNAUTHORIZED => Err(ScoutError::authentication(
                format!("Authentication required for {}: {}", url, error_body),
                Some(401),
            )),
            StatusCode::FORBIDDEN => Err(ScoutError::authentication(
                format!("Access forbidden for {}: {}", url, error_body),
                Some(403),
            )),
            StatusCode::NOT_FOUND => Err(ScoutError::not_found("endpoint", url)),
            _ => Err(ScoutError::registry(
                format!("HTTP {} from {}: {}", status.as_u16(), url, error_body),
                status.as_u16(),
            )),
        }
    }
}
