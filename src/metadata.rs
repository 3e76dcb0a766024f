// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Repository metadata source.
///
/// Defines the wire model returned by the GitHub GraphQL API and the
/// [`MetadataSource`] seam the pipeline consumes, so tests can substitute a
/// fixed fact set for the network.
use std::time::Duration;

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Facts the badge builders consume, mirroring the GraphQL response shape.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryFacts {
    /// Declared license, if any.
    #[serde(default)]
    pub license_info: Option<LicenseFacts>,
    /// Language size distribution, if any.
    #[serde(default)]
    pub languages:    Option<LanguageDistribution>
}

/// Declared license information.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseFacts {
    /// SPDX identifier reported by the host, e.g. `"MIT"`.
    #[serde(default)]
    pub spdx_id: Option<String>
}

/// Language size distribution ordered descending by size.
///
/// The query truncates to the top languages, so `total_size` may exceed the
/// sum of the edges.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDistribution {
    /// Per-language entries, largest first.
    #[serde(default)]
    pub edges:      Vec<LanguageEdge>,
    /// Total size in bytes across all languages, including truncated ones.
    #[serde(default)]
    pub total_size: u64
}

/// One language entry of the distribution.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LanguageEdge {
    /// Language name and display color.
    pub node: LanguageNode,
    /// Size in bytes attributed to the language.
    pub size: u64
}

/// Language name and display color as reported by the host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LanguageNode {
    /// Language name, e.g. `"Go"`.
    pub name:  String,
    /// Display color token, e.g. `"#00ADD8"`.
    #[serde(default)]
    pub color: Option<String>
}

/// Supplies the facts the badge builders consume.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetches the repository facts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Metadata`](Error::Metadata) when the source is
    /// unreachable, times out, or returns a malformed payload. Fatal for
    /// the run: no badge can be built without the facts.
    async fn fetch(&self) -> Result<RepositoryFacts, Error>;
}

const REPOSITORY_QUERY: &str = r#"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    licenseInfo { spdxId }
    languages(first: 5, orderBy: {field: SIZE, direction: DESC}) {
      edges {
        node { name color }
        size
      }
      totalSize
    }
  }
}"#;

/// GitHub-backed metadata source querying the GraphQL API.
pub struct GithubMetadataSource {
    octocrab:   Octocrab,
    owner:      String,
    repository: String,
    timeout:    Duration
}

impl GithubMetadataSource {
    /// Creates a source for `owner/repository` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Metadata`](Error::Metadata) when the GitHub client
    /// cannot be initialized.
    pub fn new(
        token: &str,
        owner: &str,
        repository: &str,
        timeout: Duration
    ) -> Result<Self, Error> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_owned())
            .build()
            .map_err(|e| Error::metadata(format!("failed to initialize GitHub client: {e}")))?;

        Ok(Self {
            octocrab,
            owner: owner.to_owned(),
            repository: repository.to_owned(),
            timeout
        })
    }
}

#[async_trait]
impl MetadataSource for GithubMetadataSource {
    async fn fetch(&self) -> Result<RepositoryFacts, Error> {
        let payload = serde_json::json!({
            "query": REPOSITORY_QUERY,
            "variables": { "owner": self.owner, "name": self.repository }
        });

        debug!("fetching metadata for {}/{}", self.owner, self.repository);

        let request = self.octocrab.graphql::<serde_json::Value>(&payload);
        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| {
                Error::metadata(format!(
                    "metadata request for {}/{} timed out after {:?}",
                    self.owner, self.repository, self.timeout
                ))
            })?
            .map_err(|e| Error::metadata(format!("GitHub GraphQL request failed: {e}")))?;

        parse_repository(&response)
    }
}

/// Extracts the repository facts from a GraphQL response envelope.
///
/// # Errors
///
/// Returns [`Error::Metadata`](Error::Metadata) when the envelope carries no
/// repository object or the object does not match the expected shape.
pub fn parse_repository(response: &serde_json::Value) -> Result<RepositoryFacts, Error> {
    let repository = response
        .pointer("/data/repository")
        .filter(|value| !value.is_null())
        .ok_or_else(|| Error::metadata("GraphQL response did not contain repository data"))?;

    serde_json::from_value(repository.clone())
        .map_err(|e| Error::metadata(format!("malformed repository metadata: {e}")))
}
