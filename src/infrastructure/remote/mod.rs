//! Remote service contracts consumed by the scan core
//!
//! The core treats every remote collaborator as an opaque request/response
//! contract: an artifact lister enumerating recent builds, a raw build-info
//! fetcher, and two vulnerability services (batched component summaries and
//! per-build details). Transport and authentication live behind these traits;
//! [`http`] provides the reqwest-backed implementation of the vulnerability
//! services.

pub mod http;

pub use http::HttpScanClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DependencyTree, Issue, License};

/// Errors from remote collaborators.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// One remote build artifact, as returned by [`RemoteArtifactLister::search`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub repo: String,
    pub path: String,
    pub name: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created: u64,
}

/// One component of a remote scan response, keyed by content hash.
///
/// `parent_sha256` lists the sha256 hashes of the artifacts this component is
/// bundled inside; the correlator aggregates issues/licenses under those
/// parents so build artifacts inherit the findings of their contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub component_id: String,
    pub sha1: String,
    pub sha256: String,
    #[serde(default)]
    pub parent_sha256: Vec<String>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub licenses: Vec<License>,
}

/// Enumerates remote build artifacts matching a pattern, sorted by recency
/// with the result count capped by the caller's configuration.
#[async_trait]
pub trait RemoteArtifactLister: Send + Sync {
    async fn search(&self, pattern: &str) -> Result<Vec<ArtifactDescriptor>, RemoteError>;
}

/// Downloads one raw build-info document.
#[async_trait]
pub trait BuildInfoFetcher: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, RemoteError>;
}

/// Batched per-component vulnerability summaries.
///
/// Callers chunk component ids in fixed-size batches to bound request size.
#[async_trait]
pub trait VulnerabilitySummaryService: Send + Sync {
    async fn summarize(
        &self,
        component_ids: &[String],
    ) -> Result<Vec<ComponentSummary>, RemoteError>;
}

/// Scan details scoped to one build.
///
/// `Ok(None)` means the service has no data for this build; the caller falls
/// back to populating the tree with `Unknown` severity markers.
#[async_trait]
pub trait VulnerabilityDetailsService: Send + Sync {
    async fn details_for_build(
        &self,
        name: &str,
        number: &str,
    ) -> Result<Option<Vec<ComponentSummary>>, RemoteError>;
}

/// Failure to turn a raw build-info document into a tree.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BuildParseError(pub String);

/// Turns one raw build-info document into a per-build dependency tree.
///
/// Implemented per build tool by external builders; the core never parses
/// build output itself.
pub trait BuildTreeParser: Send + Sync {
    fn parse(&self, raw: &[u8], key: &str) -> Result<DependencyTree, BuildParseError>;
}
