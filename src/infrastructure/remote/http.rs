//! reqwest-backed client for the vulnerability scan API
//!
//! Implements [`VulnerabilitySummaryService`] and
//! [`VulnerabilityDetailsService`] against a JSON-over-HTTP scan service.
//! Transport details stay here; everything above the traits is
//! implementation-agnostic.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RemoteConfig;

use super::{ComponentSummary, RemoteError, VulnerabilityDetailsService, VulnerabilitySummaryService};

#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    component_ids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    components: Vec<ComponentSummary>,
}

/// HTTP client for the remote vulnerability scan service.
pub struct HttpScanClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScanClient {
    /// Build a client from configuration.
    ///
    /// Failure here (an unconstructible client) is a configuration-level
    /// error and aborts the whole operation, unlike per-item fetch failures
    /// which are recovered inside the scan loop.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("depscan/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, RemoteError>
    where
        B: Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl VulnerabilitySummaryService for HttpScanClient {
    async fn summarize(
        &self,
        component_ids: &[String],
    ) -> Result<Vec<ComponentSummary>, RemoteError> {
        let url = format!("{}/api/v1/summary/component", self.base_url);
        debug!(count = component_ids.len(), "requesting component summaries");
        let response: SummaryResponse = self
            .post_json(&url, &SummaryRequest { component_ids })
            .await?;
        Ok(response.components)
    }
}

#[async_trait]
impl VulnerabilityDetailsService for HttpScanClient {
    async fn details_for_build(
        &self,
        name: &str,
        number: &str,
    ) -> Result<Option<Vec<ComponentSummary>>, RemoteError> {
        let url = format!("{}/api/v1/details/build/{}/{}", self.base_url, name, number);
        debug!(build = %name, number = %number, "requesting build scan details");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // The service has no scan for this build; callers fall back to
            // Unknown severity markers.
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let body: SummaryResponse = response.json().await?;
        if body.components.is_empty() {
            return Ok(None);
        }
        Ok(Some(body.components))
    }
}
