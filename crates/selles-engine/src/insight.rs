//! # Sales Insight Client
//!
//! Posts a compact sales digest to an external commentary service and
//! returns its prose response. Strictly best-effort: the dashboard
//! renders whatever string comes back, and every failure mode (no
//! endpoint configured, network down, bad response, timeout) collapses
//! to a fixed fallback sentence. Nothing in the engine ever depends on
//! this call succeeding.
//!
//! The REST call is made directly with `reqwest` rather than a vendor
//! SDK; the request body is just the [`InsightDigest`] as JSON plus a
//! bearer key when one is configured.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use selles_core::analytics::InsightDigest;

/// Shown whenever the insight service cannot be reached or answers
/// with something unusable.
pub const FALLBACK_INSIGHT: &str = "Unable to load sales insights at this time.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct InsightResponse {
    commentary: String,
}

/// HTTP client for the insight service.
#[derive(Debug, Clone)]
pub struct InsightClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl InsightClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(InsightClient {
            http,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Requests commentary for the digest. Never fails: any error is
    /// logged and the fallback sentence returned instead.
    pub async fn generate(&self, digest: &InsightDigest) -> String {
        match self.request(digest).await {
            Ok(commentary) => {
                debug!(chars = commentary.len(), "Insight received");
                commentary
            }
            Err(err) => {
                warn!(error = %err, "Insight request failed, using fallback");
                FALLBACK_INSIGHT.to_string()
            }
        }
    }

    async fn request(&self, digest: &InsightDigest) -> Result<String, reqwest::Error> {
        let mut req = self.http.post(&self.endpoint).json(digest);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response: InsightResponse = req
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.commentary)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
