//! Client for the INPI (Brazilian IP office) crawler service.
//!
//! The public INPI search interface is fronted by a crawler service that
//! returns structured listing pages. Calls here use a longer per-call
//! timeout than the default; the upstream is slow.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use pharmyrus_core::defaults::INPI_TIMEOUT_SECS;
use pharmyrus_core::{InpiBackend, InpiEntry, InpiPage, Result};

use crate::fetcher::Fetcher;

/// Default INPI crawler service endpoint.
pub const DEFAULT_INPI_URL: &str = "https://crawler3-production.up.railway.app/api/data/inpi";

/// Concurrency-gate target name for INPI calls.
const TARGET: &str = "inpi";

/// Listing entries per page served by the crawler service.
const PAGE_SIZE: usize = 20;

/// INPI crawler service client.
pub struct InpiClient {
    fetcher: Arc<Fetcher>,
    base_url: String,
    timeout: Duration,
}

impl InpiClient {
    /// Create a client over a shared fetcher.
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self {
            fetcher,
            base_url: DEFAULT_INPI_URL.to_string(),
            timeout: Duration::from_secs(INPI_TIMEOUT_SECS),
        }
    }

    /// Override the service base URL (tests point this at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl InpiBackend for InpiClient {
    #[instrument(skip(self), fields(target = TARGET))]
    async fn search_page(&self, term: &str, page: usize) -> Result<InpiPage> {
        let url = format!("{}/patents", self.base_url);
        let params = [
            ("medicine", term.to_string()),
            ("page", page.to_string()),
        ];

        let data = self
            .fetcher
            .get_json_with_timeout(TARGET, &url, &params, self.timeout)
            .await?;

        let entries: Vec<InpiEntry> = data
            .get("data")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .map(|row| InpiEntry {
                        title: row
                            .get("title")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        applicant: row
                            .get("applicant")
                            .and_then(Value::as_str)
                            .filter(|s| !s.is_empty())
                            .map(String::from),
                        deposit_date: row
                            .get("depositDate")
                            .and_then(Value::as_str)
                            .filter(|s| !s.is_empty())
                            .map(String::from),
                    })
                    .collect()
            })
            .unwrap_or_default();

        // The service does not report a page count; a full page implies
        // more listings may follow.
        let has_more = data
            .get("hasMore")
            .and_then(Value::as_bool)
            .unwrap_or(entries.len() >= PAGE_SIZE);

        Ok(InpiPage { entries, has_more })
    }
}
