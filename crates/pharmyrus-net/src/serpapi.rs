//! SerpApi-backed search client: web search, patent search, and the
//! Google Patents family chain.
//!
//! The family chain is a three-hop resolution: a patent-engine search for
//! the WO number yields a `json_endpoint`, whose first organic result
//! carries a `serpapi_link` to the full patent detail record, which in
//! turn lists the worldwide applications and family members the extractor
//! scans for Brazilian entries.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use pharmyrus_core::defaults::{FAMILY_CITATIONS_SCAN, FAMILY_SIMILAR_SCAN};
use pharmyrus_core::{
    FamilyListing, Result, SearchBackend, SearchEngine, SearchHitRecord, SearchPage,
};

use crate::fetcher::Fetcher;
use crate::keypool::ApiKeyPool;

/// Default SerpApi endpoint.
pub const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com";

/// Concurrency-gate target name for all SerpApi calls.
const TARGET: &str = "serpapi";

/// SerpApi search backend.
pub struct SerpApiClient {
    fetcher: Arc<Fetcher>,
    pool: Arc<ApiKeyPool>,
    base_url: String,
}

impl SerpApiClient {
    /// Create a client over a shared fetcher and key pool.
    pub fn new(fetcher: Arc<Fetcher>, pool: Arc<ApiKeyPool>) -> Self {
        Self {
            fetcher,
            pool,
            base_url: DEFAULT_SERPAPI_URL.to_string(),
        }
    }

    /// Override the API base URL (tests point this at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn search_url(&self) -> String {
        format!("{}/search.json", self.base_url)
    }
}

/// Pull a string field out of a JSON object, empty when absent.
fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Document identifier of a family/citation entry: `document_id` with
/// `publication_number` as fallback, matching the patent target's mixed
/// record shapes.
fn document_id(entry: &Value) -> Option<String> {
    for key in ["document_id", "publication_number"] {
        if let Some(id) = entry.get(key).and_then(Value::as_str) {
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
    }
    None
}

#[async_trait]
impl SearchBackend for SerpApiClient {
    #[instrument(skip(self), fields(target = TARGET))]
    async fn search(
        &self,
        engine: SearchEngine,
        query: &str,
        limit: usize,
    ) -> Result<SearchPage> {
        let engine_param = match engine {
            SearchEngine::Web => "google",
            SearchEngine::Patents => "google_patents",
        };
        let params = [
            ("engine", engine_param.to_string()),
            ("q", query.to_string()),
            ("num", limit.to_string()),
        ];

        let data = self
            .fetcher
            .get_json_keyed(TARGET, &self.search_url(), &params, &self.pool, "api_key")
            .await?;

        let hits = data
            .get("organic_results")
            .and_then(Value::as_array)
            .map(|results| {
                results
                    .iter()
                    .take(limit)
                    .map(|r| SearchHitRecord {
                        title: str_field(r, "title"),
                        snippet: str_field(r, "snippet"),
                        link: str_field(r, "link"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        // Patent-engine pages report publication numbers directly.
        let publication_numbers = data
            .get("patents")
            .and_then(Value::as_array)
            .map(|patents| {
                patents
                    .iter()
                    .filter_map(|p| p.get("publication_number").and_then(Value::as_str))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(SearchPage {
            hits,
            publication_numbers,
        })
    }

    #[instrument(skip(self), fields(target = TARGET))]
    async fn family_listing(&self, wo_number: &str) -> Result<FamilyListing> {
        // Hop 1: patent-engine search for the WO publication.
        let params = [
            ("engine", "google_patents".to_string()),
            ("q", wo_number.to_string()),
        ];
        let search_data = self
            .fetcher
            .get_json_keyed(TARGET, &self.search_url(), &params, &self.pool, "api_key")
            .await?;

        let Some(json_endpoint) = search_data
            .get("search_metadata")
            .and_then(|m| m.get("json_endpoint"))
            .and_then(Value::as_str)
        else {
            debug!(wo_number, "No json_endpoint in patent search metadata");
            return Ok(FamilyListing::default());
        };

        // Hop 2: resolve the endpoint to the first organic result's
        // detail link.
        let endpoint_data = self.fetcher.get_json(TARGET, json_endpoint, &[]).await?;

        let Some(first) = endpoint_data
            .get("organic_results")
            .and_then(Value::as_array)
            .and_then(|r| r.first())
        else {
            debug!(wo_number, "Patent search returned no organic results");
            return Ok(FamilyListing::default());
        };

        let Some(serpapi_link) = first.get("serpapi_link").and_then(Value::as_str) else {
            debug!(wo_number, "First organic result carries no detail link");
            return Ok(FamilyListing::default());
        };

        let link = first
            .get("patent_link")
            .or_else(|| first.get("link"))
            .and_then(Value::as_str)
            .map(String::from);

        // Hop 3: fetch the full patent detail record. The detail link is
        // keyed like any other SerpApi call so a quota response rotates
        // the pool instead of failing the chain.
        let patent_data = if serpapi_link.contains("api_key=") {
            self.fetcher.get_json(TARGET, serpapi_link, &[]).await?
        } else {
            self.fetcher
                .get_json_keyed(TARGET, serpapi_link, &[], &self.pool, "api_key")
                .await?
        };

        let mut seen = HashSet::new();
        let mut document_ids = Vec::new();
        let mut push = |id: String| {
            if seen.insert(id.clone()) {
                document_ids.push(id);
            }
        };

        // worldwide_applications is the primary source: a map of year to
        // application entries.
        if let Some(worldwide) = patent_data
            .get("worldwide_applications")
            .and_then(Value::as_object)
        {
            for apps in worldwide.values() {
                if let Some(apps) = apps.as_array() {
                    for app in apps {
                        if let Some(id) = document_id(app) {
                            push(id);
                        }
                    }
                }
            }
        }

        if let Some(family) = patent_data.get("family_members").and_then(Value::as_array) {
            for member in family {
                if let Some(id) = document_id(member) {
                    push(id);
                }
            }
        }

        if let Some(also) = patent_data
            .get("also_published_as")
            .and_then(Value::as_array)
        {
            for entry in also {
                match entry {
                    Value::String(s) => push(s.clone()),
                    other => {
                        if let Some(id) = document_id(other) {
                            push(id);
                        }
                    }
                }
            }
        }

        if let Some(citations) = patent_data.get("citations").and_then(Value::as_array) {
            for cite in citations.iter().take(FAMILY_CITATIONS_SCAN) {
                if let Some(id) = document_id(cite) {
                    push(id);
                }
            }
        }

        if let Some(similar) = patent_data
            .get("similar_documents")
            .and_then(Value::as_array)
        {
            for doc in similar.iter().take(FAMILY_SIMILAR_SCAN) {
                if let Some(id) = document_id(doc) {
                    push(id);
                }
            }
        }

        debug!(
            wo_number,
            family_size = document_ids.len(),
            "Resolved patent family listing"
        );

        Ok(FamilyListing {
            document_ids,
            link,
            resolved: true,
        })
    }
}
