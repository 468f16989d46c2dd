//! PubChem PUG REST client for molecule synonym lookup.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use pharmyrus_core::{ChemicalBackend, Error, Result};

use crate::fetcher::Fetcher;

/// Default PubChem PUG REST endpoint.
pub const DEFAULT_PUBCHEM_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";

/// Concurrency-gate target name for PubChem calls.
const TARGET: &str = "pubchem";

/// PubChem chemical database client.
pub struct PubChemClient {
    fetcher: Arc<Fetcher>,
    base_url: String,
}

impl PubChemClient {
    /// Create a client over a shared fetcher.
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self {
            fetcher,
            base_url: DEFAULT_PUBCHEM_URL.to_string(),
        }
    }

    /// Override the API base URL (tests point this at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ChemicalBackend for PubChemClient {
    #[instrument(skip(self), fields(target = TARGET))]
    async fn synonyms(&self, name: &str) -> Result<Option<Vec<String>>> {
        let url = format!("{}/compound/name/{}/synonyms/JSON", self.base_url, name);

        let data = match self.fetcher.get_json(TARGET, &url, &[]).await {
            Ok(data) => data,
            // PubChem answers 404 for unknown compound names.
            Err(Error::Status(404)) => {
                debug!(compound = name, "Compound not found in chemical database");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let synonyms = data
            .get("InformationList")
            .and_then(|l| l.get("Information"))
            .and_then(Value::as_array)
            .and_then(|info| info.first())
            .and_then(|first| first.get("Synonym"))
            .and_then(Value::as_array)
            .map(|syns| {
                syns.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect::<Vec<_>>()
            });

        match synonyms {
            Some(list) if !list.is_empty() => Ok(Some(list)),
            _ => Ok(None),
        }
    }
}
