//! Queries pairing the molecule with major pharmaceutical originators.
//!
//! PCT applications are filed by the sponsor, so pairing the molecule
//! name with originator names surfaces filings whose abstracts never
//! mention the INN prominently.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use pharmyrus_core::defaults::WEB_RESULTS_PER_QUERY;
use pharmyrus_core::{EnrichedMoleculeInfo, SearchBackend, SearchEngine};

use crate::strategy::{scan_query, CandidateSink, WoDiscoveryStrategy};

/// Originators covering the bulk of PCT pharmaceutical filings.
const COMPANIES: &[&str] = &[
    "Orion Corporation",
    "Bayer",
    "AstraZeneca",
    "Pfizer",
    "Novartis",
    "Roche",
    "Merck",
    "Bristol-Myers Squibb",
    "Johnson & Johnson",
    "Eli Lilly",
    "Sanofi",
    "GlaxoSmithKline",
    "AbbVie",
    "Takeda",
    "Gilead",
    "Amgen",
    "Biogen",
];

pub struct CompanyStrategy {
    backend: Arc<dyn SearchBackend>,
}

impl CompanyStrategy {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl WoDiscoveryStrategy for CompanyStrategy {
    fn name(&self) -> &'static str {
        "company"
    }

    #[instrument(skip(self, info, sink), fields(molecule = %info.name))]
    async fn discover(&self, info: &EnrichedMoleculeInfo, sink: &mut CandidateSink) {
        for company in COMPANIES {
            let query = format!("\"{}\" \"{company}\" patent", info.name);
            scan_query(
                &self.backend,
                SearchEngine::Web,
                &query,
                WEB_RESULTS_PER_QUERY,
                sink,
            )
            .await;
        }
    }
}
