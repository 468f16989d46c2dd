//! Queries keyed on general synonyms of the molecule.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use pharmyrus_core::defaults::{SYNONYMS_PER_STRATEGY, WEB_RESULTS_PER_QUERY};
use pharmyrus_core::{EnrichedMoleculeInfo, SearchBackend, SearchEngine};

use crate::strategy::{scan_query, CandidateSink, WoDiscoveryStrategy};

pub struct SynonymStrategy {
    backend: Arc<dyn SearchBackend>,
}

impl SynonymStrategy {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl WoDiscoveryStrategy for SynonymStrategy {
    fn name(&self) -> &'static str {
        "synonym"
    }

    #[instrument(skip(self, info, sink), fields(molecule = %info.name))]
    async fn discover(&self, info: &EnrichedMoleculeInfo, sink: &mut CandidateSink) {
        let own_name = info.name.to_lowercase();

        let picked = info
            .synonyms
            .iter()
            .filter(|s| s.to_lowercase() != own_name)
            .take(SYNONYMS_PER_STRATEGY);

        for synonym in picked {
            let query = format!("\"{synonym}\" patent WO");
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
