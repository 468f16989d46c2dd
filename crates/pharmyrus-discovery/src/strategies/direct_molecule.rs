//! Direct queries for the molecule name against the patent engine and
//! targeted web searches.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use pharmyrus_core::defaults::{PATENT_RESULTS_PER_QUERY, WEB_RESULTS_PER_QUERY};
use pharmyrus_core::{EnrichedMoleculeInfo, SearchBackend, SearchEngine};

use crate::strategy::{scan_query, CandidateSink, WoDiscoveryStrategy};

pub struct DirectMoleculeStrategy {
    backend: Arc<dyn SearchBackend>,
}

impl DirectMoleculeStrategy {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl WoDiscoveryStrategy for DirectMoleculeStrategy {
    fn name(&self) -> &'static str {
        "direct_molecule"
    }

    #[instrument(skip(self, info, sink), fields(molecule = %info.name))]
    async fn discover(&self, info: &EnrichedMoleculeInfo, sink: &mut CandidateSink) {
        let name = &info.name;

        scan_query(
            &self.backend,
            SearchEngine::Patents,
            &format!("\"{name}\" patent WO"),
            PATENT_RESULTS_PER_QUERY,
            sink,
        )
        .await;

        let web_queries = [
            format!("site:patents.google.com \"{name}\" WO"),
            format!("site:patentscope.wipo.int \"{name}\""),
            format!("\"{name}\" pharmaceutical composition patent WO"),
            format!("\"{name}\" treatment cancer patent WO"),
        ];
        for query in &web_queries {
            scan_query(
                &self.backend,
                SearchEngine::Web,
                query,
                WEB_RESULTS_PER_QUERY,
                sink,
            )
            .await;
        }
    }
}
