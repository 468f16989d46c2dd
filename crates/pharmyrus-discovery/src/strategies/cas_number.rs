//! Queries keyed on the CAS registry number.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use pharmyrus_core::defaults::{PATENT_RESULTS_PER_QUERY, WEB_RESULTS_PER_QUERY};
use pharmyrus_core::{EnrichedMoleculeInfo, SearchBackend, SearchEngine};

use crate::strategy::{scan_query, CandidateSink, WoDiscoveryStrategy};

pub struct CasNumberStrategy {
    backend: Arc<dyn SearchBackend>,
}

impl CasNumberStrategy {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl WoDiscoveryStrategy for CasNumberStrategy {
    fn name(&self) -> &'static str {
        "cas_number"
    }

    #[instrument(skip(self, info, sink), fields(molecule = %info.name))]
    async fn discover(&self, info: &EnrichedMoleculeInfo, sink: &mut CandidateSink) {
        let Some(cas) = &info.cas else {
            return;
        };

        scan_query(
            &self.backend,
            SearchEngine::Patents,
            &format!("\"{cas}\" patent WO"),
            PATENT_RESULTS_PER_QUERY,
            sink,
        )
        .await;
        scan_query(
            &self.backend,
            SearchEngine::Web,
            &format!("\"{cas}\" PCT patent"),
            WEB_RESULTS_PER_QUERY,
            sink,
        )
        .await;
    }
}
