//! Queries keyed on sponsor development codes.
//!
//! Early filings predate the molecule's INN, so the development code is
//! often the only searchable handle. Each code is queried verbatim and,
//! when hyphenated, in its compact form too (publications are
//! inconsistent about the hyphen).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use pharmyrus_core::defaults::{
    DEV_CODES_PER_STRATEGY, PATENT_RESULTS_PER_QUERY, WEB_RESULTS_PER_QUERY,
};
use pharmyrus_core::{EnrichedMoleculeInfo, SearchBackend, SearchEngine};

use crate::strategy::{scan_query, CandidateSink, WoDiscoveryStrategy};

pub struct DevCodeStrategy {
    backend: Arc<dyn SearchBackend>,
}

impl DevCodeStrategy {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl WoDiscoveryStrategy for DevCodeStrategy {
    fn name(&self) -> &'static str {
        "dev_code"
    }

    #[instrument(skip(self, info, sink), fields(molecule = %info.name))]
    async fn discover(&self, info: &EnrichedMoleculeInfo, sink: &mut CandidateSink) {
        for code in info.dev_codes.iter().take(DEV_CODES_PER_STRATEGY) {
            scan_query(
                &self.backend,
                SearchEngine::Patents,
                &format!("\"{code}\" patent WO"),
                PATENT_RESULTS_PER_QUERY,
                sink,
            )
            .await;
            scan_query(
                &self.backend,
                SearchEngine::Web,
                &format!("\"{code}\" international patent application"),
                WEB_RESULTS_PER_QUERY,
                sink,
            )
            .await;

            let compact = code.replace('-', "");
            if compact != *code {
                scan_query(
                    &self.backend,
                    SearchEngine::Web,
                    &format!("\"{compact}\" patent WO"),
                    WEB_RESULTS_PER_QUERY,
                    sink,
                )
                .await;
            }
        }
    }
}
