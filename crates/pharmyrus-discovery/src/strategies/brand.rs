//! Queries keyed on the commercial brand name. Yields nothing for
//! molecules without one.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use pharmyrus_core::defaults::{PATENT_RESULTS_PER_QUERY, WEB_RESULTS_PER_QUERY};
use pharmyrus_core::{EnrichedMoleculeInfo, SearchBackend, SearchEngine};

use crate::strategy::{scan_query, CandidateSink, WoDiscoveryStrategy};

pub struct BrandStrategy {
    backend: Arc<dyn SearchBackend>,
}

impl BrandStrategy {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl WoDiscoveryStrategy for BrandStrategy {
    fn name(&self) -> &'static str {
        "brand"
    }

    #[instrument(skip(self, info, sink), fields(molecule = %info.name))]
    async fn discover(&self, info: &EnrichedMoleculeInfo, sink: &mut CandidateSink) {
        let Some(brand) = &info.brand else {
            return;
        };

        scan_query(
            &self.backend,
            SearchEngine::Patents,
            &format!("\"{brand}\" patent WO"),
            PATENT_RESULTS_PER_QUERY,
            sink,
        )
        .await;
        scan_query(
            &self.backend,
            SearchEngine::Web,
            &format!("\"{brand}\" pharmaceutical patent international"),
            WEB_RESULTS_PER_QUERY,
            sink,
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSearchBackend;
    use crate::strategy::collect;

    #[tokio::test]
    async fn yields_nothing_without_brand() {
        let backend = MockSearchBackend::new();
        let calls = backend.calls();
        let strategy = BrandStrategy::new(Arc::new(backend));

        let info = EnrichedMoleculeInfo {
            name: "darolutamide".into(),
            ..Default::default()
        };
        let candidates = collect(&strategy, &info, 2).await;

        assert!(candidates.is_empty());
        assert!(calls.lock().unwrap().is_empty());
    }
}
