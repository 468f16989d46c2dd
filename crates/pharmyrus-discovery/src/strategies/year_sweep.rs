//! Year-windowed sweep of the patent engine.
//!
//! One bounded query per publication year over the known window, so a
//! molecule whose filings cluster in an unexpected year still surfaces.
//! Years are swept in order and each year's finds are emitted before
//! the next query runs; a sweep cut short at a deadline still
//! contributes the years it covered.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use pharmyrus_core::defaults::{PATENT_RESULTS_PER_QUERY, YEAR_SWEEP_END, YEAR_SWEEP_START};
use pharmyrus_core::{EnrichedMoleculeInfo, SearchBackend, SearchEngine};

use crate::strategy::{scan_query, CandidateSink, WoDiscoveryStrategy};

pub struct YearSweepStrategy {
    backend: Arc<dyn SearchBackend>,
    start: u16,
    end: u16,
}

impl YearSweepStrategy {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            start: YEAR_SWEEP_START,
            end: YEAR_SWEEP_END,
        }
    }

    /// Narrow the year window (tests sweep a couple of years, not twenty).
    pub fn with_window(mut self, start: u16, end: u16) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

#[async_trait]
impl WoDiscoveryStrategy for YearSweepStrategy {
    fn name(&self) -> &'static str {
        "year_sweep"
    }

    #[instrument(skip(self, info, sink), fields(molecule = %info.name))]
    async fn discover(&self, info: &EnrichedMoleculeInfo, sink: &mut CandidateSink) {
        for year in self.start..=self.end {
            let query = format!("\"{}\" patent WO{year}", info.name);
            scan_query(
                &self.backend,
                SearchEngine::Patents,
                &query,
                PATENT_RESULTS_PER_QUERY,
                sink,
            )
            .await;
        }
    }
}
