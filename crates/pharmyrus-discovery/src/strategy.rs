//! The WO discovery strategy contract and the shared query machinery
//! every strategy builds on.
//!
//! Each strategy formulates its own query text against the search
//! backend, scans result snippets and publication numbers for WO number
//! patterns, and streams candidates through its [`CandidateSink`] as
//! they are found. Streaming is what makes stage deadlines lossless:
//! a task abandoned at its deadline has already handed over everything
//! it produced, so abandonment is a partial contribution, not an error.
//! A failing query contributes nothing; it never aborts sibling queries
//! or strategies.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use pharmyrus_core::normalize::{extract_wo_numbers, normalize_wo};
use pharmyrus_core::{DiscoverySeq, EnrichedMoleculeInfo, SearchBackend, SearchEngine, WoCandidate};

/// One pluggable WO discovery strategy.
#[async_trait]
pub trait WoDiscoveryStrategy: Send + Sync {
    /// Strategy name used as the candidate provenance tag.
    fn name(&self) -> &'static str;

    /// Produce this strategy's WO candidates for one enriched molecule,
    /// pushing each into the sink the moment it is found.
    async fn discover(&self, info: &EnrichedMoleculeInfo, sink: &mut CandidateSink);
}

/// Ordered, deduplicating candidate emitter for one strategy task.
///
/// The sink carries the task's fixed rank in the stage fan-out, which
/// seeds the discovery sequence so the merged output is independent of
/// task completion order. Within a task candidates are deduplicated
/// eagerly; cross-strategy dedup belongs to the aggregator.
///
/// Candidates are sent through an unbounded channel owned by the
/// orchestrator, so output pushed before a stage deadline survives the
/// task being dropped.
pub struct CandidateSink {
    strategy: &'static str,
    rank: u16,
    next_index: u32,
    seen: HashSet<String>,
    tx: mpsc::UnboundedSender<WoCandidate>,
    sent: usize,
}

impl CandidateSink {
    pub fn new(
        strategy: &'static str,
        rank: u16,
        tx: mpsc::UnboundedSender<WoCandidate>,
    ) -> Self {
        Self {
            strategy,
            rank,
            next_index: 0,
            seen: HashSet::new(),
            tx,
            sent: 0,
        }
    }

    /// Emit one canonical WO number with its discovery evidence. A send
    /// after the stage has closed its receiver is dropped silently.
    pub fn push(&mut self, number: String, query: &str, snippet: Option<&str>) {
        if !self.seen.insert(number.clone()) {
            return;
        }
        let candidate = WoCandidate {
            number,
            strategy: self.strategy.to_string(),
            query: Some(query.to_string()),
            snippet: snippet.map(String::from),
            seq: DiscoverySeq::new(self.rank, self.next_index),
        };
        self.next_index += 1;
        if self.tx.send(candidate).is_ok() {
            self.sent += 1;
        }
    }

    /// Candidates emitted so far.
    pub fn len(&self) -> usize {
        self.sent
    }

    pub fn is_empty(&self) -> bool {
        self.sent == 0
    }
}

/// Run one strategy to completion and gather its full output. Stage
/// fan-out streams through per-task sinks instead; this is the
/// uninterrupted path used by tests and one-shot callers.
pub async fn collect(
    strategy: &dyn WoDiscoveryStrategy,
    info: &EnrichedMoleculeInfo,
    rank: u16,
) -> Vec<WoCandidate> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut sink = CandidateSink::new(strategy.name(), rank, tx);
    strategy.discover(info, &mut sink).await;
    drop(sink);

    let mut out = Vec::new();
    while let Some(candidate) = rx.recv().await {
        out.push(candidate);
    }
    out
}

/// Run one search query and feed every WO number it surfaces into the
/// sink: publication numbers reported by the engine first, then numbers
/// extracted from hit text.
pub async fn scan_query(
    backend: &Arc<dyn SearchBackend>,
    engine: SearchEngine,
    query: &str,
    limit: usize,
    sink: &mut CandidateSink,
) {
    let page = match backend.search(engine, query, limit).await {
        Ok(page) => page,
        Err(e) => {
            warn!(
                strategy = sink.strategy,
                %engine,
                query,
                error = %e,
                "Search query failed, contributing nothing"
            );
            return;
        }
    };

    for number in &page.publication_numbers {
        if let Some(wo) = normalize_wo(number) {
            sink.push(wo, query, None);
        }
    }

    for hit in &page.hits {
        let text = hit.scan_text();
        for wo in extract_wo_numbers(&text) {
            sink.push(wo, query, Some(&hit.snippet));
        }
    }

    debug!(
        strategy = sink.strategy,
        %engine,
        query,
        emitted = sink.len(),
        "Query scanned"
    );
}
