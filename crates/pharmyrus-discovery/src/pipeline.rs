//! The discovery pipeline orchestrator.
//!
//! Drives enrich, WO discovery fan-out, BR extraction fan-out,
//! aggregation, and scoring. Every sub-stage degrades gracefully to an
//! empty contribution, so a report is always produced; the only caller
//! visible failure is malformed input.
//!
//! Fan-out tasks stream their finds through per-stage channels, so a
//! task abandoned at a stage deadline, or when the whole request runs
//! out of budget, still contributes everything it produced up to that
//! point.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use pharmyrus_core::defaults::{
    BASELINE_NAME, BR_STAGE_CONCURRENCY, BR_STAGE_TIMEOUT_SECS, EXPECTED_BRS, EXPECTED_WOS,
    REQUEST_TIMEOUT_SECS, WO_STAGE_TIMEOUT_SECS,
};
use pharmyrus_core::{
    BrCandidate, BrPatentRecord, BrPatentsSection, BrSource, ChemicalBackend, DiscoveryReport,
    EnrichedMoleculeInfo, InpiBackend, MoleculeInfoSection, MoleculeQuery, PerformanceSection,
    Result, SearchBackend, WoCandidate, WoDiscoverySection, WoExtractionStatus,
    WoProcessingDetail, WoProcessingSection,
};

use crate::aggregate::{merge_br, merge_wo};
use crate::enricher::MoleculeEnricher;
use crate::family::FamilyChainExtractor;
use crate::inpi::InpiDirectCrawler;
use crate::score::score;
use crate::strategies::full_strategy_set;
use crate::strategy::{CandidateSink, WoDiscoveryStrategy};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Name of the trusted reference dataset.
    pub baseline_name: String,
    /// Known WO count for the baseline case. Always positive.
    pub expected_wos: usize,
    /// Known BR count for the baseline case. Always positive.
    pub expected_brs: usize,
    /// Wall-clock budget for one whole request. On expiry, outstanding
    /// tasks are abandoned and the pipeline proceeds to aggregation
    /// with whatever was collected.
    pub request_timeout: Duration,
    /// Wall-clock budget for the WO discovery stage.
    pub wo_stage_timeout: Duration,
    /// Wall-clock budget for the BR extraction stage.
    pub br_stage_timeout: Duration,
    /// Global ceiling on concurrent BR stage tasks.
    pub br_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            baseline_name: BASELINE_NAME.to_string(),
            expected_wos: EXPECTED_WOS,
            expected_brs: EXPECTED_BRS,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            wo_stage_timeout: Duration::from_secs(WO_STAGE_TIMEOUT_SECS),
            br_stage_timeout: Duration::from_secs(BR_STAGE_TIMEOUT_SECS),
            br_concurrency: BR_STAGE_CONCURRENCY,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `PHARMYRUS_BASELINE_NAME` | `Cortellis` | Reference dataset name |
    /// | `PHARMYRUS_EXPECTED_WOS` | `7` | Baseline WO count |
    /// | `PHARMYRUS_EXPECTED_BRS` | `8` | Baseline BR count |
    /// | `PHARMYRUS_REQUEST_TIMEOUT_SECS` | `180` | Whole-request budget |
    /// | `PHARMYRUS_WO_STAGE_TIMEOUT_SECS` | `60` | WO stage budget |
    /// | `PHARMYRUS_BR_STAGE_TIMEOUT_SECS` | `90` | BR stage budget |
    /// | `PHARMYRUS_BR_CONCURRENCY` | `6` | BR stage task ceiling |
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PHARMYRUS_BASELINE_NAME") {
            if !val.trim().is_empty() {
                config.baseline_name = val;
            }
        }
        if let Ok(val) = std::env::var("PHARMYRUS_EXPECTED_WOS") {
            if let Ok(n) = val.parse::<usize>() {
                config.expected_wos = n.max(1);
            }
        }
        if let Ok(val) = std::env::var("PHARMYRUS_EXPECTED_BRS") {
            if let Ok(n) = val.parse::<usize>() {
                config.expected_brs = n.max(1);
            }
        }
        if let Ok(val) = std::env::var("PHARMYRUS_REQUEST_TIMEOUT_SECS") {
            if let Ok(n) = val.parse::<u64>() {
                config.request_timeout = Duration::from_secs(n.max(1));
            }
        }
        if let Ok(val) = std::env::var("PHARMYRUS_WO_STAGE_TIMEOUT_SECS") {
            if let Ok(n) = val.parse::<u64>() {
                config.wo_stage_timeout = Duration::from_secs(n.max(1));
            }
        }
        if let Ok(val) = std::env::var("PHARMYRUS_BR_STAGE_TIMEOUT_SECS") {
            if let Ok(n) = val.parse::<u64>() {
                config.br_stage_timeout = Duration::from_secs(n.max(1));
            }
        }
        if let Ok(val) = std::env::var("PHARMYRUS_BR_CONCURRENCY") {
            if let Ok(n) = val.parse::<usize>() {
                config.br_concurrency = n.max(1);
            }
        }

        config
    }

    /// Set the baseline. Zero counts are clamped to one; the scorer's
    /// input must stay positive.
    pub fn with_baseline(mut self, name: impl Into<String>, expected_brs: usize) -> Self {
        self.baseline_name = name.into();
        self.expected_brs = expected_brs.max(1);
        self
    }

    /// Set the baseline's expected WO count. Zero is clamped to one.
    pub fn with_expected_wos(mut self, n: usize) -> Self {
        self.expected_wos = n.max(1);
        self
    }

    /// Set the whole-request budget.
    pub fn with_request_timeout(mut self, budget: Duration) -> Self {
        self.request_timeout = budget;
        self
    }

    /// Set the WO stage budget.
    pub fn with_wo_stage_timeout(mut self, budget: Duration) -> Self {
        self.wo_stage_timeout = budget;
        self
    }

    /// Set the BR stage budget.
    pub fn with_br_stage_timeout(mut self, budget: Duration) -> Self {
        self.br_stage_timeout = budget;
        self
    }

    /// Set the BR stage concurrency ceiling.
    pub fn with_br_concurrency(mut self, n: usize) -> Self {
        self.br_concurrency = n.max(1);
        self
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Pipeline stages in their fixed progression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Enriching,
    DiscoveringWo,
    ExtractingBr,
    Aggregating,
    Scoring,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Enriching => "enriching",
            Self::DiscoveringWo => "discovering_wo",
            Self::ExtractingBr => "extracting_br",
            Self::Aggregating => "aggregating",
            Self::Scoring => "scoring",
            Self::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// Per-task budget: the stage allowance, shrunk to whatever is left of
/// the request deadline.
fn task_budget(stage: Duration, deadline: Instant) -> Duration {
    stage.min(deadline.duration_since(Instant::now()))
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The end-to-end discovery pipeline. One instance serves many requests;
/// all state is per-call.
pub struct DiscoveryPipeline {
    enricher: MoleculeEnricher,
    extractor: Arc<FamilyChainExtractor>,
    crawler: Arc<InpiDirectCrawler>,
    strategies: Vec<Arc<dyn WoDiscoveryStrategy>>,
    config: PipelineConfig,
}

impl DiscoveryPipeline {
    /// Assemble the pipeline over its three backend seams with the full
    /// strategy set.
    pub fn new(
        chemical: Arc<dyn ChemicalBackend>,
        search: Arc<dyn SearchBackend>,
        inpi: Arc<dyn InpiBackend>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            enricher: MoleculeEnricher::new(chemical),
            extractor: Arc::new(FamilyChainExtractor::new(search.clone())),
            crawler: Arc::new(InpiDirectCrawler::new(inpi)),
            strategies: full_strategy_set(search),
            config,
        }
    }

    /// Assemble the production pipeline from environment configuration:
    /// SerpApi search, PubChem enrichment, and the INPI crawler service,
    /// all sharing one rate-limited fetcher.
    pub fn from_env() -> Result<Self> {
        let fetcher = Arc::new(pharmyrus_net::Fetcher::from_env()?);
        let pool = Arc::new(pharmyrus_net::ApiKeyPool::from_env()?);

        let search: Arc<dyn SearchBackend> =
            Arc::new(pharmyrus_net::SerpApiClient::new(fetcher.clone(), pool));
        let chemical: Arc<dyn ChemicalBackend> =
            Arc::new(pharmyrus_net::PubChemClient::new(fetcher.clone()));
        let inpi: Arc<dyn InpiBackend> = Arc::new(pharmyrus_net::InpiClient::new(fetcher));

        Ok(Self::new(chemical, search, inpi, PipelineConfig::from_env()))
    }

    /// Replace the strategy set (tests narrow it down to stubs).
    pub fn with_strategies(mut self, strategies: Vec<Arc<dyn WoDiscoveryStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Run one discovery. Fails only on malformed input; every other
    /// fault degrades to an empty contribution inside the report.
    #[instrument(skip(self), fields(molecule = %query.name))]
    pub async fn search(&self, query: MoleculeQuery) -> Result<DiscoveryReport> {
        query.validate()?;

        let request_id = Uuid::now_v7();
        let started = Instant::now();
        let deadline = started + self.config.request_timeout;
        let mut stage = Stage::Enriching;
        info!(%request_id, %stage, "Discovery started");

        let molecule = match timeout(
            task_budget(self.config.request_timeout, deadline),
            self.enricher.enrich(&query),
        )
        .await
        {
            Ok(molecule) => molecule,
            Err(_) => {
                warn!(%request_id, "Enrichment abandoned at request deadline");
                EnrichedMoleculeInfo::bare(&query)
            }
        };

        stage = self.advance(stage, Stage::DiscoveringWo);
        let wos = merge_wo(self.discover_wo(&molecule, deadline).await);
        info!(%request_id, wo_count = wos.len(), "WO discovery settled");

        stage = self.advance(stage, Stage::ExtractingBr);
        let (br_candidates, wo_processing) = self.extract_br(&molecule, &wos, deadline).await;

        stage = self.advance(stage, Stage::Aggregating);
        let brs = merge_br(br_candidates);

        stage = self.advance(stage, Stage::Scoring);
        let comparison = score(
            &self.config.baseline_name,
            brs.len(),
            self.config.expected_brs,
        );

        stage = self.advance(stage, Stage::Done);
        let duration = started.elapsed();
        info!(
            %request_id,
            %stage,
            wo_count = wos.len(),
            wo_expected = self.config.expected_wos,
            br_count = brs.len(),
            br_expected = self.config.expected_brs,
            status = %comparison.status,
            duration_ms = duration.as_millis() as u64,
            "Discovery finished"
        );

        Ok(DiscoveryReport {
            molecule_info: MoleculeInfoSection::from(&molecule),
            wo_discovery: WoDiscoverySection {
                total_found: wos.len(),
                wo_numbers: wos.into_iter().map(|c| c.number).collect(),
            },
            wo_processing,
            br_patents: br_section(brs),
            comparison,
            performance: PerformanceSection {
                request_id,
                duration_seconds: duration.as_secs_f64(),
                timestamp: Utc::now(),
            },
        })
    }

    fn advance(&self, from: Stage, to: Stage) -> Stage {
        debug!(%from, %to, "Stage transition");
        to
    }

    /// WO stage fan-out: every strategy runs concurrently under the stage
    /// budget, capped at the request deadline. Strategies stream their
    /// finds through the stage channel, so an abandoned task keeps
    /// everything it sent before its deadline; a panicked task likewise
    /// contributes what it already sent.
    async fn discover_wo(
        &self,
        molecule: &EnrichedMoleculeInfo,
        deadline: Instant,
    ) -> Vec<WoCandidate> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut join = JoinSet::new();

        for (rank, strategy) in self.strategies.iter().enumerate() {
            let strategy = strategy.clone();
            let molecule = molecule.clone();
            let mut sink = CandidateSink::new(strategy.name(), rank as u16, tx.clone());
            let budget = task_budget(self.config.wo_stage_timeout, deadline);

            join.spawn(async move {
                let name = strategy.name();
                match timeout(budget, strategy.discover(&molecule, &mut sink)).await {
                    Ok(()) => {
                        debug!(strategy = name, count = sink.len(), "Strategy settled");
                    }
                    Err(_) => {
                        warn!(
                            strategy = name,
                            kept = sink.len(),
                            "Strategy abandoned at deadline, partial output kept"
                        );
                    }
                }
            });
        }
        drop(tx);

        while let Some(settled) = join.join_next().await {
            if let Err(e) = settled {
                warn!(error = %e, "Strategy task failed to join");
            }
        }

        let mut candidates = Vec::new();
        while let Some(candidate) = rx.recv().await {
            candidates.push(candidate);
        }
        candidates
    }

    /// BR stage fan-out: one extraction task per distinct WO plus the
    /// direct crawler, all under a global concurrency ceiling. Tasks past
    /// the ceiling queue until a permit frees up; the stage budget covers
    /// queueing time. Candidates stream through the stage channel; a task
    /// abandoned at its deadline is reported as errored but keeps what it
    /// already sent.
    async fn extract_br(
        &self,
        molecule: &EnrichedMoleculeInfo,
        wos: &[WoCandidate],
        deadline: Instant,
    ) -> (Vec<BrCandidate>, WoProcessingSection) {
        let gate = Arc::new(Semaphore::new(self.config.br_concurrency));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut join: JoinSet<Option<(String, WoExtractionStatus)>> = JoinSet::new();

        for (rank, wo) in wos.iter().enumerate() {
            let extractor = self.extractor.clone();
            let gate = gate.clone();
            let number = wo.number.clone();
            let out = tx.clone();
            let budget = task_budget(self.config.br_stage_timeout, deadline);

            join.spawn(async move {
                let settled = timeout(budget, async {
                    let Ok(_permit) = gate.acquire().await else {
                        return None;
                    };
                    Some(extractor.extract(&number, rank as u16, &out).await)
                })
                .await;

                match settled {
                    Ok(Some(outcome)) => Some((outcome.wo_number, outcome.status)),
                    // Gate closed: report the WO as errored.
                    Ok(None) => Some((number, WoExtractionStatus::Error)),
                    // Deadline hit: errored, but candidates already sent
                    // stay in the stage channel.
                    Err(_) => {
                        warn!(
                            wo_number = %number,
                            "Extraction abandoned at deadline, partial output kept"
                        );
                        Some((number, WoExtractionStatus::Error))
                    }
                }
            });
        }

        // The crawler joins the same fan-out with the rank after the last
        // extraction task.
        {
            let crawler = self.crawler.clone();
            let gate = gate.clone();
            let molecule = molecule.clone();
            let rank = wos.len() as u16;
            let out = tx.clone();
            let budget = task_budget(self.config.br_stage_timeout, deadline);

            join.spawn(async move {
                let settled = timeout(budget, async {
                    let Ok(_permit) = gate.acquire().await else {
                        return;
                    };
                    crawler.crawl(&molecule, rank, &out).await;
                })
                .await;

                if settled.is_err() {
                    warn!("Direct crawl abandoned at deadline, partial output kept");
                }
                None
            });
        }
        drop(tx);

        let mut statuses: HashMap<String, WoExtractionStatus> = HashMap::new();
        while let Some(settled) = join.join_next().await {
            match settled {
                Ok(Some((wo_number, status))) => {
                    statuses.insert(wo_number, status);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "BR stage task failed to join"),
            }
        }

        let mut candidates = Vec::new();
        let mut per_wo: HashMap<String, usize> = HashMap::new();
        while let Some(candidate) = rx.recv().await {
            if let Some(wo) = &candidate.from_wo {
                *per_wo.entry(wo.clone()).or_default() += 1;
            }
            candidates.push(candidate);
        }

        // Details are emitted in WO discovery order, not completion order.
        // An abandoned WO counts as errored yet keeps the BR entries it
        // delivered before the deadline.
        let mut section = WoProcessingSection::default();
        for wo in wos {
            let status = statuses
                .remove(&wo.number)
                .unwrap_or(WoExtractionStatus::Error);
            match status {
                WoExtractionStatus::Success => section.with_br_patents += 1,
                WoExtractionStatus::NoBrPatents => section.no_br_patents += 1,
                WoExtractionStatus::Skipped | WoExtractionStatus::Error => {
                    section.skipped_or_error += 1
                }
            }
            section.details.push(WoProcessingDetail {
                wo_number: wo.number.clone(),
                br_count: per_wo.get(&wo.number).copied().unwrap_or(0),
                status,
            });
        }
        section.total_processed = section.details.len();

        (candidates, section)
    }
}

/// Project merged BR candidates into the report section.
fn br_section(brs: Vec<BrCandidate>) -> BrPatentsSection {
    let from_wo_extraction = brs
        .iter()
        .filter(|b| b.source == BrSource::WoExtraction)
        .count();
    let from_inpi_direct = brs.len() - from_wo_extraction;

    BrPatentsSection {
        total: brs.len(),
        from_wo_extraction,
        from_inpi_direct,
        patents: brs
            .into_iter()
            .map(|b| BrPatentRecord {
                number: b.number,
                source: b.source,
                link: b.link,
                from_wo: b.from_wo,
                applicant: b.applicant,
                deposit_date: b.deposit_date,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.baseline_name, BASELINE_NAME);
        assert_eq!(config.expected_wos, EXPECTED_WOS);
        assert_eq!(config.expected_brs, EXPECTED_BRS);
        assert_eq!(
            config.request_timeout,
            Duration::from_secs(REQUEST_TIMEOUT_SECS)
        );
        assert_eq!(config.br_concurrency, BR_STAGE_CONCURRENCY);
    }

    #[test]
    fn config_clamps_zero_baseline() {
        let config = PipelineConfig::default()
            .with_baseline("internal", 0)
            .with_expected_wos(0);
        assert_eq!(config.expected_brs, 1);
        assert_eq!(config.expected_wos, 1);
    }

    #[test]
    fn config_builder_chaining() {
        let config = PipelineConfig::default()
            .with_baseline("internal", 12)
            .with_expected_wos(9)
            .with_request_timeout(Duration::from_secs(11))
            .with_wo_stage_timeout(Duration::from_secs(5))
            .with_br_stage_timeout(Duration::from_secs(7))
            .with_br_concurrency(2);

        assert_eq!(config.baseline_name, "internal");
        assert_eq!(config.expected_brs, 12);
        assert_eq!(config.expected_wos, 9);
        assert_eq!(config.request_timeout, Duration::from_secs(11));
        assert_eq!(config.wo_stage_timeout, Duration::from_secs(5));
        assert_eq!(config.br_stage_timeout, Duration::from_secs(7));
        assert_eq!(config.br_concurrency, 2);
    }

    #[test]
    fn stage_display_names() {
        assert_eq!(Stage::Enriching.to_string(), "enriching");
        assert_eq!(Stage::DiscoveringWo.to_string(), "discovering_wo");
        assert_eq!(Stage::Done.to_string(), "done");
    }

    #[tokio::test(start_paused = true)]
    async fn task_budget_is_bounded_by_deadline() {
        let deadline = Instant::now() + Duration::from_secs(5);
        let budget = task_budget(Duration::from_secs(60), deadline);
        assert!(budget <= Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(task_budget(Duration::from_secs(60), deadline), Duration::ZERO);
    }
}
