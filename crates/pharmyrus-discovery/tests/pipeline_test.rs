//! End-to-end pipeline scenarios over canned backends.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use pharmyrus_core::{
    ChemicalBackend, ConfidenceStatus, EnrichedMoleculeInfo, FamilyListing, InpiBackend,
    InpiEntry, InpiPage, MoleculeQuery, SearchBackend, SearchHitRecord, SearchPage,
    WoExtractionStatus,
};
use pharmyrus_discovery::mock::{MockChemicalBackend, MockInpiBackend, MockSearchBackend};
use pharmyrus_discovery::{CandidateSink, DiscoveryPipeline, PipelineConfig, WoDiscoveryStrategy};

/// Stub strategy emitting a fixed candidate list after an optional delay.
struct FixedStrategy {
    tag: &'static str,
    numbers: Vec<&'static str>,
    delay: Duration,
}

impl FixedStrategy {
    fn new(tag: &'static str, numbers: Vec<&'static str>) -> Self {
        Self {
            tag,
            numbers,
            delay: Duration::ZERO,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl WoDiscoveryStrategy for FixedStrategy {
    fn name(&self) -> &'static str {
        self.tag
    }

    async fn discover(&self, _info: &EnrichedMoleculeInfo, sink: &mut CandidateSink) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        for number in &self.numbers {
            sink.push(number.to_string(), "canned", None);
        }
    }
}

/// Stub strategy that emits early finds, stalls, then would emit more.
struct TricklingStrategy {
    tag: &'static str,
    early: Vec<&'static str>,
    late: Vec<&'static str>,
    stall: Duration,
}

#[async_trait]
impl WoDiscoveryStrategy for TricklingStrategy {
    fn name(&self) -> &'static str {
        self.tag
    }

    async fn discover(&self, _info: &EnrichedMoleculeInfo, sink: &mut CandidateSink) {
        for number in &self.early {
            sink.push(number.to_string(), "canned", None);
        }
        tokio::time::sleep(self.stall).await;
        for number in &self.late {
            sink.push(number.to_string(), "canned", None);
        }
    }
}

fn empty_backends() -> (
    Arc<dyn ChemicalBackend>,
    Arc<dyn SearchBackend>,
    Arc<dyn InpiBackend>,
) {
    (
        Arc::new(MockChemicalBackend::new()),
        Arc::new(MockSearchBackend::new()),
        Arc::new(MockInpiBackend::new()),
    )
}

// ---------------------------------------------------------------------------
// Seed scenario
// ---------------------------------------------------------------------------

#[tokio::test]
async fn darolutamide_seed_scenario() {
    let chemical = MockChemicalBackend::new().with_synonyms(
        "darolutamide",
        &["Darolutamide", "ODM-201", "BAY-1841788", "1297538-32-9"],
    );

    let search = MockSearchBackend::new()
        .with_page(
            "\"darolutamide\" patent WO",
            SearchPage {
                hits: vec![],
                publication_numbers: vec!["WO2023222557A1".into()],
            },
        )
        .with_page(
            "\"ODM-201\" patent WO",
            SearchPage {
                hits: vec![SearchHitRecord {
                    title: "Androgen receptor antagonist".into(),
                    snippet: "International publication WO 2023/194528 discloses...".into(),
                    link: "https://patents.example/WO2023194528".into(),
                }],
                publication_numbers: vec![],
            },
        )
        .with_family(
            "WO2023222557",
            FamilyListing {
                document_ids: vec!["US2024001234A1".into(), "BR112012008823A2".into()],
                link: Some("https://patents.google.com/patent/WO2023222557A1".into()),
                resolved: true,
            },
        )
        .with_family(
            "WO2023194528",
            FamilyListing {
                document_ids: vec!["EP4352053A1".into()],
                link: None,
                resolved: true,
            },
        );

    let pipeline = DiscoveryPipeline::new(
        Arc::new(chemical),
        Arc::new(search),
        Arc::new(MockInpiBackend::new()),
        PipelineConfig::default(),
    );

    let report = pipeline
        .search(MoleculeQuery::new("darolutamide", Some("Nubeqa".into())))
        .await
        .unwrap();

    assert_eq!(report.molecule_info.name, "darolutamide");
    assert!(report.molecule_info.dev_codes.contains(&"ODM-201".to_string()));
    assert_eq!(report.molecule_info.cas.as_deref(), Some("1297538-32-9"));

    assert!(report.wo_discovery.total_found >= 2);
    assert!(report
        .wo_discovery
        .wo_numbers
        .contains(&"WO2023222557".to_string()));
    assert!(report
        .wo_discovery
        .wo_numbers
        .contains(&"WO2023194528".to_string()));

    assert!(report.br_patents.total >= 1);
    let br = &report.br_patents.patents[0];
    assert_eq!(br.number, "BR112012008823A2");
    assert_eq!(br.source.to_string(), "wo_extraction");
    assert_eq!(br.from_wo.as_deref(), Some("WO2023222557"));

    // One WO traced to Brazil, the other resolved with no BR entry.
    assert_eq!(report.wo_processing.total_processed, report.wo_discovery.total_found);
    assert_eq!(report.wo_processing.with_br_patents, 1);
    assert!(report
        .wo_processing
        .details
        .iter()
        .any(|d| d.wo_number == "WO2023194528" && d.status == WoExtractionStatus::NoBrPatents));

    assert_eq!(report.comparison.status, ConfidenceStatus::Partial);
    assert_eq!(report.comparison.br_found, report.br_patents.total);
}

// ---------------------------------------------------------------------------
// Degradation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn total_backend_failure_degrades_to_failed_report() {
    let pipeline = DiscoveryPipeline::new(
        Arc::new(MockChemicalBackend::new().failing()),
        Arc::new(MockSearchBackend::new().failing()),
        Arc::new(MockInpiBackend::new().failing()),
        PipelineConfig::default(),
    );

    let report = pipeline
        .search(MoleculeQuery::new("darolutamide", None))
        .await
        .unwrap();

    assert_eq!(report.molecule_info.name, "darolutamide");
    assert_eq!(report.wo_discovery.total_found, 0);
    assert_eq!(report.br_patents.total, 0);
    assert_eq!(report.comparison.status, ConfidenceStatus::Failed);
    assert_eq!(report.comparison.br_rate, "0%");
}

#[tokio::test]
async fn empty_molecule_name_is_rejected_before_fanout() {
    let (chemical, search, inpi) = empty_backends();
    let pipeline = DiscoveryPipeline::new(chemical, search, inpi, PipelineConfig::default());

    let err = pipeline.search(MoleculeQuery::new("   ", None)).await;
    assert!(err.is_err());
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn merge_order_is_independent_of_completion_order() {
    // The lower-ranked strategy finishes last; its candidates still lead.
    let (chemical, search, inpi) = empty_backends();
    let pipeline = DiscoveryPipeline::new(chemical, search, inpi, PipelineConfig::default())
        .with_strategies(vec![
            Arc::new(
                FixedStrategy::new("slow_first", vec!["WO2023222557", "WO2010054987"])
                    .with_delay(Duration::from_secs(5)),
            ),
            Arc::new(FixedStrategy::new(
                "fast_second",
                vec!["WO2023194528", "WO2023222557"],
            )),
        ]);

    let report = pipeline
        .search(MoleculeQuery::new("darolutamide", None))
        .await
        .unwrap();

    assert_eq!(
        report.wo_discovery.wo_numbers,
        vec!["WO2023222557", "WO2010054987", "WO2023194528"]
    );
}

// ---------------------------------------------------------------------------
// Stage deadlines
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn stalled_strategy_contributes_nothing_within_stage_budget() {
    let (chemical, search, inpi) = empty_backends();
    let config = PipelineConfig::default().with_wo_stage_timeout(Duration::from_secs(2));
    let pipeline = DiscoveryPipeline::new(chemical, search, inpi, config).with_strategies(vec![
        Arc::new(FixedStrategy::new("healthy", vec!["WO2023222557"])),
        Arc::new(
            FixedStrategy::new("stalled", vec!["WO1999000001"])
                .with_delay(Duration::from_secs(3600)),
        ),
    ]);

    let clock = tokio::time::Instant::now();
    let report = pipeline
        .search(MoleculeQuery::new("darolutamide", None))
        .await
        .unwrap();

    // The stalled strategy is abandoned at the deadline, not awaited.
    assert!(clock.elapsed() < Duration::from_secs(10));
    assert_eq!(report.wo_discovery.wo_numbers, vec!["WO2023222557"]);
}

#[tokio::test(start_paused = true)]
async fn abandoned_strategy_keeps_candidates_found_before_deadline() {
    // A strategy that found a WO and then hung is abandoned at the
    // deadline, yet its early find must land in the report.
    let (chemical, search, inpi) = empty_backends();
    let config = PipelineConfig::default().with_wo_stage_timeout(Duration::from_secs(2));
    let pipeline =
        DiscoveryPipeline::new(chemical, search, inpi, config).with_strategies(vec![Arc::new(
            TricklingStrategy {
                tag: "trickling",
                early: vec!["WO2023222557"],
                late: vec!["WO1999000001"],
                stall: Duration::from_secs(3600),
            },
        )]);

    let clock = tokio::time::Instant::now();
    let report = pipeline
        .search(MoleculeQuery::new("darolutamide", None))
        .await
        .unwrap();

    assert!(clock.elapsed() < Duration::from_secs(10));
    assert_eq!(report.wo_discovery.wo_numbers, vec!["WO2023222557"]);
}

#[tokio::test(start_paused = true)]
async fn abandoned_crawl_keeps_pages_scanned_before_deadline() {
    // Page 0 lands inside the BR stage budget, page 1 would not; the BR
    // entry from page 0 survives the crawl's abandonment.
    let inpi = MockInpiBackend::new()
        .with_delay(Duration::from_millis(1500))
        .with_page(
            "darolutamide",
            0,
            InpiPage {
                entries: vec![InpiEntry {
                    title: "BR 11 2012 008823 A2 - derivados de carboxamida".into(),
                    applicant: Some("Orion Corporation".into()),
                    deposit_date: Some("2010-10-26".into()),
                }],
                has_more: true,
            },
        );

    let config = PipelineConfig::default().with_br_stage_timeout(Duration::from_secs(2));
    let pipeline = DiscoveryPipeline::new(
        Arc::new(MockChemicalBackend::new()),
        Arc::new(MockSearchBackend::new()),
        Arc::new(inpi),
        config,
    )
    .with_strategies(vec![]);

    let clock = tokio::time::Instant::now();
    let report = pipeline
        .search(MoleculeQuery::new("darolutamide", None))
        .await
        .unwrap();

    assert!(clock.elapsed() < Duration::from_secs(10));
    assert_eq!(report.br_patents.total, 1);
    assert_eq!(report.br_patents.patents[0].number, "BR112012008823A2");
    assert_eq!(report.br_patents.patents[0].source.to_string(), "inpi_direct");
}

#[tokio::test(start_paused = true)]
async fn request_deadline_forces_progression_with_collected_output() {
    // The request budget is tighter than the stage budgets; on expiry the
    // pipeline abandons the fan-out and reports what it collected.
    let (chemical, search, inpi) = empty_backends();
    let config = PipelineConfig::default()
        .with_request_timeout(Duration::from_secs(5))
        .with_wo_stage_timeout(Duration::from_secs(60))
        .with_br_stage_timeout(Duration::from_secs(90));
    let pipeline =
        DiscoveryPipeline::new(chemical, search, inpi, config).with_strategies(vec![Arc::new(
            TricklingStrategy {
                tag: "trickling",
                early: vec!["WO2023222557"],
                late: vec!["WO1999000001"],
                stall: Duration::from_secs(3600),
            },
        )]);

    let clock = tokio::time::Instant::now();
    let report = pipeline
        .search(MoleculeQuery::new("darolutamide", None))
        .await
        .unwrap();

    assert!(clock.elapsed() < Duration::from_secs(20));
    assert_eq!(report.wo_discovery.wo_numbers, vec!["WO2023222557"]);
    // The abandoned WO stage still feeds BR processing of its finds.
    assert_eq!(report.wo_processing.total_processed, 1);
}

// ---------------------------------------------------------------------------
// Report shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_serializes_with_contract_fields() {
    let (chemical, search, inpi) = empty_backends();
    let pipeline = DiscoveryPipeline::new(chemical, search, inpi, PipelineConfig::default());

    let report = pipeline
        .search(MoleculeQuery::new("darolutamide", Some("Nubeqa".into())))
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    for path in [
        "molecule_info",
        "wo_discovery",
        "wo_processing",
        "br_patents",
        "comparison",
        "performance",
    ] {
        assert!(json.get(path).is_some(), "missing report section {path}");
    }
    assert_eq!(json["molecule_info"]["name"], "darolutamide");
    assert_eq!(json["comparison"]["baseline"], "Cortellis");
    assert_eq!(json["comparison"]["expected_brs"], 8);
    assert!(json["performance"]["request_id"].is_string());
}
