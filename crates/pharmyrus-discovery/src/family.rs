//! Family chain extraction: trace one WO publication to its Brazilian
//! national-phase entries.
//!
//! A resolved family with no Brazilian entry is a valid real-world
//! outcome, not a fault. A chain that breaks before family data is
//! reachable is reported as skipped so the processing summary can tell
//! the two apart. Candidates are sent through the caller's channel as
//! they are produced, so a task abandoned at a stage deadline keeps
//! what it already delivered.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use pharmyrus_core::normalize::normalize_br;
use pharmyrus_core::{
    BrCandidate, BrSource, DiscoverySeq, SearchBackend, WoExtractionStatus,
};

/// Outcome of one WO's extraction task.
pub struct ExtractionOutcome {
    pub wo_number: String,
    pub status: WoExtractionStatus,
    pub br_count: usize,
}

/// Resolves patent families and filters them for Brazil.
pub struct FamilyChainExtractor {
    backend: Arc<dyn SearchBackend>,
}

impl FamilyChainExtractor {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Extract the BR entries of one WO's family, sending each into
    /// `out`. `rank` is the task's fixed position in the BR stage
    /// fan-out.
    #[instrument(skip(self, out))]
    pub async fn extract(
        &self,
        wo_number: &str,
        rank: u16,
        out: &mpsc::UnboundedSender<BrCandidate>,
    ) -> ExtractionOutcome {
        let listing = match self.backend.family_listing(wo_number).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(wo_number, error = %e, "Family chain lookup failed");
                return ExtractionOutcome {
                    wo_number: wo_number.to_string(),
                    status: WoExtractionStatus::Error,
                    br_count: 0,
                };
            }
        };

        if !listing.resolved {
            debug!(wo_number, "Family chain broke before family data");
            return ExtractionOutcome {
                wo_number: wo_number.to_string(),
                status: WoExtractionStatus::Skipped,
                br_count: 0,
            };
        }

        let mut index = 0u32;
        for id in &listing.document_ids {
            let Some(br) = normalize_br(id) else {
                continue;
            };
            let candidate = BrCandidate {
                number: br,
                source: BrSource::WoExtraction,
                link: listing.link.clone(),
                from_wo: Some(wo_number.to_string()),
                applicant: None,
                deposit_date: None,
                seq: DiscoverySeq::new(rank, index),
            };
            if out.send(candidate).is_ok() {
                index += 1;
            }
        }

        let status = if index == 0 {
            WoExtractionStatus::NoBrPatents
        } else {
            WoExtractionStatus::Success
        };
        debug!(wo_number, br_count = index, "Family extracted");

        ExtractionOutcome {
            wo_number: wo_number.to_string(),
            status,
            br_count: index as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSearchBackend;
    use pharmyrus_core::FamilyListing;

    fn extractor(backend: MockSearchBackend) -> FamilyChainExtractor {
        FamilyChainExtractor::new(Arc::new(backend))
    }

    async fn run(
        backend: MockSearchBackend,
        wo_number: &str,
    ) -> (ExtractionOutcome, Vec<BrCandidate>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = extractor(backend).extract(wo_number, 0, &tx).await;
        drop(tx);
        let mut candidates = Vec::new();
        while let Some(c) = rx.recv().await {
            candidates.push(c);
        }
        (outcome, candidates)
    }

    #[tokio::test]
    async fn filters_family_for_brazilian_entries() {
        let backend = MockSearchBackend::new().with_family(
            "WO2010054987",
            FamilyListing {
                document_ids: vec![
                    "US2012270880A1".into(),
                    "BR112012008823A2".into(),
                    "EP2496575B1".into(),
                    "CN102596910A".into(),
                ],
                link: Some("https://patents.google.com/patent/WO2010054987A1".into()),
                resolved: true,
            },
        );

        let (outcome, candidates) = run(backend, "WO2010054987").await;
        assert_eq!(outcome.status, WoExtractionStatus::Success);
        assert_eq!(outcome.br_count, 1);
        assert_eq!(candidates.len(), 1);

        let br = &candidates[0];
        assert_eq!(br.number, "BR112012008823A2");
        assert_eq!(br.source, BrSource::WoExtraction);
        assert_eq!(br.from_wo.as_deref(), Some("WO2010054987"));
        assert!(br.link.is_some());
    }

    #[tokio::test]
    async fn resolved_family_without_brazil_is_no_br_patents() {
        let backend = MockSearchBackend::new().with_family(
            "WO2023222557",
            FamilyListing {
                document_ids: vec!["US2024012345A1".into()],
                link: None,
                resolved: true,
            },
        );

        let (outcome, candidates) = run(backend, "WO2023222557").await;
        assert_eq!(outcome.status, WoExtractionStatus::NoBrPatents);
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn unresolved_chain_is_skipped() {
        // No canned family: the mock answers with an unresolved listing.
        let backend = MockSearchBackend::new();

        let (outcome, candidates) = run(backend, "WO2023194528").await;
        assert_eq!(outcome.status, WoExtractionStatus::Skipped);
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn backend_failure_is_error_not_panic() {
        let backend = MockSearchBackend::new().failing();

        let (outcome, candidates) = run(backend, "WO2023222557").await;
        assert_eq!(outcome.status, WoExtractionStatus::Error);
        assert!(candidates.is_empty());
    }
}
