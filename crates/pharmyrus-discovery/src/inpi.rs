//! Direct crawl of the Brazilian IP office search interface.
//!
//! Surfaces BR filings whose originating WO was missed by every WO
//! discovery strategy. Query terms cover the molecule name, its
//! Portuguese rendering, the brand, and development codes; pagination is
//! followed up to a bounded page count per term. Candidates are sent
//! through the caller's channel page by page, so a crawl abandoned at a
//! stage deadline keeps the pages it already covered.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use pharmyrus_core::defaults::{INPI_DEV_CODE_TERMS, INPI_MAX_PAGES};
use pharmyrus_core::normalize::extract_br_numbers;
use pharmyrus_core::{BrCandidate, BrSource, DiscoverySeq, EnrichedMoleculeInfo, InpiBackend};

/// INN-to-Portuguese suffix rewrites (`darolutamide` is filed as
/// `darolutamida`).
const SUFFIX_VARIANTS: &[(&str, &str)] = &[
    ("ide", "ida"),
    ("ine", "ina"),
    ("ib", "ibe"),
    ("ab", "abe"),
];

/// Portuguese rendering of an INN, when a suffix rule applies.
fn portuguese_variant(name: &str) -> Option<String> {
    let lower = name.to_lowercase();
    for (from, to) in SUFFIX_VARIANTS {
        if let Some(stem) = lower.strip_suffix(from) {
            return Some(format!("{stem}{to}"));
        }
    }
    None
}

/// Query terms for one molecule, deduplicated case-insensitively in
/// priority order: name, Portuguese variant, brand, dev codes (both
/// hyphenated and compact forms).
fn query_terms(info: &EnrichedMoleculeInfo) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut terms = Vec::new();
    let mut push = |term: String| {
        if !term.is_empty() && seen.insert(term.to_lowercase()) {
            terms.push(term);
        }
    };

    push(info.name.clone());
    if let Some(pt) = portuguese_variant(&info.name) {
        push(pt);
    }
    if let Some(brand) = &info.brand {
        push(brand.clone());
    }

    let mut code_terms = 0usize;
    for code in &info.dev_codes {
        if code_terms >= INPI_DEV_CODE_TERMS {
            break;
        }
        push(code.clone());
        code_terms += 1;

        let compact = code.replace('-', "");
        if compact != *code && code_terms < INPI_DEV_CODE_TERMS {
            push(compact);
            code_terms += 1;
        }
    }

    terms
}

/// Direct national office crawler.
pub struct InpiDirectCrawler {
    backend: Arc<dyn InpiBackend>,
}

impl InpiDirectCrawler {
    pub fn new(backend: Arc<dyn InpiBackend>) -> Self {
        Self { backend }
    }

    /// Crawl listing pages for every query term, sending each candidate
    /// into `out` as its page is scanned. A failing term or page
    /// contributes nothing; remaining terms still run. Returns the
    /// number of candidates sent.
    #[instrument(skip(self, info, out), fields(molecule = %info.name))]
    pub async fn crawl(
        &self,
        info: &EnrichedMoleculeInfo,
        rank: u16,
        out: &mpsc::UnboundedSender<BrCandidate>,
    ) -> usize {
        let mut seen: HashSet<String> = HashSet::new();
        let mut index = 0u32;

        for term in query_terms(info) {
            for page in 0..INPI_MAX_PAGES {
                let listing = match self.backend.search_page(&term, page).await {
                    Ok(listing) => listing,
                    Err(e) => {
                        warn!(%term, page, error = %e, "National office page fetch failed");
                        break;
                    }
                };

                for entry in &listing.entries {
                    for br in extract_br_numbers(&entry.title) {
                        if !seen.insert(br.clone()) {
                            continue;
                        }
                        let candidate = BrCandidate {
                            number: br,
                            source: BrSource::InpiDirect,
                            link: None,
                            from_wo: None,
                            applicant: entry.applicant.clone(),
                            deposit_date: entry.deposit_date.clone(),
                            seq: DiscoverySeq::new(rank, index),
                        };
                        if out.send(candidate).is_ok() {
                            index += 1;
                        }
                    }
                }

                if !listing.has_more {
                    break;
                }
            }
        }

        debug!(molecule = %info.name, found = index, "Direct crawl finished");
        index as usize
    }
}
