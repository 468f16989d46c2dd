//! Molecule enrichment: expand a bare name into dev codes, CAS number,
//! and synonyms via the chemical database.
//!
//! Enrichment is best-effort. A database miss on both name and brand
//! degrades strategy recall, it never aborts discovery.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use pharmyrus_core::defaults::{ENRICH_MAX_DEV_CODES, ENRICH_MAX_SYNONYMS, ENRICH_SYNONYM_SCAN};
use pharmyrus_core::normalize::{is_cas_number, is_dev_code};
use pharmyrus_core::{ChemicalBackend, EnrichedMoleculeInfo, MoleculeQuery};

/// Builds an [`EnrichedMoleculeInfo`] from the chemical database.
pub struct MoleculeEnricher {
    backend: Arc<dyn ChemicalBackend>,
}

impl MoleculeEnricher {
    pub fn new(backend: Arc<dyn ChemicalBackend>) -> Self {
        Self { backend }
    }

    /// Enrich a query, falling back from name to brand and finally to a
    /// bare identity record.
    #[instrument(skip(self), fields(molecule = %query.name))]
    pub async fn enrich(&self, query: &MoleculeQuery) -> EnrichedMoleculeInfo {
        let synonyms = match self.lookup(&query.name).await {
            Some(list) => Some(list),
            None => match &query.brand {
                Some(brand) => self.lookup(brand).await,
                None => None,
            },
        };

        let Some(raw) = synonyms else {
            info!(molecule = %query.name, "No chemical database record, using bare identity");
            return EnrichedMoleculeInfo::bare(query);
        };

        let info = classify_synonyms(query, &raw);
        info!(
            molecule = %query.name,
            dev_codes = info.dev_codes.len(),
            synonyms = info.synonyms.len(),
            cas = info.cas.is_some(),
            "Molecule enriched"
        );
        info
    }

    async fn lookup(&self, name: &str) -> Option<Vec<String>> {
        match self.backend.synonyms(name).await {
            Ok(result) => result,
            Err(e) => {
                warn!(compound = name, error = %e, "Chemical database lookup failed");
                None
            }
        }
    }
}

/// Partition a raw synonym list into dev codes, CAS number, and general
/// synonyms, deduplicated case-insensitively and bounded.
fn classify_synonyms(query: &MoleculeQuery, raw: &[String]) -> EnrichedMoleculeInfo {
    let mut seen: HashSet<String> = HashSet::new();
    let mut dev_codes = Vec::new();
    let mut cas: Option<String> = None;
    let mut synonyms = Vec::new();

    let own_name = query.name.to_lowercase();

    for entry in raw.iter().take(ENRICH_SYNONYM_SCAN) {
        let entry = entry.trim();
        if entry.is_empty() || entry.to_lowercase() == own_name {
            continue;
        }
        if !seen.insert(entry.to_lowercase()) {
            continue;
        }

        if is_cas_number(entry) {
            if cas.is_none() {
                cas = Some(entry.to_string());
            }
        } else if is_dev_code(entry) {
            if dev_codes.len() < ENRICH_MAX_DEV_CODES {
                dev_codes.push(entry.to_string());
            }
        } else if synonyms.len() < ENRICH_MAX_SYNONYMS {
            synonyms.push(entry.to_string());
        }
    }

    debug!(
        scanned = raw.len().min(ENRICH_SYNONYM_SCAN),
        dev_codes = dev_codes.len(),
        "Classified synonym list"
    );

    EnrichedMoleculeInfo {
        name: query.name.clone(),
        brand: query.brand.clone(),
        dev_codes,
        cas,
        synonyms,
    }
}
