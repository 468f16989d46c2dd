//! Backend trait seams consumed by the discovery pipeline.
//!
//! `pharmyrus-net` provides the production implementations (SerpApi,
//! PubChem, INPI crawler service); tests inject mocks. Keeping the traits
//! here lets the discovery crate depend only on the contract, the same way
//! strategies never see a concrete HTTP client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Search engine target
// ---------------------------------------------------------------------------

/// Which external search engine a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchEngine {
    /// General web search (ranked organic results).
    Web,
    /// Patent-specific search engine (publication-aware results).
    Patents,
}

impl std::fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Web => write!(f, "web"),
            Self::Patents => write!(f, "patents"),
        }
    }
}

// ---------------------------------------------------------------------------
// Result records
// ---------------------------------------------------------------------------

/// One ranked search result: the text a strategy scans for WO numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHitRecord {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

impl SearchHitRecord {
    /// Concatenated text scanned by the shared number extractor.
    pub fn scan_text(&self) -> String {
        format!("{} {} {}", self.title, self.snippet, self.link)
    }
}

/// One page of search results. Patent-engine pages additionally carry
/// publication numbers parsed by the engine itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    pub hits: Vec<SearchHitRecord>,
    /// Publication numbers reported directly by a patent engine
    /// (empty for web searches).
    pub publication_numbers: Vec<String>,
}

/// Raw patent family listing for one WO publication: every related
/// document identifier the patent target reports, jurisdiction prefixes
/// intact. The family chain extractor filters for Brazil.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyListing {
    pub document_ids: Vec<String>,
    /// Link to the resolved patent detail page, when available.
    pub link: Option<String>,
    /// True when the family chain resolved to a detail record. False means
    /// the chain broke before family data was reachable, which is distinct
    /// from a resolved family with no entries.
    pub resolved: bool,
}

/// One entry on a national office listing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InpiEntry {
    /// Listing title; BR application numbers appear here.
    pub title: String,
    pub applicant: Option<String>,
    pub deposit_date: Option<String>,
}

/// One page of national office search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InpiPage {
    pub entries: Vec<InpiEntry>,
    /// Whether another page follows this one.
    pub has_more: bool,
}

// ---------------------------------------------------------------------------
// Trait seams
// ---------------------------------------------------------------------------

/// Search engine / patent-search target used by the WO discovery
/// strategies and the family chain extractor.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Query one engine for ranked results, capped at `limit` hits.
    async fn search(&self, engine: SearchEngine, query: &str, limit: usize)
        -> Result<SearchPage>;

    /// Resolve the patent family listing for one canonical WO number.
    ///
    /// A WO with no resolvable family yields an empty listing, not an
    /// error.
    async fn family_listing(&self, wo_number: &str) -> Result<FamilyListing>;
}

/// Chemical database queried by the molecule enricher.
#[async_trait]
pub trait ChemicalBackend: Send + Sync {
    /// Synonym list for a compound name. `Ok(None)` means "not found",
    /// which is a degraded-data outcome rather than an error.
    async fn synonyms(&self, name: &str) -> Result<Option<Vec<String>>>;
}

/// Brazilian IP office search target used by the direct crawler.
#[async_trait]
pub trait InpiBackend: Send + Sync {
    /// One listing page for a search term. Pages are zero-indexed.
    async fn search_page(&self, term: &str, page: usize) -> Result<InpiPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_engine_display() {
        assert_eq!(SearchEngine::Web.to_string(), "web");
        assert_eq!(SearchEngine::Patents.to_string(), "patents");
    }

    #[test]
    fn scan_text_joins_all_fields() {
        let hit = SearchHitRecord {
            title: "Androgen receptor modulators".into(),
            snippet: "WO2023222557 discloses...".into(),
            link: "https://patents.example/WO2023222557".into(),
        };
        let text = hit.scan_text();
        assert!(text.contains("Androgen receptor modulators"));
        assert!(text.contains("WO2023222557 discloses"));
        assert!(text.contains("https://patents.example/WO2023222557"));
    }

    #[test]
    fn default_pages_are_empty() {
        let page = SearchPage::default();
        assert!(page.hits.is_empty());
        assert!(page.publication_numbers.is_empty());

        let listing = FamilyListing::default();
        assert!(listing.document_ids.is_empty());
        assert!(!listing.resolved);

        let inpi = InpiPage::default();
        assert!(inpi.entries.is_empty());
        assert!(!inpi.has_more);
    }
}
