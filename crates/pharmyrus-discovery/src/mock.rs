//! Mock backends for tests and local development.
//!
//! Each mock is builder-configured with canned responses, keeps a call
//! log, and can be flipped into a failing or arbitrarily slow mode so
//! degradation and timeout paths are testable without a network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use pharmyrus_core::{
    ChemicalBackend, Error, FamilyListing, InpiBackend, InpiPage, Result, SearchBackend,
    SearchEngine, SearchPage,
};

// ---------------------------------------------------------------------------
// Chemical database
// ---------------------------------------------------------------------------

/// Canned chemical database.
#[derive(Default)]
pub struct MockChemicalBackend {
    synonyms: HashMap<String, Vec<String>>,
    fail: bool,
}

impl MockChemicalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Can a synonym list for a compound name (matched case-insensitively).
    pub fn with_synonyms(mut self, name: &str, synonyms: &[&str]) -> Self {
        self.synonyms.insert(
            name.to_lowercase(),
            synonyms.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Every call fails with a request error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl ChemicalBackend for MockChemicalBackend {
    async fn synonyms(&self, name: &str) -> Result<Option<Vec<String>>> {
        if self.fail {
            return Err(Error::Request("mock chemical backend failure".into()));
        }
        Ok(self.synonyms.get(&name.to_lowercase()).cloned())
    }
}

// ---------------------------------------------------------------------------
// Search engine / patent target
// ---------------------------------------------------------------------------

/// Canned search backend with a query call log.
#[derive(Default)]
pub struct MockSearchBackend {
    pages: HashMap<String, SearchPage>,
    families: HashMap<String, FamilyListing>,
    fail: bool,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockSearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Can the result page for one exact query string. Unknown queries
    /// answer an empty page.
    pub fn with_page(mut self, query: &str, page: SearchPage) -> Self {
        self.pages.insert(query.to_string(), page);
        self
    }

    /// Can the family listing for one WO number. Unknown numbers answer
    /// an unresolved listing.
    pub fn with_family(mut self, wo_number: &str, listing: FamilyListing) -> Self {
        self.families.insert(wo_number.to_string(), listing);
        self
    }

    /// Every call fails with a request error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Every call sleeps first. Pair with a paused tokio clock to stub a
    /// task that outlives its stage deadline.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Handle to the query call log.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }

    async fn settle(&self) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(Error::Request("mock search backend failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    async fn search(&self, _engine: SearchEngine, query: &str, _limit: usize) -> Result<SearchPage> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(query.to_string());
        self.settle().await?;
        Ok(self.pages.get(query).cloned().unwrap_or_default())
    }

    async fn family_listing(&self, wo_number: &str) -> Result<FamilyListing> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(format!("family:{wo_number}"));
        self.settle().await?;
        Ok(self.families.get(wo_number).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// National office
// ---------------------------------------------------------------------------

/// Canned national office backend.
#[derive(Default)]
pub struct MockInpiBackend {
    pages: HashMap<(String, usize), InpiPage>,
    fail: bool,
    delay: Option<Duration>,
}

impl MockInpiBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Can one listing page for a term. Unknown term/page pairs answer an
    /// empty final page.
    pub fn with_page(mut self, term: &str, page: usize, listing: InpiPage) -> Self {
        self.pages.insert((term.to_string(), page), listing);
        self
    }

    /// Every call fails with a request error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Every page fetch sleeps first. Pair with a paused tokio clock to
    /// stub a crawl that outlives its stage deadline.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl InpiBackend for MockInpiBackend {
    async fn search_page(&self, term: &str, page: usize) -> Result<InpiPage> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(Error::Request("mock national office failure".into()));
        }
        Ok(self
            .pages
            .get(&(term.to_string(), page))
            .cloned()
            .unwrap_or_default())
    }
}
