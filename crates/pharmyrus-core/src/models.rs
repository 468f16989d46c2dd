//! Core data model for the discovery pipeline.
//!
//! The candidate types (`WoCandidate`, `BrCandidate`) are internal working
//! records produced by strategies and merged by the aggregator. The report
//! types mirror the externally visible `DiscoveryReport` shape field for
//! field; the HTTP layer serializes them verbatim, so nothing transport
//! specific belongs here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Input identity for a discovery run. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoleculeQuery {
    /// Free-text molecule name (required, non-empty).
    pub name: String,
    /// Optional brand/commercial name.
    pub brand: Option<String>,
}

impl MoleculeQuery {
    /// Create a query, trimming surrounding whitespace.
    pub fn new(name: impl Into<String>, brand: Option<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            brand: brand
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty()),
        }
    }

    /// Reject malformed input before any fan-out begins.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("molecule name is required".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Enriched identity
// ---------------------------------------------------------------------------

/// Rich molecule identity produced once by the enricher and shared
/// read-only by every strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichedMoleculeInfo {
    pub name: String,
    pub brand: Option<String>,
    /// Sponsor development codes in discovery order (e.g. "ODM-201").
    pub dev_codes: Vec<String>,
    /// CAS registry number, when the chemical database knows one.
    pub cas: Option<String>,
    /// General synonyms, deduplicated case-insensitively.
    pub synonyms: Vec<String>,
}

impl EnrichedMoleculeInfo {
    /// Degraded record carrying only the original identity. Used when the
    /// chemical database misses on both name and brand.
    pub fn bare(query: &MoleculeQuery) -> Self {
        Self {
            name: query.name.clone(),
            brand: query.brand.clone(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery sequencing
// ---------------------------------------------------------------------------

/// Position at which a candidate was produced: the task's fixed rank in
/// the stage fan-out plus the candidate's index within that task.
///
/// Ordering on this pair is what makes the final merged lists independent
/// of the real-time completion order of concurrent tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscoverySeq {
    pub task_rank: u16,
    pub index: u32,
}

impl DiscoverySeq {
    pub fn new(task_rank: u16, index: u32) -> Self {
        Self { task_rank, index }
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// A WO publication number discovered by one strategy.
///
/// Identity key is the canonical number string; two candidates with the
/// same key are the same patent regardless of originating strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WoCandidate {
    /// Canonical WO number (`WO` + 4-digit year + 6-digit sequence).
    pub number: String,
    /// Name of the strategy that produced this candidate.
    pub strategy: String,
    /// Search query that surfaced the number, when available.
    pub query: Option<String>,
    /// Result snippet the number was extracted from, when available.
    pub snippet: Option<String>,
    /// Production-time discovery sequence.
    pub seq: DiscoverySeq,
}

/// Provenance of a BR candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrSource {
    /// Traced from a WO publication's patent family.
    WoExtraction,
    /// Surfaced by the direct INPI crawl.
    InpiDirect,
}

impl std::fmt::Display for BrSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WoExtraction => write!(f, "wo_extraction"),
            Self::InpiDirect => write!(f, "inpi_direct"),
        }
    }
}

/// A BR national-phase application number with its resolution evidence.
///
/// Dedup key is the canonical number with the kind code suffix stripped;
/// the suffix is retained for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrCandidate {
    /// Canonical BR number including any kind code (`BR112012008823A2`).
    pub number: String,
    pub source: BrSource,
    /// Resolvable evidence link, when available.
    pub link: Option<String>,
    /// Originating WO number for `wo_extraction` candidates.
    pub from_wo: Option<String>,
    /// Applicant name, when the national office listing carries one.
    pub applicant: Option<String>,
    /// Deposit date string from the national office listing.
    pub deposit_date: Option<String>,
    /// Production-time discovery sequence.
    pub seq: DiscoverySeq,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Qualitative recall status against the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceStatus {
    Excellent,
    Good,
    Partial,
    Failed,
}

impl std::fmt::Display for ConfidenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "Excellent"),
            Self::Good => write!(f, "Good"),
            Self::Partial => write!(f, "Partial"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Molecule identity section of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoleculeInfoSection {
    pub name: String,
    pub brand: Option<String>,
    pub dev_codes: Vec<String>,
    pub cas: Option<String>,
}

impl From<&EnrichedMoleculeInfo> for MoleculeInfoSection {
    fn from(info: &EnrichedMoleculeInfo) -> Self {
        Self {
            name: info.name.clone(),
            brand: info.brand.clone(),
            dev_codes: info.dev_codes.clone(),
            cas: info.cas.clone(),
        }
    }
}

/// WO discovery section: ordered unique WO numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WoDiscoverySection {
    pub total_found: usize,
    pub wo_numbers: Vec<String>,
}

/// Outcome of one WO's family chain extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WoExtractionStatus {
    /// Family data resolved and Brazilian entries found.
    Success,
    /// Family data resolved but carried no Brazilian entry.
    NoBrPatents,
    /// Family chain could not be followed (missing endpoint/link).
    Skipped,
    /// Extraction task failed or timed out.
    Error,
}

/// Per-WO extraction detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WoProcessingDetail {
    pub wo_number: String,
    pub br_count: usize,
    pub status: WoExtractionStatus,
}

/// Summary of the BR extraction fan-out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WoProcessingSection {
    pub total_processed: usize,
    pub with_br_patents: usize,
    pub no_br_patents: usize,
    pub skipped_or_error: usize,
    pub details: Vec<WoProcessingDetail>,
}

/// One deduplicated BR filing with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrPatentRecord {
    pub number: String,
    pub source: BrSource,
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_wo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_date: Option<String>,
}

/// BR patents section of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrPatentsSection {
    pub total: usize,
    pub from_wo_extraction: usize,
    pub from_inpi_direct: usize,
    pub patents: Vec<BrPatentRecord>,
}

/// Comparison against the known baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Name of the trusted reference dataset.
    pub baseline: String,
    pub expected_brs: usize,
    pub br_found: usize,
    /// Recall rate, display-capped at 100% (e.g. "75%").
    pub br_rate: String,
    pub status: ConfidenceStatus,
}

/// Timing metadata for one discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSection {
    pub request_id: Uuid,
    pub duration_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

/// The sole externally visible artifact of a discovery run. Built once
/// per request and never mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub molecule_info: MoleculeInfoSection,
    pub wo_discovery: WoDiscoverySection,
    pub wo_processing: WoProcessingSection,
    pub br_patents: BrPatentsSection,
    pub comparison: ComparisonReport,
    pub performance: PerformanceSection,
}
