//! Centralized default constants for the pharmyrus system.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates should reference these constants instead of defining
//! their own magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// FETCHER
// =============================================================================

/// Maximum retry attempts for a single outbound call.
pub const FETCH_MAX_RETRIES: u32 = 3;

/// Hard per-call timeout in seconds.
pub const FETCH_TIMEOUT_SECS: u64 = 30;

/// Per-call timeout for the INPI crawler service (slower upstream).
pub const INPI_TIMEOUT_SECS: u64 = 60;

/// Base delay for exponential backoff in milliseconds (doubles per attempt).
pub const BACKOFF_BASE_MS: u64 = 500;

/// Maximum random jitter added to each backoff delay, in milliseconds.
pub const BACKOFF_JITTER_MS: u64 = 250;

/// Maximum simultaneous in-flight calls per external target.
pub const PER_TARGET_CONCURRENCY: usize = 4;

// =============================================================================
// API KEY ROTATION
// =============================================================================

/// Cooldown window for a quota-exhausted credential, in seconds.
pub const KEY_COOLDOWN_SECS: u64 = 300;

// =============================================================================
// PIPELINE
// =============================================================================

/// Wall-clock budget for one whole discovery request, in seconds. When
/// it expires the pipeline abandons outstanding tasks and proceeds to
/// aggregation with whatever was collected.
pub const REQUEST_TIMEOUT_SECS: u64 = 180;

// =============================================================================
// WO DISCOVERY
// =============================================================================

/// First publication year covered by the year-sweep strategy (inclusive).
pub const YEAR_SWEEP_START: u16 = 2006;

/// Last publication year covered by the year-sweep strategy (inclusive).
pub const YEAR_SWEEP_END: u16 = 2024;

/// Result cap for one patent-engine query.
pub const PATENT_RESULTS_PER_QUERY: usize = 20;

/// Result cap for one web-engine query.
pub const WEB_RESULTS_PER_QUERY: usize = 10;

/// Maximum development codes expanded into queries per strategy.
pub const DEV_CODES_PER_STRATEGY: usize = 10;

/// Maximum synonyms expanded into queries by the synonym strategy.
pub const SYNONYMS_PER_STRATEGY: usize = 5;

/// Wall-clock budget for the entire WO discovery stage, in seconds.
pub const WO_STAGE_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// BR DISCOVERY
// =============================================================================

/// Wall-clock budget for the entire BR discovery stage, in seconds.
pub const BR_STAGE_TIMEOUT_SECS: u64 = 90;

/// Global concurrency ceiling across family extraction + crawler tasks.
pub const BR_STAGE_CONCURRENCY: usize = 6;

/// Maximum cited documents scanned per patent detail page.
pub const FAMILY_CITATIONS_SCAN: usize = 50;

/// Maximum similar documents scanned per patent detail page.
pub const FAMILY_SIMILAR_SCAN: usize = 30;

/// Maximum listing pages followed per INPI search term.
pub const INPI_MAX_PAGES: usize = 3;

/// Maximum development codes expanded into INPI search terms.
pub const INPI_DEV_CODE_TERMS: usize = 12;

// =============================================================================
// ENRICHMENT
// =============================================================================

/// Maximum synonyms scanned from a chemical database response.
pub const ENRICH_SYNONYM_SCAN: usize = 150;

/// Maximum development codes retained on an enriched record.
pub const ENRICH_MAX_DEV_CODES: usize = 25;

/// Maximum synonyms retained on an enriched record.
pub const ENRICH_MAX_SYNONYMS: usize = 50;

// =============================================================================
// SCORING
// =============================================================================

/// Name of the trusted reference dataset used as the scoring baseline.
pub const BASELINE_NAME: &str = "Cortellis";

/// Expected number of distinct WO publications for the baseline case.
pub const EXPECTED_WOS: usize = 7;

/// Expected number of BR national-phase filings for the baseline case.
pub const EXPECTED_BRS: usize = 8;
