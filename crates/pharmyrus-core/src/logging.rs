//! Structured logging schema and field name constants for pharmyrus.
//!
//! All crates use these constants for consistent structured logging
//! fields, so log aggregation tools can query by standardized field names
//! across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Stage transitions, operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration (search hits, family entries) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID for one discovery run. Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "net", "enricher", "strategy", "family", "inpi", "pipeline"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "search", "enrich", "extract_br", "crawl", "merge"
pub const OPERATION: &str = "op";

// ─── Discovery fields ──────────────────────────────────────────────────────

/// Strategy name producing the log event.
pub const STRATEGY: &str = "strategy";

/// Search query text.
pub const QUERY: &str = "query";

/// Molecule name under discovery.
pub const MOLECULE: &str = "molecule";

/// WO publication number being processed.
pub const WO_NUMBER: &str = "wo_number";

/// External target of an outbound call ("serpapi", "pubchem", "inpi").
pub const TARGET: &str = "target";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of candidates or results produced.
pub const RESULT_COUNT: &str = "result_count";

/// Retry attempt number for an outbound call.
pub const ATTEMPT: &str = "attempt";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Initialize the tracing subscriber for embedding applications.
///
/// Respects `RUST_LOG`; defaults to `info` for pharmyrus crates. Safe to
/// call once per process; subsequent calls are ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pharmyrus=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
