//! Shared WO/BR patent number normalization and validation.
//!
//! Every strategy, the family chain extractor, the crawler, and the
//! aggregator go through this module, so two textual representations of
//! the same publication always collapse to one canonical form before
//! dedup comparison.
//!
//! Canonical forms:
//!
//! ```text
//! WO numbers:  "WO" + 4-digit year + 6-digit sequence   (WO2023222557)
//! BR numbers:  "BR" + digits + optional kind code        (BR112012008823A2)
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Textual variants under which WO numbers appear in search snippets,
/// links, and publication listings. Each pattern captures (year, sequence).
static WO_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Four-digit year with optional spacing/hyphen/slash separators,
        // also matches the compact published form (WO2023222557A1).
        r"(?i)WO[\s-]?(\d{4})[\s/-]?(\d{6})",
        // PCT application references (PCT/EP2023/059011).
        r"(?i)PCT/[A-Z]{2}(\d{4})/(\d{6})",
        // Two-digit year; the separator is mandatory here, otherwise the
        // pattern would mis-split compact four-digit-year numbers.
        r"(?i)WO\s?(\d{2})[\s/](\d{5,6})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static WO pattern"))
    .collect()
});

/// Canonical WO number shape.
static WO_CANONICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^WO\d{4}\d{6}$").expect("static WO canonical pattern"));

/// Canonical BR application number shape: `BR` + 6-12 digits + optional
/// kind code (letter plus optional digit, e.g. `A2`, `B1`, `A`).
static BR_CANONICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^BR(\d{6,12})([A-Z]\d?)?$").expect("static BR canonical pattern"));

/// BR numbers as they appear in free text and national office listings,
/// where digit groups are separated by spaces, dots, or hyphens
/// (`BR 11 2012 008823 A2`).
static BR_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bBR(?:[\s./-]?\d){6,12}(?:[\s./-]?[A-Z]\d?)?\b")
        .expect("static BR text pattern")
});

/// Sponsor development code shape (e.g. `ODM-201`, `BAY-1841788`).
static DEV_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[A-Z]{2,5}-?\d{3,7}[A-Z]?$").expect("static dev code pattern"));

/// CAS registry number shape (e.g. `1297538-32-9`).
static CAS_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2,7}-\d{2}-\d$").expect("static CAS pattern"));

/// Build a canonical WO number from captured year and sequence strings.
///
/// Two-digit years expand to 20xx below 50, 19xx otherwise; sequences are
/// left-padded to six digits.
fn canonical_wo(year: &str, sequence: &str) -> String {
    let year = if year.len() == 2 {
        let n: u16 = year.parse().unwrap_or(0);
        if n < 50 {
            format!("20{year}")
        } else {
            format!("19{year}")
        }
    } else {
        year.to_string()
    };
    format!("WO{year}{:0>6}", sequence)
}

/// Extract every WO number appearing in free text, canonicalized.
///
/// Output preserves first-occurrence order and contains no duplicates, so
/// a strategy yields candidates in a stable relative order for any given
/// snippet sequence.
pub fn extract_wo_numbers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for pattern in WO_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let wo = canonical_wo(&caps[1], &caps[2]);
            if seen.insert(wo.clone()) {
                out.push(wo);
            }
        }
    }

    out
}

/// Normalize a single WO publication number to canonical form.
///
/// Returns `None` when the input does not contain a recognizable WO
/// number. Idempotent: canonical input comes back unchanged.
pub fn normalize_wo(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '/' | '.'))
        .collect();
    let compact = compact.to_uppercase();

    if WO_CANONICAL.is_match(&compact) {
        return Some(compact);
    }

    // Published numbers often carry a kind code suffix (WO2023222557A1).
    if let Some(prefix) = compact.get(..12) {
        if compact.len() > 12 && WO_CANONICAL.is_match(prefix) {
            return Some(prefix.to_string());
        }
    }

    extract_wo_numbers(raw).into_iter().next()
}

/// Normalize a single BR application number to canonical form.
///
/// Strips spacing, hyphens, and slashes, uppercases, and validates the
/// result. Returns `None` for anything that is not a BR number.
pub fn normalize_br(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '/' | '.'))
        .collect();
    let compact = compact.to_uppercase();

    if BR_CANONICAL.is_match(&compact) {
        Some(compact)
    } else {
        None
    }
}

/// Extract every BR application number appearing in free text,
/// canonicalized. First-occurrence order, no duplicates.
pub fn extract_br_numbers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for m in BR_TEXT.find_iter(text) {
        if let Some(br) = normalize_br(m.as_str()) {
            if seen.insert(br.clone()) {
                out.push(br);
            }
        }
    }

    out
}

/// Dedup key for a canonical BR number: the kind code suffix is stripped,
/// since two filings differing only by kind code are the same application
/// at different prosecution stages.
pub fn br_dedup_key(canonical: &str) -> String {
    match BR_CANONICAL.captures(canonical) {
        Some(caps) => format!("BR{}", &caps[1]),
        None => canonical.to_string(),
    }
}

/// Kind code suffix of a canonical BR number, if present.
pub fn br_kind_code(canonical: &str) -> Option<String> {
    BR_CANONICAL
        .captures(canonical)
        .and_then(|caps| caps.get(2).map(|m| m.as_str().to_string()))
}

/// True if the string looks like a sponsor development code.
pub fn is_dev_code(s: &str) -> bool {
    DEV_CODE.is_match(s)
}

/// True if the string is a CAS registry number.
pub fn is_cas_number(s: &str) -> bool {
    CAS_NUMBER.is_match(s)
}
