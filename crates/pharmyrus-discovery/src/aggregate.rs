//! Candidate aggregation: deterministic merge of concurrently produced
//! WO and BR candidates.
//!
//! Merging is pure and order-independent: candidates are first sorted on
//! their production-time discovery sequence, then deduplicated. First
//! seen wins position and display metadata; a later duplicate with
//! richer evidence enriches the kept record in place without moving it.

use std::collections::HashMap;

use tracing::debug;

use pharmyrus_core::normalize::{br_dedup_key, br_kind_code};
use pharmyrus_core::{BrCandidate, WoCandidate};

/// Merge WO candidates from all strategies into the final ordered,
/// deduplicated list.
pub fn merge_wo(mut candidates: Vec<WoCandidate>) -> Vec<WoCandidate> {
    candidates.sort_by_key(|c| c.seq);

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<WoCandidate> = Vec::new();

    for candidate in candidates {
        match index.get(&candidate.number) {
            None => {
                index.insert(candidate.number.clone(), merged.len());
                merged.push(candidate);
            }
            Some(&at) => {
                let kept = &mut merged[at];
                if kept.query.is_none() {
                    kept.query = candidate.query;
                }
                if kept.snippet.is_none() {
                    kept.snippet = candidate.snippet;
                }
            }
        }
    }

    debug!(merged = merged.len(), "WO candidates merged");
    merged
}

/// Merge BR candidates into the final ordered, deduplicated list.
///
/// Dedup key strips the kind code suffix: two filings differing only by
/// kind code are the same application at different prosecution stages.
/// The record keeps the latest prosecution stage (greatest kind code)
/// while holding its first-discovery position.
pub fn merge_br(mut candidates: Vec<BrCandidate>) -> Vec<BrCandidate> {
    candidates.sort_by_key(|c| c.seq);

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<BrCandidate> = Vec::new();

    for candidate in candidates {
        let key = br_dedup_key(&candidate.number);
        match index.get(&key) {
            None => {
                index.insert(key, merged.len());
                merged.push(candidate);
            }
            Some(&at) => {
                let kept = &mut merged[at];
                if br_kind_code(&candidate.number) > br_kind_code(&kept.number) {
                    kept.number = candidate.number;
                }
                if kept.link.is_none() {
                    kept.link = candidate.link;
                }
                if kept.from_wo.is_none() {
                    kept.from_wo = candidate.from_wo;
                }
                if kept.applicant.is_none() {
                    kept.applicant = candidate.applicant;
                }
                if kept.deposit_date.is_none() {
                    kept.deposit_date = candidate.deposit_date;
                }
            }
        }
    }

    debug!(merged = merged.len(), "BR candidates merged");
    merged
}
