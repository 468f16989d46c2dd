//! # pharmyrus-core
//!
//! Core types, traits, and abstractions for pharmyrus: discovery of the
//! Brazilian national-phase patent filings (BR numbers) protecting a
//! pharmaceutical molecule, traced through its international PCT
//! publications (WO numbers).
//!
//! This crate provides:
//! - The shared data model (`MoleculeQuery`, `EnrichedMoleculeInfo`,
//!   `WoCandidate`, `BrCandidate`, `DiscoveryReport`)
//! - The error taxonomy and `Result` alias
//! - Backend trait seams implemented by `pharmyrus-net`
//! - The single shared WO/BR number normalization module
//! - Default constants and structured-logging field names

pub mod backend;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;

pub use backend::{
    ChemicalBackend, FamilyListing, InpiBackend, InpiEntry, InpiPage, SearchBackend,
    SearchEngine, SearchHitRecord, SearchPage,
};
pub use error::{Error, Result};
pub use models::{
    BrCandidate, BrPatentRecord, BrPatentsSection, BrSource, ComparisonReport, ConfidenceStatus,
    DiscoveryReport, DiscoverySeq, EnrichedMoleculeInfo, MoleculeInfoSection, MoleculeQuery,
    PerformanceSection, WoCandidate, WoDiscoverySection, WoExtractionStatus, WoProcessingDetail,
    WoProcessingSection,
};
