//! # pharmyrus-discovery
//!
//! Multi-strategy discovery pipeline: find the WO publications disclosing
//! a pharmaceutical molecule, trace each to its Brazilian national-phase
//! filings, and score recall against a known baseline.
//!
//! This crate provides:
//! - [`MoleculeEnricher`]: chemical database enrichment
//! - The seven WO discovery strategies ([`strategies`])
//! - [`FamilyChainExtractor`]: WO-to-BR family tracing
//! - [`InpiDirectCrawler`]: direct national office crawl
//! - [`aggregate`]: deterministic candidate merging
//! - [`DiscoveryPipeline`]: the orchestrator and its [`PipelineConfig`]
//! - [`mock`]: canned backends for tests and local development
//!
//! [`MoleculeEnricher`]: enricher::MoleculeEnricher
//! [`FamilyChainExtractor`]: family::FamilyChainExtractor
//! [`InpiDirectCrawler`]: inpi::InpiDirectCrawler
//! [`DiscoveryPipeline`]: pipeline::DiscoveryPipeline
//! [`PipelineConfig`]: pipeline::PipelineConfig

pub mod aggregate;
pub mod enricher;
pub mod family;
pub mod inpi;
pub mod mock;
pub mod pipeline;
pub mod score;
pub mod strategies;
pub mod strategy;

pub use enricher::MoleculeEnricher;
pub use family::{ExtractionOutcome, FamilyChainExtractor};
pub use inpi::InpiDirectCrawler;
pub use pipeline::{DiscoveryPipeline, PipelineConfig};
pub use score::score;
pub use strategy::{collect, CandidateSink, WoDiscoveryStrategy};
