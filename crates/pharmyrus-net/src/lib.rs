//! # pharmyrus-net
//!
//! Outbound HTTP plumbing for pharmyrus.
//!
//! This crate provides:
//! - [`ApiKeyPool`]: round-robin credential rotation with per-key cooldown
//! - [`Fetcher`]: rate-limited GET-JSON with retry, backoff, jitter, hard
//!   timeouts, and per-target concurrency ceilings
//! - Production implementations of the `pharmyrus-core` backend traits:
//!   [`SerpApiClient`] (search engines + Google Patents family chain),
//!   [`PubChemClient`] (chemical database), [`InpiClient`] (Brazilian IP
//!   office crawler service)

pub mod fetcher;
pub mod inpi;
pub mod keypool;
pub mod pubchem;
pub mod serpapi;

pub use fetcher::{Fetcher, FetcherConfig};
pub use inpi::{InpiClient, DEFAULT_INPI_URL};
pub use keypool::ApiKeyPool;
pub use pubchem::{PubChemClient, DEFAULT_PUBCHEM_URL};
pub use serpapi::{SerpApiClient, DEFAULT_SERPAPI_URL};
