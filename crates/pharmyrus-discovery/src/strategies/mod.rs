//! The seven WO discovery strategies.
//!
//! Each strategy is independently constructible over a [`SearchBackend`]
//! and independently testable with a stub backend. The pipeline launches
//! all of them concurrently against the same enriched molecule identity.
//!
//! [`SearchBackend`]: pharmyrus_core::SearchBackend

mod brand;
mod cas_number;
mod company;
mod dev_code;
mod direct_molecule;
mod synonym;
mod year_sweep;

pub use brand::BrandStrategy;
pub use cas_number::CasNumberStrategy;
pub use company::CompanyStrategy;
pub use dev_code::DevCodeStrategy;
pub use direct_molecule::DirectMoleculeStrategy;
pub use synonym::SynonymStrategy;
pub use year_sweep::YearSweepStrategy;

use std::sync::Arc;

use pharmyrus_core::SearchBackend;

use crate::strategy::WoDiscoveryStrategy;

/// The full strategy set in its fixed fan-out order. The order fixes each
/// strategy's rank and therefore the merged output ordering.
pub fn full_strategy_set(backend: Arc<dyn SearchBackend>) -> Vec<Arc<dyn WoDiscoveryStrategy>> {
    vec![
        Arc::new(DirectMoleculeStrategy::new(backend.clone())),
        Arc::new(YearSweepStrategy::new(backend.clone())),
        Arc::new(BrandStrategy::new(backend.clone())),
        Arc::new(DevCodeStrategy::new(backend.clone())),
        Arc::new(CasNumberStrategy::new(backend.clone())),
        Arc::new(CompanyStrategy::new(backend.clone())),
        Arc::new(SynonymStrategy::new(backend)),
    ]
}
