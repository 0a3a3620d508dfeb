pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{storage::LocalStorage, ProbeConfig};
pub use crate::core::{
    catalog_store::CatalogStore, fingerprint::fingerprint, freshness::FreshnessController,
    orchestrator::ProbeOrchestrator, platforms::PlatformDirectory,
    probe_client::ReqwestProbeClient,
};
pub use crate::domain::model::{
    Catalog, FreshnessOutcome, ProbeResult, ProbeSummary, SiteDefinition,
};
pub use crate::utils::error::{ProbeError, Result};
