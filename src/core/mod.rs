pub mod catalog_store;
pub mod fingerprint;
pub mod freshness;
pub mod orchestrator;
pub mod platforms;
pub mod probe_client;

pub use crate::domain::model::{
    Catalog, DecodeFailure, Fingerprint, FreshnessOutcome, ProbeResponse, ProbeResult,
    ProbeSummary, SiteDefinition, SiteIssue,
};
pub use crate::domain::ports::{HttpProbe, Storage};
pub use crate::utils::error::Result;
