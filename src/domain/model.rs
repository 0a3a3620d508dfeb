use crate::utils::error::ProbeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Placeholder that `uri_check` templates carry for the probed username.
pub const ACCOUNT_PLACEHOLDER: &str = "{account}";

/// One target platform as listed in the catalog.
///
/// Fields other than `name` and `uri_check` are kept in `extra` so that a
/// catalog survives a load/save cycle unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDefinition {
    pub name: String,
    pub uri_check: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SiteDefinition {
    pub fn new(name: impl Into<String>, uri_check: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri_check: uri_check.into(),
            extra: Map::new(),
        }
    }

    pub fn has_placeholder(&self) -> bool {
        self.uri_check.contains(ACCOUNT_PLACEHOLDER)
    }

    /// Expands the `uri_check` template for `username`.
    ///
    /// A template without the placeholder is rejected rather than probed as a
    /// literal URL. The username is inserted as-is, without percent-encoding.
    pub fn target_url(&self, username: &str) -> Result<String, ProbeError> {
        if !self.has_placeholder() {
            return Err(ProbeError::InvalidSite {
                name: self.name.clone(),
                reason: format!("uri_check has no {} placeholder", ACCOUNT_PLACEHOLDER),
            });
        }
        Ok(self.uri_check.replace(ACCOUNT_PLACEHOLDER, username))
    }
}

/// The full site catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub sites: Vec<SiteDefinition>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteIssue {
    MissingPlaceholder { name: String },
    DuplicateName { name: String },
}

impl fmt::Display for SiteIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteIssue::MissingPlaceholder { name } => write!(
                f,
                "site '{}' has no {} placeholder in uri_check and will not be probed",
                name, ACCOUNT_PLACEHOLDER
            ),
            SiteIssue::DuplicateName { name } => {
                write!(f, "site name '{}' appears more than once", name)
            }
        }
    }
}

impl Catalog {
    pub fn new(sites: Vec<SiteDefinition>) -> Self {
        Self {
            sites,
            extra: Map::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Lists site definitions that are suspicious but do not prevent loading.
    pub fn validate(&self) -> Vec<SiteIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for site in &self.sites {
            if !site.has_placeholder() {
                issues.push(SiteIssue::MissingPlaceholder {
                    name: site.name.clone(),
                });
            }
            if !seen.insert(site.name.as_str()) {
                issues.push(SiteIssue::DuplicateName {
                    name: site.name.clone(),
                });
            }
        }

        issues
    }
}

/// Hex digest of a canonicalized catalog. Only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_hex(hex: String) -> Self {
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, enough for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A body that did not decode as JSON. Expected data, not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    pub message: String,
}

/// A completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub json: Result<Value, DecodeFailure>,
}

impl ProbeResponse {
    /// Builds a response, decoding `body` as JSON when it can.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        let json = serde_json::from_slice(&body).map_err(|e| DecodeFailure {
            message: e.to_string(),
        });
        Self {
            status,
            headers,
            body,
            json,
        }
    }

    pub fn parsed_json(&self) -> Option<&Value> {
        self.json.as_ref().ok()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Outcome of probing one site for one username.
#[derive(Debug)]
pub struct ProbeResult {
    pub site: SiteDefinition,
    pub url: String,
    pub outcome: Result<ProbeResponse, ProbeError>,
}

impl ProbeResult {
    pub fn response(&self) -> Option<&ProbeResponse> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ProbeError> {
        self.outcome.as_ref().err()
    }

    pub fn parsed_json(&self) -> Option<&Value> {
        self.response().and_then(ProbeResponse::parsed_json)
    }
}

/// Counts over one probing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeSummary {
    pub total: usize,
    pub succeeded: usize,
    pub http_errors: usize,
    pub failed: usize,
}

impl ProbeSummary {
    pub fn from_results(results: &[ProbeResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut summary, result| {
                match &result.outcome {
                    Ok(response) if response.is_success() => summary.succeeded += 1,
                    Ok(_) => summary.http_errors += 1,
                    Err(_) => summary.failed += 1,
                }
                summary
            },
        )
    }
}

/// What the freshness check did to the local catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreshnessOutcome {
    /// No usable local catalog existed; the remote one was saved.
    Downloaded { sites: usize },
    UpToDate,
    /// The remote catalog differed and replaced the local one.
    Updated {
        previous: Fingerprint,
        current: Fingerprint,
    },
    /// The remote fetch failed; the local catalog stays in use.
    Degraded { reason: String },
}
