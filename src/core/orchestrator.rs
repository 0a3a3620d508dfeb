//! Concurrent fan-out of one probe per catalog site.
//!
//! Every site yields exactly one [`ProbeResult`], in catalog order, whatever
//! order the probes finish in. A failing site only affects its own result.

use crate::core::{Catalog, HttpProbe, ProbeResult, ProbeSummary, SiteDefinition};
use crate::utils::error::{NetworkError, NetworkErrorKind, ProbeError};
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Method;

pub struct ProbeOrchestrator<P: HttpProbe> {
    client: P,
    /// Upper bound on probes in flight; `None` launches every site at once.
    max_concurrent_probes: Option<usize>,
}

impl<P: HttpProbe> ProbeOrchestrator<P> {
    pub fn new(client: P) -> Self {
        Self {
            client,
            max_concurrent_probes: None,
        }
    }

    /// Caps the fan-out for very large catalogs. `None` removes the cap.
    #[must_use]
    pub fn with_max_concurrent_probes(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent_probes = limit.filter(|n| *n > 0);
        self
    }

    /// Probes every site of `catalog` for `username` and waits for all of
    /// them to settle.
    ///
    /// Nothing is spawned: dropping the returned future drops every probe
    /// still in flight along with its connection.
    pub async fn run(&self, username: &str, catalog: &Catalog) -> Vec<ProbeResult> {
        let total = catalog.len();
        let limit = self.max_concurrent_probes.unwrap_or(usize::MAX);
        tracing::info!("🔎 Probing {} sites for '{}'", total, username);

        let mut slots: Vec<Option<ProbeResult>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);

        let mut in_flight = FuturesUnordered::new();
        for (index, site) in catalog.sites.iter().enumerate() {
            in_flight.push(self.probe_site(index, username, site));

            while in_flight.len() >= limit {
                if let Some((index, result)) = in_flight.next().await {
                    slots[index] = Some(result);
                }
            }
        }

        while let Some((index, result)) = in_flight.next().await {
            slots[index] = Some(result);
        }

        let results = fill_slots(slots, &catalog.sites);

        let summary = ProbeSummary::from_results(&results);
        tracing::info!(
            "✅ Probed {} sites: {} ok, {} HTTP errors, {} failed",
            summary.total,
            summary.succeeded,
            summary.http_errors,
            summary.failed
        );
        results
    }

    async fn probe_site(
        &self,
        index: usize,
        username: &str,
        site: &SiteDefinition,
    ) -> (usize, ProbeResult) {
        let (url, outcome) = match site.target_url(username) {
            Ok(url) => {
                let outcome = self
                    .client
                    .probe(Method::GET, &url)
                    .await
                    .map_err(ProbeError::from);
                (url, outcome)
            }
            Err(e) => (site.uri_check.clone(), Err(e)),
        };

        match &outcome {
            Ok(response) => tracing::debug!("{}: HTTP {}", site.name, response.status),
            Err(e) => tracing::debug!("{}: {}", site.name, e),
        }

        (
            index,
            ProbeResult {
                site: site.clone(),
                url,
                outcome,
            },
        )
    }
}

/// Turns the per-index slots into one result per site. A slot that never
/// settled still yields a failed result for its site instead of vanishing.
fn fill_slots(slots: Vec<Option<ProbeResult>>, sites: &[SiteDefinition]) -> Vec<ProbeResult> {
    slots
        .into_iter()
        .zip(sites)
        .map(|(slot, site)| {
            slot.unwrap_or_else(|| {
                tracing::warn!("⚠️ No result recorded for {}", site.name);
                ProbeResult {
                    site: site.clone(),
                    url: site.uri_check.clone(),
                    outcome: Err(ProbeError::Network(NetworkError::new(
                        NetworkErrorKind::Other,
                        "probe did not complete",
                    ))),
                }
            })
        })
        .collect()
}
