use crate::config::ProbeConfig;
use crate::core::{Catalog, HttpProbe, ProbeResponse};
use crate::utils::error::{NetworkError, ProbeError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/124.0.0.0 Safari/537.36";

const MAX_REDIRECTS: usize = 10;

/// HTTP client shared by every probe of a session.
///
/// Timeout, proxy and certificate policy are fixed when the client is built,
/// so all requests of a run go out the same way.
#[derive(Clone)]
pub struct ReqwestProbeClient {
    client: Client,
}

impl ReqwestProbeClient {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.probe_timeout())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!config.tls_verify);

        builder = match config.active_proxy() {
            Some(proxy) => {
                let proxy = reqwest::Proxy::all(proxy).map_err(|e| {
                    ProbeError::InvalidConfigValueError {
                        field: "PROXY".to_string(),
                        value: proxy.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        if !config.tls_verify {
            tracing::warn!("⚠️ TLS certificate verification is disabled");
        }

        let client = builder.build().map_err(|e| ProbeError::ConfigError {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self { client })
    }

    /// Downloads the remote catalog. Unlike a probe, anything other than a
    /// 2xx JSON catalog is an error here.
    pub async fn fetch_catalog(&self, url: &str) -> Result<Catalog> {
        tracing::debug!("Fetching remote catalog from {}", url);
        let response = self.probe(Method::GET, url).await?;

        if !response.is_success() {
            return Err(ProbeError::UnexpectedStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| ProbeError::parse("remote catalog", e))
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbeClient {
    async fn probe(
        &self,
        method: Method,
        url: &str,
    ) -> std::result::Result<ProbeResponse, NetworkError> {
        let response = self.client.request(method, url).send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        tracing::debug!("{} -> HTTP {} ({} bytes)", url, status, body.len());
        Ok(ProbeResponse::new(status, headers, body))
    }
}
