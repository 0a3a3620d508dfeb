use crate::domain::model::ProbeResponse;
use crate::utils::error::{NetworkError, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// Replaces the whole file; readers never observe a partial write.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// A single HTTP exchange. Proxy and TLS policy belong to the implementor
/// and apply uniformly to every call.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn probe(
        &self,
        method: reqwest::Method,
        url: &str,
    ) -> std::result::Result<ProbeResponse, NetworkError>;
}
