use crate::config::ProbeConfig;
use crate::core::catalog_store::CatalogStore;
use crate::core::fingerprint::fingerprint;
use crate::core::probe_client::ReqwestProbeClient;
use crate::core::{Catalog, FreshnessOutcome, Storage};
use crate::utils::error::{ProbeError, Result};

/// Keeps the local catalog in step with the remote copy.
///
/// Runs once at session start, before any probing. With no usable local
/// catalog a failed download is fatal; with one, it only degrades the check.
pub struct FreshnessController<S: Storage> {
    store: CatalogStore<S>,
    client: ReqwestProbeClient,
    list_url: String,
}

impl<S: Storage> FreshnessController<S> {
    pub fn new(store: CatalogStore<S>, client: ReqwestProbeClient, config: &ProbeConfig) -> Self {
        Self {
            store,
            client,
            list_url: config.list_url.clone(),
        }
    }

    pub fn store(&self) -> &CatalogStore<S> {
        &self.store
    }

    pub async fn check(&self) -> Result<FreshnessOutcome> {
        let local = match self.store.load().await {
            Ok(local) => local,
            Err(ProbeError::NotFound { path }) => {
                tracing::info!("📥 No catalog at {}, downloading {}", path, self.list_url);
                return self.download().await;
            }
            Err(e @ ProbeError::Parse { .. }) => {
                tracing::warn!("⚠️ Local catalog is unusable ({}), replacing it", e);
                return self.download().await;
            }
            Err(e) => return Err(e),
        };

        tracing::info!("🔄 Checking {} for catalog updates", self.list_url);
        let remote = match self.client.fetch_catalog(&self.list_url).await {
            Ok(remote) => remote,
            Err(e) => {
                tracing::warn!(
                    "⚠️ Could not fetch remote catalog, keeping local copy: {}",
                    e
                );
                return Ok(FreshnessOutcome::Degraded {
                    reason: e.to_string(),
                });
            }
        };

        let previous = fingerprint(&local)?;
        let current = fingerprint(&remote)?;
        tracing::debug!(
            "Catalog fingerprints: local {} remote {}",
            previous.short(),
            current.short()
        );

        if previous == current {
            tracing::info!("✅ Catalog is up to date ({} sites)", local.len());
            return Ok(FreshnessOutcome::UpToDate);
        }

        tracing::info!("📝 Updating catalog ({} -> {} sites)", local.len(), remote.len());
        self.store.save(&remote).await?;
        Ok(FreshnessOutcome::Updated { previous, current })
    }

    /// Runs [`check`](Self::check) and loads the catalog a probing session
    /// works from.
    ///
    /// A failed check is tolerated while a readable local copy exists, in
    /// which case the outcome is `None`. Without one, the check's own error is
    /// returned rather than the follow-up load failure.
    pub async fn refresh_and_load(&self) -> Result<(Option<FreshnessOutcome>, Catalog)> {
        let check_error = match self.check().await {
            Ok(outcome) => return Ok((Some(outcome), self.store.load().await?)),
            Err(e) => e,
        };

        tracing::warn!("⚠️ Catalog refresh failed: {}", check_error);
        match self.store.load().await {
            Ok(catalog) => Ok((None, catalog)),
            Err(load_error) => {
                tracing::debug!("No local catalog to fall back on: {}", load_error);
                Err(check_error)
            }
        }
    }

    async fn download(&self) -> Result<FreshnessOutcome> {
        let remote = self.client.fetch_catalog(&self.list_url).await?;
        self.store.save(&remote).await?;
        tracing::info!("✅ Saved catalog with {} sites", remote.len());
        Ok(FreshnessOutcome::Downloaded {
            sites: remote.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        writes: Arc<AtomicUsize>,
        read_only: bool,
    }

    impl MockStorage {
        async fn seed(&self, path: &str, data: &[u8]) {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ProbeError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if self.read_only {
                return Err(ProbeError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only filesystem",
                )));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    const PATH: &str = "wmn-data.json";

    fn controller(storage: MockStorage, list_url: String) -> FreshnessController<MockStorage> {
        let config = ProbeConfig {
            list_url,
            probe_timeout_secs: 5,
            ..ProbeConfig::default()
        };
        let client = ReqwestProbeClient::new(&config).unwrap();
        FreshnessController::new(CatalogStore::new(storage, PATH), client, &config)
    }

    fn remote_catalog() -> serde_json::Value {
        json!({
            "license": ["CC BY-SA 4.0"],
            "sites": [
                {"name": "Example", "uri_check": "https://example.com/{account}", "e_code": 200},
                {"name": "Other", "uri_check": "https://other.example/u/{account}", "e_code": 200}
            ]
        })
    }

    #[tokio::test]
    async fn test_absent_catalog_is_downloaded() {
        let server = MockServer::start();
        let remote = server.mock(|when, then| {
            when.method(GET).path("/wmn-data.json");
            then.status(200).json_body(remote_catalog());
        });

        let storage = MockStorage::default();
        let controller = controller(storage.clone(), server.url("/wmn-data.json"));

        let outcome = controller.check().await.unwrap();

        remote.assert();
        assert_eq!(outcome, FreshnessOutcome::Downloaded { sites: 2 });
        let expected: Catalog = serde_json::from_value(remote_catalog()).unwrap();
        assert_eq!(controller.store().load().await.unwrap(), expected);
        assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_absent_catalog_with_failed_download_is_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/wmn-data.json");
            then.status(500);
        });

        let storage = MockStorage::default();
        let controller = controller(storage.clone(), server.url("/wmn-data.json"));

        assert!(matches!(
            controller.check().await,
            Err(ProbeError::UnexpectedStatus { status: 500, .. })
        ));
        assert!(storage.get_file(PATH).await.is_none());
    }

    #[tokio::test]
    async fn test_identical_remote_with_other_key_order_is_not_written() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/wmn-data.json");
            then.status(200).body(
                r#"{"sites":[{"e_code":200,"uri_check":"https://example.com/{account}","name":"Example"},{"uri_check":"https://other.example/u/{account}","name":"Other","e_code":200}],"license":["CC BY-SA 4.0"]}"#,
            );
        });

        let storage = MockStorage::default();
        let local = serde_json::to_vec(&remote_catalog()).unwrap();
        storage.seed(PATH, &local).await;
        let controller = controller(storage.clone(), server.url("/wmn-data.json"));

        let outcome = controller.check().await.unwrap();

        assert_eq!(outcome, FreshnessOutcome::UpToDate);
        assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
        assert_eq!(storage.get_file(PATH).await.unwrap(), local);
    }

    #[tokio::test]
    async fn test_changed_remote_replaces_local() {
        let server = MockServer::start();
        let mut updated = remote_catalog();
        updated["sites"][1]["uri_check"] = json!("https://other.example/profile/{account}");
        let body = updated.clone();
        server.mock(move |when, then| {
            when.method(GET).path("/wmn-data.json");
            then.status(200).json_body(body);
        });

        let storage = MockStorage::default();
        storage
            .seed(PATH, &serde_json::to_vec(&remote_catalog()).unwrap())
            .await;
        let controller = controller(storage.clone(), server.url("/wmn-data.json"));

        let outcome = controller.check().await.unwrap();

        match outcome {
            FreshnessOutcome::Updated { previous, current } => assert_ne!(previous, current),
            other => panic!("expected Updated, got {:?}", other),
        }
        let expected: Catalog = serde_json::from_value(updated).unwrap();
        assert_eq!(controller.store().load().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_local_catalog() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/wmn-data.json");
            then.status(502);
        });

        let storage = MockStorage::default();
        let local = serde_json::to_vec(&remote_catalog()).unwrap();
        storage.seed(PATH, &local).await;
        let controller = controller(storage.clone(), server.url("/wmn-data.json"));

        let outcome = controller.check().await.unwrap();

        assert!(matches!(outcome, FreshnessOutcome::Degraded { .. }));
        assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
        assert_eq!(storage.get_file(PATH).await.unwrap(), local);
    }

    #[tokio::test]
    async fn test_failed_save_surfaces_io_error_and_keeps_local() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/wmn-data.json");
            then.status(200)
                .json_body(json!({"sites": [{"name": "New", "uri_check": "https://new.example/{account}"}]}));
        });

        let storage = MockStorage {
            read_only: true,
            ..MockStorage::default()
        };
        let local = serde_json::to_vec(&remote_catalog()).unwrap();
        storage.seed(PATH, &local).await;
        let controller = controller(storage.clone(), server.url("/wmn-data.json"));

        assert!(matches!(controller.check().await, Err(ProbeError::Io(_))));
        assert_eq!(storage.get_file(PATH).await.unwrap(), local);
    }

    #[tokio::test]
    async fn test_refresh_and_load_surfaces_download_error_without_local_catalog() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/wmn-data.json");
            then.status(500);
        });

        let controller = controller(MockStorage::default(), server.url("/wmn-data.json"));

        assert!(matches!(
            controller.refresh_and_load().await,
            Err(ProbeError::UnexpectedStatus { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_and_load_falls_back_to_local_catalog() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/wmn-data.json");
            then.status(200)
                .json_body(json!({"sites": [{"name": "New", "uri_check": "https://new.example/{account}"}]}));
        });

        let storage = MockStorage {
            read_only: true,
            ..MockStorage::default()
        };
        storage
            .seed(PATH, &serde_json::to_vec(&remote_catalog()).unwrap())
            .await;
        let controller = controller(storage, server.url("/wmn-data.json"));

        let (outcome, catalog) = controller.refresh_and_load().await.unwrap();

        assert!(outcome.is_none());
        let expected: Catalog = serde_json::from_value(remote_catalog()).unwrap();
        assert_eq!(catalog, expected);
    }

    #[tokio::test]
    async fn test_refresh_and_load_reports_outcome_and_catalog() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/wmn-data.json");
            then.status(200).json_body(remote_catalog());
        });

        let controller = controller(MockStorage::default(), server.url("/wmn-data.json"));

        let (outcome, catalog) = controller.refresh_and_load().await.unwrap();

        assert_eq!(outcome, Some(FreshnessOutcome::Downloaded { sites: 2 }));
        assert_eq!(catalog.len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_local_catalog_is_replaced() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/wmn-data.json");
            then.status(200).json_body(remote_catalog());
        });

        let storage = MockStorage::default();
        storage.seed(PATH, b"{\"sites\": [trunc").await;
        let controller = controller(storage.clone(), server.url("/wmn-data.json"));

        let outcome = controller.check().await.unwrap();

        assert_eq!(outcome, FreshnessOutcome::Downloaded { sites: 2 });
        assert!(controller.store().load().await.is_ok());
    }
}
