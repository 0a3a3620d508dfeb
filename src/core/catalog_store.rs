use crate::core::{Catalog, Storage};
use crate::utils::error::{ProbeError, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Reads and replaces the local catalog file.
///
/// The catalog is never edited in place; `save` swaps in a whole new document.
pub struct CatalogStore<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> CatalogStore<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn load(&self) -> Result<Catalog> {
        let bytes = match self.storage.read_file(&self.path).await {
            Ok(bytes) => bytes,
            Err(ProbeError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProbeError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(e) => return Err(e),
        };

        let catalog: Catalog =
            serde_json::from_slice(&bytes).map_err(|e| ProbeError::parse("local catalog", e))?;

        for issue in catalog.validate() {
            tracing::warn!("⚠️ {}", issue);
        }

        tracing::debug!(
            "Loaded catalog with {} sites from {}",
            catalog.len(),
            self.path
        );
        Ok(catalog)
    }

    pub async fn save(&self, catalog: &Catalog) -> Result<()> {
        let data = to_pretty_json(catalog)?;
        self.storage.write_file(&self.path, &data).await?;
        tracing::debug!(
            "Saved catalog with {} sites to {} ({} bytes)",
            catalog.len(),
            self.path,
            data.len()
        );
        Ok(())
    }
}

/// Four-space indented JSON with non-ASCII text left as is.
pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| ProbeError::parse("serialized document", e))?;
    Ok(buf)
}
