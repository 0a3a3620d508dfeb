use crate::core::{Catalog, Fingerprint};
use crate::utils::error::{ProbeError, Result};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// SHA-256 over the key-sorted compact serialization of `catalog`.
///
/// Two catalogs with the same content hash equally no matter the order in
/// which their object keys were written.
pub fn fingerprint(catalog: &Catalog) -> Result<Fingerprint> {
    let value =
        serde_json::to_value(catalog).map_err(|e| ProbeError::parse("fingerprinted catalog", e))?;
    let canonical = canonicalize(value);
    let bytes = serde_json::to_vec(&canonical)
        .map_err(|e| ProbeError::parse("fingerprinted catalog", e))?;

    let digest = Sha256::digest(&bytes);
    Ok(Fingerprint::from_hex(format!("{:x}", digest)))
}

/// Rebuilds every object with its keys in sorted order. Array order is kept.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, canonicalize(value)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
