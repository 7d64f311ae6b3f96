use serde::Deserialize;
use serde_json::Value;

/// On-disk registry snapshot.
///
/// ```json
/// {
///   "schemas": [
///     { "id": 1, "subject": "orders", "version": 3,
///       "schema": { "type": "record", "name": "Order", "fields": [] } }
///   ]
/// }
/// ```
///
/// `schema` may be the schema object itself or a string holding its JSON,
/// which is the shape registries return over HTTP.
#[derive(Debug, Deserialize)]
pub(crate) struct Manifest {
    pub schemas: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ManifestEntry {
    pub id: i32,
    pub subject: String,
    pub version: i32,
    pub schema: Value,
}

impl ManifestEntry {
    pub(crate) fn definition(&self) -> String {
        match &self.schema {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}
