/// Errors raised while building schemas and decode targets.
///
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                              │
/// │   ├── InvalidJson      definition is not JSON       │
/// │   ├── InvalidSchema    JSON is not an Avro schema   │
/// │   ├── Instantiation    target factory failed        │
/// │   └── Populate         target rejected the value    │
/// └─────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// The raw schema definition could not be read as JSON.
    #[error("schema definition is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The JSON parsed, but Avro rejected it as a schema.
    #[error("invalid Avro schema: {0}")]
    InvalidSchema(#[source] apache_avro::Error),

    /// A target factory could not produce an instance.
    #[error("cannot instantiate target {target}: {reason}")]
    Instantiation { target: String, reason: String },

    /// A target instance refused the decoded value.
    #[error("target {target} rejected decoded value: {reason}")]
    Populate { target: String, reason: String },
}
