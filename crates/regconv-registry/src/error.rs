/// Errors surfaced by [`SchemaRegistry`](crate::SchemaRegistry) implementations.
///
/// ```text
///   RegistryError
///   ├── IdNotFound         ← no schema registered under that id
///   ├── SubjectNotFound    ← no such subject, or no such version of it
///   ├── Unavailable        ← transport-level failure talking to the registry
///   ├── IdsExhausted       ← no id left to assign to a new schema
///   └── InvalidManifest    ← a JSON manifest could not be loaded
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("schema id {id} not found in registry")]
    IdNotFound { id: i32 },

    #[error("subject {subject:?} version {version} not found in registry")]
    SubjectNotFound { subject: String, version: i32 },

    /// The registry could not be reached or answered with garbage.
    ///
    /// Implementations put whatever their transport reported in `reason`.
    #[error("schema registry unavailable: {reason}")]
    Unavailable { reason: String },

    /// Every id up to `i32::MAX` is taken.
    #[error("schema registry has no ids left to assign")]
    IdsExhausted,

    #[error("invalid registry manifest: {0}")]
    InvalidManifest(#[from] serde_json::Error),
}
