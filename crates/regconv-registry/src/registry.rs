use std::sync::Arc;

use crate::error::RegistryError;

/// Read side of a schema registry.
///
/// Both lookups return the raw schema definition (JSON text) exactly as
/// registered; parsing it is the caller's job.
///
/// # Thread Safety
///
/// One registry is shared by every conversion running on every thread,
/// so implementations must be `Send + Sync` and do their own locking.
/// Caching is also theirs to decide: callers treat every lookup as a
/// fresh fetch that may or may not be served from a cache.
///
/// ```text
/// wrapped message:    schema id ──▶ fetch_by_id ──▶ definition
/// versioned message:  (subject, version) ──▶ fetch_by_subject ──▶ definition
/// ```
pub trait SchemaRegistry: Send + Sync {
    /// Fetch the definition registered under a numeric id.
    ///
    /// # Errors
    ///
    /// [`RegistryError::IdNotFound`] for an unknown id, or
    /// [`RegistryError::Unavailable`] when the registry cannot answer.
    fn fetch_by_id(&self, id: i32) -> Result<String, RegistryError>;

    /// Fetch the definition registered as `version` of `subject`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::SubjectNotFound`] for an unknown subject or
    /// version, or [`RegistryError::Unavailable`] when the registry cannot
    /// answer.
    fn fetch_by_subject(&self, subject: &str, version: i32) -> Result<String, RegistryError>;
}

impl<R: SchemaRegistry + ?Sized> SchemaRegistry for Arc<R> {
    fn fetch_by_id(&self, id: i32) -> Result<String, RegistryError> {
        (**self).fetch_by_id(id)
    }

    fn fetch_by_subject(&self, subject: &str, version: i32) -> Result<String, RegistryError> {
        (**self).fetch_by_subject(subject, version)
    }
}

impl<R: SchemaRegistry + ?Sized> SchemaRegistry for &R {
    fn fetch_by_id(&self, id: i32) -> Result<String, RegistryError> {
        (**self).fetch_by_id(id)
    }

    fn fetch_by_subject(&self, subject: &str, version: i32) -> Result<String, RegistryError> {
        (**self).fetch_by_subject(subject, version)
    }
}
