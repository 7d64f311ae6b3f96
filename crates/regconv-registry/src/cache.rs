use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::RegistryError;
use crate::registry::SchemaRegistry;

/// Caching decorator over any [`SchemaRegistry`].
///
/// Registered schemas are immutable, so a definition fetched once for an
/// id (or a subject/version pair) is kept for the life of the cache.
/// Errors are never cached: an id that is unknown now may be registered a
/// second later, and an unavailable registry may come back.
///
/// ```text
/// fetch_by_id(7) ──▶ cache hit? ──yes──▶ definition
///                        │
///                        no
///                        ▼
///                 inner.fetch_by_id(7) ──Ok──▶ store ──▶ definition
///                        │
///                       Err ──▶ returned as is, nothing stored
/// ```
#[derive(Debug)]
pub struct CachingRegistry<R> {
    inner: R,
    by_id: RwLock<HashMap<i32, String>>,
    by_subject: RwLock<HashMap<(String, i32), String>>,
}

impl<R: SchemaRegistry> CachingRegistry<R> {
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            by_id: RwLock::new(HashMap::new()),
            by_subject: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped registry.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Number of cached entries across both lookup paths.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.by_id.read().expect("cache lock poisoned").len()
            + self.by_subject.read().expect("cache lock poisoned").len()
    }

    /// Drop every cached definition.
    pub fn clear(&self) {
        self.by_id.write().expect("cache lock poisoned").clear();
        self.by_subject.write().expect("cache lock poisoned").clear();
    }
}

impl<R: SchemaRegistry> SchemaRegistry for CachingRegistry<R> {
    fn fetch_by_id(&self, id: i32) -> Result<String, RegistryError> {
        if let Some(hit) = self.by_id.read().expect("cache lock poisoned").get(&id) {
            tracing::trace!(schema_id = id, "schema cache hit");
            return Ok(hit.clone());
        }

        let definition = self.inner.fetch_by_id(id)?;
        self.by_id
            .write()
            .expect("cache lock poisoned")
            .insert(id, definition.clone());
        Ok(definition)
    }

    fn fetch_by_subject(&self, subject: &str, version: i32) -> Result<String, RegistryError> {
        let key = (subject.to_string(), version);
        if let Some(hit) = self.by_subject.read().expect("cache lock poisoned").get(&key) {
            tracing::trace!(subject, version, "schema cache hit");
            return Ok(hit.clone());
        }

        let definition = self.inner.fetch_by_subject(subject, version)?;
        self.by_subject
            .write()
            .expect("cache lock poisoned")
            .insert(key, definition.clone());
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySchemaRegistry;

    #[test]
    fn second_id_lookup_is_served_from_cache() {
        let cache = CachingRegistry::new(MemorySchemaRegistry::new());
        let (id, _) = cache.inner().register("orders", r#""long""#).unwrap();

        assert_eq!(cache.fetch_by_id(id).unwrap(), r#""long""#);
        assert_eq!(cache.fetch_by_id(id).unwrap(), r#""long""#);
        assert_eq!(cache.inner().id_lookups(), 1);
        assert_eq!(cache.cached(), 1);
    }

    #[test]
    fn second_subject_lookup_is_served_from_cache() {
        let cache = CachingRegistry::new(MemorySchemaRegistry::new());
        let (_, version) = cache.inner().register("orders", r#""long""#).unwrap();

        cache.fetch_by_subject("orders", version).unwrap();
        cache.fetch_by_subject("orders", version).unwrap();
        assert_eq!(cache.inner().subject_lookups(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = CachingRegistry::new(MemorySchemaRegistry::new());
        assert!(cache.fetch_by_id(1).is_err());

        cache.inner().insert(1, "orders", 1, r#""long""#);
        assert_eq!(cache.fetch_by_id(1).unwrap(), r#""long""#);
        assert_eq!(cache.inner().id_lookups(), 2);
    }

    #[test]
    fn clear_forces_refetch() {
        let cache = CachingRegistry::new(MemorySchemaRegistry::new());
        let (id, _) = cache.inner().register("orders", r#""long""#).unwrap();
        cache.fetch_by_id(id).unwrap();
        cache.clear();
        assert_eq!(cache.cached(), 0);
        cache.fetch_by_id(id).unwrap();
        assert_eq!(cache.inner().id_lookups(), 2);
    }
}
