use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::RegistryError;
use crate::manifest::Manifest;
use crate::registry::SchemaRegistry;

#[derive(Clone, Debug)]
struct Entry {
    subject: String,
    version: i32,
    definition: String,
}

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<i32, Entry>,
    by_subject: HashMap<(String, i32), i32>,
    /// `None` once `i32::MAX` has been handed out.
    next_id: Option<i32>,
}

/// In-memory schema registry backed by two `HashMap`s.
///
/// Stands in for a real registry in tests, benches and the CLI. Ids are
/// assigned sequentially from 1; versions count up per subject. Each
/// `(subject, version)` pair belongs to exactly one id.
///
/// # Concurrency
///
/// Lookups take a read lock, registration takes a write lock. Lookup
/// counters are atomics so tests can assert which path a conversion took.
///
/// # Example
///
/// ```rust
/// use regconv_registry::{MemorySchemaRegistry, SchemaRegistry};
///
/// let registry = MemorySchemaRegistry::new();
/// let (id, version) = registry.register("orders", r#""long""#)?;
/// assert_eq!((id, version), (1, 1));
/// assert_eq!(registry.fetch_by_id(id)?, r#""long""#);
/// assert_eq!(registry.fetch_by_subject("orders", 1)?, r#""long""#);
/// # Ok::<(), regconv_registry::RegistryError>(())
/// ```
#[derive(Debug)]
pub struct MemorySchemaRegistry {
    inner: RwLock<Inner>,
    id_lookups: AtomicUsize,
    subject_lookups: AtomicUsize,
}

impl MemorySchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: Some(1),
                ..Inner::default()
            }),
            id_lookups: AtomicUsize::new(0),
            subject_lookups: AtomicUsize::new(0),
        }
    }

    /// Load a registry from a JSON manifest (see the crate docs for the shape).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidManifest`] if the JSON does not
    /// match the manifest shape.
    pub fn from_manifest_str(json: &str) -> Result<Self, RegistryError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        let registry = Self::new();
        for entry in &manifest.schemas {
            registry.insert(entry.id, &entry.subject, entry.version, &entry.definition());
        }
        tracing::debug!(schemas = manifest.schemas.len(), "loaded registry manifest");
        Ok(registry)
    }

    /// Register `definition` under `subject` and return `(id, version)`.
    ///
    /// Registering a definition the subject already has is a no-op that
    /// returns the existing id and version.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IdsExhausted`] if the definition is new and
    /// an id of `i32::MAX` has already been assigned.
    pub fn register(&self, subject: &str, definition: &str) -> Result<(i32, i32), RegistryError> {
        let mut inner = self.inner.write().expect("registry lock poisoned");

        let existing = inner
            .by_id
            .iter()
            .find(|(_, e)| e.subject == subject && e.definition == definition)
            .map(|(&id, e)| (id, e.version));
        if let Some(found) = existing {
            return Ok(found);
        }

        let version = inner
            .by_id
            .values()
            .filter(|e| e.subject == subject)
            .map(|e| e.version)
            .max()
            .unwrap_or(0)
            + 1;
        let id = inner.next_id.ok_or(RegistryError::IdsExhausted)?;
        Self::insert_locked(&mut inner, id, subject, version, definition);
        Ok((id, version))
    }

    /// Insert a definition under a fixed id and version, replacing any
    /// previous entry with that id and any other id holding the same
    /// subject and version.
    pub fn insert(&self, id: i32, subject: &str, version: i32, definition: &str) {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        Self::insert_locked(&mut inner, id, subject, version, definition);
    }

    fn insert_locked(inner: &mut Inner, id: i32, subject: &str, version: i32, definition: &str) {
        if let Some(old) = inner.by_id.remove(&id) {
            let key = (old.subject, old.version);
            if inner.by_subject.get(&key) == Some(&id) {
                inner.by_subject.remove(&key);
            }
        }
        let key = (subject.to_string(), version);
        if let Some(stale) = inner.by_subject.insert(key, id).filter(|&owner| owner != id) {
            tracing::debug!(stale, id, subject, version, "replacing schema id for subject version");
            inner.by_id.remove(&stale);
        }
        inner.by_id.insert(
            id,
            Entry {
                subject: subject.to_string(),
                version,
                definition: definition.to_string(),
            },
        );
        inner.next_id = match (inner.next_id, id.checked_add(1)) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().expect("registry lock poisoned").by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times [`fetch_by_id`](SchemaRegistry::fetch_by_id) was called.
    #[must_use]
    pub fn id_lookups(&self) -> usize {
        self.id_lookups.load(Ordering::Relaxed)
    }

    /// How many times [`fetch_by_subject`](SchemaRegistry::fetch_by_subject) was called.
    #[must_use]
    pub fn subject_lookups(&self) -> usize {
        self.subject_lookups.load(Ordering::Relaxed)
    }
}

impl Default for MemorySchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry for MemorySchemaRegistry {
    fn fetch_by_id(&self, id: i32) -> Result<String, RegistryError> {
        self.id_lookups.fetch_add(1, Ordering::Relaxed);
        self.inner
            .read()
            .expect("registry lock poisoned")
            .by_id
            .get(&id)
            .map(|e| e.definition.clone())
            .ok_or(RegistryError::IdNotFound { id })
    }

    fn fetch_by_subject(&self, subject: &str, version: i32) -> Result<String, RegistryError> {
        self.subject_lookups.fetch_add(1, Ordering::Relaxed);
        let inner = self.inner.read().expect("registry lock poisoned");
        inner
            .by_subject
            .get(&(subject.to_string(), version))
            .and_then(|id| inner.by_id.get(id))
            .map(|e| e.definition.clone())
            .ok_or_else(|| RegistryError::SubjectNotFound {
                subject: subject.to_string(),
                version,
            })
    }
}
