use std::sync::Arc;

use regconv_registry::SchemaRegistry;
use regconv_types::{SchemaDescriptor, get_version};
use regconv_wire::{ContentType, Envelope, MimeClassifier};

use crate::error::ResolveError;
use crate::message::MessageHeaders;

/// Finds the writer schema of a message that carries no schema id.
///
/// This is the content-type driven path: whatever the content type and
/// headers say about subject and version is turned into a schema.
/// It must return a parsed schema or fail; it never guesses.
pub trait WriterSchemaLookup: Send + Sync {
    /// # Errors
    ///
    /// [`ResolveError::NoSchemaReference`] when nothing identifies a
    /// schema, [`ResolveError::SchemaNotFound`] when the registry has no
    /// match, [`ResolveError::InvalidDefinition`] when it returns garbage.
    fn lookup(
        &self,
        content_type: &ContentType,
        headers: &MessageHeaders,
    ) -> Result<SchemaDescriptor, ResolveError>;
}

/// Default [`WriterSchemaLookup`]: reads `(subject, version)` from a
/// versioned content type and asks the registry for it.
///
/// ```text
/// application/vnd.orders.v3+avro ──▶ ("orders", 3) ──▶ fetch_by_subject
/// ```
pub struct SubjectVersionLookup {
    registry: Arc<dyn SchemaRegistry>,
    classifier: MimeClassifier,
}

impl SubjectVersionLookup {
    #[must_use]
    pub fn new(registry: Arc<dyn SchemaRegistry>, classifier: MimeClassifier) -> Self {
        Self {
            registry,
            classifier,
        }
    }
}

impl WriterSchemaLookup for SubjectVersionLookup {
    fn lookup(
        &self,
        content_type: &ContentType,
        _headers: &MessageHeaders,
    ) -> Result<SchemaDescriptor, ResolveError> {
        let Some(versioned) = self.classifier.versioned(content_type) else {
            return Err(ResolveError::NoSchemaReference {
                content_type: content_type.to_string(),
            });
        };

        tracing::debug!(
            subject = %versioned.subject,
            version = versioned.version,
            "resolving writer schema by subject and version"
        );
        let definition = self
            .registry
            .fetch_by_subject(&versioned.subject, versioned.version)?;
        SchemaDescriptor::parse(&definition).map_err(ResolveError::InvalidDefinition)
    }
}

/// Produces the writer schema for an unwrapped message.
///
/// Two paths, and the schema id always wins:
///
/// ```text
///             envelope.schema_id?
///               │            │
///             Some          None
///               │            │
///               ▼            ▼
///   registry.fetch_by_id   lookup.lookup(content_type, headers)
///               │            │
///               └─────┬──────┘
///                     ▼
///        envelope.schema_version = get_version(schema)
/// ```
///
/// The version written back to the envelope is metadata only; it never
/// influences which schema was picked.
#[derive(Clone)]
pub struct SchemaResolver {
    registry: Arc<dyn SchemaRegistry>,
    lookup: Arc<dyn WriterSchemaLookup>,
}

impl SchemaResolver {
    /// Resolver that uses [`SubjectVersionLookup`] over the same registry
    /// for messages without a schema id.
    #[must_use]
    pub fn new(registry: Arc<dyn SchemaRegistry>, classifier: MimeClassifier) -> Self {
        let lookup = Arc::new(SubjectVersionLookup::new(Arc::clone(&registry), classifier));
        Self { registry, lookup }
    }

    /// Resolver with a caller-supplied content-type lookup.
    #[must_use]
    pub fn with_lookup(
        registry: Arc<dyn SchemaRegistry>,
        lookup: Arc<dyn WriterSchemaLookup>,
    ) -> Self {
        Self { registry, lookup }
    }

    /// Resolve the writer schema and record its version on the envelope.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::SchemaNotFound`] if the registry lookup fails.
    /// - [`ResolveError::InvalidDefinition`] if the definition does not parse.
    /// - [`ResolveError::NoSchemaReference`] if there is no id and the
    ///   content type names no subject/version.
    pub fn resolve_writer_schema(
        &self,
        envelope: &mut Envelope,
        content_type: &ContentType,
        headers: &MessageHeaders,
    ) -> Result<SchemaDescriptor, ResolveError> {
        let schema = match envelope.schema_id {
            Some(id) => {
                tracing::debug!(schema_id = id, "resolving writer schema by id");
                let definition = self.registry.fetch_by_id(id)?;
                SchemaDescriptor::parse(&definition).map_err(ResolveError::InvalidDefinition)?
            }
            None => self.lookup.lookup(content_type, headers)?,
        };

        envelope.schema_version = get_version(&schema);
        Ok(schema)
    }
}
