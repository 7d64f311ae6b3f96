use std::sync::Arc;

use regconv_registry::SchemaRegistry;
use regconv_types::{TargetRegistry, TargetType};
use regconv_wire::{ContentType, Envelope, MimeClassifier};

use crate::config::ConverterConfig;
use crate::decoder::{DecodedMessage, GenericDecoder};
use crate::error::{ConversionCause, ConversionError};
use crate::message::{ContentTypeResolver, HeaderContentTypeResolver, Message, MessageHeaders};
use crate::resolver::{SchemaResolver, WriterSchemaLookup};

/// Turns transport messages into decoded Avro values.
///
/// The converter is the single entry point a transport layer calls. It
/// owns no mutable state: every collaborator is either immutable or
/// shared behind an `Arc`, so one converter can serve any number of
/// threads.
///
/// ```text
///  Message ──▶ content type ──▶ Envelope::unwrap ──▶ SchemaResolver ──▶ GenericDecoder
///              (header/hint)     (4-byte id?)         (id ▸ subject)     (reader/writer)
///                   │                  │                    │                  │
///                 None ─▶ Ok(None)     └──────── any Err ───┴──────────────────┘
///                                                   │
///                                                   ▼
///                                  ConversionError { message, cause }
/// ```
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use regconv_decoder::{Message, MessageConverter};
/// use regconv_registry::MemorySchemaRegistry;
/// use regconv_types::TargetType;
/// use regconv_wire::Envelope;
///
/// let registry = Arc::new(MemorySchemaRegistry::new());
/// registry.insert(1, "counts", 1, r#""long""#);
///
/// // zig-zag varint 42 is 0x54
/// let payload = Envelope::wrap(1, &[0x54]);
/// let message = Message::with_content_type(payload, "application/vnd.counts.*+avro");
///
/// let converter = MessageConverter::new(registry);
/// let decoded = converter
///     .convert_from(&message, &TargetType::generic_record(), None)
///     .unwrap()
///     .unwrap();
/// assert_eq!(decoded.schema_id, Some(1));
/// assert_eq!(decoded.record(), Some(&apache_avro::types::Value::Long(42)));
/// ```
#[derive(Clone)]
pub struct MessageConverter {
    config: ConverterConfig,
    classifier: MimeClassifier,
    content_types: Arc<dyn ContentTypeResolver>,
    resolver: SchemaResolver,
    targets: Arc<TargetRegistry>,
}

impl MessageConverter {
    /// Converter with the default configuration and no registered targets.
    #[must_use]
    pub fn new(registry: Arc<dyn SchemaRegistry>) -> Self {
        Self::with_config(registry, ConverterConfig::default())
    }

    #[must_use]
    pub fn with_config(registry: Arc<dyn SchemaRegistry>, config: ConverterConfig) -> Self {
        let classifier = config.classifier();
        let content_types = Arc::new(HeaderContentTypeResolver::new(&config.content_type_header));
        let resolver = SchemaResolver::new(registry, classifier.clone());
        Self {
            config,
            classifier,
            content_types,
            resolver,
            targets: Arc::new(TargetRegistry::new()),
        }
    }

    /// Replace the target registry.
    #[must_use]
    pub fn with_targets(mut self, targets: TargetRegistry) -> Self {
        self.targets = Arc::new(targets);
        self
    }

    /// Replace the lookup used for messages that carry no schema id.
    #[must_use]
    pub fn with_lookup(
        mut self,
        registry: Arc<dyn SchemaRegistry>,
        lookup: Arc<dyn WriterSchemaLookup>,
    ) -> Self {
        self.resolver = SchemaResolver::with_lookup(registry, lookup);
        self
    }

    /// Replace how the content type is found in the headers.
    #[must_use]
    pub fn with_content_type_resolver(mut self, resolver: Arc<dyn ContentTypeResolver>) -> Self {
        self.content_types = resolver;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// `true` if the headers carry a content type this converter handles.
    ///
    /// A malformed content type is simply not supported; the transport can
    /// route the message elsewhere.
    #[must_use]
    pub fn supports(&self, headers: &MessageHeaders) -> bool {
        match self.content_types.resolve(headers) {
            Ok(Some(content_type)) => {
                self.classifier.is_wildcard(&content_type)
                    || self.classifier.is_versioned(&content_type)
                    || self.classifier.is_supported(&content_type)
            }
            Ok(None) | Err(_) => false,
        }
    }

    /// Convert a message into a decoded value for `target`.
    ///
    /// The content type comes from the headers, falling back to `hint`.
    /// Returns `Ok(None)` when neither exists: the message is not meant
    /// for this converter.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] carrying the original message when
    /// the content type is malformed, the envelope is short, the writer
    /// schema cannot be resolved, or the payload does not decode.
    pub fn convert_from(
        &self,
        message: &Message,
        target: &TargetType,
        hint: Option<&ContentType>,
    ) -> Result<Option<DecodedMessage>, ConversionError> {
        let result = self.convert(message, target, hint);
        if let Err(err) = &result {
            tracing::warn!(
                kind = %err.kind(),
                target_type = %target,
                error = %err,
                "message conversion failed"
            );
        }
        result
    }

    fn convert(
        &self,
        message: &Message,
        target: &TargetType,
        hint: Option<&ContentType>,
    ) -> Result<Option<DecodedMessage>, ConversionError> {
        let fail = |cause: ConversionCause| ConversionError::new(message.clone(), cause);

        let from_headers = self
            .content_types
            .resolve(&message.headers)
            .map_err(|e| fail(e.into()))?;
        let Some(content_type) = from_headers.or_else(|| hint.cloned()) else {
            tracing::debug!("no content type on message or hint, skipping");
            return Ok(None);
        };

        let mut envelope =
            Envelope::unwrap_with(&self.classifier, message.payload.clone(), &content_type)
                .map_err(|e| fail(e.into()))?;

        let writer = self
            .resolver
            .resolve_writer_schema(&mut envelope, &content_type, &message.headers)
            .map_err(|e| fail(e.into()))?;

        let kind = self.targets.kind(target);
        let decoded =
            GenericDecoder::decode(&envelope, &writer, &kind).map_err(|e| fail(e.into()))?;

        Ok(Some(decoded))
    }
}
