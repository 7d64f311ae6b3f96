use std::fmt;

use regconv_registry::RegistryError;
use regconv_types::TypeError;
use regconv_wire::{ContentTypeError, WireError};

use crate::message::Message;

/// Failure classes a conversion can end in.
///
/// The transport layer keys retry and dead-letter decisions off this, so
/// every [`ConversionError`] maps to exactly one kind.
///
/// ```text
/// ┌──────────────────────┬──────────────────────────────────────────────────┐
/// │ Kind                 │ Raised when                                      │
/// ├──────────────────────┼──────────────────────────────────────────────────┤
/// │ MalformedEnvelope    │ wrapped payload shorter than the 4-byte id       │
/// │ SchemaNotFound       │ registry lookup by id or subject/version failed  │
/// │ SchemaParse          │ schema, `mimeType` or content type unparsable    │
/// │ TargetInstantiation  │ target factory could not build an instance       │
/// │ Decode               │ Avro decode / schema resolution / populate fail  │
/// └──────────────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedEnvelope,
    SchemaNotFound,
    SchemaParse,
    TargetInstantiation,
    Decode,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MalformedEnvelope => "malformed envelope",
            Self::SchemaNotFound => "schema not found",
            Self::SchemaParse => "schema parse error",
            Self::TargetInstantiation => "target instantiation error",
            Self::Decode => "decode error",
        };
        f.write_str(name)
    }
}

/// Errors from writer-schema resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The registry had nothing for the id or subject/version asked for,
    /// or could not be reached.
    #[error("writer schema not found: {0}")]
    SchemaNotFound(#[from] RegistryError),

    /// The content type names neither a schema id nor a subject/version,
    /// so there is nothing to look up.
    #[error("writer schema not found: content type {content_type} carries no subject and version")]
    NoSchemaReference { content_type: String },

    /// The registry answered, but with something that is not a schema.
    #[error("writer schema could not be parsed: {0}")]
    InvalidDefinition(#[source] TypeError),
}

impl ResolveError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SchemaNotFound(_) | Self::NoSchemaReference { .. } => ErrorKind::SchemaNotFound,
            Self::InvalidDefinition(_) => ErrorKind::SchemaParse,
        }
    }
}

/// Errors from the decode step, after a writer schema is in hand.
#[derive(Debug, thiserror::Error)]
pub enum DecodeFailure {
    #[error("target instantiation failed: {0}")]
    Instantiation(#[source] TypeError),

    /// The expected schema's `mimeType` property is present but malformed.
    #[error("target schema has an invalid mimeType property: {0}")]
    TargetMimeType(#[source] ContentTypeError),

    /// Reader and writer are both records but differ in name (and the
    /// reader has no alias for the writer) or have no field in common.
    #[error("reader schema {reader} cannot read data written with schema {writer}")]
    Irreconcilable { reader: String, writer: String },

    /// Avro could not decode the payload or resolve it against the reader.
    #[error("avro decode failed: {0}")]
    Avro(#[source] apache_avro::Error),

    #[error("target rejected decoded value: {0}")]
    Populate(#[source] TypeError),

    /// A typed view was asked of a container result.
    #[error("decoded value is a container, not a record")]
    NotARecord,
}

impl DecodeFailure {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Instantiation(_) => ErrorKind::TargetInstantiation,
            Self::TargetMimeType(_) => ErrorKind::SchemaParse,
            Self::Irreconcilable { .. } | Self::Avro(_) | Self::Populate(_) | Self::NotARecord => {
                ErrorKind::Decode
            }
        }
    }
}

/// The underlying cause carried by a [`ConversionError`].
#[derive(Debug, thiserror::Error)]
pub enum ConversionCause {
    /// The `contentType` header (or hint) did not parse.
    #[error(transparent)]
    ContentType(#[from] ContentTypeError),

    #[error(transparent)]
    Envelope(#[from] WireError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Decode(#[from] DecodeFailure),
}

impl ConversionCause {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Envelope(_) => ErrorKind::MalformedEnvelope,
            Self::ContentType(_) => ErrorKind::SchemaParse,
            Self::Resolve(e) => e.kind(),
            Self::Decode(e) => e.kind(),
        }
    }
}

/// A failed conversion: what went wrong, and on which message.
///
/// The original [`Message`] rides along (payload bytes are refcounted, so
/// this is cheap) so the transport can dead-letter it untouched.
#[derive(Debug, thiserror::Error)]
#[error("failed to read payload of {message}: {cause}")]
pub struct ConversionError {
    message: Message,
    #[source]
    cause: ConversionCause,
}

impl ConversionError {
    #[must_use]
    pub fn new(message: Message, cause: impl Into<ConversionCause>) -> Self {
        Self {
            message,
            cause: cause.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.cause.kind()
    }

    /// The message that failed to convert, exactly as received.
    #[must_use]
    pub fn message(&self) -> &Message {
        &self.message
    }

    #[must_use]
    pub fn cause(&self) -> &ConversionCause {
        &self.cause
    }

    #[must_use]
    pub fn into_parts(self) -> (Message, ConversionCause) {
        (self.message, self.cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageHeaders;
    use insta::assert_snapshot;

    fn message() -> Message {
        Message::new(
            vec![0u8, 1],
            MessageHeaders::new()
                .with("id", "m-1")
                .with("contentType", "application/vnd.orders.*+avro"),
        )
    }

    #[test]
    fn kinds_follow_causes() {
        let envelope = ConversionError::new(
            message(),
            WireError::MalformedEnvelope { len: 2, needed: 4 },
        );
        assert_eq!(envelope.kind(), ErrorKind::MalformedEnvelope);

        let not_found = ConversionError::new(
            message(),
            ResolveError::from(RegistryError::IdNotFound { id: 9 }),
        );
        assert_eq!(not_found.kind(), ErrorKind::SchemaNotFound);

        let target = ConversionError::new(
            message(),
            DecodeFailure::Instantiation(TypeError::Instantiation {
                target: "Order".to_string(),
                reason: "no default".to_string(),
            }),
        );
        assert_eq!(target.kind(), ErrorKind::TargetInstantiation);

        let mime = ConversionError::new(
            message(),
            DecodeFailure::TargetMimeType(ContentTypeError::Empty),
        );
        assert_eq!(mime.kind(), ErrorKind::SchemaParse);

        let header = ConversionError::new(message(), ContentTypeError::Empty);
        assert_eq!(header.kind(), ErrorKind::SchemaParse);
    }

    #[test]
    fn display_names_message_and_cause() {
        let err = ConversionError::new(
            message(),
            WireError::MalformedEnvelope { len: 2, needed: 4 },
        );
        assert_snapshot!(
            err.to_string(),
            @"failed to read payload of message m-1 (2 bytes): malformed envelope: wrapped payload is 2 bytes, need at least 4"
        );
    }

    #[test]
    fn schema_not_found_display() {
        let err = ConversionError::new(
            message(),
            ResolveError::from(RegistryError::IdNotFound { id: 9 }),
        );
        assert_snapshot!(
            err.to_string(),
            @"failed to read payload of message m-1 (2 bytes): writer schema not found: schema id 9 not found in registry"
        );
    }

    #[test]
    fn original_message_is_preserved() {
        let err = ConversionError::new(
            message(),
            ResolveError::from(RegistryError::IdNotFound { id: 9 }),
        );
        let (original, _) = err.into_parts();
        assert_eq!(original, message());
    }

    #[test]
    fn kind_display() {
        assert_eq!(ErrorKind::SchemaParse.to_string(), "schema parse error");
    }
}
