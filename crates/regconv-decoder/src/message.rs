use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use regconv_wire::{ContentType, ContentTypeError};

/// Header carrying the message content type.
pub const CONTENT_TYPE_HEADER: &str = "contentType";

/// Header carrying the transport's message id, if it sets one.
pub const ID_HEADER: &str = "id";

/// Transport headers as plain strings.
///
/// Names keep the case they were inserted with. Lookups try the exact
/// name first and fall back to a case-insensitive match, since brokers
/// disagree on whether it is `contentType`, `content-type` or
/// `Content-Type`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageHeaders(BTreeMap<String, String>);

impl MessageHeaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: &str) -> Option<String> {
        self.0.insert(name.to_string(), value.to_string())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get(ID_HEADER)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A transport message as the converter sees it: raw payload bytes plus
/// headers.
///
/// Cloning is cheap, the payload is a refcounted [`Bytes`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub payload: Bytes,
    pub headers: MessageHeaders,
}

impl Message {
    #[must_use]
    pub fn new(payload: impl Into<Bytes>, headers: MessageHeaders) -> Self {
        Self {
            payload: payload.into(),
            headers,
        }
    }

    /// A message with only a `contentType` header.
    #[must_use]
    pub fn with_content_type(payload: impl Into<Bytes>, content_type: &str) -> Self {
        Self::new(
            payload,
            MessageHeaders::new().with(CONTENT_TYPE_HEADER, content_type),
        )
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.headers.id() {
            Some(id) => write!(f, "message {id} ({} bytes)", self.payload.len()),
            None => write!(f, "message ({} bytes)", self.payload.len()),
        }
    }
}

/// Finds the content type of a message from its headers.
///
/// Implementations return `Ok(None)` when the headers carry no content
/// type at all; a present but malformed value is an error.
pub trait ContentTypeResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns the parser's [`ContentTypeError`] for a malformed value.
    fn resolve(&self, headers: &MessageHeaders) -> Result<Option<ContentType>, ContentTypeError>;
}

/// Reads the content type from a single named header.
#[derive(Clone, Debug)]
pub struct HeaderContentTypeResolver {
    header: String,
}

impl HeaderContentTypeResolver {
    #[must_use]
    pub fn new(header: &str) -> Self {
        Self {
            header: header.to_string(),
        }
    }
}

impl Default for HeaderContentTypeResolver {
    fn default() -> Self {
        Self::new(CONTENT_TYPE_HEADER)
    }
}

impl ContentTypeResolver for HeaderContentTypeResolver {
    fn resolve(&self, headers: &MessageHeaders) -> Result<Option<ContentType>, ContentTypeError> {
        headers
            .get(&self.header)
            .map(ContentType::parse)
            .transpose()
    }
}
