#![warn(clippy::pedantic)]

pub mod classify;
pub mod content_type;
pub mod envelope;
pub mod error;

pub use classify::{MimeClassifier, VersionedContentType, is_supported, is_versioned, is_wildcard};
pub use content_type::ContentType;
pub use envelope::{Envelope, SCHEMA_ID_SIZE};
pub use error::{ContentTypeError, WireError};
