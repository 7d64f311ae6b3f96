#![warn(clippy::pedantic)]

pub mod config;
pub mod converter;
pub mod decoder;
pub mod error;
pub mod message;
pub mod resolver;

pub use config::ConverterConfig;
pub use converter::MessageConverter;
pub use decoder::{Decoded, DecodedMessage, GenericDecoder};
pub use error::{ConversionCause, ConversionError, DecodeFailure, ErrorKind, ResolveError};
pub use message::{ContentTypeResolver, HeaderContentTypeResolver, Message, MessageHeaders};
pub use resolver::{SchemaResolver, SubjectVersionLookup, WriterSchemaLookup};
