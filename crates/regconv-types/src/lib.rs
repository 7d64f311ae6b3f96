#![warn(clippy::pedantic)]

pub mod error;
pub mod properties;
pub mod schema;
pub mod target;

pub use error::TypeError;
pub use properties::{MIME_TYPE_PROPERTY, VERSION_PROPERTY, get_mime_type, get_version};
pub use schema::SchemaDescriptor;
pub use target::{
    ContainerFactory, GenericContainer, GenericRecordContainer, TargetKind, TargetRegistry,
    TargetType,
};
