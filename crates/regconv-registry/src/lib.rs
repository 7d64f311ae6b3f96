#![warn(clippy::pedantic)]

pub mod cache;
pub mod error;
pub mod memory;
pub mod registry;

mod manifest;

pub use cache::CachingRegistry;
pub use error::RegistryError;
pub use memory::MemorySchemaRegistry;
pub use registry::SchemaRegistry;
