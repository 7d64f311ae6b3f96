use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use apache_avro::types::Value;

use crate::error::TypeError;
use crate::schema::SchemaDescriptor;

/// Identity of a decode target.
///
/// Targets are keyed by name rather than by Rust type so a transport
/// layer can carry the target through configuration (a topic binding, a
/// header) without generics leaking into it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetType(String);

impl TargetType {
    /// Name of the target used when the caller only wants a generic record.
    pub const GENERIC_RECORD: &'static str = "generic-record";

    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The target for "give me whatever the writer wrote".
    #[must_use]
    pub fn generic_record() -> Self {
        Self::new(Self::GENERIC_RECORD)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A target that knows its own schema and can be filled with a decoded
/// value.
///
/// The schema an instance reports is the reader schema: decoding
/// resolves the writer's data against it, so fields the writer added are
/// dropped and fields it lacks take their defaults.
pub trait GenericContainer: Send + fmt::Debug {
    /// The schema this container expects to be populated with.
    fn schema(&self) -> &SchemaDescriptor;

    /// Take ownership of a value already resolved against [`schema`](Self::schema).
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::Populate`] if the value does not fit.
    fn populate(&mut self, value: Value) -> Result<(), TypeError>;

    /// Downcast hook for callers that registered a concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Builds a fresh, empty container for one decode call.
pub type ContainerFactory =
    Arc<dyn Fn() -> Result<Box<dyn GenericContainer>, TypeError> + Send + Sync>;

/// How the decoder should treat a target.
///
/// ```text
/// ┌─────────────────┬───────────────────────────────────────────────┐
/// │ Kind            │ Reader schema                                 │
/// ├─────────────────┼───────────────────────────────────────────────┤
/// │ PlainRecord     │ the writer schema (no evolution applied)      │
/// │ SelfDescribing  │ whatever a fresh factory instance reports     │
/// └─────────────────┴───────────────────────────────────────────────┘
/// ```
#[derive(Clone)]
pub enum TargetKind {
    PlainRecord,
    SelfDescribing(ContainerFactory),
}

impl fmt::Debug for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlainRecord => f.write_str("PlainRecord"),
            Self::SelfDescribing(_) => f.write_str("SelfDescribing(..)"),
        }
    }
}

/// Maps target identities to container factories.
///
/// Filled once at setup; a target with no factory is a plain record.
#[derive(Clone, Default)]
pub struct TargetRegistry {
    factories: HashMap<TargetType, ContainerFactory>,
}

impl TargetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `target`.
    pub fn register(&mut self, target: TargetType, factory: ContainerFactory) -> &mut Self {
        self.factories.insert(target, factory);
        self
    }

    #[must_use]
    pub fn kind(&self, target: &TargetType) -> TargetKind {
        self.factories
            .get(target)
            .map_or(TargetKind::PlainRecord, |factory| {
                TargetKind::SelfDescribing(Arc::clone(factory))
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for TargetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

/// A container for a generic record with a fixed reader schema.
///
/// Useful when the reader schema is known up front (a `.avsc` file
/// bundled with the consumer) but no dedicated Rust type exists.
#[derive(Clone, Debug)]
pub struct GenericRecordContainer {
    schema: SchemaDescriptor,
    value: Option<Value>,
}

impl GenericRecordContainer {
    #[must_use]
    pub fn new(schema: SchemaDescriptor) -> Self {
        Self {
            schema,
            value: None,
        }
    }

    /// A factory producing empty containers for `schema`.
    #[must_use]
    pub fn factory(schema: SchemaDescriptor) -> ContainerFactory {
        Arc::new(move || {
            let container: Box<dyn GenericContainer> = Box::new(Self::new(schema.clone()));
            Ok::<_, TypeError>(container)
        })
    }

    /// The populated value, `None` until a decode succeeded.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        self.value
    }
}

impl GenericContainer for GenericRecordContainer {
    fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    fn populate(&mut self, value: Value) -> Result<(), TypeError> {
        if !value.validate(self.schema.schema()) {
            return Err(TypeError::Populate {
                target: self
                    .schema
                    .full_name()
                    .unwrap_or_else(|| TargetType::GENERIC_RECORD.to_string()),
                reason: "value does not match the container schema".to_string(),
            });
        }
        self.value = Some(value);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
