//! Shared fixtures for the regconv integration tests and benches.
//!
//! Everything here builds real Avro bytes through `apache-avro` so the
//! tests exercise the same encoding a producer would emit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use apache_avro::types::{Record, Value};
use regconv_registry::{MemorySchemaRegistry, RegistryError, SchemaRegistry};
use regconv_types::SchemaDescriptor;
use tracing::Level;

/// Writer schema v1: id and amount.
pub const ORDER_V1: &str = r#"{
    "type": "record",
    "name": "Order",
    "namespace": "com.example.orders",
    "version": 1,
    "mimeType": "application/vnd.orders.v1+avro",
    "fields": [
        {"name": "id", "type": "string"},
        {"name": "amount", "type": "double"}
    ]
}"#;

/// Writer schema v2: adds `channel` and an optional `note`.
pub const ORDER_V2: &str = r#"{
    "type": "record",
    "name": "Order",
    "namespace": "com.example.orders",
    "version": 2,
    "mimeType": "application/vnd.orders.v2+avro",
    "fields": [
        {"name": "id", "type": "string"},
        {"name": "amount", "type": "double"},
        {"name": "channel", "type": "string"},
        {"name": "note", "type": ["null", "string"], "default": null}
    ]
}"#;

/// Reader schema that knows a field v1 never wrote, with a default.
pub const ORDER_WITH_PRIORITY: &str = r#"{
    "type": "record",
    "name": "Order",
    "namespace": "com.example.orders",
    "fields": [
        {"name": "id", "type": "string"},
        {"name": "amount", "type": "double"},
        {"name": "priority", "type": "int", "default": 0}
    ]
}"#;

/// Schema id the fixtures register v1 under.
pub const ORDER_V1_ID: i32 = 41;

/// Schema id the fixtures register v2 under.
pub const ORDER_V2_ID: i32 = 42;

static INIT_TRACING: Once = Once::new();

pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_target(false)
            .without_time()
            .try_init();
    });
}

/// A registry holding both order schemas under subject `orders`.
#[must_use]
pub fn order_registry() -> Arc<MemorySchemaRegistry> {
    let registry = Arc::new(MemorySchemaRegistry::new());
    registry.insert(ORDER_V1_ID, "orders", 1, ORDER_V1);
    registry.insert(ORDER_V2_ID, "orders", 2, ORDER_V2);
    registry
}

#[must_use]
pub fn schema(definition: &str) -> SchemaDescriptor {
    SchemaDescriptor::parse(definition).expect("fixture schema parses")
}

/// Encode a v1 order body (no envelope).
#[must_use]
pub fn order_v1_body(id: &str, amount: f64) -> Vec<u8> {
    let writer = schema(ORDER_V1);
    let mut record = Record::new(writer.schema()).expect("v1 is a record");
    record.put("id", id);
    record.put("amount", amount);
    apache_avro::to_avro_datum(writer.schema(), record).expect("v1 order encodes")
}

/// Encode a v2 order body (no envelope).
#[must_use]
pub fn order_v2_body(id: &str, amount: f64, channel: &str) -> Vec<u8> {
    let writer = schema(ORDER_V2);
    let mut record = Record::new(writer.schema()).expect("v2 is a record");
    record.put("id", id);
    record.put("amount", amount);
    record.put("channel", channel);
    record.put("note", Value::Union(0, Box::new(Value::Null)));
    apache_avro::to_avro_datum(writer.schema(), record).expect("v2 order encodes")
}

/// The generic value a v1 writer produces for `(id, amount)`.
#[must_use]
pub fn order_v1_value(id: &str, amount: f64) -> Value {
    Value::Record(vec![
        ("id".to_string(), Value::String(id.to_string())),
        ("amount".to_string(), Value::Double(amount)),
    ])
}

/// Which registry path a conversion took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    ById(i32),
    BySubject(i32),
}

/// Registry wrapper that records every call in order.
#[derive(Debug)]
pub struct RecordingRegistry<R> {
    inner: R,
    calls: std::sync::Mutex<Vec<Lookup>>,
    total: AtomicUsize,
}

impl<R: SchemaRegistry> RecordingRegistry<R> {
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            calls: std::sync::Mutex::new(Vec::new()),
            total: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Lookup> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    fn record(&self, lookup: Lookup) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.calls.lock().expect("calls lock poisoned").push(lookup);
    }
}

impl<R: SchemaRegistry> SchemaRegistry for RecordingRegistry<R> {
    fn fetch_by_id(&self, id: i32) -> Result<String, RegistryError> {
        self.record(Lookup::ById(id));
        self.inner.fetch_by_id(id)
    }

    fn fetch_by_subject(&self, subject: &str, version: i32) -> Result<String, RegistryError> {
        self.record(Lookup::BySubject(version));
        self.inner.fetch_by_subject(subject, version)
    }
}

/// A registry that is always down.
#[derive(Debug, Default)]
pub struct UnavailableRegistry;

impl SchemaRegistry for UnavailableRegistry {
    fn fetch_by_id(&self, _id: i32) -> Result<String, RegistryError> {
        Err(RegistryError::Unavailable {
            reason: "connection refused".to_string(),
        })
    }

    fn fetch_by_subject(&self, _subject: &str, _version: i32) -> Result<String, RegistryError> {
        Err(RegistryError::Unavailable {
            reason: "connection refused".to_string(),
        })
    }
}
