use apache_avro::Schema;
use serde_json::{Map, Value};

use crate::error::TypeError;

/// Attribute names that belong to the Avro schema grammar itself.
///
/// Everything else found at the top level of a schema object is a custom
/// property (`version`, `mimeType`, ...).
const RESERVED_ATTRIBUTES: &[&str] = &[
    "type",
    "name",
    "namespace",
    "doc",
    "aliases",
    "fields",
    "items",
    "values",
    "symbols",
    "size",
    "default",
    "order",
    "logicalType",
    "precision",
    "scale",
];

/// A parsed Avro schema plus its custom top-level properties.
///
/// Producers use custom properties as a side channel: the registry stores
/// the schema verbatim, so a `"version": 3` or
/// `"mimeType": "application/vnd.orders.v3+avro"` written next to the
/// record's `name` travels with it.
///
/// ```json
/// {
///   "type": "record",
///   "name": "Order",
///   "version": 3,
///   "mimeType": "application/vnd.orders.v3+avro",
///   "fields": [ { "name": "id", "type": "long" } ]
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaDescriptor {
    schema: Schema,
    properties: Map<String, Value>,
}

impl SchemaDescriptor {
    /// Parse a raw schema definition as returned by a registry.
    ///
    /// # Errors
    ///
    /// - [`TypeError::InvalidJson`] if `definition` is not JSON.
    /// - [`TypeError::InvalidSchema`] if the JSON is not a valid Avro schema.
    pub fn parse(definition: &str) -> Result<Self, TypeError> {
        let json: Value = serde_json::from_str(definition).map_err(TypeError::InvalidJson)?;
        Self::from_json(&json)
    }

    /// Build from an already-parsed JSON schema definition.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidSchema`] if the JSON is not a valid Avro
    /// schema.
    pub fn from_json(json: &Value) -> Result<Self, TypeError> {
        let schema = Schema::parse(json).map_err(TypeError::InvalidSchema)?;
        Ok(Self {
            schema,
            properties: custom_properties(json),
        })
    }

    /// Wrap a schema built in code.
    ///
    /// Custom properties are recovered from the schema's own serialized
    /// form, so a record built with attributes keeps them. Primitive
    /// schemas have none.
    #[must_use]
    pub fn from_schema(schema: Schema) -> Self {
        let properties = serde_json::to_value(&schema)
            .map(|json| custom_properties(&json))
            .unwrap_or_default();
        Self { schema, properties }
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Raw custom property lookup. Reserved Avro attributes never appear
    /// here.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    #[must_use]
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Full name of a named schema (`record`, `enum`, `fixed`), if any.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        self.schema.name().map(|name| name.fullname(None))
    }

    /// Parsing Canonical Form, used as a stable identity in logs and tests.
    #[must_use]
    pub fn canonical_form(&self) -> String {
        self.schema.canonical_form()
    }
}

fn custom_properties(json: &Value) -> Map<String, Value> {
    match json {
        Value::Object(object) => object
            .iter()
            .filter(|(key, _)| !RESERVED_ATTRIBUTES.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        _ => Map::new(),
    }
}
