use apache_avro::Schema;
use apache_avro::types::Value;
use regconv_types::{GenericContainer, SchemaDescriptor, TargetKind, get_mime_type};
use regconv_wire::{ContentType, Envelope};
use serde::de::DeserializeOwned;

use crate::error::DecodeFailure;

/// What a decode produced.
#[derive(Debug)]
pub enum Decoded {
    /// A generic Avro value shaped by the writer schema.
    Record(Value),
    /// A self-describing target instance, populated.
    Container(Box<dyn GenericContainer>),
}

/// The result of a successful conversion.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │ DecodedMessage                                              │
/// │   value:            Decoded      ← record or container      │
/// │   writer_schema:    Descriptor   ← what the payload used    │
/// │   schema_id:        Option<i32>  ← set for wrapped payloads │
/// │   schema_version:   Option<i32>  ← writer `version` prop    │
/// │   target_mime_type: Option<CT>   ← reader `mimeType` prop   │
/// └─────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug)]
pub struct DecodedMessage {
    pub value: Decoded,
    pub writer_schema: SchemaDescriptor,
    pub schema_id: Option<i32>,
    pub schema_version: Option<i32>,
    /// Content type the expected schema advertises, for a caller that
    /// re-publishes the message. Extracted only; nothing here acts on it.
    pub target_mime_type: Option<ContentType>,
}

impl DecodedMessage {
    /// The generic value, if the target was a plain record.
    #[must_use]
    pub fn record(&self) -> Option<&Value> {
        match &self.value {
            Decoded::Record(value) => Some(value),
            Decoded::Container(_) => None,
        }
    }

    #[must_use]
    pub fn into_record(self) -> Option<Value> {
        match self.value {
            Decoded::Record(value) => Some(value),
            Decoded::Container(_) => None,
        }
    }

    /// The container, downcast to the concrete type its factory built.
    #[must_use]
    pub fn container<T: 'static>(&self) -> Option<&T> {
        match &self.value {
            Decoded::Container(container) => container.as_any().downcast_ref::<T>(),
            Decoded::Record(_) => None,
        }
    }

    /// Map a plain-record result onto a serde type.
    ///
    /// # Errors
    ///
    /// - [`DecodeFailure::NotARecord`] for container results.
    /// - [`DecodeFailure::Avro`] if the value does not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DecodeFailure> {
        let value = self.record().ok_or(DecodeFailure::NotARecord)?;
        apache_avro::from_value::<T>(value).map_err(DecodeFailure::Avro)
    }
}

/// Schema-evolution-aware binary decoder.
///
/// Decoding proceeds in four steps:
///
///   1. **Expected schema**: a plain record reads with the writer schema;
///      a self-describing target is instantiated through its factory and
///      reads with the schema the instance reports.
///   2. **Target mime type**: the expected schema's `mimeType` property
///      is extracted for the caller. A malformed value fails the decode.
///   3. **Compatibility precheck**: two records with no field in common
///      are rejected up front instead of silently decoding to defaults.
///   4. **Decode**: the payload is read with the writer schema and
///      resolved against the expected schema (fields the writer added
///      are dropped, missing ones take reader defaults). Containers are
///      then populated with the resolved value.
///
/// Nothing partial escapes: any failure returns an error and the
/// half-built instance is dropped.
pub struct GenericDecoder;

impl GenericDecoder {
    /// Decode an unwrapped payload.
    ///
    /// # Errors
    ///
    /// - [`DecodeFailure::Instantiation`] if the target factory fails.
    /// - [`DecodeFailure::TargetMimeType`] if the expected schema's
    ///   `mimeType` property is malformed.
    /// - [`DecodeFailure::Irreconcilable`] if reader and writer records
    ///   have unrelated names or share no field.
    /// - [`DecodeFailure::Avro`] if the payload does not decode or resolve.
    /// - [`DecodeFailure::Populate`] if the container rejects the value.
    pub fn decode(
        envelope: &Envelope,
        writer: &SchemaDescriptor,
        target: &TargetKind,
    ) -> Result<DecodedMessage, DecodeFailure> {
        let mut container = match target {
            TargetKind::PlainRecord => None,
            TargetKind::SelfDescribing(factory) => {
                Some(factory().map_err(DecodeFailure::Instantiation)?)
            }
        };
        let expected = container.as_ref().map_or(writer, |c| c.schema());

        let target_mime_type = get_mime_type(expected).map_err(DecodeFailure::TargetMimeType)?;

        // Reading with the writer schema alone skips a no-op resolution pass.
        let reader_schema = if container.is_some() {
            check_reconcilable(expected, writer)?;
            Some(expected.schema())
        } else {
            None
        };

        let mut body = envelope.payload.as_ref();
        let value = apache_avro::from_avro_datum(writer.schema(), &mut body, reader_schema)
            .map_err(DecodeFailure::Avro)?;

        tracing::debug!(
            writer = writer.full_name().as_deref().unwrap_or("<unnamed>"),
            schema_id = envelope.schema_id,
            schema_version = envelope.schema_version,
            trailing_bytes = body.len(),
            "decoded payload"
        );

        let value = match container.take() {
            Some(mut instance) => {
                instance.populate(value).map_err(DecodeFailure::Populate)?;
                Decoded::Container(instance)
            }
            None => Decoded::Record(value),
        };

        Ok(DecodedMessage {
            value,
            writer_schema: writer.clone(),
            schema_id: envelope.schema_id,
            schema_version: envelope.schema_version,
            target_mime_type,
        })
    }
}

/// Reject record pairs that cannot describe the same data.
///
/// `apache-avro` resolution ignores record names and would happily fill a
/// reader record entirely from defaults when no writer field matches.
/// Both are wrong-schema bugs, not evolution, so two records must:
///
///   - share a name (full or unqualified), or the reader must list the
///     writer's full name among its aliases, and
///   - share at least one field, reader field aliases included.
fn check_reconcilable(
    reader: &SchemaDescriptor,
    writer: &SchemaDescriptor,
) -> Result<(), DecodeFailure> {
    let (Schema::Record(reader_record), Schema::Record(writer_record)) =
        (reader.schema(), writer.schema())
    else {
        return Ok(());
    };
    let irreconcilable = || DecodeFailure::Irreconcilable {
        reader: reader.full_name().unwrap_or_default(),
        writer: writer.full_name().unwrap_or_default(),
    };

    let writer_name = writer_record.name.fullname(None);
    let aliased = reader_record.aliases.as_ref().is_some_and(|aliases| {
        aliases
            .iter()
            .any(|alias| alias.fullname(reader_record.name.namespace.clone()) == writer_name)
    });
    let same_name = reader_record.name.fullname(None) == writer_name
        || reader_record.name.name == writer_record.name.name;
    if !same_name && !aliased {
        return Err(irreconcilable());
    }

    if reader_record.fields.is_empty() {
        return Ok(());
    }

    let shared = reader_record.fields.iter().any(|field| {
        writer_record.fields.iter().any(|w| {
            w.name == field.name
                || field
                    .aliases
                    .as_ref()
                    .is_some_and(|aliases| aliases.contains(&w.name))
        })
    });

    if !shared {
        return Err(irreconcilable());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apache_avro::types::Record;
    use bytes::Bytes;
    use regconv_types::{ContainerFactory, GenericRecordContainer, TypeError};
    use serde::Deserialize;
    use std::sync::Arc;

    const ORDER_V2: &str = r#"{"type": "record", "name": "Order", "version": 2,
        "mimeType": "application/vnd.orders.v2+avro",
        "fields": [
            {"name": "id", "type": "long"},
            {"name": "amount", "type": "double"},
            {"name": "channel", "type": "string"}
        ]}"#;

    const ORDER_V1: &str = r#"{"type": "record", "name": "Order", "version": 1,
        "mimeType": "application/vnd.orders.v1+avro",
        "fields": [
            {"name": "id", "type": "long"},
            {"name": "amount", "type": "double"}
        ]}"#;

    fn encode_v2(id: i64, amount: f64, channel: &str) -> (SchemaDescriptor, Envelope) {
        let writer = SchemaDescriptor::parse(ORDER_V2).unwrap();
        let mut record = Record::new(writer.schema()).unwrap();
        record.put("id", id);
        record.put("amount", amount);
        record.put("channel", channel);
        let body = apache_avro::to_avro_datum(writer.schema(), record).unwrap();
        let mut envelope = Envelope::plain(Bytes::from(body));
        envelope.schema_version = Some(2);
        (writer, envelope)
    }

    #[test]
    fn plain_record_reads_with_writer_schema() {
        let (writer, envelope) = encode_v2(1, 9.5, "web");
        let decoded = GenericDecoder::decode(&envelope, &writer, &TargetKind::PlainRecord).unwrap();

        assert_eq!(
            decoded.record(),
            Some(&Value::Record(vec![
                ("id".to_string(), Value::Long(1)),
                ("amount".to_string(), Value::Double(9.5)),
                ("channel".to_string(), Value::String("web".to_string())),
            ]))
        );
        assert_eq!(decoded.schema_version, Some(2));
        assert_eq!(
            decoded.target_mime_type.as_ref().unwrap().subtype(),
            "vnd.orders.v2+avro"
        );
    }

    #[test]
    fn container_drops_fields_the_reader_does_not_know() {
        let (writer, envelope) = encode_v2(1, 9.5, "web");
        let reader = SchemaDescriptor::parse(ORDER_V1).unwrap();
        let target = TargetKind::SelfDescribing(GenericRecordContainer::factory(reader));

        let decoded = GenericDecoder::decode(&envelope, &writer, &target).unwrap();

        let container = decoded.container::<GenericRecordContainer>().unwrap();
        assert_eq!(
            container.value(),
            Some(&Value::Record(vec![
                ("id".to_string(), Value::Long(1)),
                ("amount".to_string(), Value::Double(9.5)),
            ]))
        );
        assert_eq!(
            decoded.target_mime_type.as_ref().unwrap().subtype(),
            "vnd.orders.v1+avro"
        );
        assert!(decoded.record().is_none());
    }

    #[test]
    fn failing_factory_is_instantiation_error() {
        let (writer, envelope) = encode_v2(1, 9.5, "web");
        let factory: ContainerFactory =
            Arc::new(|| -> Result<Box<dyn GenericContainer>, TypeError> {
                Err(TypeError::Instantiation {
                    target: "Order".to_string(),
                    reason: "no default constructor".to_string(),
                })
            });
        let target = TargetKind::SelfDescribing(factory);
        let err = GenericDecoder::decode(&envelope, &writer, &target).unwrap_err();
        assert!(matches!(err, DecodeFailure::Instantiation(_)));
    }

    #[test]
    fn truncated_payload_is_decode_error() {
        let (writer, envelope) = encode_v2(1, 9.5, "web");
        let truncated = Envelope::plain(envelope.payload.slice(..2));
        let err =
            GenericDecoder::decode(&truncated, &writer, &TargetKind::PlainRecord).unwrap_err();
        assert!(matches!(err, DecodeFailure::Avro(_)));
    }

    #[test]
    fn records_without_shared_fields_are_irreconcilable() {
        let (writer, envelope) = encode_v2(1, 9.5, "web");
        let reader = SchemaDescriptor::parse(
            r#"{"type": "record", "name": "Order", "fields": [
                {"name": "sku", "type": "string", "default": "none"}
            ]}"#,
        )
        .unwrap();
        let target = TargetKind::SelfDescribing(GenericRecordContainer::factory(reader));
        let err = GenericDecoder::decode(&envelope, &writer, &target).unwrap_err();
        assert!(matches!(err, DecodeFailure::Irreconcilable { .. }));
    }

    #[test]
    fn reader_alias_counts_as_shared_field() {
        let writer = SchemaDescriptor::parse(ORDER_V2).unwrap();
        let reader = SchemaDescriptor::parse(
            r#"{"type": "record", "name": "Order", "fields": [
                {"name": "order_id", "type": "long", "aliases": ["id"]}
            ]}"#,
        )
        .unwrap();
        assert!(check_reconcilable(&reader, &writer).is_ok());
    }

    #[test]
    fn records_with_different_names_are_irreconcilable() {
        let writer = SchemaDescriptor::parse(
            r#"{"type": "record", "name": "Order", "fields": [{"name": "id", "type": "long"}]}"#,
        )
        .unwrap();
        let body = apache_avro::to_avro_datum(
            writer.schema(),
            Value::Record(vec![("id".to_string(), Value::Long(7))]),
        )
        .unwrap();
        let envelope = Envelope::plain(Bytes::from(body));
        let reader = SchemaDescriptor::parse(
            r#"{"type": "record", "name": "Invoice", "fields": [{"name": "id", "type": "long"}]}"#,
        )
        .unwrap();
        let target = TargetKind::SelfDescribing(GenericRecordContainer::factory(reader));

        let err = GenericDecoder::decode(&envelope, &writer, &target).unwrap_err();
        assert!(matches!(
            err,
            DecodeFailure::Irreconcilable { ref reader, ref writer }
                if reader == "Invoice" && writer == "Order"
        ));
    }

    #[test]
    fn reader_record_alias_accepts_renamed_writer() {
        let writer = SchemaDescriptor::parse(ORDER_V2).unwrap();
        let reader = SchemaDescriptor::parse(
            r#"{"type": "record", "name": "Purchase", "aliases": ["Order"], "fields": [
                {"name": "id", "type": "long"}
            ]}"#,
        )
        .unwrap();
        assert!(check_reconcilable(&reader, &writer).is_ok());
    }

    #[test]
    fn namespace_change_keeps_unqualified_name_compatible() {
        let writer = SchemaDescriptor::parse(ORDER_V2).unwrap();
        let reader = SchemaDescriptor::parse(
            r#"{"type": "record", "name": "Order", "namespace": "com.example.v2",
                "fields": [{"name": "id", "type": "long"}]}"#,
        )
        .unwrap();
        assert!(check_reconcilable(&reader, &writer).is_ok());
    }

    #[test]
    fn malformed_target_mime_type_is_reported() {
        let (writer, envelope) = encode_v2(1, 9.5, "web");
        let reader = SchemaDescriptor::parse(
            r#"{"type": "record", "name": "Order", "mimeType": "nonsense",
                "fields": [{"name": "id", "type": "long"}]}"#,
        )
        .unwrap();
        let target = TargetKind::SelfDescribing(GenericRecordContainer::factory(reader));
        let err = GenericDecoder::decode(&envelope, &writer, &target).unwrap_err();
        assert!(matches!(err, DecodeFailure::TargetMimeType(_)));
    }

    #[test]
    fn deserialize_into_serde_type() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Order {
            id: i64,
            amount: f64,
            channel: String,
        }

        let (writer, envelope) = encode_v2(4, 1.25, "store");
        let decoded = GenericDecoder::decode(&envelope, &writer, &TargetKind::PlainRecord).unwrap();
        let order: Order = decoded.deserialize().unwrap();
        assert_eq!(
            order,
            Order {
                id: 4,
                amount: 1.25,
                channel: "store".to_string(),
            }
        );
    }
}
