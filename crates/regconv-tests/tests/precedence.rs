//! Schema id precedence.
//!
//! A wrapped payload's id is authoritative. Even when the content type also
//! names a subject and version, the registry must only be asked by id.

use std::sync::Arc;

use regconv_decoder::{Message, MessageConverter, MessageHeaders};
use regconv_registry::{CachingRegistry, MemorySchemaRegistry};
use regconv_tests::{
    Lookup, ORDER_V1_ID, ORDER_V2_ID, RecordingRegistry, init_tracing, order_registry,
    order_v1_body, order_v2_body,
};
use regconv_types::TargetType;
use regconv_wire::{ContentType, Envelope};

fn recording() -> Arc<RecordingRegistry<Arc<MemorySchemaRegistry>>> {
    Arc::new(RecordingRegistry::new(order_registry()))
}

#[test]
fn id_only_lookup_for_wrapped_payload() {
    init_tracing();
    let registry = recording();
    let converter = MessageConverter::new(registry.clone());
    let message = Message::with_content_type(
        Envelope::wrap(ORDER_V1_ID, &order_v1_body("o-1", 1.0)),
        "application/vnd.orders.*+avro",
    );

    converter
        .convert_from(&message, &TargetType::generic_record(), None)
        .unwrap()
        .unwrap();

    assert_eq!(registry.calls(), vec![Lookup::ById(ORDER_V1_ID)]);
}

#[test]
fn hint_with_version_does_not_override_header_id() {
    // The header says wrapped; the hint names v2. The header wins, and
    // within it the id wins.
    let registry = recording();
    let converter = MessageConverter::new(registry.clone());
    let message = Message::with_content_type(
        Envelope::wrap(ORDER_V1_ID, &order_v1_body("o-2", 2.0)),
        "application/vnd.orders.*+avro",
    );
    let hint = ContentType::parse("application/vnd.orders.v2+avro").unwrap();

    let decoded = converter
        .convert_from(&message, &TargetType::generic_record(), Some(&hint))
        .unwrap()
        .unwrap();

    assert_eq!(decoded.schema_version, Some(1));
    assert_eq!(registry.calls(), vec![Lookup::ById(ORDER_V1_ID)]);
}

#[test]
fn versioned_content_type_uses_subject_lookup() {
    let registry = recording();
    let converter = MessageConverter::new(registry.clone());
    let message = Message::new(
        order_v2_body("o-3", 3.0, "web"),
        MessageHeaders::new().with("contentType", "application/vnd.orders.v2+avro"),
    );

    converter
        .convert_from(&message, &TargetType::generic_record(), None)
        .unwrap()
        .unwrap();

    assert_eq!(registry.calls(), vec![Lookup::BySubject(2)]);
}

#[test]
fn caching_registry_serves_repeat_ids() {
    let inner = recording();
    let converter = MessageConverter::new(Arc::new(CachingRegistry::new(inner.clone())));
    let message = Message::with_content_type(
        Envelope::wrap(ORDER_V2_ID, &order_v2_body("o-4", 4.0, "app")),
        "application/vnd.orders.*+avro",
    );

    for _ in 0..5 {
        converter
            .convert_from(&message, &TargetType::generic_record(), None)
            .unwrap()
            .unwrap();
    }

    assert_eq!(inner.total(), 1);
}
