#![no_main]

use std::sync::LazyLock;

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use regconv_decoder::GenericDecoder;
use regconv_types::{GenericRecordContainer, SchemaDescriptor, TargetKind};
use regconv_wire::Envelope;

static WRITER: LazyLock<SchemaDescriptor> = LazyLock::new(|| {
    SchemaDescriptor::parse(
        r#"{"type": "record", "name": "Order", "fields": [
            {"name": "id", "type": "string"},
            {"name": "amount", "type": "double"},
            {"name": "tags", "type": {"type": "array", "items": "string"}},
            {"name": "note", "type": ["null", "string"], "default": null}
        ]}"#,
    )
    .unwrap()
});

static READER: LazyLock<SchemaDescriptor> = LazyLock::new(|| {
    SchemaDescriptor::parse(
        r#"{"type": "record", "name": "Order", "fields": [
            {"name": "id", "type": "string"},
            {"name": "priority", "type": "int", "default": 0}
        ]}"#,
    )
    .unwrap()
});

// Fuzz target: GenericDecoder::decode on arbitrary bodies.
//
// Catches bugs in:
// - Oversized length prefixes for strings and arrays
// - Out-of-range union branches
// - Resolution of garbage values against a reader schema
fuzz_target!(|data: &[u8]| {
    let envelope = Envelope::plain(Bytes::copy_from_slice(data));
    let _ = GenericDecoder::decode(&envelope, &WRITER, &TargetKind::PlainRecord);
    let evolved = TargetKind::SelfDescribing(GenericRecordContainer::factory(READER.clone()));
    let _ = GenericDecoder::decode(&envelope, &WRITER, &evolved);
});
