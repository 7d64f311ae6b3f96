#![no_main]

use libfuzzer_sys::fuzz_target;
use regconv_wire::{ContentType, Envelope};

#[derive(Debug, arbitrary::Arbitrary)]
struct Input {
    schema_id: i32,
    body: Vec<u8>,
}

// Fuzz target: Envelope::wrap -> Envelope::unwrap roundtrip.
fuzz_target!(|input: Input| {
    let content_type = ContentType::new("application", "vnd.fuzz.*+avro");
    let wrapped = Envelope::wrap(input.schema_id, &input.body);
    let envelope = Envelope::unwrap(wrapped, &content_type).unwrap();
    assert_eq!(envelope.schema_id, Some(input.schema_id));
    assert_eq!(&envelope.payload[..], &input.body[..]);
});
