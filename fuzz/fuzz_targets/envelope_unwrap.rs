#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use regconv_wire::{ContentType, Envelope, SCHEMA_ID_SIZE};

// Fuzz target: Envelope::unwrap on a wildcard content type.
//
// Short inputs must error, everything else must split at byte 4.
fuzz_target!(|data: &[u8]| {
    let content_type = ContentType::new("application", "vnd.fuzz.*+avro");
    match Envelope::unwrap(Bytes::copy_from_slice(data), &content_type) {
        Ok(envelope) => {
            assert!(data.len() >= SCHEMA_ID_SIZE);
            assert_eq!(&envelope.payload[..], &data[SCHEMA_ID_SIZE..]);
        }
        Err(_) => assert!(data.len() < SCHEMA_ID_SIZE),
    }
});
