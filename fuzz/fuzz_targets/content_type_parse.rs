#![no_main]

use libfuzzer_sys::fuzz_target;
use regconv_wire::{ContentType, MimeClassifier};

// Fuzz target: ContentType::parse and classification.
//
// Catches bugs in:
// - Quote handling in parameter values
// - Multi-byte UTF-8 at token boundaries
// - Regex classification of arbitrary subtypes
//
// Anything that parses must re-parse from its Display form to the same value.
fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(content_type) = ContentType::parse(input) else {
        return;
    };

    let classifier = MimeClassifier::default();
    let _ = classifier.is_wildcard(&content_type);
    let _ = classifier.is_supported(&content_type);
    if let Some(versioned) = classifier.versioned(&content_type) {
        assert!(versioned.version >= 0);
    }

    let reparsed = ContentType::parse(&content_type.to_string()).unwrap();
    assert_eq!(reparsed, content_type);
});
