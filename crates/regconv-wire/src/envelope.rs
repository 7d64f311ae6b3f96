use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::classify::MimeClassifier;
use crate::content_type::ContentType;
use crate::error::WireError;

/// Size of the schema id prefix on wrapped payloads.
pub const SCHEMA_ID_SIZE: usize = 4;

/// A message payload with any schema id prefix taken off.
///
/// ```text
/// Wrapped (wildcard content type):
/// ┌──────────────────────┬─────────────────────────────┐
/// │ schema id (i32, BE)  │ Avro binary body            │
/// │ 4 bytes              │ payload.len() - 4 bytes     │
/// └──────────────────────┴─────────────────────────────┘
///
/// Versioned / anything else:
/// ┌────────────────────────────────────────────────────┐
/// │ Avro binary body (payload unchanged)               │
/// └────────────────────────────────────────────────────┘
/// ```
///
/// `schema_id` is `Some` exactly when the content type was a wildcard.
/// `schema_version` starts out `None` and is filled in by the resolver
/// from the resolved schema's `version` property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub payload: Bytes,
    pub schema_id: Option<i32>,
    pub schema_version: Option<i32>,
}

impl Envelope {
    /// An envelope around an unprefixed payload.
    #[must_use]
    pub fn plain(payload: Bytes) -> Self {
        Self {
            payload,
            schema_id: None,
            schema_version: None,
        }
    }

    /// Split a raw payload according to its content type, using the
    /// default `avro` classifier.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MalformedEnvelope`] when the content type is a
    /// wildcard and the payload is shorter than [`SCHEMA_ID_SIZE`].
    pub fn unwrap(payload: Bytes, content_type: &ContentType) -> Result<Self, WireError> {
        Self::unwrap_with(&MimeClassifier::default(), payload, content_type)
    }

    /// Same as [`unwrap`](Self::unwrap) with an explicit classifier.
    ///
    /// The body is a zero-copy slice of `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MalformedEnvelope`] when the content type is a
    /// wildcard and the payload is shorter than [`SCHEMA_ID_SIZE`].
    pub fn unwrap_with(
        classifier: &MimeClassifier,
        mut payload: Bytes,
        content_type: &ContentType,
    ) -> Result<Self, WireError> {
        if !classifier.is_wildcard(content_type) {
            tracing::trace!(content_type = %content_type, "payload is not wrapped");
            return Ok(Self::plain(payload));
        }

        if payload.len() < SCHEMA_ID_SIZE {
            return Err(WireError::MalformedEnvelope {
                len: payload.len(),
                needed: SCHEMA_ID_SIZE,
            });
        }

        // get_i32 reads big-endian and advances past the prefix.
        let schema_id = payload.get_i32();
        tracing::debug!(
            content_type = %content_type,
            schema_id,
            body_len = payload.len(),
            "unwrapped schema id prefix"
        );

        Ok(Self {
            payload,
            schema_id: Some(schema_id),
            schema_version: None,
        })
    }

    /// Prefix `body` with a big-endian schema id.
    #[must_use]
    pub fn wrap(schema_id: i32, body: &[u8]) -> Bytes {
        let mut buf = BytesMut::with_capacity(SCHEMA_ID_SIZE + body.len());
        buf.put_i32(schema_id);
        buf.put_slice(body);
        buf.freeze()
    }

    #[must_use]
    pub fn is_wrapped(&self) -> bool {
        self.schema_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wildcard() -> ContentType {
        ContentType::parse("application/vnd.orders.*+avro").unwrap()
    }

    fn versioned() -> ContentType {
        ContentType::parse("application/vnd.orders.v3+avro").unwrap()
    }

    #[test]
    fn unwrap_reads_big_endian_id() {
        let payload = Bytes::from_static(&[0x00, 0x00, 0x01, 0x02, 0xAA, 0xBB]);
        let envelope = Envelope::unwrap(payload, &wildcard()).unwrap();
        assert_eq!(envelope.schema_id, Some(0x0102));
        assert_eq!(envelope.payload.as_ref(), &[0xAA, 0xBB]);
        assert_eq!(envelope.schema_version, None);
        assert!(envelope.is_wrapped());
    }

    #[test]
    fn unwrap_negative_id() {
        let payload = Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0xFE]);
        let envelope = Envelope::unwrap(payload, &wildcard()).unwrap();
        assert_eq!(envelope.schema_id, Some(-2));
        assert!(envelope.payload.is_empty());
    }

    #[test]
    fn unwrap_leaves_versioned_payload_alone() {
        let payload = Bytes::from_static(&[0x00, 0x00, 0x00, 0x07, 0x02]);
        let envelope = Envelope::unwrap(payload.clone(), &versioned()).unwrap();
        assert_eq!(envelope, Envelope::plain(payload));
        assert!(!envelope.is_wrapped());
    }

    #[test]
    fn unwrap_short_wrapped_payload_fails() {
        for len in 0..SCHEMA_ID_SIZE {
            let payload = Bytes::from(vec![0u8; len]);
            let result = Envelope::unwrap(payload, &wildcard());
            assert!(matches!(
                result,
                Err(WireError::MalformedEnvelope { len: l, needed: 4 }) if l == len
            ));
        }
    }

    #[test]
    fn short_plain_payload_is_fine() {
        let envelope = Envelope::unwrap(Bytes::from_static(&[0x01]), &versioned()).unwrap();
        assert_eq!(envelope.payload.len(), 1);
    }

    #[test]
    fn wrap_writes_prefix() {
        let wrapped = Envelope::wrap(7, &[0x02]);
        assert_eq!(wrapped.as_ref(), &[0x00, 0x00, 0x00, 0x07, 0x02]);
    }

    proptest! {
        #[test]
        fn unwrap_splits_any_wrapped_buffer(
            bytes in proptest::collection::vec(any::<u8>(), 4..256)
        ) {
            let expected_id = i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            let envelope = Envelope::unwrap(Bytes::from(bytes.clone()), &wildcard()).unwrap();
            prop_assert_eq!(envelope.schema_id, Some(expected_id));
            prop_assert_eq!(envelope.payload.as_ref(), &bytes[4..]);
        }

        #[test]
        fn wrap_then_unwrap_recovers_id(
            id in any::<i32>(),
            body in proptest::collection::vec(any::<u8>(), 0..64)
        ) {
            let envelope = Envelope::unwrap(Envelope::wrap(id, &body), &wildcard()).unwrap();
            prop_assert_eq!(envelope.schema_id, Some(id));
            prop_assert_eq!(envelope.payload.as_ref(), body.as_slice());
        }
    }
}
