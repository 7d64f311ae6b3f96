use regconv_wire::{ContentType, ContentTypeError};
use serde_json::Value;

use crate::schema::SchemaDescriptor;

/// Custom property carrying the schema's registry version.
pub const VERSION_PROPERTY: &str = "version";

/// Custom property carrying the content type messages of this schema use.
pub const MIME_TYPE_PROPERTY: &str = "mimeType";

/// Read the `version` property.
///
/// Only a JSON integer that fits in an `i32` counts. `"3"`, `3.0`,
/// `true`, an out-of-range number or a missing property all read as
/// `None`; nothing is coerced and nothing fails.
#[must_use]
pub fn get_version(schema: &SchemaDescriptor) -> Option<i32> {
    match schema.property(VERSION_PROPERTY) {
        Some(Value::Number(number)) => number.as_i64().and_then(|v| i32::try_from(v).ok()),
        _ => None,
    }
}

/// Read the `mimeType` property as a [`ContentType`].
///
/// Missing, non-string, empty and whitespace-only values read as
/// `Ok(None)`.
///
/// # Errors
///
/// A present but malformed value is not swallowed: the parser's
/// [`ContentTypeError`] is returned as is.
pub fn get_mime_type(schema: &SchemaDescriptor) -> Result<Option<ContentType>, ContentTypeError> {
    match schema.property(MIME_TYPE_PROPERTY) {
        Some(Value::String(text)) if !text.trim().is_empty() => ContentType::parse(text).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(extra: &str) -> SchemaDescriptor {
        let definition = format!(
            r#"{{"type": "record", "name": "Order", {extra} "fields": [{{"name": "id", "type": "long"}}]}}"#
        );
        SchemaDescriptor::parse(&definition).unwrap()
    }

    #[test]
    fn version_present_and_integer() {
        assert_eq!(get_version(&record_with(r#""version": 4,"#)), Some(4));
    }

    #[test]
    fn version_missing() {
        assert_eq!(get_version(&record_with("")), None);
    }

    #[test]
    fn version_stored_as_string_is_absent() {
        assert_eq!(get_version(&record_with(r#""version": "4","#)), None);
    }

    #[test]
    fn version_stored_as_float_is_absent() {
        assert_eq!(get_version(&record_with(r#""version": 4.0,"#)), None);
    }

    #[test]
    fn version_out_of_i32_range_is_absent() {
        assert_eq!(get_version(&record_with(r#""version": 4294967296,"#)), None);
    }

    #[test]
    fn version_on_primitive_schema_is_absent() {
        let schema = SchemaDescriptor::parse(r#""long""#).unwrap();
        assert_eq!(get_version(&schema), None);
    }

    #[test]
    fn mime_type_parses() {
        let schema = record_with(r#""mimeType": "application/vnd.orders.v3+avro","#);
        let mime = get_mime_type(&schema).unwrap().unwrap();
        assert_eq!(mime.subtype(), "vnd.orders.v3+avro");
    }

    #[test]
    fn mime_type_missing_or_blank() {
        assert_eq!(get_mime_type(&record_with("")).unwrap(), None);
        assert_eq!(
            get_mime_type(&record_with(r#""mimeType": "","#)).unwrap(),
            None
        );
        assert_eq!(
            get_mime_type(&record_with(r#""mimeType": "   ","#)).unwrap(),
            None
        );
    }

    #[test]
    fn mime_type_non_string_is_absent() {
        assert_eq!(
            get_mime_type(&record_with(r#""mimeType": 12,"#)).unwrap(),
            None
        );
    }

    #[test]
    fn mime_type_malformed_is_an_error() {
        let schema = record_with(r#""mimeType": "not a content type","#);
        assert!(matches!(
            get_mime_type(&schema),
            Err(ContentTypeError::MissingSlash { .. })
        ));
    }
}
