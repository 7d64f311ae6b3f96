use regconv_wire::MimeClassifier;

use crate::message::CONTENT_TYPE_HEADER;

/// Configuration for a [`MessageConverter`](crate::MessageConverter).
///
/// ```text
/// ┌─────────────────────┬────────────────────────────────────────────────┐
/// │ Field               │ Purpose                                        │
/// ├─────────────────────┼────────────────────────────────────────────────┤
/// │ format              │ Serialization suffix matched in content types  │
/// │ content_type_header │ Header the default resolver reads              │
/// └─────────────────────┴────────────────────────────────────────────────┘
/// ```
///
/// `format` is what turns `application/vnd.orders.*+avro` into a wrapped
/// content type. Changing it to `"avro-binary"` makes the converter claim
/// `+avro-binary` content types instead; nothing else changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Format suffix, without the leading `+`.
    pub format: String,

    /// Name of the header carrying the content type. Lookups fall back to
    /// a case-insensitive match.
    pub content_type_header: String,
}

impl ConverterConfig {
    /// The classifier this configuration implies.
    #[must_use]
    pub fn classifier(&self) -> MimeClassifier {
        MimeClassifier::for_format(&self.format)
    }
}

impl Default for ConverterConfig {
    /// `avro` format, `contentType` header.
    fn default() -> Self {
        Self {
            format: "avro".to_string(),
            content_type_header: CONTENT_TYPE_HEADER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regconv_wire::ContentType;

    #[test]
    fn default_config_classifies_avro() {
        let classifier = ConverterConfig::default().classifier();
        let ct = ContentType::parse("application/vnd.orders.*+avro").unwrap();
        assert!(classifier.is_wildcard(&ct));
    }

    #[test]
    fn custom_format_changes_suffix() {
        let config = ConverterConfig {
            format: "avro-binary".to_string(),
            ..ConverterConfig::default()
        };
        let classifier = config.classifier();
        let orders = ContentType::parse("application/vnd.orders.*+avro").unwrap();
        assert!(!classifier.is_wildcard(&orders));
    }
}
