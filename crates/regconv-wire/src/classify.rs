use std::sync::LazyLock;

use regex::Regex;

use crate::content_type::ContentType;

/// Format suffix used when no other is configured.
pub const DEFAULT_FORMAT: &str = "avro";

/// Default vendor prefix in versioned content types.
pub const DEFAULT_PREFIX: &str = "vnd";

static AVRO: LazyLock<MimeClassifier> =
    LazyLock::new(|| MimeClassifier::for_format(DEFAULT_FORMAT));

/// Recognizes the two content-type conventions used by schema-aware
/// producers.
///
/// ```text
/// ┌───────────┬──────────────────────────────────────┬──────────────────────────────┐
/// │ Shape     │ Subtype                              │ Payload                      │
/// ├───────────┼──────────────────────────────────────┼──────────────────────────────┤
/// │ Wildcard  │ vnd.<subject>.*+<format>             │ 4-byte BE schema id + body   │
/// │ Versioned │ <prefix>.<subject>.v<version>+<fmt>  │ body only                    │
/// └───────────┴──────────────────────────────────────┴──────────────────────────────┘
/// ```
///
/// Both checks are full matches against the subtype. `vnd.orders.*+avro`
/// is a wildcard; `xvnd.orders.*+avro` and `vnd.orders.*+avro2` are not.
/// The wildcard subject is ASCII word characters only, so subjects
/// carrying dots or dashes never take the wrapped path.
#[derive(Clone, Debug)]
pub struct MimeClassifier {
    format: String,
    wildcard: Regex,
    versioned: Regex,
}

/// Subject and version carried by a versioned content type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionedContentType {
    pub prefix: String,
    pub subject: String,
    pub version: i32,
    pub format: String,
}

impl MimeClassifier {
    /// Build a classifier for the given format suffix (`avro`, `json`, ...).
    ///
    /// # Panics
    ///
    /// Never in practice: the suffix is regex-escaped, so the patterns are
    /// always valid.
    #[must_use]
    pub fn for_format(format: &str) -> Self {
        let format = format.to_ascii_lowercase();
        let escaped = regex::escape(&format);
        let wildcard = Regex::new(&format!(r"^vnd\.[A-Za-z0-9_]+\.\*\+{escaped}$"))
            .expect("escaped wildcard pattern is valid");
        let versioned = Regex::new(&format!(
            r"^([A-Za-z0-9_\-]+)\.([A-Za-z0-9$.]+)\.v([0-9]+)\+{escaped}$"
        ))
        .expect("escaped versioned pattern is valid");

        Self {
            format,
            wildcard,
            versioned,
        }
    }

    /// The format suffix this classifier matches.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// `true` iff the subtype is `vnd.<word-chars>.*+<format>`.
    #[must_use]
    pub fn is_wildcard(&self, content_type: &ContentType) -> bool {
        self.wildcard.is_match(content_type.subtype())
    }

    /// `true` iff the content type is `application/<prefix>.<subject>.v<n>+<format>`.
    #[must_use]
    pub fn is_versioned(&self, content_type: &ContentType) -> bool {
        self.versioned(content_type).is_some()
    }

    /// Extract prefix, subject and version from a versioned content type.
    ///
    /// Returns `None` for anything else, including versions that do not
    /// fit in an `i32`.
    #[must_use]
    pub fn versioned(&self, content_type: &ContentType) -> Option<VersionedContentType> {
        if content_type.type_name() != "application" {
            return None;
        }
        let caps = self.versioned.captures(content_type.subtype())?;
        let version = caps[3].parse::<i32>().ok()?;
        Some(VersionedContentType {
            prefix: caps[1].to_string(),
            subject: caps[2].to_string(),
            version,
            format: self.format.clone(),
        })
    }

    /// `true` for `application/<format>` and `application/*+<format>`.
    #[must_use]
    pub fn is_supported(&self, content_type: &ContentType) -> bool {
        let type_ok = content_type.type_name() == "application" || content_type.is_wildcard_type();
        type_ok
            && (content_type.subtype() == self.format
                || content_type.subtype_suffix() == Some(self.format.as_str()))
    }
}

impl Default for MimeClassifier {
    fn default() -> Self {
        AVRO.clone()
    }
}

impl VersionedContentType {
    /// Parse a versioned content type with the default `avro` format.
    #[must_use]
    pub fn parse(content_type: &ContentType) -> Option<Self> {
        AVRO.versioned(content_type)
    }

    /// Render back to `application/<prefix>.<subject>.v<version>+<format>`.
    #[must_use]
    pub fn to_content_type(&self) -> ContentType {
        ContentType::new(
            "application",
            &format!(
                "{}.{}.v{}+{}",
                self.prefix, self.subject, self.version, self.format
            ),
        )
    }
}

/// Wildcard check with the default `avro` format.
#[must_use]
pub fn is_wildcard(content_type: &ContentType) -> bool {
    AVRO.is_wildcard(content_type)
}

/// Versioned check with the default `avro` format.
#[must_use]
pub fn is_versioned(content_type: &ContentType) -> bool {
    AVRO.is_versioned(content_type)
}

/// Supported-shape check with the default `avro` format.
#[must_use]
pub fn is_supported(content_type: &ContentType) -> bool {
    AVRO.is_supported(content_type)
}
