/// Errors raised while taking a message payload apart.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A wrapped payload was too short to hold the 4-byte schema id.
    ///
    /// Only reachable on the wildcard content-type path. The payload is
    /// rejected outright instead of being truncated or padded.
    #[error("malformed envelope: wrapped payload is {len} bytes, need at least {needed}")]
    MalformedEnvelope { len: usize, needed: usize },
}

/// Errors raised by [`ContentType::parse`](crate::ContentType::parse).
///
/// Each variant keeps the offending input so the message is useful on
/// its own when it ends up in a log line several layers up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentTypeError {
    #[error("invalid content type: input is empty")]
    Empty,

    #[error("invalid content type {input:?}: does not contain '/'")]
    MissingSlash { input: String },

    #[error("invalid content type {input:?}: empty type")]
    EmptyType { input: String },

    #[error("invalid content type {input:?}: empty subtype")]
    EmptySubtype { input: String },

    /// `*/json` and friends. A wildcard type only pairs with a wildcard
    /// subtype.
    #[error("invalid content type {input:?}: wildcard type is legal only in '*/*'")]
    WildcardType { input: String },

    #[error("invalid content type {input:?}: illegal character {found:?} in {part}")]
    IllegalToken {
        input: String,
        part: &'static str,
        found: char,
    },

    #[error("invalid content type {input:?}: malformed parameter {parameter:?}")]
    MalformedParameter { input: String, parameter: String },
}

// NOTE
// Two enums rather than one: a content type can fail to parse long before
// any payload bytes are looked at (e.g. a `mimeType` schema property), and
// callers several crates up want to tell those apart from a short payload
// without string matching on the Display text.
