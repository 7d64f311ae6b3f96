use std::fmt;
use std::str::FromStr;

use crate::error::ContentTypeError;

/// The wildcard token used for "any type" / "any subtype".
pub const WILDCARD: &str = "*";

/// A parsed content type: `type/subtype;name=value;...`.
///
/// Type and subtype are stored lower-cased, so `Application/VND.Orders.*+AVRO`
/// and `application/vnd.orders.*+avro` compare equal. Parameter names are
/// lower-cased too; parameter values keep their case, with surrounding
/// quotes removed.
///
/// ```text
///   application/vnd.orders.v3+avro;charset=utf-8
///   └────┬────┘ └───────┬───────┘ └─────┬─────┘
///      type          subtype        parameters
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentType {
    type_name: String,
    subtype: String,
    parameters: Vec<(String, String)>,
}

impl ContentType {
    /// Build a content type from already-valid parts.
    ///
    /// No validation happens here; use [`parse`](Self::parse) for
    /// untrusted input.
    #[must_use]
    pub fn new(type_name: &str, subtype: &str) -> Self {
        Self {
            type_name: type_name.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            parameters: Vec::new(),
        }
    }

    /// Return a copy with an extra parameter appended.
    #[must_use]
    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.parameters
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// Parse a content type string.
    ///
    /// A lone `*` is accepted as shorthand for `*/*`. Parameter values may
    /// be quoted; a `;` inside quotes does not end the parameter.
    ///
    /// # Errors
    ///
    /// Returns a [`ContentTypeError`] describing the first problem found:
    /// empty input, missing `/`, empty type or subtype, a wildcard type with
    /// a concrete subtype, a character that is not a legal token character,
    /// or a parameter without `=`.
    pub fn parse(input: &str) -> Result<Self, ContentTypeError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ContentTypeError::Empty);
        }

        let segments = split_parameters(trimmed);
        let mut full_type = segments[0].trim();
        if full_type == WILDCARD {
            full_type = "*/*";
        }

        let Some(slash) = full_type.find('/') else {
            return Err(ContentTypeError::MissingSlash {
                input: input.to_string(),
            });
        };
        let type_name = &full_type[..slash];
        let subtype = &full_type[slash + 1..];

        if type_name.is_empty() {
            return Err(ContentTypeError::EmptyType {
                input: input.to_string(),
            });
        }
        if subtype.is_empty() {
            return Err(ContentTypeError::EmptySubtype {
                input: input.to_string(),
            });
        }
        if type_name == WILDCARD && subtype != WILDCARD {
            return Err(ContentTypeError::WildcardType {
                input: input.to_string(),
            });
        }
        check_token(input, "type", type_name)?;
        check_token(input, "subtype", subtype)?;

        let mut parameters = Vec::new();
        for segment in &segments[1..] {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let malformed = || ContentTypeError::MalformedParameter {
                input: input.to_string(),
                parameter: segment.to_string(),
            };
            let (name, value) = segment.split_once('=').ok_or_else(malformed)?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() {
                return Err(malformed());
            }
            check_token(input, "parameter name", name)?;

            let value = if is_quoted(value) {
                &value[1..value.len() - 1]
            } else {
                check_token(input, "parameter value", value)?;
                value
            };
            parameters.push((name.to_ascii_lowercase(), value.to_string()));
        }

        Ok(Self {
            type_name: type_name.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            parameters,
        })
    }

    /// The primary type, e.g. `application`.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The subtype, e.g. `vnd.orders.*+avro`.
    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// The structured-syntax suffix after the last `+`, if any.
    #[must_use]
    pub fn subtype_suffix(&self) -> Option<&str> {
        self.subtype.rsplit_once('+').map(|(_, suffix)| suffix)
    }

    /// Look up a parameter by (case-insensitive) name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// `type/subtype` without parameters.
    #[must_use]
    pub fn essence(&self) -> String {
        format!("{}/{}", self.type_name, self.subtype)
    }

    #[must_use]
    pub fn is_wildcard_type(&self) -> bool {
        self.type_name == WILDCARD
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_name, self.subtype)?;
        for (name, value) in &self.parameters {
            if !value.is_empty() && value.chars().all(is_token_char) {
                write!(f, ";{name}={value}")?;
            } else {
                write!(f, ";{name}=\"{value}\"")?;
            }
        }
        Ok(())
    }
}

impl FromStr for ContentType {
    type Err = ContentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split on `;`, ignoring separators inside double quotes.
///
/// Always returns at least one segment (the type part).
fn split_parameters(input: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                segments.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&input[start..]);
    segments
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}

/// RFC 7230 `tchar`: visible ASCII minus the separator set.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn check_token(input: &str, part: &'static str, token: &str) -> Result<(), ContentTypeError> {
    match token.chars().find(|&c| !is_token_char(c)) {
        Some(found) => Err(ContentTypeError::IllegalToken {
            input: input.to_string(),
            part,
            found,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let ct = ContentType::parse("application/json").unwrap();
        assert_eq!(ct.type_name(), "application");
        assert_eq!(ct.subtype(), "json");
        assert!(ct.parameters().is_empty());
    }

    #[test]
    fn parse_lowercases_type_and_subtype() {
        let ct = ContentType::parse("Application/VND.Orders.*+AVRO").unwrap();
        assert_eq!(ct.essence(), "application/vnd.orders.*+avro");
    }

    #[test]
    fn parse_parameters_keep_value_case() {
        let ct = ContentType::parse("text/plain; Charset=UTF-8 ;format=\"a;b\"").unwrap();
        assert_eq!(ct.parameter("charset"), Some("UTF-8"));
        assert_eq!(ct.parameter("FORMAT"), Some("a;b"));
        assert_eq!(ct.parameters().len(), 2);
    }

    #[test]
    fn parse_lone_wildcard() {
        let ct = ContentType::parse("*").unwrap();
        assert_eq!(ct.essence(), "*/*");
        assert!(ct.is_wildcard_type());
    }

    #[test]
    fn subtype_suffix() {
        let ct = ContentType::parse("application/vnd.orders.v3+avro").unwrap();
        assert_eq!(ct.subtype_suffix(), Some("avro"));
        let plain = ContentType::parse("application/avro").unwrap();
        assert_eq!(plain.subtype_suffix(), None);
    }

    #[test]
    fn display_round_trips_through_parse() {
        let ct = ContentType::new("application", "vnd.orders.v3+avro")
            .with_parameter("note", "has space");
        let text = ct.to_string();
        assert_eq!(text, "application/vnd.orders.v3+avro;note=\"has space\"");
        assert_eq!(ContentType::parse(&text).unwrap(), ct);
    }

    #[test]
    fn reject_empty() {
        assert_eq!(ContentType::parse("   "), Err(ContentTypeError::Empty));
    }

    #[test]
    fn reject_missing_slash() {
        assert!(matches!(
            ContentType::parse("application"),
            Err(ContentTypeError::MissingSlash { .. })
        ));
    }

    #[test]
    fn reject_empty_parts() {
        assert!(matches!(
            ContentType::parse("/avro"),
            Err(ContentTypeError::EmptyType { .. })
        ));
        assert!(matches!(
            ContentType::parse("application/"),
            Err(ContentTypeError::EmptySubtype { .. })
        ));
    }

    #[test]
    fn reject_wildcard_type_with_concrete_subtype() {
        assert!(matches!(
            ContentType::parse("*/avro"),
            Err(ContentTypeError::WildcardType { .. })
        ));
    }

    #[test]
    fn reject_illegal_character() {
        let err = ContentType::parse("application/vnd orders").unwrap_err();
        assert_eq!(
            err,
            ContentTypeError::IllegalToken {
                input: "application/vnd orders".to_string(),
                part: "subtype",
                found: ' ',
            }
        );
    }

    #[test]
    fn reject_parameter_without_value() {
        assert!(matches!(
            ContentType::parse("application/avro;charset"),
            Err(ContentTypeError::MalformedParameter { .. })
        ));
    }

    #[test]
    fn from_str_matches_parse() {
        let ct: ContentType = "application/vnd.orders.*+avro".parse().unwrap();
        assert_eq!(ct, ContentType::new("application", "vnd.orders.*+avro"));
    }
}
