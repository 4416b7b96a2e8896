//! Error types for GraphQL JSON decoding.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Display};

use crate::scanner::{ScanErrorKind, Span};

/// Error type for GraphQL JSON decoding.
///
/// The first error encountered aborts the decode; the target may be left
/// partially mutated and should be discarded or rebuilt by the caller.
#[derive(Debug)]
pub struct DecodeError {
    /// The specific kind of error
    pub kind: DecodeErrorKind,
    /// Source span where the error occurred
    pub span: Option<Span>,
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for DecodeError {}

impl DecodeError {
    /// Create a new error with span information
    pub const fn new(kind: DecodeErrorKind, span: Span) -> Self {
        DecodeError {
            kind,
            span: Some(span),
        }
    }

    /// Create an error without span information
    pub const fn without_span(kind: DecodeErrorKind) -> Self {
        DecodeError { kind, span: None }
    }
}

/// Specific error kinds for GraphQL JSON decoding
#[derive(Debug)]
pub enum DecodeErrorKind {
    /// Malformed input reported by the scanner
    Scan(ScanErrorKind),
    /// Unexpected token
    UnexpectedToken {
        /// The token that was found
        got: String,
        /// What was expected instead
        expected: &'static str,
    },
    /// Unexpected end of input
    UnexpectedEof {
        /// What was expected before EOF
        expected: &'static str,
    },
    /// An object key position held something other than a string
    ExpectedObjectKey {
        /// The token that was found instead
        got: String,
    },
    /// A key matched no field, fragment, or embedded target in any branch
    UnknownField {
        /// The unknown field name
        field: String,
        /// Field names visible across the active branches
        expected: Vec<&'static str>,
        /// Suggested field name (if similar to an expected field)
        suggestion: Option<&'static str>,
    },
    /// An array element arrived but no branch had a sequence to grow
    NoSequenceTarget {
        /// How many branches were live at that point
        branches: usize,
    },
    /// A closing delimiter did not match the open container
    MismatchedDelimiter {
        /// The delimiter that was found
        got: char,
        /// The delimiter that would have matched
        expected: &'static str,
    },
    /// Token cannot be coerced into the target slot
    TypeMismatch {
        /// The expected type
        expected: &'static str,
        /// The actual token kind found
        got: &'static str,
    },
    /// Number out of range for the target type
    NumberOutOfRange {
        /// The numeric text that was out of range
        value: String,
        /// The target type that couldn't hold the value
        target_type: &'static str,
    },
    /// Input continued after the top-level value was fully decoded
    TrailingData {
        /// The token found after the top-level value
        got: String,
    },
}

impl Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::Scan(e) => match e {
                ScanErrorKind::UnexpectedChar(c) => write!(f, "unexpected character '{c}'"),
                ScanErrorKind::UnexpectedEof(ctx) => write!(f, "unexpected end of input {ctx}"),
                ScanErrorKind::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
            },
            DecodeErrorKind::UnexpectedToken { got, expected } => {
                write!(f, "unexpected token: got {got}, expected {expected}")
            }
            DecodeErrorKind::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            DecodeErrorKind::ExpectedObjectKey { got } => {
                write!(f, "expected object key, got {got}")
            }
            DecodeErrorKind::UnknownField {
                field,
                expected,
                suggestion,
            } => {
                write!(
                    f,
                    "unknown field `{field}`, expected one of: {expected:?}"
                )?;
                if let Some(suggested) = suggestion {
                    write!(f, " (did you mean `{suggested}`?)")?;
                }
                Ok(())
            }
            DecodeErrorKind::NoSequenceTarget { branches } => {
                write!(
                    f,
                    "sequence doesn't exist in any of {branches} places to unmarshal"
                )
            }
            DecodeErrorKind::MismatchedDelimiter { got, expected } => {
                write!(f, "mismatched delimiter: got '{got}', expected {expected}")
            }
            DecodeErrorKind::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            DecodeErrorKind::NumberOutOfRange { value, target_type } => {
                write!(f, "number `{value}` out of range for {target_type}")
            }
            DecodeErrorKind::TrailingData { got } => {
                write!(f, "invalid token {got} after top-level value")
            }
        }
    }
}

impl DecodeErrorKind {
    /// Get an error code for this kind of error.
    pub const fn code(&self) -> &'static str {
        match self {
            DecodeErrorKind::Scan(_) => "graphql::scan",
            DecodeErrorKind::UnexpectedToken { .. } => "graphql::unexpected_token",
            DecodeErrorKind::UnexpectedEof { .. } => "graphql::unexpected_eof",
            DecodeErrorKind::ExpectedObjectKey { .. } => "graphql::expected_object_key",
            DecodeErrorKind::UnknownField { .. } => "graphql::unknown_field",
            DecodeErrorKind::NoSequenceTarget { .. } => "graphql::no_sequence_target",
            DecodeErrorKind::MismatchedDelimiter { .. } => "graphql::mismatched_delimiter",
            DecodeErrorKind::TypeMismatch { .. } => "graphql::type_mismatch",
            DecodeErrorKind::NumberOutOfRange { .. } => "graphql::number_out_of_range",
            DecodeErrorKind::TrailingData { .. } => "graphql::trailing_data",
        }
    }

    /// Get a label describing where/what the error points to.
    pub fn label(&self) -> String {
        match self {
            DecodeErrorKind::Scan(e) => match e {
                ScanErrorKind::UnexpectedChar(c) => format!("unexpected '{c}'"),
                ScanErrorKind::UnexpectedEof(ctx) => format!("unexpected end of input {ctx}"),
                ScanErrorKind::InvalidUtf8 => "invalid UTF-8 here".into(),
            },
            DecodeErrorKind::UnexpectedToken { got, expected } => {
                format!("expected {expected}, got {got}")
            }
            DecodeErrorKind::UnexpectedEof { expected } => format!("expected {expected}"),
            DecodeErrorKind::ExpectedObjectKey { got } => {
                format!("expected object key, got {got}")
            }
            DecodeErrorKind::UnknownField {
                field, suggestion, ..
            } => {
                if let Some(suggested) = suggestion {
                    format!("unknown field '{field}' - did you mean '{suggested}'?")
                } else {
                    format!("unknown field '{field}'")
                }
            }
            DecodeErrorKind::NoSequenceTarget { .. } => "no sequence to unmarshal into".into(),
            DecodeErrorKind::MismatchedDelimiter { got, expected } => {
                format!("got '{got}', expected {expected}")
            }
            DecodeErrorKind::TypeMismatch { expected, got } => {
                format!("expected {expected}, got {got}")
            }
            DecodeErrorKind::NumberOutOfRange { target_type, .. } => {
                format!("out of range for {target_type}")
            }
            DecodeErrorKind::TrailingData { got } => {
                format!("trailing {got}")
            }
        }
    }
}

impl From<crate::scanner::ScanError> for DecodeError {
    fn from(err: crate::scanner::ScanError) -> Self {
        DecodeError {
            kind: DecodeErrorKind::Scan(err.kind),
            span: Some(err.span),
        }
    }
}

/// Threshold for "did you mean" suggestions on unknown fields.
const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Pick the closest candidate name for an unknown field, if any is close enough.
pub(crate) fn suggest_field(
    unknown: &str,
    candidates: &[&'static str],
) -> Option<&'static str> {
    let mut best: Option<(&'static str, f64)> = None;
    for &known in candidates {
        let similarity = strsim::jaro_winkler(unknown, known);
        if similarity >= SIMILARITY_THRESHOLD
            && best.is_none_or(|(_, best_sim)| similarity > best_sim)
        {
            best = Some((known, similarity));
        }
    }
    best.map(|(name, _)| name)
}
