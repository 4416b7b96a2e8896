//! Dynamic JSON values for generically-captured subtrees.
//!
//! Map-shaped fields swallow an entire nested JSON object verbatim, whatever
//! its internal shape. The engine decodes such subtrees into [`Value`] rather
//! than through the branch mechanism. Numbers are kept as raw text
//! ([`Number`]) so arbitrary-precision content survives the round trip.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use lexical_parse_float::FromLexical as _;
use lexical_parse_integer::FromLexical as _;

/// A generically-decoded JSON object, keyed by field name.
pub type Map = BTreeMap<String, Value>;

/// Any JSON value, decoded without a static target shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// A number, kept textual
    Number(Number),
    /// A string
    String(String),
    /// An array
    Array(Vec<Value>),
    /// An object
    Object(Map),
}

impl Value {
    /// Look up a key if this value is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// The string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number, if this is a number.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }
}

/// A JSON number carried in textual form.
///
/// Conversion happens on demand, so values beyond `f64` range (or with more
/// digits than `f64` can hold) stay intact until the caller commits to a
/// concrete type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number(String);

impl Number {
    /// Wrap raw number text. The text is trusted to be valid JSON number syntax.
    pub fn from_text(text: impl Into<String>) -> Self {
        Number(text.into())
    }

    /// The raw textual representation.
    pub fn as_text(&self) -> &str {
        &self.0
    }

    /// Convert to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        f64::from_lexical(self.0.as_bytes()).ok()
    }

    /// Convert to `i64`, failing on fractional or out-of-range values.
    pub fn as_i64(&self) -> Option<i64> {
        i64::from_lexical(self.0.as_bytes()).ok()
    }

    /// Convert to `u64`, failing on negative, fractional or out-of-range values.
    pub fn as_u64(&self) -> Option<u64> {
        u64::from_lexical(self.0.as_bytes()).ok()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Number {
    fn from(text: &str) -> Self {
        Number(text.to_string())
    }
}
