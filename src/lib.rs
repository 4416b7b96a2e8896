//! JSON decoding for GraphQL query results.
//!
//! GraphQL responses are plain JSON, but the target structures that queries
//! are written against have features ordinary JSON decoding cannot express:
//! fragments (`... on Dog`) and embedded records flatten several Rust structs
//! onto a single JSON object, so one value may need to land in more than one
//! place. This crate decodes token by token, keeping one branch per
//! simultaneous target.
//!
//! Targets are registered with the [`graphql_record!`] macro, which builds a
//! static field table carrying the `graphql` naming metadata: aliases,
//! arguments, and fragment markers.
//!
//! ```
//! use graphql_json::graphql_record;
//!
//! graphql_record! {
//!     #[derive(Default, Debug, PartialEq)]
//!     struct Hero {
//!         name: String,
//!         friends: Vec<Friend>,
//!     }
//! }
//!
//! graphql_record! {
//!     #[derive(Default, Debug, PartialEq)]
//!     struct Friend {
//!         name: String,
//!     }
//! }
//!
//! let json = r#"{"name": "Ann", "friends": [{"name": "Bo"}]}"#;
//! let hero: Hero = graphql_json::from_str(json).unwrap();
//! assert_eq!(hero.name, "Ann");
//! assert_eq!(hero.friends, vec![Friend { name: "Bo".to_owned() }]);
//! ```

extern crate alloc;

mod decode;
mod error;
mod record;
mod scanner;
mod shape;
mod source;
mod value;

pub use error::{DecodeError, DecodeErrorKind};
pub use scanner::{ScanErrorKind, Span};
pub use shape::{FieldDescriptor, Optional, Record, ScalarSlot, Sequence, Slot, Target};
pub use value::{Map, Number, Value};

use crate::source::{Token, TokenSource};

/// Decode a JSON string into a fresh `T`.
///
/// # Example
///
/// ```
/// use graphql_json::graphql_record;
///
/// graphql_record! {
///     #[derive(Default, Debug, PartialEq)]
///     struct Viewer {
///         login: String,
///         "createdAt" created: String,
///     }
/// }
///
/// let json = r#"{"login": "gopher", "createdAt": "2018-02-01T00:00:00Z"}"#;
/// let viewer: Viewer = graphql_json::from_str(json).unwrap();
/// assert_eq!(viewer.login, "gopher");
/// assert_eq!(viewer.created, "2018-02-01T00:00:00Z");
/// ```
pub fn from_str<T>(input: &str) -> Result<T, DecodeError>
where
    T: Target + Default,
{
    from_slice(input.as_bytes())
}

/// Decode JSON bytes into a fresh `T`.
pub fn from_slice<T>(input: &[u8]) -> Result<T, DecodeError>
where
    T: Target + Default,
{
    let mut target = T::default();
    from_slice_into(input, &mut target)?;
    Ok(target)
}

/// Decode a JSON string into an existing target.
///
/// Scalars and records are overwritten field by field; sequences are cleared
/// before elements arrive, so decoding twice into the same target leaves the
/// same result as decoding into a fresh one.
pub fn from_str_into<T>(input: &str, target: &mut T) -> Result<(), DecodeError>
where
    T: Target,
{
    from_slice_into(input.as_bytes(), target)
}

/// Decode JSON bytes into an existing target.
///
/// On error the target may be partially written and should not be trusted.
pub fn from_slice_into<T>(input: &[u8], target: &mut T) -> Result<(), DecodeError>
where
    T: Target,
{
    let mut source = TokenSource::new(input);
    let mut decoder = decode::Decoder::new(&mut source);
    decoder.decode(target)?;

    // The root value is done; anything but end of input is an error.
    let sp = source.next()?;
    match sp.token {
        Token::Eof => Ok(()),
        other => Err(DecodeError::new(
            DecodeErrorKind::TrailingData {
                got: other.describe().to_string(),
            },
            sp.span,
        )),
    }
}
