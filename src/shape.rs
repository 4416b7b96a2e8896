//! Static shape metadata for decode targets.
//!
//! Instead of runtime reflection, every decodable type exposes its shape
//! through the [`Target`] trait: a [`Slot`] says whether a location is a
//! scalar, a record with named fields, a growable sequence, a generic map,
//! or an optional wrapper. Records carry a static [`FieldDescriptor`] table
//! built once at registration time (see the `graphql_record!` macro), which
//! is where field names, `graphql` tags, and fragment/embedded flags live.
//!
//! Slots borrow mutably into the target, so a slot is only ever produced
//! transiently while the engine deposits a single value.

use alloc::string::String;
use alloc::vec::Vec;

use crate::value::Map;

/// A type that JSON can be decoded into.
///
/// Implemented for scalars, `String`, `Vec<T>`, `Option<T>`, [`Map`], and for
/// every record registered through `graphql_record!`.
pub trait Target {
    /// Expose this value's shape for the decode engine.
    fn slot(&mut self) -> Slot<'_>;
}

/// The shape category of a single location in the target structure.
pub enum Slot<'a> {
    /// A leaf value
    Scalar(ScalarSlot<'a>),
    /// A composite with named fields
    Record(&'a mut dyn Record),
    /// An ordered, appendable sequence
    Sequence(&'a mut dyn Sequence),
    /// A generic string-to-value map; captures whole subtrees verbatim
    Map(&'a mut Map),
    /// An optional wrapper around any of the above
    Optional(&'a mut dyn Optional),
}

impl Slot<'_> {
    /// Short category/type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Slot::Scalar(s) => s.type_name(),
            Slot::Record(_) => "record",
            Slot::Sequence(_) => "sequence",
            Slot::Map(_) => "map",
            Slot::Optional(_) => "optional",
        }
    }
}

/// A mutable reference to a scalar leaf.
pub enum ScalarSlot<'a> {
    /// `bool`
    Bool(&'a mut bool),
    /// `i8`
    I8(&'a mut i8),
    /// `i16`
    I16(&'a mut i16),
    /// `i32`
    I32(&'a mut i32),
    /// `i64`
    I64(&'a mut i64),
    /// `i128`
    I128(&'a mut i128),
    /// `u8`
    U8(&'a mut u8),
    /// `u16`
    U16(&'a mut u16),
    /// `u32`
    U32(&'a mut u32),
    /// `u64`
    U64(&'a mut u64),
    /// `u128`
    U128(&'a mut u128),
    /// `f32`
    F32(&'a mut f32),
    /// `f64`
    F64(&'a mut f64),
    /// `String`
    String(&'a mut String),
}

impl ScalarSlot<'_> {
    /// The Rust type name behind this slot.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarSlot::Bool(_) => "bool",
            ScalarSlot::I8(_) => "i8",
            ScalarSlot::I16(_) => "i16",
            ScalarSlot::I32(_) => "i32",
            ScalarSlot::I64(_) => "i64",
            ScalarSlot::I128(_) => "i128",
            ScalarSlot::U8(_) => "u8",
            ScalarSlot::U16(_) => "u16",
            ScalarSlot::U32(_) => "u32",
            ScalarSlot::U64(_) => "u64",
            ScalarSlot::U128(_) => "u128",
            ScalarSlot::F32(_) => "f32",
            ScalarSlot::F64(_) => "f64",
            ScalarSlot::String(_) => "String",
        }
    }
}

/// A composite value with named fields.
pub trait Record {
    /// The static field table, in declaration order.
    fn fields(&self) -> &'static [FieldDescriptor];
    /// Borrow the field at `index` (an index into [`Record::fields`]).
    fn slot_at(&mut self, index: usize) -> Slot<'_>;
}

/// An ordered, appendable sequence (e.g. `Vec<T>`).
pub trait Sequence {
    /// Drop all elements. Called at every array start so re-decoding into a
    /// reused target never appends to stale contents.
    fn clear(&mut self);
    /// Append one zero-valued element, returning its index.
    fn push_default(&mut self) -> usize;
    /// Borrow the element at `index`.
    fn slot_at(&mut self, index: usize) -> Option<Slot<'_>>;
}

/// An optional wrapper (e.g. `Option<T>`).
pub trait Optional {
    /// Whether a value is present.
    fn is_set(&self) -> bool;
    /// Install the zero value if unset.
    fn set_default(&mut self);
    /// Remove the value (JSON `null`).
    fn clear(&mut self);
    /// Borrow the inner value, if present.
    fn inner(&mut self) -> Option<Slot<'_>>;
}

/// Static description of one record field.
///
/// The `tag` is the `graphql` naming metadata: `name[(args)][: alias]`, or
/// `...` to mark a fragment. Arguments and alias are recognized and stripped
/// during matching but otherwise unused here.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// The declared Rust identifier.
    pub name: &'static str,
    /// The declared `graphql` tag, if any.
    pub tag: Option<&'static str>,
    /// Whether the field is embedded (its fields flatten into the parent).
    pub embedded: bool,
}

impl FieldDescriptor {
    /// Create a descriptor. Used by the `graphql_record!` expansion.
    pub const fn new(name: &'static str, tag: Option<&'static str>, embedded: bool) -> Self {
        FieldDescriptor {
            name,
            tag,
            embedded,
        }
    }

    /// Whether this field is a GraphQL fragment (`...` tag). Fragments have
    /// no key of their own in the JSON.
    pub fn is_fragment(&self) -> bool {
        self.tag.is_some_and(|tag| tag.trim().starts_with("..."))
    }

    /// Whether a JSON object key resolves to this field.
    ///
    /// Tagged fields compare the tag-derived name case-sensitively; untagged
    /// fields compare the declared identifier case-insensitively.
    pub fn matches(&self, key: &str) -> bool {
        match self.key_name() {
            Some(name) => name == key,
            None => match self.tag {
                // A fragment never matches a key.
                Some(_) => false,
                None => self.name.eq_ignore_ascii_case(key),
            },
        }
    }

    /// The JSON key this field answers to, when derived from a tag.
    ///
    /// `None` for untagged fields (ident match applies) and for fragments
    /// (no key at all).
    pub fn key_name(&self) -> Option<&'static str> {
        let tag = self.tag?;
        let tag = tag.trim();
        if tag.starts_with("...") {
            return None;
        }
        let mut name = tag;
        if let Some(i) = name.find('(') {
            name = &name[..i];
        }
        if let Some(i) = name.find(':') {
            name = &name[..i];
        }
        Some(name.trim())
    }

    /// The name to advertise in "unknown field" diagnostics, if this field
    /// is addressable by key at all.
    pub fn visible_name(&self) -> Option<&'static str> {
        if self.is_fragment() {
            return None;
        }
        Some(self.key_name().unwrap_or(self.name))
    }
}

// =============================================================================
// Target impls for std types
// =============================================================================

macro_rules! impl_scalar_target {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Target for $ty {
                fn slot(&mut self) -> Slot<'_> {
                    Slot::Scalar(ScalarSlot::$variant(self))
                }
            }
        )*
    };
}

impl_scalar_target! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    f32 => F32,
    f64 => F64,
    String => String,
}

impl<T: Target + Default> Target for Vec<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Sequence(self)
    }
}

impl<T: Target + Default> Sequence for Vec<T> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push_default(&mut self) -> usize {
        self.push(T::default());
        self.len() - 1
    }

    fn slot_at(&mut self, index: usize) -> Option<Slot<'_>> {
        self.get_mut(index).map(Target::slot)
    }
}

impl<T: Target + Default> Target for Option<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Optional(self)
    }
}

impl<T: Target + Default> Optional for Option<T> {
    fn is_set(&self) -> bool {
        self.is_some()
    }

    fn set_default(&mut self) {
        if self.is_none() {
            *self = Some(T::default());
        }
    }

    fn clear(&mut self) {
        *self = None;
    }

    fn inner(&mut self) -> Option<Slot<'_>> {
        self.as_mut().map(Target::slot)
    }
}

impl Target for Map {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Map(self)
    }
}
