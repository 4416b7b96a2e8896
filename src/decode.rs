//! The multi-branch decode engine.
//!
//! GraphQL responses are decoded into several places at once: fragments and
//! embedded records mean a single JSON object can populate more than one
//! target record simultaneously. The engine keeps one *branch* per target, and
//! each branch is a stack of cursors mirroring the JSON nesting. Every value
//! token is written through the top cursor of every branch that still resolves
//! to a live location, then all tops are popped together.
//!
//! Cursors are plain paths from the decode root, re-walked on each access, so
//! several branches can address overlapping parts of the target without
//! holding aliasing borrows.

use alloc::collections::VecDeque;
use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;

use log::trace;

use crate::error::{DecodeError, DecodeErrorKind, suggest_field};
use crate::scanner::{NumberHint, Span};
use crate::shape::{ScalarSlot, Slot, Target};
use crate::source::{SpannedToken, Token, TokenSource};
use crate::value::{Map, Value};

/// One step of a cursor path from the decode root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Record field, by index into the field table
    Field(usize),
    /// Sequence element, by position
    Elem(usize),
    /// Through an optional wrapper into its value
    Inner,
}

/// An addressable location in the target, or a hole.
///
/// A branch whose current record has nothing to say about a key still pushes
/// `Invalid`, so the uniform pop at the end of every value keeps all branch
/// stacks in lockstep.
#[derive(Debug, Clone, PartialEq)]
enum Cursor {
    Path(Vec<Step>),
    Invalid,
}

/// One decoding branch: a stack of cursors, the top being where the next
/// value lands.
type Branch = Vec<Cursor>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delim {
    Object,
    Array,
}

/// Walk `path` from the root.
///
/// Returns `None` when the path no longer resolves, e.g. an optional that a
/// later `null` cleared. Writes through dead paths are silently skipped.
fn navigate<'a>(root: &'a mut dyn Target, path: &[Step]) -> Option<Slot<'a>> {
    let mut slot = root.slot();
    for &step in path {
        slot = match (slot, step) {
            (Slot::Record(record), Step::Field(index)) => record.slot_at(index),
            (Slot::Sequence(sequence), Step::Elem(index)) => sequence.slot_at(index)?,
            (Slot::Optional(optional), Step::Inner) => optional.inner()?,
            _ => return None,
        };
    }
    Some(slot)
}

/// Walk `path`, then dereference through set optional wrappers, appending the
/// extra steps to `path` so it remains the effective address of the result.
/// An unset optional stops the walk.
fn navigate_deref<'a>(root: &'a mut dyn Target, path: &mut Vec<Step>) -> Option<Slot<'a>> {
    let mut slot = navigate(root, path)?;
    loop {
        match slot {
            Slot::Optional(optional) => {
                slot = optional.inner()?;
                path.push(Step::Inner);
            }
            other => return Some(other),
        }
    }
}

/// Drives one decode: pulls tokens from the source and routes every value
/// into all live branches.
pub(crate) struct Decoder<'s, 'de> {
    source: &'s mut TokenSource<'de>,
    /// Open containers, outermost first. Mirrors the JSON nesting.
    parse_state: Vec<Delim>,
    branches: Vec<Branch>,
}

impl<'s, 'de> Decoder<'s, 'de> {
    pub(crate) fn new(source: &'s mut TokenSource<'de>) -> Self {
        Decoder {
            source,
            parse_state: Vec::new(),
            branches: vec![vec![Cursor::Path(Vec::new())]],
        }
    }

    /// Decode one complete JSON value into `root`.
    ///
    /// Finishes when every branch stack has emptied, which happens exactly
    /// when the root value closes.
    pub(crate) fn decode(&mut self, root: &mut dyn Target) -> Result<(), DecodeError> {
        while !self.branches.is_empty() {
            let sp = self.source.next()?;

            if self.at_object_key(&sp.token) {
                let key = match sp.token {
                    Token::String(key) => key,
                    other => {
                        return Err(DecodeError::new(
                            DecodeErrorKind::ExpectedObjectKey {
                                got: other.describe().to_string(),
                            },
                            sp.span,
                        ));
                    }
                };
                if self.resolve_key(root, &key, sp.span)? {
                    // A map field captured the whole value.
                    continue;
                }
                let value = self.source.next()?;
                self.dispatch_value(root, value)?;
            } else {
                if self.at_array_element(&sp.token) {
                    self.grow_sequences(root, sp.span)?;
                }
                self.dispatch_value(root, sp)?;
            }
        }
        Ok(())
    }

    fn dispatch_value(
        &mut self,
        root: &mut dyn Target,
        sp: SpannedToken<'de>,
    ) -> Result<(), DecodeError> {
        match &sp.token {
            Token::ObjectBegin => {
                self.parse_state.push(Delim::Object);
                self.enter_object(root);
                Ok(())
            }
            Token::ArrayBegin => {
                self.reset_sequences(root);
                self.parse_state.push(Delim::Array);
                Ok(())
            }
            Token::ObjectEnd => self.close(Delim::Object, '}', sp.span),
            Token::ArrayEnd => self.close(Delim::Array, ']', sp.span),
            Token::Eof => Err(DecodeError::new(
                DecodeErrorKind::UnexpectedEof { expected: "value" },
                sp.span,
            )),
            _scalar => {
                self.write_scalar(root, &sp)?;
                self.pop_all();
                Ok(())
            }
        }
    }

    /// Resolve an object key against the top record of every branch.
    ///
    /// Each branch pushes a cursor: the matched field's path, or `Invalid`
    /// when the key means nothing to that branch. Errors if no branch at all
    /// recognizes the key. Returns `true` when a map-shaped field captured
    /// the value generically (nothing was pushed in that case).
    fn resolve_key(
        &mut self,
        root: &mut dyn Target,
        key: &str,
        span: Span,
    ) -> Result<bool, DecodeError> {
        // Per branch: effective path to the record, field index, map-shaped?
        let mut resolutions: Vec<Option<(Vec<Step>, usize, bool)>> =
            Vec::with_capacity(self.branches.len());
        let mut any_match = false;
        let mut any_map = false;

        for branch in &self.branches {
            let resolution = match branch.last() {
                Some(Cursor::Path(path)) => {
                    let mut effective = path.clone();
                    match navigate_deref(root, &mut effective) {
                        Some(Slot::Record(record)) => record
                            .fields()
                            .iter()
                            .position(|field| field.matches(key))
                            .map(|index| {
                                let is_map = matches!(record.slot_at(index), Slot::Map(_));
                                (effective, index, is_map)
                            }),
                        _ => None,
                    }
                }
                _ => None,
            };
            if let Some((_, _, is_map)) = &resolution {
                any_match = true;
                any_map |= *is_map;
            }
            resolutions.push(resolution);
        }

        if !any_match {
            return Err(self.unknown_field(root, key, span));
        }

        if any_map {
            // Map fields swallow the whole subtree generically, bypassing the
            // branch mechanism. No cursors are pushed, so pops stay balanced.
            let captured = self.source.read_value()?;
            trace!("key `{key}` captured generically");
            self.assign_map_matches(root, &resolutions, captured, span)?;
            return Ok(true);
        }

        for (branch, resolution) in self.branches.iter_mut().zip(resolutions) {
            let cursor = match resolution {
                Some((mut path, index, _)) => {
                    path.push(Step::Field(index));
                    Cursor::Path(path)
                }
                None => Cursor::Invalid,
            };
            branch.push(cursor);
        }
        Ok(false)
    }

    fn unknown_field(&self, root: &mut dyn Target, key: &str, span: Span) -> DecodeError {
        let mut candidates: Vec<&'static str> = Vec::new();
        for branch in &self.branches {
            if let Some(Cursor::Path(path)) = branch.last() {
                let mut effective = path.clone();
                if let Some(Slot::Record(record)) = navigate_deref(root, &mut effective) {
                    for field in record.fields() {
                        if let Some(name) = field.visible_name() {
                            if !candidates.contains(&name) {
                                candidates.push(name);
                            }
                        }
                    }
                }
            }
        }
        let suggestion = suggest_field(key, &candidates);
        DecodeError::new(
            DecodeErrorKind::UnknownField {
                field: key.to_string(),
                expected: candidates,
                suggestion,
            },
            span,
        )
    }

    /// Replace every map-shaped match with the captured object.
    fn assign_map_matches(
        &self,
        root: &mut dyn Target,
        resolutions: &[Option<(Vec<Step>, usize, bool)>],
        captured: Value,
        span: Span,
    ) -> Result<(), DecodeError> {
        let entries = match captured {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(DecodeError::new(
                    DecodeErrorKind::TypeMismatch {
                        expected: "map",
                        got: value_kind(&other),
                    },
                    span,
                ));
            }
        };
        for resolution in resolutions.iter().flatten() {
            let (path, index, is_map) = resolution;
            if !*is_map {
                continue;
            }
            if let Some(Slot::Record(record)) = navigate(root, path) {
                if let Slot::Map(slot) = record.slot_at(*index) {
                    *slot = entries.clone();
                }
            }
        }
        Ok(())
    }

    /// An array element is coming up: append a default element to every
    /// branch whose top is a sequence, and push its cursor. Branches without
    /// a sequence there push `Invalid`.
    fn grow_sequences(&mut self, root: &mut dyn Target, span: Span) -> Result<(), DecodeError> {
        let mut any_sequence = false;
        for branch in &mut self.branches {
            let cursor = match branch.last() {
                Some(Cursor::Path(path)) => {
                    let mut effective = path.clone();
                    match navigate_deref(root, &mut effective) {
                        Some(Slot::Sequence(sequence)) => {
                            let index = sequence.push_default();
                            effective.push(Step::Elem(index));
                            any_sequence = true;
                            Cursor::Path(effective)
                        }
                        _ => Cursor::Invalid,
                    }
                }
                _ => Cursor::Invalid,
            };
            branch.push(cursor);
        }
        if any_sequence {
            Ok(())
        } else {
            Err(DecodeError::new(
                DecodeErrorKind::NoSequenceTarget {
                    branches: self.branches.len(),
                },
                span,
            ))
        }
    }

    /// An object just opened at the current branch tops.
    ///
    /// Unset optionals at the tops get a default value installed, then
    /// fragment and embedded fields reachable from the tops each become a new
    /// branch decoding this same object. Discovery is breadth-first, so
    /// fragments nested inside fragments or embedded records are found too.
    fn enter_object(&mut self, root: &mut dyn Target) {
        for branch in &self.branches {
            if let Some(Cursor::Path(path)) = branch.last() {
                if let Some(Slot::Optional(optional)) = navigate(root, path) {
                    optional.set_default();
                }
            }
        }

        let mut frontier: VecDeque<Vec<Step>> = self
            .branches
            .iter()
            .filter_map(|branch| match branch.last() {
                Some(Cursor::Path(path)) => Some(path.clone()),
                _ => None,
            })
            .collect();
        while let Some(mut path) = frontier.pop_front() {
            let Some(Slot::Record(record)) = navigate_deref(root, &mut path) else {
                continue;
            };
            for (index, field) in record.fields().iter().enumerate() {
                if field.is_fragment() || field.embedded {
                    let mut child = path.clone();
                    child.push(Step::Field(index));
                    trace!("new branch for `{}`", field.name);
                    self.branches.push(vec![Cursor::Path(child.clone())]);
                    frontier.push_back(child);
                }
            }
        }
    }

    /// Clear every sequence at the branch tops so re-decoding into a reused
    /// target replaces elements instead of appending to stale contents.
    fn reset_sequences(&self, root: &mut dyn Target) {
        for branch in &self.branches {
            if let Some(Cursor::Path(path)) = branch.last() {
                let mut effective = path.clone();
                if let Some(Slot::Sequence(sequence)) = navigate_deref(root, &mut effective) {
                    sequence.clear();
                }
            }
        }
    }

    /// Write one scalar token through the top cursor of every live branch.
    fn write_scalar(
        &self,
        root: &mut dyn Target,
        sp: &SpannedToken<'de>,
    ) -> Result<(), DecodeError> {
        for branch in &self.branches {
            let Some(Cursor::Path(path)) = branch.last() else {
                continue;
            };
            let Some(slot) = navigate(root, path) else {
                continue;
            };
            coerce(&sp.token, slot, sp.span)?;
        }
        Ok(())
    }

    fn close(&mut self, kind: Delim, got: char, span: Span) -> Result<(), DecodeError> {
        match self.parse_state.last() {
            Some(&open) if open == kind => {
                self.parse_state.pop();
                self.pop_all();
                Ok(())
            }
            Some(Delim::Object) => Err(DecodeError::new(
                DecodeErrorKind::MismatchedDelimiter {
                    got,
                    expected: "'}'",
                },
                span,
            )),
            Some(Delim::Array) => Err(DecodeError::new(
                DecodeErrorKind::MismatchedDelimiter {
                    got,
                    expected: "']'",
                },
                span,
            )),
            None => Err(DecodeError::new(
                DecodeErrorKind::MismatchedDelimiter {
                    got,
                    expected: "end of input",
                },
                span,
            )),
        }
    }

    /// Pop the top cursor from every branch; branches that empty are done.
    fn pop_all(&mut self) {
        for branch in &mut self.branches {
            branch.pop();
        }
        self.branches.retain(|branch| !branch.is_empty());
    }

    fn at_object_key(&self, token: &Token<'de>) -> bool {
        self.parse_state.last() == Some(&Delim::Object) && !matches!(token, Token::ObjectEnd)
    }

    fn at_array_element(&self, token: &Token<'de>) -> bool {
        self.parse_state.last() == Some(&Delim::Array) && !matches!(token, Token::ArrayEnd)
    }
}

/// Deposit one scalar token into a slot, coercing by target shape.
fn coerce(token: &Token<'_>, slot: Slot<'_>, span: Span) -> Result<(), DecodeError> {
    match slot {
        Slot::Scalar(scalar) => coerce_scalar(token, scalar, span),
        Slot::Optional(optional) => match token {
            Token::Null => {
                optional.clear();
                Ok(())
            }
            _ => {
                optional.set_default();
                match optional.inner() {
                    Some(inner) => coerce(token, inner, span),
                    None => Ok(()),
                }
            }
        },
        Slot::Sequence(sequence) => match token {
            Token::Null => {
                sequence.clear();
                Ok(())
            }
            other => Err(mismatch("sequence", other, span)),
        },
        Slot::Map(map) => match token {
            Token::Null => {
                map.clear();
                Ok(())
            }
            other => Err(mismatch("map", other, span)),
        },
        Slot::Record(_) => match token {
            // `null` for an object-shaped field leaves the record zeroed.
            Token::Null => Ok(()),
            other => Err(mismatch("record", other, span)),
        },
    }
}

fn coerce_scalar(token: &Token<'_>, scalar: ScalarSlot<'_>, span: Span) -> Result<(), DecodeError> {
    match scalar {
        ScalarSlot::Bool(slot) => match token {
            Token::Bool(b) => {
                *slot = *b;
                Ok(())
            }
            Token::Null => {
                *slot = false;
                Ok(())
            }
            other => Err(mismatch("bool", other, span)),
        },
        ScalarSlot::String(slot) => match token {
            Token::String(s) => {
                *slot = s.as_ref().to_owned();
                Ok(())
            }
            Token::Null => {
                slot.clear();
                Ok(())
            }
            other => Err(mismatch("String", other, span)),
        },
        ScalarSlot::I8(slot) => write_int(slot, token, "i8", span),
        ScalarSlot::I16(slot) => write_int(slot, token, "i16", span),
        ScalarSlot::I32(slot) => write_int(slot, token, "i32", span),
        ScalarSlot::I64(slot) => write_int(slot, token, "i64", span),
        ScalarSlot::I128(slot) => write_int(slot, token, "i128", span),
        ScalarSlot::U8(slot) => write_int(slot, token, "u8", span),
        ScalarSlot::U16(slot) => write_int(slot, token, "u16", span),
        ScalarSlot::U32(slot) => write_int(slot, token, "u32", span),
        ScalarSlot::U64(slot) => write_int(slot, token, "u64", span),
        ScalarSlot::U128(slot) => write_int(slot, token, "u128", span),
        ScalarSlot::F32(slot) => write_float(slot, token, "f32", span),
        ScalarSlot::F64(slot) => write_float(slot, token, "f64", span),
    }
}

fn write_int<T>(
    slot: &mut T,
    token: &Token<'_>,
    name: &'static str,
    span: Span,
) -> Result<(), DecodeError>
where
    T: lexical_parse_integer::FromLexical + Default,
{
    match token {
        Token::Number(number) => {
            if number.hint == NumberHint::Float {
                return Err(DecodeError::new(
                    DecodeErrorKind::TypeMismatch {
                        expected: name,
                        got: "floating-point number",
                    },
                    span,
                ));
            }
            *slot = T::from_lexical(number.text.as_bytes()).map_err(|_| {
                DecodeError::new(
                    DecodeErrorKind::NumberOutOfRange {
                        value: number.text.to_string(),
                        target_type: name,
                    },
                    span,
                )
            })?;
            Ok(())
        }
        Token::Null => {
            *slot = T::default();
            Ok(())
        }
        other => Err(mismatch(name, other, span)),
    }
}

fn write_float<T>(
    slot: &mut T,
    token: &Token<'_>,
    name: &'static str,
    span: Span,
) -> Result<(), DecodeError>
where
    T: lexical_parse_float::FromLexical + Default,
{
    match token {
        Token::Number(number) => {
            *slot = T::from_lexical(number.text.as_bytes()).map_err(|_| {
                DecodeError::new(
                    DecodeErrorKind::NumberOutOfRange {
                        value: number.text.to_string(),
                        target_type: name,
                    },
                    span,
                )
            })?;
            Ok(())
        }
        Token::Null => {
            *slot = T::default();
            Ok(())
        }
        other => Err(mismatch(name, other, span)),
    }
}

fn mismatch(expected: &'static str, got: &Token<'_>, span: Span) -> DecodeError {
    DecodeError::new(
        DecodeErrorKind::TypeMismatch {
            expected,
            got: got.describe(),
        },
        span,
    )
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
