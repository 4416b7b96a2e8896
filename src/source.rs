//! The token source: a grammar layer over the scanner.
//!
//! [`TokenSource`] validates JSON structure (commas, colons, delimiter
//! nesting) and yields *value tokens only* - begin/end delimiters, strings,
//! textual numbers, booleans, nulls. Punctuation never escapes this layer,
//! so the decode engine sees the stream the way a GraphQL response reads:
//! keys, values, and container edges.
//!
//! It can also decode one entire value generically ([`TokenSource::read_value`]),
//! which the engine uses when a field captures a raw JSON subtree.

use alloc::borrow::Cow;
use alloc::string::ToString;
use alloc::vec::Vec;

use crate::error::{DecodeError, DecodeErrorKind};
use crate::scanner::{self, NumberHint, Scanner, Span, Token as ScanToken};
use crate::value::{Map, Number, Value};

/// A cooked value token: strings decoded, numbers still textual.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'de> {
    /// `{`
    ObjectBegin,
    /// `}`
    ObjectEnd,
    /// `[`
    ArrayBegin,
    /// `]`
    ArrayEnd,
    /// A string (escapes already processed)
    String(Cow<'de, str>),
    /// A number, carried as raw text until coercion
    Number(RawNumber<'de>),
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,
    /// End of input
    Eof,
}

/// Raw number text plus the scanner's format hint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawNumber<'de> {
    /// The number exactly as it appeared in the input
    pub text: &'de str,
    /// Unsigned / signed / float
    pub hint: NumberHint,
}

impl Token<'_> {
    /// Short description for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::ObjectBegin => "'{'",
            Token::ObjectEnd => "'}'",
            Token::ArrayBegin => "'['",
            Token::ArrayEnd => "']'",
            Token::String(_) => "string",
            Token::Number(_) => "number",
            Token::Bool(_) => "boolean",
            Token::Null => "null",
            Token::Eof => "end of input",
        }
    }
}

/// Token with location information.
#[derive(Debug, Clone)]
pub struct SpannedToken<'de> {
    /// The token
    pub token: Token<'de>,
    /// Source span
    pub span: Span,
}

#[derive(Debug, Clone, Copy)]
enum ContextState {
    Object(ObjectState),
    Array(ArrayState),
}

#[derive(Debug, Clone, Copy)]
enum ObjectState {
    KeyOrEnd,
    Value,
    CommaOrEnd,
}

#[derive(Debug, Clone, Copy)]
enum ArrayState {
    ValueOrEnd,
    CommaOrEnd,
}

/// Streaming token source over a complete JSON buffer.
///
/// Tracks container context so commas and colons are consumed (and enforced)
/// internally. After the root value completes, further calls return whatever
/// the scanner finds - the entry point uses that for the trailing-data check.
pub struct TokenSource<'de> {
    input: &'de [u8],
    scanner: Scanner,
    stack: Vec<ContextState>,
    root_complete: bool,
}

impl<'de> TokenSource<'de> {
    /// Create a token source over `input`.
    pub fn new(input: &'de [u8]) -> Self {
        Self {
            input,
            scanner: Scanner::new(),
            stack: Vec::new(),
            root_complete: false,
        }
    }

    /// Pull the next value token.
    pub fn next(&mut self) -> Result<SpannedToken<'de>, DecodeError> {
        loop {
            let raw = self.scanner.next_token(self.input)?;
            let span = raw.span;

            if self.root_complete && self.stack.is_empty() {
                // Past the root value: surface whatever is there, cooked.
                return self.cook_value(raw.token, span);
            }

            match self.stack.last().copied() {
                None => return self.value_start(raw.token, span),
                Some(ContextState::Object(ObjectState::KeyOrEnd)) => match raw.token {
                    ScanToken::ObjectEnd => {
                        self.stack.pop();
                        self.finish_value_in_parent();
                        return Ok(SpannedToken {
                            token: Token::ObjectEnd,
                            span,
                        });
                    }
                    ScanToken::String {
                        start,
                        end,
                        has_escapes,
                    } => {
                        let key = scanner::decode_string(self.input, start, end, has_escapes)?;
                        self.expect_colon()?;
                        self.set_object_state(ObjectState::Value);
                        return Ok(SpannedToken {
                            token: Token::String(key),
                            span,
                        });
                    }
                    ScanToken::Eof => {
                        return Err(DecodeError::new(
                            DecodeErrorKind::UnexpectedEof {
                                expected: "field name or '}'",
                            },
                            span,
                        ));
                    }
                    other => return Err(unexpected(&other, "field name or '}'", span)),
                },
                Some(ContextState::Object(ObjectState::Value)) => {
                    self.set_object_state(ObjectState::CommaOrEnd);
                    return self.value_start(raw.token, span);
                }
                Some(ContextState::Object(ObjectState::CommaOrEnd)) => match raw.token {
                    ScanToken::Comma => {
                        self.set_object_state(ObjectState::KeyOrEnd);
                        continue;
                    }
                    ScanToken::ObjectEnd => {
                        self.stack.pop();
                        self.finish_value_in_parent();
                        return Ok(SpannedToken {
                            token: Token::ObjectEnd,
                            span,
                        });
                    }
                    ScanToken::Eof => {
                        return Err(DecodeError::new(
                            DecodeErrorKind::UnexpectedEof {
                                expected: "',' or '}'",
                            },
                            span,
                        ));
                    }
                    other => return Err(unexpected(&other, "',' or '}'", span)),
                },
                Some(ContextState::Array(ArrayState::ValueOrEnd)) => match raw.token {
                    ScanToken::ArrayEnd => {
                        self.stack.pop();
                        self.finish_value_in_parent();
                        return Ok(SpannedToken {
                            token: Token::ArrayEnd,
                            span,
                        });
                    }
                    ScanToken::Comma | ScanToken::Colon => {
                        return Err(unexpected(&raw.token, "value or ']'", span));
                    }
                    ScanToken::Eof => {
                        return Err(DecodeError::new(
                            DecodeErrorKind::UnexpectedEof {
                                expected: "value or ']'",
                            },
                            span,
                        ));
                    }
                    other => {
                        self.set_array_state(ArrayState::CommaOrEnd);
                        return self.value_start(other, span);
                    }
                },
                Some(ContextState::Array(ArrayState::CommaOrEnd)) => match raw.token {
                    ScanToken::Comma => {
                        self.set_array_state(ArrayState::ValueOrEnd);
                        continue;
                    }
                    ScanToken::ArrayEnd => {
                        self.stack.pop();
                        self.finish_value_in_parent();
                        return Ok(SpannedToken {
                            token: Token::ArrayEnd,
                            span,
                        });
                    }
                    ScanToken::Eof => {
                        return Err(DecodeError::new(
                            DecodeErrorKind::UnexpectedEof {
                                expected: "',' or ']'",
                            },
                            span,
                        ));
                    }
                    other => return Err(unexpected(&other, "',' or ']'", span)),
                },
            }
        }
    }

    /// Handle a token in value position.
    fn value_start(
        &mut self,
        token: ScanToken,
        span: Span,
    ) -> Result<SpannedToken<'de>, DecodeError> {
        match token {
            ScanToken::ObjectStart => {
                self.stack.push(ContextState::Object(ObjectState::KeyOrEnd));
                Ok(SpannedToken {
                    token: Token::ObjectBegin,
                    span,
                })
            }
            ScanToken::ArrayStart => {
                self.stack.push(ContextState::Array(ArrayState::ValueOrEnd));
                Ok(SpannedToken {
                    token: Token::ArrayBegin,
                    span,
                })
            }
            ScanToken::Eof => Ok(SpannedToken {
                token: Token::Eof,
                span,
            }),
            ScanToken::ObjectEnd | ScanToken::ArrayEnd | ScanToken::Comma | ScanToken::Colon => {
                Err(unexpected(&token, "value", span))
            }
            scalar => {
                self.finish_value_in_parent();
                self.cook_value(scalar, span)
            }
        }
    }

    /// Convert a scalar scan token into a cooked token.
    fn cook_value(
        &mut self,
        token: ScanToken,
        span: Span,
    ) -> Result<SpannedToken<'de>, DecodeError> {
        let token = match token {
            ScanToken::String {
                start,
                end,
                has_escapes,
            } => Token::String(scanner::decode_string(self.input, start, end, has_escapes)?),
            ScanToken::Number { start, end, hint } => {
                let text = core::str::from_utf8(&self.input[start..end]).map_err(|_| {
                    DecodeError::new(
                        DecodeErrorKind::Scan(scanner::ScanErrorKind::InvalidUtf8),
                        span,
                    )
                })?;
                Token::Number(RawNumber { text, hint })
            }
            ScanToken::True => Token::Bool(true),
            ScanToken::False => Token::Bool(false),
            ScanToken::Null => Token::Null,
            ScanToken::Eof => Token::Eof,
            ScanToken::ObjectStart => Token::ObjectBegin,
            ScanToken::ArrayStart => Token::ArrayBegin,
            ScanToken::ObjectEnd => Token::ObjectEnd,
            ScanToken::ArrayEnd => Token::ArrayEnd,
            ScanToken::Colon | ScanToken::Comma => {
                return Err(unexpected(&token, "value", span));
            }
        };
        Ok(SpannedToken { token, span })
    }

    fn expect_colon(&mut self) -> Result<(), DecodeError> {
        let raw = self.scanner.next_token(self.input)?;
        match raw.token {
            ScanToken::Colon => Ok(()),
            ScanToken::Eof => Err(DecodeError::new(
                DecodeErrorKind::UnexpectedEof { expected: "':'" },
                raw.span,
            )),
            other => Err(unexpected(&other, "':'", raw.span)),
        }
    }

    fn set_object_state(&mut self, state: ObjectState) {
        if let Some(ContextState::Object(s)) = self.stack.last_mut() {
            *s = state;
        }
    }

    fn set_array_state(&mut self, state: ArrayState) {
        if let Some(ContextState::Array(s)) = self.stack.last_mut() {
            *s = state;
        }
    }

    fn finish_value_in_parent(&mut self) {
        if self.stack.is_empty() {
            self.root_complete = true;
        }
    }

    /// Decode one entire JSON value generically, starting at the next token.
    ///
    /// This is the capture path for map-shaped fields: the subtree bypasses
    /// the branch mechanism entirely.
    pub fn read_value(&mut self) -> Result<Value, DecodeError> {
        let sp = self.next()?;
        self.read_value_from(sp)
    }

    fn read_value_from(&mut self, sp: SpannedToken<'de>) -> Result<Value, DecodeError> {
        match sp.token {
            Token::Null => Ok(Value::Null),
            Token::Bool(b) => Ok(Value::Bool(b)),
            Token::Number(n) => Ok(Value::Number(Number::from(n.text))),
            Token::String(s) => Ok(Value::String(s.into_owned())),
            Token::ObjectBegin => {
                let mut map = Map::new();
                loop {
                    let next = self.next()?;
                    match next.token {
                        Token::ObjectEnd => return Ok(Value::Object(map)),
                        Token::String(key) => {
                            let value = self.read_value()?;
                            map.insert(key.into_owned(), value);
                        }
                        Token::Eof => {
                            return Err(DecodeError::new(
                                DecodeErrorKind::UnexpectedEof {
                                    expected: "field name or '}'",
                                },
                                next.span,
                            ));
                        }
                        other => {
                            return Err(DecodeError::new(
                                DecodeErrorKind::UnexpectedToken {
                                    got: other.describe().to_string(),
                                    expected: "field name or '}'",
                                },
                                next.span,
                            ));
                        }
                    }
                }
            }
            Token::ArrayBegin => {
                let mut items = Vec::new();
                loop {
                    let next = self.next()?;
                    match next.token {
                        Token::ArrayEnd => return Ok(Value::Array(items)),
                        Token::Eof => {
                            return Err(DecodeError::new(
                                DecodeErrorKind::UnexpectedEof {
                                    expected: "value or ']'",
                                },
                                next.span,
                            ));
                        }
                        _ => items.push(self.read_value_from(next)?),
                    }
                }
            }
            Token::Eof => Err(DecodeError::new(
                DecodeErrorKind::UnexpectedEof { expected: "value" },
                sp.span,
            )),
            other => Err(DecodeError::new(
                DecodeErrorKind::UnexpectedToken {
                    got: other.describe().to_string(),
                    expected: "value",
                },
                sp.span,
            )),
        }
    }
}

fn unexpected(token: &ScanToken, expected: &'static str, span: Span) -> DecodeError {
    let got = match token {
        ScanToken::ObjectStart => "'{'",
        ScanToken::ObjectEnd => "'}'",
        ScanToken::ArrayStart => "'['",
        ScanToken::ArrayEnd => "']'",
        ScanToken::Colon => "':'",
        ScanToken::Comma => "','",
        ScanToken::String { .. } => "string",
        ScanToken::Number { .. } => "number",
        ScanToken::True | ScanToken::False => "boolean",
        ScanToken::Null => "null",
        ScanToken::Eof => "end of input",
    };
    DecodeError::new(
        DecodeErrorKind::UnexpectedToken {
            got: got.to_string(),
            expected,
        },
        span,
    )
}
