//! Low-level JSON scanner that finds token boundaries without materializing strings.
//!
//! The scanner's job is to identify where tokens are in the buffer, not to
//! interpret them. String content is returned as indices plus a `has_escapes`
//! flag, and numbers as indices plus a [`NumberHint`]; the decode engine
//! decides how (and whether) to materialize them. Numbers stay textual all
//! the way to value coercion, so precision is never lost in transit.

use core::str;

use alloc::borrow::Cow;
use alloc::string::String;

/// A half-open byte range into the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first byte.
    pub offset: usize,
    /// Length in bytes.
    pub len: usize,
}

impl Span {
    /// Create a new span.
    pub const fn new(offset: usize, len: usize) -> Self {
        Span { offset, len }
    }
}

/// Token kinds with minimal data - strings/numbers are just indices into the buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `{`
    ObjectStart,
    /// `}`
    ObjectEnd,
    /// `[`
    ArrayStart,
    /// `]`
    ArrayEnd,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `null`
    Null,
    /// `true`
    True,
    /// `false`
    False,
    /// A string literal - indices point to content (excluding quotes)
    String {
        /// Start index of string content (after opening quote)
        start: usize,
        /// End index of string content (before closing quote)
        end: usize,
        /// True if the string contains escape sequences that need processing
        has_escapes: bool,
    },
    /// A number literal - indices point to the raw number text
    Number {
        /// Start index of number
        start: usize,
        /// End index of number
        end: usize,
        /// Hint about number format
        hint: NumberHint,
    },
    /// End of input reached
    Eof,
}

/// Hint about number format to guide later parsing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberHint {
    /// Unsigned integer (no sign, no decimal, no exponent)
    Unsigned,
    /// Signed integer (has `-` prefix, no decimal, no exponent)
    Signed,
    /// Floating point (has `.` or `e`/`E`)
    Float,
}

/// Spanned token with location information
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token
    pub token: Token,
    /// Source span
    pub span: Span,
}

/// Scanner error
#[derive(Debug, Clone, PartialEq)]
pub struct ScanError {
    /// The error kind
    pub kind: ScanErrorKind,
    /// Source span
    pub span: Span,
}

/// Types of scanner errors
#[derive(Debug, Clone, PartialEq)]
pub enum ScanErrorKind {
    /// Unexpected character
    UnexpectedChar(char),
    /// Unexpected end of input (with context)
    UnexpectedEof(&'static str),
    /// Invalid UTF-8
    InvalidUtf8,
}

/// Result type for scanner operations
pub type ScanResult = Result<SpannedToken, ScanError>;

/// JSON scanner over a complete in-memory buffer.
///
/// Tracks only a position; the buffer is passed to [`Scanner::next_token`]
/// on every call.
pub struct Scanner {
    pos: usize,
}

impl Scanner {
    /// Create a new scanner starting at position 0
    pub const fn new() -> Self {
        Self { pos: 0 }
    }

    /// Scan the next token from the buffer.
    pub fn next_token(&mut self, buf: &[u8]) -> ScanResult {
        self.skip_whitespace(buf);

        let start = self.pos;
        let Some(&byte) = buf.get(self.pos) else {
            return Ok(SpannedToken {
                token: Token::Eof,
                span: Span::new(self.pos, 0),
            });
        };

        let punct = |token| {
            Ok(SpannedToken {
                token,
                span: Span::new(start, 1),
            })
        };

        match byte {
            b'{' => {
                self.pos += 1;
                punct(Token::ObjectStart)
            }
            b'}' => {
                self.pos += 1;
                punct(Token::ObjectEnd)
            }
            b'[' => {
                self.pos += 1;
                punct(Token::ArrayStart)
            }
            b']' => {
                self.pos += 1;
                punct(Token::ArrayEnd)
            }
            b':' => {
                self.pos += 1;
                punct(Token::Colon)
            }
            b',' => {
                self.pos += 1;
                punct(Token::Comma)
            }
            b'"' => self.scan_string(buf, start),
            b'-' | b'0'..=b'9' => self.scan_number(buf, start),
            b't' => self.scan_literal(buf, start, b"true", Token::True),
            b'f' => self.scan_literal(buf, start, b"false", Token::False),
            b'n' => self.scan_literal(buf, start, b"null", Token::Null),
            _ => Err(ScanError {
                kind: ScanErrorKind::UnexpectedChar(byte as char),
                span: Span::new(start, 1),
            }),
        }
    }

    fn skip_whitespace(&mut self, buf: &[u8]) {
        let mut pos = self.pos;
        while let Some(&b) = buf.get(pos) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => pos += 1,
                _ => break,
            }
        }
        self.pos = pos;
    }

    /// Scan a string, finding its boundaries and noting if it has escapes.
    fn scan_string(&mut self, buf: &[u8], start: usize) -> ScanResult {
        // Skip opening quote
        self.pos += 1;
        let content_start = self.pos;
        let mut has_escapes = false;

        // Wide fast path: scan 16 bytes at a time looking for quotes/backslashes
        const STEP_SIZE: usize = 16;
        type Window = u128;
        type Chunk = [u8; STEP_SIZE];

        while let Some(Ok(chunk)) = buf
            .get(self.pos..)
            .and_then(|s| s.get(..STEP_SIZE))
            .map(Chunk::try_from)
        {
            let window = Window::from_ne_bytes(chunk);
            if contains_byte(window, b'"') || contains_byte(window, b'\\') {
                break;
            }
            self.pos += STEP_SIZE;
        }

        // Byte-by-byte scanning
        while let Some(&byte) = buf.get(self.pos) {
            match byte {
                b'"' => {
                    let content_end = self.pos;
                    self.pos += 1; // Skip closing quote

                    return Ok(SpannedToken {
                        token: Token::String {
                            start: content_start,
                            end: content_end,
                            has_escapes,
                        },
                        span: Span::new(start, self.pos - start),
                    });
                }
                b'\\' => {
                    has_escapes = true;
                    self.pos += 1;
                    if buf.get(self.pos).is_none() {
                        break;
                    }
                    // Skip the escaped char; \uXXXX hex digits are plain bytes
                    // and fall through the loop on their own.
                    self.pos += 1;
                }
                _ => {
                    self.pos += 1;
                }
            }
        }

        Err(ScanError {
            kind: ScanErrorKind::UnexpectedEof("in string"),
            span: Span::new(start, self.pos - start),
        })
    }

    /// Scan a number, finding its boundaries and determining its type hint.
    fn scan_number(&mut self, buf: &[u8], start: usize) -> ScanResult {
        let mut hint = NumberHint::Unsigned;
        let mut pos = self.pos;

        if buf.get(pos) == Some(&b'-') {
            hint = NumberHint::Signed;
            pos += 1;
        }

        // Integer part
        while buf.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }

        // Decimal part
        if buf.get(pos) == Some(&b'.') {
            hint = NumberHint::Float;
            pos += 1;
            while buf.get(pos).is_some_and(u8::is_ascii_digit) {
                pos += 1;
            }
        }

        // Exponent
        if matches!(buf.get(pos), Some(b'e') | Some(b'E')) {
            hint = NumberHint::Float;
            pos += 1;
            if matches!(buf.get(pos), Some(b'+') | Some(b'-')) {
                pos += 1;
            }
            while buf.get(pos).is_some_and(u8::is_ascii_digit) {
                pos += 1;
            }
        }

        self.pos = pos;
        let end = pos;

        // A bare `-` is not a number
        if end == start || (end == start + 1 && buf.get(start) == Some(&b'-')) {
            return Err(match buf.get(pos) {
                Some(&b) => ScanError {
                    kind: ScanErrorKind::UnexpectedChar(b as char),
                    span: Span::new(pos, 1),
                },
                None => ScanError {
                    kind: ScanErrorKind::UnexpectedEof("in number"),
                    span: Span::new(start, end - start),
                },
            });
        }

        Ok(SpannedToken {
            token: Token::Number { start, end, hint },
            span: Span::new(start, end - start),
        })
    }

    /// Scan a literal keyword (true, false, null)
    fn scan_literal(
        &mut self,
        buf: &[u8],
        start: usize,
        expected: &'static [u8],
        token: Token,
    ) -> ScanResult {
        for (i, &want) in expected.iter().enumerate() {
            match buf.get(start + i) {
                Some(&b) if b == want => {}
                Some(&b) => {
                    return Err(ScanError {
                        kind: ScanErrorKind::UnexpectedChar(b as char),
                        span: Span::new(start + i, 1),
                    });
                }
                None => {
                    return Err(ScanError {
                        kind: ScanErrorKind::UnexpectedEof("in literal"),
                        span: Span::new(start, i),
                    });
                }
            }
        }
        self.pos = start + expected.len();

        Ok(SpannedToken {
            token,
            span: Span::new(start, expected.len()),
        })
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a 128-bit window contains a specific byte
#[inline]
const fn contains_byte(window: u128, byte: u8) -> bool {
    let pattern = u128::from_ne_bytes([byte; 16]);
    let xor = window ^ pattern;
    let has_zero = (xor.wrapping_sub(0x01010101010101010101010101010101))
        & !xor
        & 0x80808080808080808080808080808080;
    has_zero != 0
}

// =============================================================================
// String decoding (second pass)
// =============================================================================

/// Decode a JSON string from the buffer, handling escape sequences.
///
/// Only called when the scanner flagged escapes; plain strings take the
/// borrowed path in [`decode_string`].
pub fn decode_string_owned(buf: &[u8], start: usize, end: usize) -> Result<String, ScanError> {
    let slice = &buf[start..end];
    let mut result = String::with_capacity(end - start);
    let mut i = 0;

    while i < slice.len() {
        let byte = slice[i];
        if byte != b'\\' {
            // Plain content: take the whole run up to the next backslash.
            let run_end = slice[i..]
                .iter()
                .position(|&b| b == b'\\')
                .map_or(slice.len(), |p| i + p);
            let run = str::from_utf8(&slice[i..run_end]).map_err(|_| ScanError {
                kind: ScanErrorKind::InvalidUtf8,
                span: Span::new(start + i, run_end - i),
            })?;
            result.push_str(run);
            i = run_end;
            continue;
        }

        i += 1;
        let Some(&esc) = slice.get(i) else {
            return Err(ScanError {
                kind: ScanErrorKind::UnexpectedEof("in escape sequence"),
                span: Span::new(start + i - 1, 1),
            });
        };

        match esc {
            b'"' => result.push('"'),
            b'\\' => result.push('\\'),
            b'/' => result.push('/'),
            b'b' => result.push('\x08'),
            b'f' => result.push('\x0c'),
            b'n' => result.push('\n'),
            b'r' => result.push('\r'),
            b't' => result.push('\t'),
            b'u' => {
                i += 1;
                let code_unit = read_hex4(slice, i).ok_or(ScanError {
                    kind: ScanErrorKind::UnexpectedEof("in unicode escape"),
                    span: Span::new(start + i.saturating_sub(2), 2),
                })?;
                i += 4;

                let code_point = if (0xD800..=0xDBFF).contains(&code_unit) {
                    // High surrogate: a `\uXXXX` low surrogate must follow
                    if slice.get(i) != Some(&b'\\') || slice.get(i + 1) != Some(&b'u') {
                        return Err(ScanError {
                            kind: ScanErrorKind::InvalidUtf8,
                            span: Span::new(start + i - 6, 6),
                        });
                    }
                    i += 2;
                    let low_unit = read_hex4(slice, i).ok_or(ScanError {
                        kind: ScanErrorKind::UnexpectedEof("in unicode escape"),
                        span: Span::new(start + i - 2, 2),
                    })?;
                    i += 4;
                    if !(0xDC00..=0xDFFF).contains(&low_unit) {
                        return Err(ScanError {
                            kind: ScanErrorKind::InvalidUtf8,
                            span: Span::new(start + i - 4, 4),
                        });
                    }
                    0x10000 + (((code_unit as u32) & 0x3FF) << 10) + ((low_unit as u32) & 0x3FF)
                } else if (0xDC00..=0xDFFF).contains(&code_unit) {
                    // Lone low surrogate
                    return Err(ScanError {
                        kind: ScanErrorKind::InvalidUtf8,
                        span: Span::new(start + i - 4, 4),
                    });
                } else {
                    code_unit as u32
                };

                let c = char::from_u32(code_point).ok_or(ScanError {
                    kind: ScanErrorKind::InvalidUtf8,
                    span: Span::new(start + i - 4, 4),
                })?;
                result.push(c);
                continue; // i already advanced past the hex digits
            }
            other => {
                // Unknown escape - keep the character as-is
                result.push(other as char);
            }
        }
        i += 1;
    }

    Ok(result)
}

/// Read 4 hex digits at `slice[i..i + 4]` as a UTF-16 code unit.
fn read_hex4(slice: &[u8], i: usize) -> Option<u16> {
    let hex = slice.get(i..i + 4)?;
    let hex_str = str::from_utf8(hex).ok()?;
    u16::from_str_radix(hex_str, 16).ok()
}

/// Try to borrow a string directly from the buffer (zero-copy).
///
/// Only works for strings without escape sequences. Returns `None` if the
/// string contains escapes or invalid UTF-8.
pub fn decode_string_borrowed(buf: &[u8], start: usize, end: usize) -> Option<&str> {
    let slice = &buf[start..end];
    if slice.contains(&b'\\') {
        return None;
    }
    str::from_utf8(slice).ok()
}

/// Decode a JSON string, borrowing when the content needs no unescaping.
pub fn decode_string(
    buf: &[u8],
    start: usize,
    end: usize,
    has_escapes: bool,
) -> Result<Cow<'_, str>, ScanError> {
    if has_escapes {
        decode_string_owned(buf, start, end).map(Cow::Owned)
    } else {
        decode_string_borrowed(buf, start, end)
            .map(Cow::Borrowed)
            .ok_or(ScanError {
                kind: ScanErrorKind::InvalidUtf8,
                span: Span::new(start, end - start),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_tokens() {
        let input = b"{}[],:";
        let mut scanner = Scanner::new();

        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::ObjectStart
        ));
        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::ObjectEnd
        ));
        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::ArrayStart
        ));
        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::ArrayEnd
        ));
        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::Comma
        ));
        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::Colon
        ));
        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::Eof
        ));
    }

    #[test]
    fn string_no_escapes() {
        let input = b"\"hello world\"";
        let mut scanner = Scanner::new();

        let result = scanner.next_token(input).unwrap();
        assert!(matches!(
            result.token,
            Token::String {
                start: 1,
                end: 12,
                has_escapes: false
            }
        ));
    }

    #[test]
    fn string_with_escapes() {
        let input = br#""hello\nworld""#;
        let mut scanner = Scanner::new();

        let result = scanner.next_token(input).unwrap();
        assert!(matches!(
            result.token,
            Token::String {
                start: 1,
                end: 13,
                has_escapes: true
            }
        ));
    }

    #[test]
    fn long_string_crosses_window() {
        // Longer than the 16-byte fast-path window, with an escape at the end
        let input = br#""aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\t""#;
        let mut scanner = Scanner::new();

        let result = scanner.next_token(input).unwrap();
        assert!(matches!(
            result.token,
            Token::String {
                has_escapes: true,
                ..
            }
        ));
        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::Eof
        ));
    }

    #[test]
    fn numbers() {
        let mut scanner = Scanner::new();
        let result = scanner.next_token(b"42").unwrap();
        assert!(matches!(
            result.token,
            Token::Number {
                start: 0,
                end: 2,
                hint: NumberHint::Unsigned,
            }
        ));

        let mut scanner = Scanner::new();
        let result = scanner.next_token(b"-42]").unwrap();
        assert!(matches!(
            result.token,
            Token::Number {
                hint: NumberHint::Signed,
                ..
            }
        ));

        let mut scanner = Scanner::new();
        let result = scanner.next_token(b"3.14}").unwrap();
        assert!(matches!(
            result.token,
            Token::Number {
                hint: NumberHint::Float,
                ..
            }
        ));

        let mut scanner = Scanner::new();
        let result = scanner.next_token(b"1e10 ").unwrap();
        assert!(matches!(
            result.token,
            Token::Number {
                hint: NumberHint::Float,
                ..
            }
        ));
    }

    #[test]
    fn bare_minus_is_an_error() {
        let mut scanner = Scanner::new();
        assert!(scanner.next_token(b"-").is_err());
    }

    #[test]
    fn literals() {
        let mut scanner = Scanner::new();
        assert!(matches!(
            scanner.next_token(b"true").unwrap().token,
            Token::True
        ));

        let mut scanner = Scanner::new();
        assert!(matches!(
            scanner.next_token(b"false]").unwrap().token,
            Token::False
        ));

        let mut scanner = Scanner::new();
        assert!(matches!(
            scanner.next_token(b"null}").unwrap().token,
            Token::Null
        ));

        let mut scanner = Scanner::new();
        let err = scanner.next_token(b"nul").unwrap_err();
        assert!(matches!(err.kind, ScanErrorKind::UnexpectedEof(_)));
    }

    #[test]
    fn whitespace_handling() {
        let input = b"  {\n\t\"key\"  :  42  }  ";
        let mut scanner = Scanner::new();

        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::ObjectStart
        ));
        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::String { .. }
        ));
        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::Colon
        ));
        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::Number { .. }
        ));
        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::ObjectEnd
        ));
        assert!(matches!(
            scanner.next_token(input).unwrap().token,
            Token::Eof
        ));
    }

    #[test]
    fn decode_simple_escapes() {
        let input = br#"hello\nworld"#;
        let result = decode_string_owned(input, 0, input.len()).unwrap();
        assert_eq!(result, "hello\nworld");
    }

    #[test]
    fn decode_unicode_escapes() {
        let input = b"\\u0048\\u0065\\u006C\\u006C\\u006F";
        let result = decode_string_owned(input, 0, input.len()).unwrap();
        assert_eq!(result, "Hello");
    }

    #[test]
    fn decode_surrogate_pair() {
        // U+1F600 (grinning face)
        let input = b"\\uD83D\\uDE00";
        let result = decode_string_owned(input, 0, input.len()).unwrap();
        assert_eq!(result, "\u{1F600}");
    }

    #[test]
    fn decode_cow_borrowed_vs_owned() {
        let input = b"simple";
        let result = decode_string(input, 0, input.len(), false).unwrap();
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(&*result, "simple");

        let input = br#"has\tescape"#;
        let result = decode_string(input, 0, input.len(), true).unwrap();
        assert!(matches!(result, Cow::Owned(_)));
        assert_eq!(&*result, "has\tescape");
    }
}
