//! Cursor-based tokenizer for connection URLs.
//!
//! The scanner borrows the input and advances a single forward-only byte
//! cursor; it never backtracks. Tokens are subslices of the input, split
//! at delimiter characters. Percent-decoding writes into a fresh buffer
//! rather than rewriting the input. Failures propagate as [`ParseError`]s,
//! so the first error encountered is the one the caller sees.

use crate::error::ParseError;

/// How special a character is during tokenization.
///
/// `scan(level)` consumes characters whose class ranks strictly below
/// `level`. End of input ranks as [`CharClass::VerySpecial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum CharClass {
    /// Regular characters, including `%`
    NotSpecial,
    /// Special in the sense of RFC 3986 section 2.2: `: / ? [ ] @`
    GenericSpecial,
    /// Special even inside query parameter values: `# & =`
    VerySpecial,
}

fn classify(c: u8) -> CharClass {
    match c {
        b'#' | b'&' | b'=' => CharClass::VerySpecial,
        b':' | b'/' | b'?' | b'[' | b']' | b'@' => CharClass::GenericSpecial,
        // note that '%' is NOT special
        _ => CharClass::NotSpecial,
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

pub(crate) struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// The byte at the cursor, or `None` at end of input.
    pub(crate) fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    /// Consume characters while their class ranks below `level` and return
    /// them as a token. The delimiter (or end of input) is left at the
    /// cursor.
    ///
    /// All delimiters are ASCII, so the token boundary is always a char
    /// boundary of the input.
    pub(crate) fn scan(&mut self, level: CharClass) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if classify(c) >= level {
                break;
            }
            self.advance();
        }
        &self.input[start..self.pos]
    }

    /// Consume characters matching `pred` and return them as a token.
    pub(crate) fn scan_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
        &self.input[start..self.pos]
    }

    /// Match an exact literal, advancing past it on success.
    pub(crate) fn consume(&mut self, literal: &str) -> Result<(), ParseError> {
        for (i, expected) in literal.bytes().enumerate() {
            match self.peek() {
                Some(c) if c == expected => self.advance(),
                Some(_) => {
                    return Err(ParseError::at(
                        format!(
                            "unexpected character '{}' at position {}, expected '{}'",
                            self.current_char(),
                            self.pos,
                            &literal[i..],
                        ),
                        self.pos,
                    ));
                }
                None => {
                    return Err(ParseError::at(
                        format!(
                            "unexpected end at position {}, expected '{}'",
                            self.pos,
                            &literal[i..],
                        ),
                        self.pos,
                    ));
                }
            }
        }
        Ok(())
    }

    /// A positional "unexpected character" error for the character at the
    /// cursor, or "URL ended unexpectedly" at end of input.
    pub(crate) fn unexpected(&self) -> ParseError {
        if self.peek().is_none() {
            ParseError::new("URL ended unexpectedly")
        } else {
            ParseError::at(
                format!(
                    "unexpected character '{}' at position {}",
                    self.current_char(),
                    self.pos,
                ),
                self.pos,
            )
        }
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }
}

/// Decode `%HH` escapes in `token` into a fresh string.
///
/// `%` itself is never a delimiter, so escapes survive tokenization
/// intact. A truncated or non-hex escape fails, as does a decoded byte
/// sequence that is not valid UTF-8. `context` names the token in the
/// error message.
pub(crate) fn percent_decode(token: &str, context: &str) -> Result<String, ParseError> {
    let bytes = token.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        if i + 1 >= bytes.len() {
            return Err(ParseError::new(format!(
                "percent escape in {context} ends after one digit"
            )));
        }
        if i + 2 >= bytes.len() {
            return Err(ParseError::new(format!(
                "invalid percent escape in {context}"
            )));
        }
        let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) else {
            return Err(ParseError::new(format!(
                "invalid percent escape in {context}"
            )));
        };
        out.push(16 * hi + lo);
        i += 3;
    }
    String::from_utf8(out).map_err(|_| {
        ParseError::new(format!(
            "percent escapes in {context} do not form valid UTF-8"
        ))
    })
}
