//! Recursive-descent parser for TOML+.
//!
//! The parser pulls bytes from a [`PositionedStream`] and pushes events to a
//! [`Handler`] as soon as each construct is recognized. It never needs more
//! than one byte of lookahead. It handles:
//! - Expressions: blank lines, comments, table headers, key/value pairs
//! - Compounds: arrays (homogeneous) and inline tables
//! - Strings: basic, literal, and their multi-line forms
//! - Bare values: booleans, integers, floats, datetimes, and symbols
//!
//! The first grammar violation aborts the parse. Error offsets name the last
//! byte consumed when the problem was detected.

use std::io::Read;

use crate::encode::escape_byte;
use crate::error::{ParseError, Result};
use crate::handler::Handler;
use crate::stream::PositionedStream;

/// Syntactic type of a parsed value, used to keep arrays homogeneous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    String,
    Integer,
    FloatingPoint,
    Boolean,
    Datetime,
    Array,
    Table,
    Symbol,
}

/// Deepest allowed nesting of arrays and inline tables.
pub const MAX_NESTING_DEPTH: usize = 256;

fn is_control(byte: u8) -> bool {
    byte < 0x20
}

/// Bytes allowed in a bare key.
fn is_key_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

/// Bytes that may make up a bare value token.
fn is_word_byte(byte: u8) -> bool {
    is_key_byte(byte) || matches!(byte, b'+' | b'.' | b':')
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Event-driving parser over one input.
///
/// A parser is consumed by [`Parser::parse`]; create a new one per document.
pub struct Parser<'h, R, H: ?Sized> {
    input: PositionedStream<R>,
    handler: &'h mut H,
    /// Open arrays and inline tables.
    depth: usize,
}

impl<'h, R: Read, H: Handler + ?Sized> Parser<'h, R, H> {
    /// Create a parser reading `source` and reporting to `handler`.
    pub fn new(source: R, handler: &'h mut H) -> Self {
        Self {
            input: PositionedStream::new(source),
            handler,
            depth: 0,
        }
    }

    /// Parse the whole document.
    pub fn parse(mut self) -> Result<()> {
        debug!("parsing document");
        self.handler.start_document()?;

        self.parse_expression()?;

        while !self.input.eof()? {
            self.parse_new_line()?;
            self.parse_expression()?;
        }

        self.handler.finish_document()?;
        debug!(bytes = self.input.processed(), "parsed document");
        Ok(())
    }

    // ========================================================================
    // Stream Helpers
    // ========================================================================

    /// Offset of the last consumed byte, or 0 before the first.
    fn last_char_offset(&self) -> usize {
        self.input.processed().saturating_sub(1)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::grammar(message, self.last_char_offset())
    }

    fn peek_is(&mut self, byte: u8) -> Result<bool> {
        Ok(self.input.peek()? == Some(byte))
    }

    fn at_new_line(&mut self) -> Result<bool> {
        Ok(matches!(self.input.peek()?, Some(b'\r' | b'\n')))
    }

    /// Consume one byte that must be among `expected`.
    fn expect_one_of(&mut self, expected: &[u8]) -> Result<u8> {
        let byte = self.input.get()?;
        if expected.contains(&byte) {
            return Ok(byte);
        }

        let list = expected
            .iter()
            .map(|&b| format!("'{}'", escape_byte(b)))
            .collect::<Vec<_>>()
            .join(", ");
        Err(self.error(format!("Expected one of the following symbols: {}", list)))
    }

    /// Account for one more open container; the opening byte has been consumed.
    fn enter_nested(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error("Maximum nesting depth exceeded"));
        }
        self.depth += 1;
        Ok(())
    }

    fn decode_text(&self, bytes: Vec<u8>) -> Result<String> {
        String::from_utf8(bytes).map_err(|_| self.error("Invalid UTF-8 sequence"))
    }

    // ========================================================================
    // Whitespace, Comments, Newlines
    // ========================================================================

    /// Skip spaces and tabs.
    fn skip_spaces(&mut self) -> Result<()> {
        while matches!(self.input.peek()?, Some(b' ' | b'\t')) {
            self.input.get()?;
        }
        Ok(())
    }

    fn parse_comment(&mut self) -> Result<()> {
        self.input.get()?; // '#'

        let mut text = Vec::new();
        while let Some(byte) = self.input.peek()? {
            if byte != b'\t' && is_control(byte) {
                break;
            }
            text.push(self.input.get()?);
        }

        let text = self.decode_text(text)?;
        self.handler.comment(&text)
    }

    /// Consume `\n` or `\r\n`.
    fn parse_new_line(&mut self) -> Result<()> {
        let mut byte = self.input.get()?;
        if byte == b'\r' {
            byte = self.input.get()?;
        }
        if byte != b'\n' {
            return Err(self.error("Expected new-line"));
        }
        Ok(())
    }

    /// Skip whitespace, blank lines and whole-line comments.
    fn skip_spaces_and_empty_lines(&mut self) -> Result<()> {
        while !self.input.eof()? {
            self.skip_spaces()?;

            match self.input.peek()? {
                Some(b'#') => {
                    self.parse_comment()?;
                    self.parse_new_line()?;
                }
                Some(b'\r' | b'\n') => self.parse_new_line()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn parse_trailing_comment(&mut self) -> Result<()> {
        self.skip_spaces()?;
        if self.peek_is(b'#')? {
            self.parse_comment()?;
        }
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parse one line's worth of content, stopping before its newline.
    fn parse_expression(&mut self) -> Result<()> {
        self.skip_spaces()?;

        match self.input.peek()? {
            None | Some(b'\r' | b'\n') => Ok(()),
            Some(b'#') => self.parse_comment(),
            Some(b'[') => {
                self.parse_table_header()?;
                self.parse_trailing_comment()
            }
            Some(_) => {
                self.parse_pair()?;
                self.parse_trailing_comment()
            }
        }
    }

    fn parse_table_header(&mut self) -> Result<()> {
        self.input.get()?; // '['

        let array_item = self.peek_is(b'[')?;
        if array_item {
            self.input.get()?;
        }

        let mut path = Vec::new();
        loop {
            self.skip_spaces()?;
            path.push(self.parse_key()?);
            self.skip_spaces()?;

            if self.peek_is(b']')? {
                self.input.get()?;
                if array_item {
                    self.expect_one_of(b"]")?;
                }
                break;
            }
            self.expect_one_of(b".")?;
        }

        if array_item {
            trace!(?path, "array table header");
            self.handler.array_table(&path)
        } else {
            trace!(?path, "table header");
            self.handler.table(&path)
        }
    }

    /// Parse `key = value`.
    fn parse_pair(&mut self) -> Result<ValueType> {
        let key = self.parse_key()?;
        self.handler.key(&key)?;
        self.skip_spaces()?;
        self.expect_one_of(b"=")?;
        self.skip_spaces()?;
        self.parse_value()
    }

    fn parse_key(&mut self) -> Result<String> {
        if self.peek_is(b'"')? {
            self.input.get()?;
            let key = self.parse_basic_string()?;
            if key.is_empty() {
                return Err(self.error("Expected a non-empty key"));
            }
            return Ok(key);
        }

        // At least one byte is required.
        let first = self.input.get()?;
        if !is_key_byte(first) {
            return Err(self.error("Expected a non-empty key"));
        }

        let mut key = String::new();
        key.push(first as char);
        while let Some(byte) = self.input.peek()? {
            if !is_key_byte(byte) {
                break;
            }
            key.push(self.input.get()? as char);
        }
        Ok(key)
    }

    // ========================================================================
    // Values
    // ========================================================================

    fn parse_value(&mut self) -> Result<ValueType> {
        match self.input.peek()? {
            Some(b'{') => {
                self.parse_inline_table()?;
                Ok(ValueType::Table)
            }
            Some(b'[') => {
                self.parse_array()?;
                Ok(ValueType::Array)
            }
            Some(b'"') => {
                self.parse_string()?;
                Ok(ValueType::String)
            }
            Some(b'\'') => {
                self.parse_literal_string()?;
                Ok(ValueType::String)
            }
            _ => self.parse_bare_value(),
        }
    }

    fn parse_array(&mut self) -> Result<()> {
        self.input.get()?; // '['
        self.enter_nested()?;
        self.handler.start_array()?;
        trace!("array start");
        self.skip_spaces_and_empty_lines()?;

        let mut array_type = None;
        let mut size = 0;

        loop {
            if self.peek_is(b']')? {
                self.input.get()?;
                return self.finish_array(size);
            }

            let item_offset = self.input.processed();
            let item_type = self.parse_value()?;

            if array_type.is_some_and(|expected| expected != item_type) {
                return Err(ParseError::grammar(
                    "All array elements must be of the same type",
                    item_offset,
                ));
            }

            size += 1;
            array_type = Some(item_type);

            // Newlines and comments are tolerated between values and commas.
            self.skip_spaces_and_empty_lines()?;

            match self.input.get()? {
                b']' => return self.finish_array(size),
                b',' => self.skip_spaces_and_empty_lines()?,
                _ => return Err(self.error("Expected ',' or ']' after an array element")),
            }
        }
    }

    fn finish_array(&mut self, size: usize) -> Result<()> {
        self.depth -= 1;
        trace!(size, "array end");
        self.handler.finish_array(size)
    }

    fn parse_inline_table(&mut self) -> Result<()> {
        self.input.get()?; // '{'
        self.enter_nested()?;
        self.handler.start_inline_table()?;
        trace!("inline table start");
        let mut size = 0;

        self.skip_spaces()?;

        if self.peek_is(b'}')? {
            self.input.get()?;
            return self.finish_inline_table(size);
        }

        loop {
            self.parse_pair()?;
            self.skip_spaces()?;
            size += 1;

            match self.input.get()? {
                b'}' => return self.finish_inline_table(size),
                b',' => self.skip_spaces()?,
                _ => {
                    return Err(self.error("Expected ',' or '}' after an inline table element"))
                }
            }
        }
    }

    fn finish_inline_table(&mut self, size: usize) -> Result<()> {
        self.depth -= 1;
        trace!(size, "inline table end");
        self.handler.finish_inline_table(size)
    }

    // ========================================================================
    // Strings
    // ========================================================================

    fn parse_hex_digit(&mut self) -> Result<u32> {
        let byte = self.input.get()?;
        (byte as char)
            .to_digit(16)
            .ok_or_else(|| self.error("Expected hex-digit"))
    }

    fn parse_codepoint(&mut self, digits: usize) -> Result<u32> {
        let mut codepoint = 0;
        for _ in 0..digits {
            codepoint = (codepoint << 4) + self.parse_hex_digit()?;
        }
        Ok(codepoint)
    }

    /// Validate a code point and append it as UTF-8.
    fn push_codepoint(codepoint: u32, escape_offset: usize, out: &mut Vec<u8>) -> Result<()> {
        if (0xD800..=0xDFFF).contains(&codepoint) {
            return Err(ParseError::grammar(
                "Surrogate pairs are not allowed",
                escape_offset,
            ));
        }

        let Some(ch) = char::from_u32(codepoint) else {
            return Err(ParseError::grammar(
                "Codepoint must be less or equal than 0x10FFFF",
                escape_offset,
            ));
        };

        let mut buf = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }

    /// Decode one escape sequence; the backslash has been consumed.
    fn parse_escape(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let escape_offset = self.last_char_offset();

        match self.input.get()? {
            b'b' => out.push(0x08),
            b't' => out.push(b'\t'),
            b'n' => out.push(b'\n'),
            b'f' => out.push(0x0c),
            b'r' => out.push(b'\r'),
            b'"' => out.push(b'"'),
            b'\\' => out.push(b'\\'),
            b'u' => {
                let codepoint = self.parse_codepoint(4)?;
                Self::push_codepoint(codepoint, escape_offset, out)?;
            }
            b'U' => {
                let codepoint = self.parse_codepoint(8)?;
                Self::push_codepoint(codepoint, escape_offset, out)?;
            }
            _ => return Err(ParseError::grammar("Invalid escape-sequence", escape_offset)),
        }
        Ok(())
    }

    /// Handle a quote inside a multi-line string; the first quote has been
    /// consumed. Returns `true` when the run closes the string.
    ///
    /// A run of three to five quotes closes the string, keeping the extra
    /// one or two as content. Shorter runs are content.
    fn close_quote_run(&mut self, quote: u8, out: &mut Vec<u8>) -> Result<bool> {
        let mut run = 1;
        while run < 5 && self.peek_is(quote)? {
            self.input.get()?;
            run += 1;
        }

        if run >= 3 {
            out.extend(std::iter::repeat(quote).take(run - 3));
            return Ok(true);
        }
        out.extend(std::iter::repeat(quote).take(run));
        Ok(false)
    }

    /// Parse a single-line basic string; the opening quote has been consumed.
    fn parse_basic_string(&mut self) -> Result<String> {
        let mut result = Vec::new();

        loop {
            match self.input.get()? {
                byte if is_control(byte) => {
                    return Err(self.error("Control characters must be escaped"));
                }
                b'"' => break,
                b'\\' => self.parse_escape(&mut result)?,
                byte => result.push(byte),
            }
        }

        self.decode_text(result)
    }

    /// Parse a multi-line basic string; the opening `"""` has been consumed.
    fn parse_multiline_string(&mut self) -> Result<String> {
        let mut result = Vec::new();

        // A newline right after the opening quotes is not content.
        if self.at_new_line()? {
            self.parse_new_line()?;
        }

        loop {
            if self.at_new_line()? {
                self.parse_new_line()?;
                result.push(b'\n');
                continue;
            }

            match self.input.get()? {
                byte if is_control(byte) => {
                    return Err(self.error("Control characters must be escaped"));
                }
                b'"' => {
                    if self.close_quote_run(b'"', &mut result)? {
                        break;
                    }
                }
                b'\\' => {
                    if self.at_new_line()? {
                        // Line continuation: drop the newline and following whitespace.
                        self.parse_new_line()?;
                        while matches!(self.input.peek()?, Some(byte) if is_whitespace(byte)) {
                            self.input.get()?;
                        }
                        continue;
                    }
                    self.parse_escape(&mut result)?;
                }
                byte => result.push(byte),
            }
        }

        self.decode_text(result)
    }

    fn parse_string(&mut self) -> Result<()> {
        self.input.get()?; // '"'

        let value = if self.peek_is(b'"')? {
            self.input.get()?;
            if self.peek_is(b'"')? {
                self.input.get()?;
                self.parse_multiline_string()?
            } else {
                String::new()
            }
        } else {
            self.parse_basic_string()?
        };

        self.handler.string(&value)
    }

    fn parse_literal_string(&mut self) -> Result<()> {
        self.input.get()?; // '\''

        let value = if self.peek_is(b'\'')? {
            self.input.get()?;
            if self.peek_is(b'\'')? {
                self.input.get()?;
                self.parse_multiline_literal()?
            } else {
                String::new()
            }
        } else {
            let mut result = Vec::new();
            loop {
                match self.input.get()? {
                    b'\'' => break,
                    byte if byte != b'\t' && is_control(byte) => {
                        return Err(self.error("Control characters are not allowed"));
                    }
                    byte => result.push(byte),
                }
            }
            self.decode_text(result)?
        };

        self.handler.string(&value)
    }

    /// Parse a multi-line literal string; the opening `'''` has been consumed.
    fn parse_multiline_literal(&mut self) -> Result<String> {
        let mut result = Vec::new();

        if self.at_new_line()? {
            self.parse_new_line()?;
        }

        loop {
            if self.at_new_line()? {
                self.parse_new_line()?;
                result.push(b'\n');
                continue;
            }

            match self.input.get()? {
                b'\'' => {
                    if self.close_quote_run(b'\'', &mut result)? {
                        break;
                    }
                }
                byte if byte != b'\t' && is_control(byte) => {
                    return Err(self.error("Control characters are not allowed"));
                }
                byte => result.push(byte),
            }
        }

        self.decode_text(result)
    }

    // ========================================================================
    // Bare Values
    // ========================================================================

    /// Parse a boolean, number, datetime or symbol token.
    fn parse_bare_value(&mut self) -> Result<ValueType> {
        let first = self.input.get()?;
        if !is_word_byte(first) {
            return Err(self.error("Expected a value"));
        }

        let mut token = String::new();
        token.push(first as char);
        while let Some(byte) = self.input.peek()? {
            if !is_word_byte(byte) {
                break;
            }
            token.push(self.input.get()? as char);
        }

        match token.as_str() {
            "true" => {
                self.handler.boolean(true)?;
                return Ok(ValueType::Boolean);
            }
            "false" => {
                self.handler.boolean(false)?;
                return Ok(ValueType::Boolean);
            }
            _ => {}
        }

        if let Some(digits) = integer_literal(&token) {
            let value = digits
                .parse::<i64>()
                .map_err(|_| self.error("Integer out of range"))?;
            self.handler.integer(value)?;
            return Ok(ValueType::Integer);
        }

        if let Some(text) = float_literal(&token) {
            let value = text
                .parse::<f64>()
                .map_err(|_| self.error("Invalid floating point number"))?;
            self.handler.floating_point(value)?;
            return Ok(ValueType::FloatingPoint);
        }

        if is_datetime(&token) {
            self.handler.datetime(&token)?;
            return Ok(ValueType::Datetime);
        }

        if is_identifier(&token) {
            self.handler.symbol(&token)?;
            return Ok(ValueType::Symbol);
        }

        Err(self.error("Invalid value"))
    }
}

// ============================================================================
// Token Classification
// ============================================================================

fn split_sign(token: &str) -> (&str, &str) {
    match token.as_bytes().first() {
        Some(b'+' | b'-') => token.split_at(1),
        _ => ("", token),
    }
}

/// Remove `_` digit separators; each must sit between two digits.
fn strip_separators(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());

    for (i, &byte) in bytes.iter().enumerate() {
        if byte != b'_' {
            out.push(byte as char);
            continue;
        }
        let before = i.checked_sub(1).map(|j| bytes[j]);
        let after = bytes.get(i + 1).copied();
        if !(before.is_some_and(|b| b.is_ascii_digit()) && after.is_some_and(|b| b.is_ascii_digit()))
        {
            return None;
        }
    }

    Some(out)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Returns the token without separators if it is a decimal integer.
fn integer_literal(token: &str) -> Option<String> {
    let (sign, rest) = split_sign(token);
    let digits = strip_separators(rest)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}{}", sign, digits))
}

/// Returns the token without separators if it is a decimal float: digits
/// with an optional point (at least one digit on either side) and an
/// optional exponent.
fn float_literal(token: &str) -> Option<String> {
    let (sign, rest) = split_sign(token);
    let text = strip_separators(rest)?;
    let bytes = text.as_bytes();

    let int_digits = count_digits(bytes);
    let mut i = int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = count_digits(&bytes[i + 1..]);
        i += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_digits = count_digits(&bytes[i..]);
        if exp_digits == 0 {
            return None;
        }
        i += exp_digits;
    }

    if i != bytes.len() {
        return None;
    }
    Some(format!("{}{}", sign, text))
}

/// Consume fixed-width digit groups joined by `separator`.
fn take_digit_groups(rest: &mut &[u8], widths: &[usize], separator: u8) -> bool {
    for (n, &width) in widths.iter().enumerate() {
        if n > 0 {
            match rest.split_first() {
                Some((&byte, tail)) if byte == separator => *rest = tail,
                _ => return false,
            }
        }
        if rest.len() < width || count_digits(&rest[..width]) != width {
            return false;
        }
        *rest = &rest[width..];
    }
    true
}

/// `hh:mm:ss[.frac]`
fn take_time(rest: &mut &[u8]) -> bool {
    if !take_digit_groups(rest, &[2, 2, 2], b':') {
        return false;
    }
    if let Some((b'.', tail)) = rest.split_first() {
        let frac = count_digits(tail);
        if frac == 0 {
            return false;
        }
        *rest = &tail[frac..];
    }
    true
}

/// Lexical shape of an RFC 3339 date, time or date-time.
fn is_datetime(token: &str) -> bool {
    let mut rest = token.as_bytes();

    if !take_digit_groups(&mut rest, &[4, 2, 2], b'-') {
        // Local time only.
        let mut rest = token.as_bytes();
        return take_time(&mut rest) && rest.is_empty();
    }
    match rest.split_first() {
        None => return true,
        Some((b'T' | b't', tail)) => rest = tail,
        Some(_) => return false,
    }
    if !take_time(&mut rest) {
        return false;
    }

    match rest {
        [] | [b'Z' | b'z'] => true,
        [b'+' | b'-', tail @ ..] => {
            let mut offset = tail;
            take_digit_groups(&mut offset, &[2, 2], b':') && offset.is_empty()
        }
        _ => false,
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(token: &str) -> bool {
    let mut bytes = token.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {
            bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        _ => false,
    }
}
