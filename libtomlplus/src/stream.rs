//! Positional byte stream.
//!
//! Wraps any [`Read`] source and hands the parser one byte at a time with a
//! single byte of lookahead. The stream counts consumed bytes so that errors
//! can point at the exact offset of the character that caused them.

use std::io::{Bytes, Read};

use crate::error::{ParseError, Result};

/// Single-byte lookahead over a reader.
pub struct PositionedStream<R> {
    bytes: Bytes<R>,
    /// Next unconsumed byte, once fetched.
    lookahead: Option<u8>,
    at_end: bool,
    processed: usize,
}

impl<R: Read> PositionedStream<R> {
    /// Create a stream positioned before the first byte of `source`.
    pub fn new(source: R) -> Self {
        Self {
            bytes: source.bytes(),
            lookahead: None,
            at_end: false,
            processed: 0,
        }
    }

    /// Return the next unconsumed byte without advancing, or `None` at end.
    pub fn peek(&mut self) -> Result<Option<u8>> {
        if self.lookahead.is_none() && !self.at_end {
            match self.bytes.next() {
                Some(byte) => self.lookahead = Some(byte?),
                None => self.at_end = true,
            }
        }
        Ok(self.lookahead)
    }

    /// Consume and return the next byte.
    pub fn get(&mut self) -> Result<u8> {
        match self.peek()? {
            Some(byte) => {
                self.lookahead = None;
                self.processed += 1;
                Ok(byte)
            }
            None => Err(ParseError::unexpected_end(self.processed)),
        }
    }

    /// Whether no further bytes remain.
    pub fn eof(&mut self) -> Result<bool> {
        Ok(self.peek()?.is_none())
    }

    /// Number of bytes consumed so far.
    pub fn processed(&self) -> usize {
        self.processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_peek_is_stable() {
        let mut stream = PositionedStream::new(&b"ab"[..]);
        assert_eq!(stream.peek().unwrap(), Some(b'a'));
        assert_eq!(stream.peek().unwrap(), Some(b'a'));
        assert_eq!(stream.processed(), 0);
        assert_eq!(stream.get().unwrap(), b'a');
        assert_eq!(stream.peek().unwrap(), Some(b'b'));
        assert_eq!(stream.processed(), 1);
    }

    #[test]
    fn test_get_past_end() {
        let mut stream = PositionedStream::new(&b"x"[..]);
        assert!(!stream.eof().unwrap());
        assert_eq!(stream.get().unwrap(), b'x');
        assert!(stream.eof().unwrap());
        assert_eq!(stream.peek().unwrap(), None);

        let err = stream.get().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEnd);
        assert_eq!(err.offset(), Some(1));
        assert_eq!(stream.processed(), 1);
    }

    #[test]
    fn test_empty_source() {
        let mut stream = PositionedStream::new(std::io::empty());
        assert!(stream.eof().unwrap());
        assert!(stream.get().is_err());
    }
}
