//! The event interface the parser drives.
//!
//! The parser never builds a document tree. It calls one [`Handler`] method
//! per structural or scalar event, in source order, and the handler decides
//! what to keep. A `key` event is always followed by the events of exactly
//! one value; pairing them up is the handler's job.
//!
//! # Example
//!
//! ```
//! use libtomlplus::{parse_str, ParseEvent};
//!
//! let mut events: Vec<ParseEvent> = Vec::new();
//! parse_str("answer = 42", &mut events).unwrap();
//! assert_eq!(
//!     events,
//!     vec![
//!         ParseEvent::StartDocument,
//!         ParseEvent::Key("answer".to_string()),
//!         ParseEvent::Integer(42),
//!         ParseEvent::FinishDocument,
//!     ]
//! );
//! ```

use crate::error::Result;

/// Receiver of parse events.
///
/// Every method is required. A handler that cannot represent a construct
/// should return [`ParseError::HandlerRejected`](crate::ParseError) rather
/// than silently dropping it; the parser aborts and propagates the error.
pub trait Handler {
    fn start_document(&mut self) -> Result<()>;
    fn finish_document(&mut self) -> Result<()>;

    /// Comment text after the `#`, up to the end of the line.
    fn comment(&mut self, text: &str) -> Result<()>;

    /// Key of the next value.
    fn key(&mut self, key: &str) -> Result<()>;

    /// `[a.b.c]` header.
    fn table(&mut self, path: &[String]) -> Result<()>;

    /// `[[a.b.c]]` header; appends one table to the array at `path`.
    fn array_table(&mut self, path: &[String]) -> Result<()>;

    fn start_array(&mut self) -> Result<()>;

    /// Closes the innermost array; `len` is its element count.
    fn finish_array(&mut self, len: usize) -> Result<()>;

    fn start_inline_table(&mut self) -> Result<()>;

    /// Closes the innermost inline table; `len` is its pair count.
    fn finish_inline_table(&mut self, len: usize) -> Result<()>;

    fn string(&mut self, value: &str) -> Result<()>;
    fn integer(&mut self, value: i64) -> Result<()>;
    fn floating_point(&mut self, value: f64) -> Result<()>;
    fn boolean(&mut self, value: bool) -> Result<()>;

    /// Raw datetime token; its value is not interpreted.
    fn datetime(&mut self, raw: &str) -> Result<()>;

    /// Bare identifier in value position, naming a previously set key.
    fn symbol(&mut self, name: &str) -> Result<()>;
}

/// An owned copy of one handler call.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    StartDocument,
    FinishDocument,
    Comment(String),
    Key(String),
    Table(Vec<String>),
    ArrayTable(Vec<String>),
    StartArray,
    FinishArray(usize),
    StartInlineTable,
    FinishInlineTable(usize),
    String(String),
    Integer(i64),
    FloatingPoint(f64),
    Boolean(bool),
    Datetime(String),
    Symbol(String),
}

/// Records every event in order.
impl Handler for Vec<ParseEvent> {
    fn start_document(&mut self) -> Result<()> {
        self.push(ParseEvent::StartDocument);
        Ok(())
    }

    fn finish_document(&mut self) -> Result<()> {
        self.push(ParseEvent::FinishDocument);
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        self.push(ParseEvent::Comment(text.to_string()));
        Ok(())
    }

    fn key(&mut self, key: &str) -> Result<()> {
        self.push(ParseEvent::Key(key.to_string()));
        Ok(())
    }

    fn table(&mut self, path: &[String]) -> Result<()> {
        self.push(ParseEvent::Table(path.to_vec()));
        Ok(())
    }

    fn array_table(&mut self, path: &[String]) -> Result<()> {
        self.push(ParseEvent::ArrayTable(path.to_vec()));
        Ok(())
    }

    fn start_array(&mut self) -> Result<()> {
        self.push(ParseEvent::StartArray);
        Ok(())
    }

    fn finish_array(&mut self, len: usize) -> Result<()> {
        self.push(ParseEvent::FinishArray(len));
        Ok(())
    }

    fn start_inline_table(&mut self) -> Result<()> {
        self.push(ParseEvent::StartInlineTable);
        Ok(())
    }

    fn finish_inline_table(&mut self, len: usize) -> Result<()> {
        self.push(ParseEvent::FinishInlineTable(len));
        Ok(())
    }

    fn string(&mut self, value: &str) -> Result<()> {
        self.push(ParseEvent::String(value.to_string()));
        Ok(())
    }

    fn integer(&mut self, value: i64) -> Result<()> {
        self.push(ParseEvent::Integer(value));
        Ok(())
    }

    fn floating_point(&mut self, value: f64) -> Result<()> {
        self.push(ParseEvent::FloatingPoint(value));
        Ok(())
    }

    fn boolean(&mut self, value: bool) -> Result<()> {
        self.push(ParseEvent::Boolean(value));
        Ok(())
    }

    fn datetime(&mut self, raw: &str) -> Result<()> {
        self.push(ParseEvent::Datetime(raw.to_string()));
        Ok(())
    }

    fn symbol(&mut self, name: &str) -> Result<()> {
        self.push(ParseEvent::Symbol(name.to_string()));
        Ok(())
    }
}
