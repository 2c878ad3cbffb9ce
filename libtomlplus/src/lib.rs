//! TOML+ parser implementation.
//!
//! TOML+ is a subset of TOML v0.4 in which a value may also be a bare
//! identifier naming a previously defined key:
//!
//! ```toml
//! first = true
//! second = first  # first = true,  second = true
//! first = false   # first = false, second = true
//! ```
//!
//! # Parsing Pipeline
//!
//! 1. **Stream**: A positioned byte stream with one byte of lookahead that
//!    counts consumed bytes for error offsets.
//!
//! 2. **Parser**: A recursive-descent walker that pushes one event per
//!    construct to a [`Handler`], without building a tree.
//!
//! 3. **Handler**: Caller code that accumulates events. [`ConfigReader`]
//!    builds a flat map of [`TaggedValue`]s and resolves symbol values;
//!    `Vec<ParseEvent>` records the raw event log.

// Conditional tracing macros
#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($arg:tt)*) => { ::tracing::trace!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use trace;

#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use debug;

mod config;
mod encode;
mod error;
mod handler;
mod parser;
mod stream;
mod value;

use std::io::Read;

pub use config::{read_config, read_config_str, ConfigReader};
pub use encode::escape_string;
pub use error::{Construct, ErrorKind, ParseContext, ParseError, Rejection, Result};
pub use handler::{Handler, ParseEvent};
pub use parser::{Parser, MAX_NESTING_DEPTH};
pub use stream::PositionedStream;
pub use value::{FloatShape, IntegerShape, TaggedValue, ValueKind};

/// Parse a TOML+ document from a reader, reporting events to `handler`.
///
/// Wrap files in a [`std::io::BufReader`]; the parser reads one byte at a
/// time.
///
/// # Example
///
/// ```
/// use libtomlplus::{parse, ParseEvent};
///
/// let mut events: Vec<ParseEvent> = Vec::new();
/// parse(&b"enabled = true"[..], &mut events).unwrap();
/// assert_eq!(events[2], ParseEvent::Boolean(true));
/// ```
pub fn parse<R: Read, H: Handler + ?Sized>(input: R, handler: &mut H) -> Result<()> {
    parse_with_filename(input, None, handler)
}

/// Parse a TOML+ document with a source name for error messages.
pub fn parse_with_filename<R: Read, H: Handler + ?Sized>(
    input: R,
    filename: Option<&str>,
    handler: &mut H,
) -> Result<()> {
    let ctx = ParseContext::new(filename);
    Parser::new(input, handler)
        .parse()
        .map_err(|err| err.with_context(&ctx))
}

/// Parse a TOML+ document held in a string.
pub fn parse_str<H: Handler + ?Sized>(input: &str, handler: &mut H) -> Result<()> {
    parse(input.as_bytes(), handler)
}
