//! Error types for TOML+ parsing.
//!
//! Every failure the crate can report, from malformed bytes to a handler that
//! refuses a construct, is a [`ParseError`]. Callers that need to tell
//! "bad input" from "valid but unsupported input" match on [`ErrorKind`].

use std::fmt;
use std::io;

use thiserror::Error;

use crate::value::ValueKind;

/// Result type for TOML+ operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying the source name for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self, offset: usize) -> String {
        match &self.filename {
            Some(name) => format!(" at byte {} of <{}>", offset, name),
            None => format!(" at byte {}", offset),
        }
    }
}

/// Syntactically valid constructs a handler may refuse to support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    Table,
    ArrayTable,
    Array,
    InlineTable,
    Datetime,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Construct::Table => "table",
            Construct::ArrayTable => "array table",
            Construct::Array => "array",
            Construct::InlineTable => "inline table",
            Construct::Datetime => "datetime",
        };
        f.write_str(name)
    }
}

/// Why a handler rejected an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The handler does not implement this construct.
    #[error("Unsupported TOML expression: {0}")]
    Unsupported(Construct),

    /// A symbol value names a key that has not been defined yet.
    #[error("Identifier \"{0}\" on right hand side of =, but undefined")]
    UndefinedIdentifier(String),
}

/// Coarse error category, stable across message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedEnd,
    GrammarViolation,
    TypeMismatch,
    HandlerRejected,
    Io,
}

/// Error type for TOML+ parsing and value access.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The input ended where more bytes were required.
    #[error("Unexpected end of input{suffix}")]
    UnexpectedEnd { offset: usize, suffix: String },

    /// The bytes at `offset` do not match any production.
    #[error("{message}{suffix}")]
    Grammar {
        message: String,
        offset: usize,
        suffix: String,
    },

    /// A tagged value was read as a shape its discriminant does not allow.
    #[error("Expected {expected}, found {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },

    /// The handler refused a syntactically valid construct.
    #[error(transparent)]
    HandlerRejected(#[from] Rejection),

    /// The underlying reader failed.
    #[error("Read error: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    /// Create a grammar violation at a byte offset.
    pub fn grammar(message: impl Into<String>, offset: usize) -> Self {
        ParseError::Grammar {
            message: message.into(),
            offset,
            suffix: ParseContext::default().loc_suffix(offset),
        }
    }

    /// Create an end-of-input error at a byte offset.
    pub fn unexpected_end(offset: usize) -> Self {
        ParseError::UnexpectedEnd {
            offset,
            suffix: ParseContext::default().loc_suffix(offset),
        }
    }

    /// Shorthand for a handler refusing a construct.
    pub fn unsupported(construct: Construct) -> Self {
        ParseError::HandlerRejected(Rejection::Unsupported(construct))
    }

    /// Shorthand for a symbol naming an unknown key.
    pub fn undefined_identifier(name: &str) -> Self {
        ParseError::HandlerRejected(Rejection::UndefinedIdentifier(name.to_string()))
    }

    /// Re-render the location suffix with the context's source name.
    pub fn with_context(self, ctx: &ParseContext) -> Self {
        match self {
            ParseError::UnexpectedEnd { offset, .. } => ParseError::UnexpectedEnd {
                offset,
                suffix: ctx.loc_suffix(offset),
            },
            ParseError::Grammar {
                message, offset, ..
            } => ParseError::Grammar {
                message,
                offset,
                suffix: ctx.loc_suffix(offset),
            },
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnexpectedEnd { .. } => ErrorKind::UnexpectedEnd,
            ParseError::Grammar { .. } => ErrorKind::GrammarViolation,
            ParseError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            ParseError::HandlerRejected(_) => ErrorKind::HandlerRejected,
            ParseError::Io(_) => ErrorKind::Io,
        }
    }

    /// Byte offset of the offending character, for positional errors.
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedEnd { offset, .. } | ParseError::Grammar { offset, .. } => {
                Some(*offset)
            }
            _ => None,
        }
    }

    /// The human-readable message without the location suffix.
    pub fn message(&self) -> String {
        match self {
            ParseError::UnexpectedEnd { .. } => "Unexpected end of input".to_string(),
            ParseError::Grammar { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_display() {
        let err = ParseError::grammar("Expected new-line", 7);
        assert_eq!(err.to_string(), "Expected new-line at byte 7");
        assert_eq!(err.offset(), Some(7));
        assert_eq!(err.kind(), ErrorKind::GrammarViolation);
    }

    #[test]
    fn test_with_context_adds_filename() {
        let ctx = ParseContext::new(Some("app.toml"));
        let err = ParseError::unexpected_end(3).with_context(&ctx);
        assert_eq!(err.to_string(), "Unexpected end of input at byte 3 of <app.toml>");
        assert_eq!(err.message(), "Unexpected end of input");
    }

    #[test]
    fn test_rejection_messages() {
        let err = ParseError::undefined_identifier("nope");
        assert_eq!(err.kind(), ErrorKind::HandlerRejected);
        assert_eq!(
            err.to_string(),
            "Identifier \"nope\" on right hand side of =, but undefined"
        );
        assert_eq!(
            ParseError::unsupported(Construct::ArrayTable).to_string(),
            "Unsupported TOML expression: array table"
        );
        assert_eq!(ParseError::unsupported(Construct::Table).offset(), None);
    }
}
