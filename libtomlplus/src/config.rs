//! Flat configuration reader.
//!
//! [`ConfigReader`] keeps the scalars of a TOML+ document in a map from key
//! to [`TaggedValue`]. A symbol value copies whatever the named key holds at
//! that point in the document, so later reassignments of the source key do
//! not reach the copy.
//!
//! Only comments, strings, integers, floats, booleans and symbols are
//! supported. Tables, arrays of tables, arrays, inline tables and datetimes
//! are rejected with [`ParseError::HandlerRejected`].
//!
//! # Example
//!
//! ```
//! use libtomlplus::{read_config_str, TaggedValue};
//!
//! let configs = read_config_str("first = true\nsecond = first\nfirst = false").unwrap();
//! assert_eq!(configs["first"], TaggedValue::Boolean(false));
//! assert_eq!(configs["second"], TaggedValue::Boolean(true));
//! ```

use std::collections::BTreeMap;
use std::io::Read;

use crate::error::{Construct, ParseError, Result};
use crate::handler::Handler;
use crate::value::TaggedValue;

/// Handler that stores every `key = scalar` pair.
#[derive(Debug, Default)]
pub struct ConfigReader {
    configs: BTreeMap<String, TaggedValue>,
    /// Key of the next value.
    pending_key: String,
}

impl ConfigReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pairs read so far.
    pub fn configs(&self) -> &BTreeMap<String, TaggedValue> {
        &self.configs
    }

    pub fn into_configs(self) -> BTreeMap<String, TaggedValue> {
        self.configs
    }

    fn store(&mut self, value: TaggedValue) -> Result<()> {
        self.configs.insert(self.pending_key.clone(), value);
        Ok(())
    }
}

impl Handler for ConfigReader {
    fn start_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn finish_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn comment(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn key(&mut self, key: &str) -> Result<()> {
        self.pending_key = key.to_string();
        Ok(())
    }

    fn table(&mut self, _path: &[String]) -> Result<()> {
        Err(ParseError::unsupported(Construct::Table))
    }

    fn array_table(&mut self, _path: &[String]) -> Result<()> {
        Err(ParseError::unsupported(Construct::ArrayTable))
    }

    fn start_array(&mut self) -> Result<()> {
        Err(ParseError::unsupported(Construct::Array))
    }

    fn finish_array(&mut self, _len: usize) -> Result<()> {
        Err(ParseError::unsupported(Construct::Array))
    }

    fn start_inline_table(&mut self) -> Result<()> {
        Err(ParseError::unsupported(Construct::InlineTable))
    }

    fn finish_inline_table(&mut self, _len: usize) -> Result<()> {
        Err(ParseError::unsupported(Construct::InlineTable))
    }

    fn string(&mut self, value: &str) -> Result<()> {
        self.store(TaggedValue::from(value))
    }

    fn integer(&mut self, value: i64) -> Result<()> {
        self.store(TaggedValue::from(value))
    }

    fn floating_point(&mut self, value: f64) -> Result<()> {
        self.store(TaggedValue::from(value))
    }

    fn boolean(&mut self, value: bool) -> Result<()> {
        self.store(TaggedValue::from(value))
    }

    fn datetime(&mut self, _raw: &str) -> Result<()> {
        Err(ParseError::unsupported(Construct::Datetime))
    }

    fn symbol(&mut self, name: &str) -> Result<()> {
        let value = self
            .configs
            .get(name)
            .cloned()
            .ok_or_else(|| ParseError::undefined_identifier(name))?;
        self.store(value)
    }
}

/// Read the key/value pairs of a TOML+ document.
pub fn read_config<R: Read>(input: R) -> Result<BTreeMap<String, TaggedValue>> {
    let mut reader = ConfigReader::new();
    crate::parse(input, &mut reader)?;
    Ok(reader.into_configs())
}

/// Read the key/value pairs of a TOML+ document held in a string.
pub fn read_config_str(input: &str) -> Result<BTreeMap<String, TaggedValue>> {
    read_config(input.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, Rejection};

    #[test]
    fn test_scalars() {
        let configs =
            read_config_str("# settings\nname = \"app\"\nport = 8080\nratio = 0.5\ndebug = false")
                .unwrap();
        assert_eq!(configs.len(), 4);
        assert_eq!(configs["name"].as_text().unwrap(), "app");
        assert_eq!(configs["port"].as_integer::<i32>().unwrap(), 8080);
        assert_eq!(configs["ratio"].as_float::<f64>().unwrap(), 0.5);
        assert!(!configs["debug"].as_bool().unwrap());
    }

    #[test]
    fn test_symbol_copies_at_reference_time() {
        let configs = read_config_str("a = true\nb = a\na = false").unwrap();
        assert_eq!(configs["a"], TaggedValue::Boolean(false));
        assert_eq!(configs["b"], TaggedValue::Boolean(true));
    }

    #[test]
    fn test_symbol_overwrites_existing_key() {
        let configs = read_config_str("a = \"x\"\nb = 2\nb = a").unwrap();
        assert_eq!(configs["b"], TaggedValue::Text("x".into()));
    }

    #[test]
    fn test_undefined_symbol() {
        let err = read_config_str("b = undefined_name").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HandlerRejected);
        assert!(matches!(
            err,
            ParseError::HandlerRejected(Rejection::UndefinedIdentifier(ref name)) if name == "undefined_name"
        ));
    }

    #[test]
    fn test_reassignment_replaces() {
        let configs = read_config_str("a = 1\na = \"one\"").unwrap();
        assert_eq!(configs["a"], TaggedValue::from("one"));
    }

    #[test]
    fn test_unsupported_constructs() {
        let cases = [
            ("[table]", Construct::Table),
            ("[[items]]", Construct::ArrayTable),
            ("a = [1]", Construct::Array),
            ("a = { b = 1 }", Construct::InlineTable),
            ("a = 1979-05-27T07:32:00Z", Construct::Datetime),
        ];
        for (input, construct) in cases {
            let err = read_config_str(input).unwrap_err();
            assert!(
                matches!(err, ParseError::HandlerRejected(Rejection::Unsupported(c)) if c == construct),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn test_grammar_errors_pass_through() {
        let err = read_config_str("a = \"open").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEnd);
    }
}
