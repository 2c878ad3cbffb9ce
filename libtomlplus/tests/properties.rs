//! Property tests for string escapes, number literals and symbols.

use proptest::prelude::*;

use libtomlplus::{escape_string, parse, read_config_str, ParseEvent, TaggedValue};

fn finite_f64() -> impl Strategy<Value = f64> {
    use proptest::num::f64;
    f64::POSITIVE | f64::NEGATIVE | f64::NORMAL | f64::SUBNORMAL | f64::ZERO
}

/// Names that classify as symbols rather than booleans.
fn identifier() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}".prop_filter("reserved", |s| !matches!(s.as_str(), "true" | "false" | "alias"))
}

proptest! {
    #[test]
    fn escaped_strings_read_back(s in any::<String>()) {
        let document = format!("key = \"{}\"", escape_string(&s));
        let configs = read_config_str(&document).unwrap();
        prop_assert_eq!(&configs["key"], &TaggedValue::Text(s));
    }

    #[test]
    fn integers_read_back(n in any::<i64>()) {
        let configs = read_config_str(&format!("n = {}", n)).unwrap();
        prop_assert_eq!(configs["n"].as_integer::<i64>().unwrap(), n);
        prop_assert_eq!(configs["n"].as_float::<f64>().unwrap(), n as f64);
    }

    #[test]
    fn rendered_floats_read_back(x in finite_f64()) {
        let value = TaggedValue::Float(x);
        let configs = read_config_str(&format!("x = {}", value)).unwrap();
        prop_assert_eq!(configs["x"].as_float::<f64>().unwrap(), x);
    }

    #[test]
    fn symbols_copy_current_value(name in identifier(), n in any::<i64>()) {
        let document = format!("{name} = {n}\nalias = {name}\n{name} = \"changed\"");
        let configs = read_config_str(&document).unwrap();
        prop_assert_eq!(&configs["alias"], &TaggedValue::Integer(n));
    }

    #[test]
    fn arbitrary_input_never_panics(input in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut events: Vec<ParseEvent> = Vec::new();
        match parse(input.as_slice(), &mut events) {
            Ok(()) => {
                prop_assert_eq!(events.first(), Some(&ParseEvent::StartDocument));
                prop_assert_eq!(events.last(), Some(&ParseEvent::FinishDocument));
            }
            Err(err) => {
                prop_assert!(err.offset().is_some_and(|offset| offset <= input.len()));
                prop_assert!(!events.contains(&ParseEvent::FinishDocument));
            }
        }
    }
}
