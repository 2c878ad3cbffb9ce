//! String escaping for rendered values and diagnostics.

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Escape a string so it can be embedded between double quotes.
///
/// Backslash, double quote, backspace, tab, carriage return and newline get
/// their two-character escapes; other control bytes become `\u00xx`.
pub fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\x08' => result.push_str("\\b"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\n' => result.push_str("\\n"),
            c if (c as u32) < 0x20 => {
                let byte = c as u8;
                result.push_str("\\u00");
                result.push(HEX_DIGITS[usize::from(byte >> 4)] as char);
                result.push(HEX_DIGITS[usize::from(byte & 0x0f)] as char);
            }
            c => result.push(c),
        }
    }
    result
}

/// Render a single byte for an error message.
pub(crate) fn escape_byte(byte: u8) -> String {
    match byte {
        b'\\' => "\\\\".to_string(),
        b'\'' => "\\'".to_string(),
        b'"' => "\\\"".to_string(),
        0x08 => "\\b".to_string(),
        b'\t' => "\\t".to_string(),
        b'\r' => "\\r".to_string(),
        b'\n' => "\\n".to_string(),
        0x20..=0x7e => (byte as char).to_string(),
        _ => format!("\\x{:02x}", byte),
    }
}
