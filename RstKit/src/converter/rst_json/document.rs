//! JSON document shape for string tables
//!
//! ```json
//! {
//!     "version": "v5-patch1502",
//!     "config": "only for v2 tables with a font config",
//!     "entries": {
//!         "game_item_name": "Sword",
//!         "7d889f6da3": "entry without a known name",
//!         "{7d889f6da3}": "braced hex is accepted on input"
//!     }
//! }
//! ```

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::formats::rst::HashAlgorithm;

/// Serialized form of a string table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RstJsonDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,

    #[serde(default)]
    pub entries: Option<IndexMap<String, String>>,
}

/// Parse an entry key into a hash.
///
/// `{hex}` and bare `hex` keys are read as hashes; any other key is an
/// entry name and is hashed with `algorithm`.
pub fn parse_key(key: &str, algorithm: HashAlgorithm) -> Result<u64> {
    if let Some(inner) = key.strip_prefix('{').and_then(|k| k.strip_suffix('}')) {
        return parse_hex(inner)
            .ok_or_else(|| Error::InvalidFormat(format!("invalid hex key: {key}")));
    }
    if let Some(hash) = parse_hex(key) {
        return Ok(hash);
    }
    if key.is_empty() {
        return Err(Error::InvalidArgument("entry key must not be empty".into()));
    }
    Ok(algorithm.hash(key))
}

fn parse_hex(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(s, 16).ok()
}

/// Key written for an entry.
///
/// Resolved names are written as is unless they would read back as hex,
/// in which case the hash is written instead. Unresolved keys are bare
/// lower-case hex.
#[must_use]
pub fn format_key(hash: u64, name: Option<&str>) -> Cow<'_, str> {
    match name {
        Some(name) if !name.is_empty() && parse_hex(name).is_none() && !is_braced(name) => {
            Cow::Borrowed(name)
        }
        _ => Cow::Owned(format!("{hash:x}")),
    }
}

fn is_braced(name: &str) -> bool {
    name.starts_with('{') && name.ends_with('}')
}

/// Blank out `//` and `/* */` comments outside string literals.
///
/// Comment bytes are replaced with spaces (newlines are kept) so error
/// positions reported by the JSON parser still line up with the input.
#[must_use]
pub fn strip_comments(text: &str) -> Cow<'_, str> {
    if !text.contains("//") && !text.contains("/*") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                out.push_str("  ");
                chars.next();
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    out.push(' ');
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                out.push_str("  ");
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    out.push(if next == '\n' { '\n' } else { ' ' });
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_forms() {
        let algorithm = HashAlgorithm::XXHASH3_38;
        assert_eq!(parse_key("{155c62dcfd}", algorithm).unwrap(), 0x155c62dcfd);
        assert_eq!(parse_key("155c62dcfd", algorithm).unwrap(), 0x155c62dcfd);
        assert_eq!(parse_key("hello", algorithm).unwrap(), 0x155c62dcfd);
        assert!(matches!(parse_key("{xyz}", algorithm), Err(Error::InvalidFormat(_))));
        assert!(matches!(parse_key("", algorithm), Err(Error::InvalidArgument(_))));
        // `+` prefixed keys are names, not hex
        assert_eq!(parse_key("+1", algorithm).unwrap(), algorithm.hash("+1"));
    }

    #[test]
    fn test_format_key() {
        assert_eq!(format_key(0xabc, Some("menu_title")), "menu_title");
        assert_eq!(format_key(0xabc, None), "abc");
        // Names that look like hex would not read back as the same key
        assert_eq!(format_key(0xabc, Some("beef")), "abc");
        assert_eq!(format_key(0xabc, Some("{x}")), "abc");
    }

    #[test]
    fn test_strip_comments() {
        let text = "{\n// line\n\"a\": \"x // not a comment\", /* block\n */ \"b\": \"/*y*/\"\n}";
        let stripped = strip_comments(text);
        let value: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], "x // not a comment");
        assert_eq!(value["b"], "/*y*/");
        assert_eq!(stripped.lines().count(), text.lines().count());
    }

    #[test]
    fn test_strip_comments_escaped_quote() {
        let text = r#"{"a": "say \"hi\" // still string"} // trailing"#;
        let stripped = strip_comments(text);
        let value: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], "say \"hi\" // still string");
    }
}
