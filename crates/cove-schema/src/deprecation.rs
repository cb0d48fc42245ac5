//! # Deprecation Notices
//!
//! A schema author marks a field deprecated in one of three ways. They are
//! checked in this order and the first match wins:
//!
//! 1. A structured object, as used by the open-data standards Cove targets:
//!
//!    ```json
//!    "deprecated": {"deprecatedVersion": "1.1", "description": "Not a useful field"}
//!    ```
//!
//! 2. A notice embedded in the `description` text, following the grammar
//!
//!    ```text
//!    notice      := "[" ws* "deprecated" ws+ ( "in" ws+ )? version ws* "]" ws* ":"? explanation
//!    version     := digits ( "." digits )*
//!    explanation := the remaining text, trimmed
//!    ```
//!
//!    `deprecated` and `in` match case-insensitively. The notice may appear
//!    anywhere in the description, e.g.
//!    `"Item quantity. [Deprecated in 1.1] Nobody cares about quantities"`.
//!
//! 3. A boolean `"deprecated": true` (JSON Schema 2019-09 annotation). The
//!    version is empty and the explanation is the node's description.

use serde::Serialize;
use serde_json::Value;

/// When and why a field was deprecated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Deprecation {
    /// Version of the standard that deprecated the field.
    pub version: String,
    /// Why the field should no longer be used.
    pub explanation: String,
}

impl Deprecation {
    /// Construct from borrowed parts.
    pub fn new(version: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            explanation: explanation.into(),
        }
    }

    /// `(version, explanation)` as a tuple, the historical report shape.
    pub fn as_pair(&self) -> (&str, &str) {
        (&self.version, &self.explanation)
    }
}

/// The deprecation declared directly on a schema node, if any.
pub fn from_node(node: &Value) -> Option<Deprecation> {
    let obj = node.as_object()?;
    let description = obj.get("description").and_then(Value::as_str);

    match obj.get("deprecated") {
        Some(Value::Object(notice)) => {
            let version = notice
                .get("deprecatedVersion")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let explanation = notice
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            return Some(Deprecation::new(version, explanation));
        }
        Some(Value::Bool(true)) => {
            if let Some(parsed) = description.and_then(parse_notice) {
                return Some(parsed);
            }
            return Some(Deprecation::new("", description.unwrap_or_default()));
        }
        _ => {}
    }

    description.and_then(parse_notice)
}

/// Find a deprecation notice in free text. See the module docs for the grammar.
pub fn parse_notice(text: &str) -> Option<Deprecation> {
    text.match_indices('[')
        .find_map(|(start, _)| parse_notice_at(&text[start..]))
}

fn parse_notice_at(s: &str) -> Option<Deprecation> {
    let mut cursor = Cursor::new(s);
    cursor.expect_char('[')?;
    cursor.skip_ws();
    cursor.expect_word("deprecated")?;
    if cursor.skip_ws() == 0 {
        return None;
    }
    if cursor.peek_word("in") {
        let save = cursor.pos;
        cursor.expect_word("in")?;
        if cursor.skip_ws() == 0 {
            cursor.pos = save;
        }
    }
    let version = cursor.version()?;
    cursor.skip_ws();
    cursor.expect_char(']')?;
    cursor.skip_ws();
    if cursor.rest().starts_with(':') {
        cursor.pos += 1;
    }
    Some(Deprecation::new(version, cursor.rest().trim()))
}

struct Cursor<'t> {
    text: &'t str,
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn new(text: &'t str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'t str {
        &self.text[self.pos..]
    }

    fn expect_char(&mut self, c: char) -> Option<()> {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            Some(())
        } else {
            None
        }
    }

    fn peek_word(&self, word: &str) -> bool {
        self.rest()
            .get(..word.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(word))
    }

    fn expect_word(&mut self, word: &str) -> Option<()> {
        if self.peek_word(word) {
            self.pos += word.len();
            Some(())
        } else {
            None
        }
    }

    fn skip_ws(&mut self) -> usize {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        let skipped = rest.len() - trimmed.len();
        self.pos += skipped;
        skipped
    }

    /// `digits ( "." digits )*`
    fn version(&mut self) -> Option<&'t str> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut end = 0;
        let mut expect_digit = true;
        while end < bytes.len() {
            let b = bytes[end];
            if b.is_ascii_digit() {
                expect_digit = false;
            } else if b == b'.' && !expect_digit {
                // A dot must be followed by another digit run.
                if !bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
                    break;
                }
                expect_digit = true;
            } else {
                break;
            }
            end += 1;
        }
        if end == 0 || expect_digit {
            return None;
        }
        self.pos += end;
        Some(&rest[..end])
    }
}
