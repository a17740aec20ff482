//! Locating a JSON object inside free-form generated text.

use serde_json::{Map, Value};

/// Backend output after parsing: either a JSON object or nothing usable.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedOutput {
    Parsed(Map<String, Value>),
    Unparsable,
}

impl GeneratedOutput {
    pub fn from_text(text: &str) -> Self {
        parse_generated(text)
    }

    /// Objects are parsed; every other JSON value is unparsable.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => GeneratedOutput::Parsed(map),
            _ => GeneratedOutput::Unparsable,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, GeneratedOutput::Parsed(_))
    }
}

/// Greedy span from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// First brace-balanced span, ignoring braces inside string literals.
///
/// One pass from the first `{`: if that brace closes, its span wins.
/// Otherwise the earliest-opened pair that did close is the answer, since
/// closed pairs are either nested or disjoint.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut open = Vec::new();
    let mut earliest: Option<(usize, usize)> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in text.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => open.push(i),
            b'}' => {
                let Some(opened) = open.pop() else {
                    continue;
                };
                if opened == start {
                    return Some(&text[start..=i]);
                }
                if !matches!(earliest, Some((first, _)) if first < opened) {
                    earliest = Some((opened, i));
                }
            }
            _ => {}
        }
    }
    earliest.map(|(from, to)| &text[from..=to])
}

/// Parse generated text into an object: the whole text, then the greedy
/// span, then the first balanced span.
pub fn parse_generated(text: &str) -> GeneratedOutput {
    let candidates = [
        Some(text.trim()),
        extract_json_object(text),
        first_balanced_object(text),
    ];
    for candidate in candidates.into_iter().flatten() {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
            return GeneratedOutput::Parsed(map);
        }
    }
    GeneratedOutput::Unparsable
}
