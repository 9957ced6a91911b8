//! Pulling a JSON payload out of free-form model output
//!
//! Models wrap JSON in code fences, add a sentence before or after it, or
//! mention a stray `[1]` or a tag list in the preamble. We collect every
//! balanced top-level `{...}` / `[...]` segment, try objects before arrays
//! in order of appearance, and keep the first one that actually
//! deserializes into the requested type.

use aurora_common::{AuroraError, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```json\n?|```").unwrap());

/// Remove code fence markers and surrounding whitespace
pub fn strip_fences(text: &str) -> String {
    FENCE.replace_all(text, "").trim().to_string()
}

/// Top-level balanced object/array segments, in order of appearance
fn balanced_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut stack: Vec<char> = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if stack.is_empty() {
            if c == '{' || c == '[' {
                start = i;
                stack.push(c);
            }
            continue;
        }

        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' | '[' => stack.push(c),
            '}' | ']' => {
                let opener = if c == '}' { '{' } else { '[' };
                if stack.last() == Some(&opener) {
                    stack.pop();
                    if stack.is_empty() {
                        segments.push(&text[start..i + c.len_utf8()]);
                    }
                } else {
                    // Mismatched close: abandon this segment
                    stack.clear();
                }
            }
            _ => {}
        }
    }
    segments
}

/// First `{`..last `}` unless a `[` comes first, else first `[`..last `]`
fn outer_slice(text: &str) -> Option<&str> {
    let first_brace = text.find('{');
    let first_bracket = text.find('[');
    let last_brace = text.rfind('}');
    let last_bracket = text.rfind(']');

    if let (Some(fb), Some(lb)) = (first_brace, last_brace) {
        if lb > fb && first_bracket.is_none_or(|bk| fb < bk) {
            return Some(&text[fb..=lb]);
        }
    }
    if let (Some(fb), Some(lb)) = (first_bracket, last_bracket) {
        if lb > fb {
            return Some(&text[fb..=lb]);
        }
    }
    None
}

/// Locate and parse the JSON value of type `T` inside model output
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let cleaned = strip_fences(text);

    let (mut candidates, arrays): (Vec<&str>, Vec<&str>) = balanced_segments(&cleaned)
        .into_iter()
        .partition(|segment| segment.starts_with('{'));
    candidates.extend(arrays);
    candidates.extend(outer_slice(&cleaned));
    candidates.push(&cleaned);

    let mut last_error = None;
    for candidate in candidates {
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }

    Err(AuroraError::ai(match last_error {
        Some(e) => format!("无法解析 AI 返回的 JSON: {}", e),
        None => "AI 返回内容为空".to_string(),
    }))
}
