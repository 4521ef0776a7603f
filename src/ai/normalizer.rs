use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{AiError, Result};

/// Expected top-level JSON shape of a model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Array,
    Object,
}

impl Shape {
    fn delimiters(self) -> (char, char) {
        match self {
            Shape::Array => ('[', ']'),
            Shape::Object => ('{', '}'),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Shape::Array => "JSON array",
            Shape::Object => "JSON object",
        }
    }
}

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z]*").unwrap());

/// Coerce a raw model response into parsed JSON.
///
/// Generation services routinely wrap structured output in prose or Markdown
/// fences despite instructions not to. Cleaning strips fence markers and
/// typographic quotes, then the text is parsed as-is; if that fails, the first
/// balanced `[...]` or `{...}` substring (per `shape`) is extracted and parsed
/// instead. Extraction is a best-effort boundary, not a general parser.
pub fn normalize(raw: &str, shape: Shape) -> Result<Value> {
    let cleaned = clean_response_text(raw);

    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => return Ok(value),
        Err(e) => debug!("Direct JSON parse failed, trying extraction: {}", e),
    }

    let candidate = extract_balanced(&cleaned, shape).ok_or_else(|| {
        AiError::MalformedResponse(format!("no balanced {} found in response", shape.describe()))
    })?;

    serde_json::from_str(candidate).map_err(|e| {
        AiError::MalformedResponse(format!("extracted {} did not parse: {}", shape.describe(), e))
    })
}

fn clean_response_text(raw: &str) -> String {
    let without_fences = CODE_FENCE.replace_all(raw, "");
    without_fences
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .trim()
        .to_string()
}

/// Find the first bracket-balanced substring of the requested shape. String
/// literals are skipped so delimiters inside quoted text do not affect depth.
fn extract_balanced(text: &str, shape: Shape) -> Option<&str> {
    let (open, close) = shape.delimiters();
    let start = text.find(open)?;

    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
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

        if c == '"' {
            in_string = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(&text[start..start + offset + c.len_utf8()]);
            }
        }
    }

    None
}
