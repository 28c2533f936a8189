//! Response extraction. Recovers a JSON payload from model output that may be
//! wrapped in prose or markdown code fences.

use serde_json::Value;

use crate::llm_client::error::GenerationError;

/// A parsed JSON payload and the slice of the response it came from.
#[derive(Debug, Clone)]
pub struct ExtractedPayload {
    pub json: Value,
    pub source_span: String,
}

/// Extracts the first JSON object (or, failing that, array) from `raw`.
///
/// Order: direct parse of the unfenced text, balanced `{…}` scan, greedy
/// first-`{`-to-last-`}` span, balanced `[…]` scan (tried first when the text
/// opens an array before any object). Fences are stripped first.
pub fn extract(raw: &str) -> Result<ExtractedPayload, GenerationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::Malformed("response was empty".to_string()));
    }

    let unfenced = strip_json_fences(trimmed);

    let mut sources = vec![unfenced];
    if unfenced != trimmed {
        sources.push(trimmed);
    }

    for text in &sources {
        if let Some(payload) = parse_structured(text) {
            return Ok(payload);
        }
    }

    for text in &sources {
        // A payload that opens with `[` is an array of objects; don't pick out its first element.
        let array_first = match (text.find('['), text.find('{')) {
            (Some(a), Some(o)) => a < o,
            (Some(_), None) => true,
            _ => false,
        };
        if array_first {
            if let Some(payload) = balanced_span(text, '[', ']') {
                return Ok(payload);
            }
        }
        if let Some(payload) = balanced_span(text, '{', '}') {
            return Ok(payload);
        }
        if let Some(payload) = greedy_object_span(text) {
            return Ok(payload);
        }
        if let Some(payload) = balanced_span(text, '[', ']') {
            return Ok(payload);
        }
    }

    Err(GenerationError::Malformed(
        "no JSON object found in response".to_string(),
    ))
}

/// Returns the contents of the first fenced code block (```json … ``` or ``` … ```),
/// or the input unchanged when there is no fence.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(open) = text.find("```") else {
        return text;
    };

    let after_open = &text[open + 3..];
    // Skip the info string (`json`, `JSON`, …) up to the end of the fence line.
    let body_start = match after_open.find('\n') {
        Some(nl) if after_open[..nl].trim().chars().all(|c| c.is_ascii_alphanumeric()) => nl + 1,
        _ => after_open
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(after_open.len()),
    };
    let body = &after_open[body_start..];

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

fn parse_structured(text: &str) -> Option<ExtractedPayload> {
    let json: Value = serde_json::from_str(text).ok()?;
    (json.is_object() || json.is_array()).then(|| ExtractedPayload {
        json,
        source_span: text.to_string(),
    })
}

/// Tries every `open` position in order and returns the first balanced span
/// that parses. Brackets inside string literals are ignored.
fn balanced_span(text: &str, open: char, close: char) -> Option<ExtractedPayload> {
    text.match_indices(open)
        .filter_map(|(start, _)| matching_close(&text[start..], open, close).map(|len| &text[start..start + len]))
        .find_map(parse_structured)
}

/// Byte length of the span starting at `text[0] == open` through its matching `close`.
fn matching_close(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

fn greedy_object_span(text: &str) -> Option<ExtractedPayload> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end)
        .then(|| &text[start..=end])
        .and_then(parse_structured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "headlines": ["One", "Two {braces} inside", "Three \"quoted\""],
            "analysis": { "tone": "warm", "impact": "high", "nested": { "n": [1, 2, 3] } }
        })
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_inline_tag() {
        let input = "```json{\"key\": 1}```";
        assert_eq!(strip_json_fences(input), "{\"key\": 1}");
    }

    #[test]
    fn test_bare_json_round_trips() {
        let original = sample();
        let payload = extract(&serde_json::to_string(&original).unwrap()).unwrap();
        assert_eq!(payload.json, original);
    }

    #[test]
    fn test_fenced_json_inside_prose_round_trips() {
        let original = sample();
        let raw = format!(
            "Sure! Here is what you asked for:\n```json\n{}\n```\nLet me know if you need more.",
            serde_json::to_string_pretty(&original).unwrap()
        );
        let payload = extract(&raw).unwrap();
        assert_eq!(payload.json, original);
    }

    #[test]
    fn test_prose_preamble_without_fence() {
        let original = sample();
        let raw = format!(
            "Here is the analysis you requested: {} Hope that helps!",
            serde_json::to_string(&original).unwrap()
        );
        let payload = extract(&raw).unwrap();
        assert_eq!(payload.json, original);
        assert!(payload.source_span.starts_with('{'));
        assert!(payload.source_span.ends_with('}'));
    }

    #[test]
    fn test_skips_brace_noise_before_real_object() {
        let raw = "Template {placeholder} ignored. Result: {\"a\": 1}";
        let payload = extract(raw).unwrap();
        assert_eq!(payload.json, json!({ "a": 1 }));
    }

    #[test]
    fn test_top_level_array_is_accepted() {
        let raw = "Variations below\n[{\"content\": \"x\", \"hashtags\": []}]";
        let payload = extract(raw).unwrap();
        assert!(payload.json.is_array());
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = extract("not json at all").unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[test]
    fn test_empty_response_is_malformed() {
        assert!(matches!(extract("   \n"), Err(GenerationError::Malformed(_))));
    }

    #[test]
    fn test_scalar_json_is_rejected() {
        assert!(matches!(extract("42"), Err(GenerationError::Malformed(_))));
    }

    #[test]
    fn test_unbalanced_object_is_malformed() {
        assert!(matches!(
            extract("{\"headlines\": [\"a\", \"b\""),
            Err(GenerationError::Malformed(_))
        ));
    }
}
