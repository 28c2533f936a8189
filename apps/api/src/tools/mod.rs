// Content tools: each one describes itself as a `StructuredTask` and lets the
// generation client do the rest.

pub mod analyzer;
pub mod article;
pub mod catalog;
pub mod fallback;
pub mod handlers;
pub mod hashtags;
pub mod headlines;
pub mod keywords;
pub mod prompt_builder;
pub mod prompts;
pub mod rephraser;
pub mod social;
pub mod summarizer;

use serde_json::Value;

/// Average adult reading speed used for reading-time estimates.
pub const WORDS_PER_MINUTE: usize = 200;

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Whole minutes needed to read `words`, rounded up.
pub fn reading_minutes(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE)
}

// ────────────────────────────────────────────────────────────────────────────
// Shape coercion shared by tool normalizers
// ────────────────────────────────────────────────────────────────────────────

/// Accepts a list, a comma/newline separated string, or a single value, and
/// returns a list of trimmed, non-empty strings.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split([',', '\n'])
            .map(|part| part.trim().trim_start_matches(['-', '*', '•']).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Numbers pass through; numeric strings (`"85"`, `"2.5%"`) are parsed.
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// Rewrites the value at `key` in place with `f`, when present.
pub fn rewrite(json: &mut Value, key: &str, f: impl FnOnce(&Value) -> Value) {
    if let Some(slot) = json.get_mut(key) {
        *slot = f(slot);
    }
}

/// Moves the first present alias onto `canonical` when `canonical` is absent.
pub fn alias(json: &mut Value, canonical: &str, aliases: &[&str]) {
    let Some(map) = json.as_object_mut() else {
        return;
    };
    if map.get(canonical).is_some_and(|v| !v.is_null()) {
        return;
    }
    for name in aliases {
        if let Some(value) = map.remove(*name) {
            map.insert(canonical.to_string(), value);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reading_minutes_rounds_up() {
        assert_eq!(reading_minutes(0), 0);
        assert_eq!(reading_minutes(1), 1);
        assert_eq!(reading_minutes(200), 1);
        assert_eq!(reading_minutes(201), 2);
    }

    #[test]
    fn test_string_list_accepts_comma_strings_and_bullets() {
        assert_eq!(string_list(&json!("rust, tokio ,  axum")), vec!["rust", "tokio", "axum"]);
        assert_eq!(string_list(&json!("- one\n- two")), vec!["one", "two"]);
        assert_eq!(string_list(&json!(["a", " ", "b"])), vec!["a", "b"]);
        assert!(string_list(&json!(null)).is_empty());
    }

    #[test]
    fn test_number_parses_strings_and_percentages() {
        assert_eq!(number(&json!(85)), Some(85.0));
        assert_eq!(number(&json!("72")), Some(72.0));
        assert_eq!(number(&json!("2.5%")), Some(2.5));
        assert_eq!(number(&json!("high")), None);
    }

    #[test]
    fn test_alias_moves_first_present_name() {
        let mut value = json!({ "tags": ["#a"] });
        alias(&mut value, "hashtags", &["hashTags", "tags"]);
        assert_eq!(value, json!({ "hashtags": ["#a"] }));

        let mut kept = json!({ "hashtags": ["#x"], "tags": ["#y"] });
        alias(&mut kept, "hashtags", &["tags"]);
        assert_eq!(kept["hashtags"], json!(["#x"]));
    }
}
