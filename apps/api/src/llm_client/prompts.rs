// Shared prompt fragments and the placeholder renderer.
// Each tool's templates live in tools/prompts.rs; this file holds what they share.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Instruction appended to every JSON-contract prompt.
pub const JSON_ONLY_INSTRUCTION: &str = "IMPORTANT: Return ONLY valid JSON. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Phrases the generated copy must avoid. Injected as `{banned_phrases}`.
pub const BANNED_PHRASES: &[&str] = &[
    "revolutionize",
    "dive in",
    "venture",
    "innovative",
    "realm",
    "adhere",
    "delve",
    "reimagine",
    "robust",
    "orchestrate",
    "diverse",
    "commendable",
    "embrace",
    "paramount",
    "beacon",
    "captivate",
    "tapestry",
    "leverage",
    "resonate",
    "foster",
    "endeavor",
    "embark",
    "unleash",
    "renowned",
    "bespoke",
    "whimsical",
    "meticulous",
    "vibrant",
    "supercharge",
    "pivotal",
    "cutting-edge",
    "groundbreaking",
    "game-changing",
    "next-generation",
    "paradigm shift",
    "state-of-the-art",
    "synergy",
    "thought leader",
    "in conclusion",
    "in the fast-paced world",
    "unlocking the power",
    "push the boundaries",
    "the possibilities are endless",
    "only time will tell",
    "it remains to be seen",
    "honored to announce",
    "humbled by",
    "thrilled to share",
    "excited to announce",
    "thread incoming",
    "hot take",
    "unpopular opinion",
    "let that sink in",
    "like and share",
    "tag someone who",
    "share if you agree",
];

/// `{snake_case}` placeholder. JSON examples inside templates never match because
/// their braces are followed by whitespace or a quote.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z][a-z0-9_]*)\}").expect("placeholder pattern is valid"));

/// Fills every placeholder in one pass. Substituted text is not re-scanned.
/// Returns the names of placeholders `resolve` could not fill.
pub fn render<F>(template: &str, resolve: F) -> Result<String, Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut unresolved = Vec::new();
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        match resolve(name) {
            Some(value) => value,
            None => {
                unresolved.push(name.to_string());
                caps[0].to_string()
            }
        }
    });

    if unresolved.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(unresolved)
    }
}

/// Placeholder names referenced by `template`, in order of appearance.
#[cfg(test)]
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

pub fn banned_phrases() -> String {
    BANNED_PHRASES.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_all_placeholders() {
        let out = render("Topic: {topic}, tone {tone}.", |k| match k {
            "topic" => Some("rust".to_string()),
            "tone" => Some("calm".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(out, "Topic: rust, tone calm.");
    }

    #[test]
    fn test_render_reports_unresolved() {
        let err = render("{topic} and {missing}", |k| (k == "topic").then(|| "x".to_string()))
            .unwrap_err();
        assert_eq!(err, vec!["missing".to_string()]);
    }

    #[test]
    fn test_json_examples_are_not_placeholders() {
        let template = "Return:\n{\n  \"headlines\": [\"a\"]\n}\nTopic: {topic}";
        assert_eq!(placeholders(template), vec!["topic"]);
    }

    #[test]
    fn test_substituted_text_is_not_rescanned() {
        let out = render("{content}", |_| Some("user wrote {tone}".to_string())).unwrap();
        assert_eq!(out, "user wrote {tone}");
    }

    #[test]
    fn test_banned_phrases_are_lowercase_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for phrase in BANNED_PHRASES {
            assert_eq!(*phrase, phrase.to_lowercase());
            assert!(seen.insert(*phrase), "duplicate banned phrase {phrase}");
        }
    }
}
