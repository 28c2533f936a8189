//! Headline, blog-idea and call-to-action generation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::llm_client::error::GenerationError;
use crate::llm_client::transport::GenerationConfig;
use crate::llm_client::validate::ShapeContract;
use crate::llm_client::StructuredTask;
use crate::models::task::{label, HeadlineStyle, HeadlineTone, TaskKind, Variant};
use crate::tools::prompt_builder::{self, GenerationRequest};
use crate::tools::{alias, rewrite, string_list};

const CONFIG: GenerationConfig = GenerationConfig::new(0.9, 60, 0.95, 2048);

pub const DEFAULT_COUNT: usize = 5;
pub const MAX_COUNT: usize = 10;
pub const MAX_HEADLINE_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlineSet {
    pub headlines: Vec<String>,
    pub analysis: HeadlineAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlineAnalysis {
    pub tone: String,
    pub impact: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub variations: Vec<CtaVariation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtaVariation {
    pub text: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub audience: String,
}

pub struct HeadlineTask {
    topic: String,
    style: HeadlineStyle,
    tone: HeadlineTone,
    count: usize,
}

impl HeadlineTask {
    /// `count` must already be within `1..=MAX_COUNT`.
    pub fn new(topic: impl Into<String>, style: HeadlineStyle, tone: HeadlineTone, count: usize) -> Self {
        Self {
            topic: topic.into(),
            style,
            tone,
            count,
        }
    }
}

impl StructuredTask for HeadlineTask {
    type Output = HeadlineSet;

    fn kind(&self) -> TaskKind {
        TaskKind::Headlines
    }

    fn prompt(&self) -> Result<String, GenerationError> {
        prompt_builder::build(
            &GenerationRequest::new(TaskKind::Headlines)
                .variant(Variant::Headline(self.style))
                .text("topic", &self.topic)
                .text("style", label(&self.style))
                .text("tone", label(&self.tone))
                .text("count", self.count.to_string()),
        )
    }

    fn generation_config(&self) -> GenerationConfig {
        CONFIG
    }

    fn normalize(&self, json: Value) -> Value {
        // A bare list of headlines carries no analysis; let the contract report it.
        let mut json = match json {
            Value::Array(items) => json!({ "headlines": items }),
            other => other,
        };
        alias(&mut json, "headlines", &["titles", "ideas", "ctas"]);
        rewrite(&mut json, "headlines", headline_entries);
        // Extras beyond `count` are dropped before the contract sees them.
        if let Some(items) = json.get_mut("headlines").and_then(Value::as_array_mut) {
            items.truncate(self.count);
        }
        if let Some(analysis) = json.get_mut("analysis") {
            rewrite(analysis, "suggestions", |v| json!(string_list(v)));
            rewrite(analysis, "keywords", |v| json!(string_list(v)));
        }
        json
    }

    fn contract(&self) -> ShapeContract {
        ShapeContract::new()
            .string_items("headlines", self.count, MAX_HEADLINE_CHARS, "headlines")
            .text("analysis.tone", 1)
            .text("analysis.impact", 1)
    }

    fn finalize(&self, mut output: HeadlineSet) -> Result<HeadlineSet, GenerationError> {
        output.headlines.truncate(self.count);
        for headline in &mut output.headlines {
            *headline = headline.trim().to_string();
        }
        Ok(output)
    }
}

/// Headlines sometimes come back as `{headline: …}` / `{text: …}` objects.
fn headline_entries(value: &Value) -> Value {
    let Some(items) = value.as_array() else {
        return value.clone();
    };
    items
        .iter()
        .map(|item| match item {
            Value::Object(map) => map
                .get("headline")
                .or_else(|| map.get("text"))
                .or_else(|| map.get("title"))
                .cloned()
                .unwrap_or(Value::Null),
            other => other.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::error::FailureKind;
    use crate::llm_client::testing::ScriptedTransport;
    use crate::llm_client::GenerationClient;
    use std::sync::Arc;

    fn reply(headlines: &[&str]) -> String {
        json!({
            "headlines": headlines,
            "analysis": {
                "tone": "friendly",
                "impact": "curiosity",
                "summary": "short and punchy",
                "suggestions": "try numbers, ask a question"
            }
        })
        .to_string()
    }

    fn task(style: HeadlineStyle, count: usize) -> HeadlineTask {
        HeadlineTask::new("rust for data teams", style, HeadlineTone::Casual, count)
    }

    #[tokio::test]
    async fn test_extra_headlines_are_truncated_to_count() {
        let transport = Arc::new(ScriptedTransport::replying(reply(&["a", "b", "c", " d "])));
        let out = GenerationClient::new(transport)
            .generate(&task(HeadlineStyle::Creative, 3))
            .await
            .unwrap();
        assert_eq!(out.result.headlines, vec!["a", "b", "c"]);
        assert_eq!(out.result.analysis.suggestions, vec!["try numbers", "ask a question"]);
    }

    #[tokio::test]
    async fn test_too_few_headlines_fail_validation() {
        let transport = Arc::new(ScriptedTransport::replying(reply(&["only one"])));
        let record = GenerationClient::new(transport)
            .generate(&task(HeadlineStyle::News, 5))
            .await
            .unwrap_err();
        assert_eq!(record.kind, FailureKind::ValidationFailed);
        assert!(record.message.contains("fewer than 5 headlines"), "{}", record.message);
    }

    #[tokio::test]
    async fn test_overlong_headline_fails_validation() {
        let long = "x".repeat(MAX_HEADLINE_CHARS + 1);
        let transport = Arc::new(ScriptedTransport::replying(reply(&["fine", long.as_str()])));
        let record = GenerationClient::new(transport)
            .generate(&task(HeadlineStyle::Professional, 2))
            .await
            .unwrap_err();
        assert_eq!(record.kind, FailureKind::ValidationFailed);
    }

    #[tokio::test]
    async fn test_overlong_extra_beyond_count_is_ignored() {
        let long = "x".repeat(MAX_HEADLINE_CHARS + 1);
        let transport = Arc::new(ScriptedTransport::replying(reply(&["a", "b", long.as_str()])));
        let out = GenerationClient::new(transport)
            .generate(&task(HeadlineStyle::Professional, 2))
            .await
            .unwrap();
        assert_eq!(out.result.headlines, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_cta_analysis_fields_survive() {
        let body = json!({
            "ctas": [{ "text": "Start free" }, { "text": "Book a demo" }],
            "analysis": {
                "tone": "persuasive",
                "impact": "higher signups",
                "variations": [{ "text": "Try it now", "context": "pricing page", "audience": "trial users" }],
                "urgency": "high",
                "type": "signup"
            }
        });
        let transport = Arc::new(ScriptedTransport::replying(body.to_string()));
        let out = GenerationClient::new(transport)
            .generate(&task(HeadlineStyle::Cta, 2))
            .await
            .unwrap();
        assert_eq!(out.result.headlines, vec!["Start free", "Book a demo"]);
        assert_eq!(out.result.analysis.kind.as_deref(), Some("signup"));
        assert_eq!(out.result.analysis.variations.len(), 1);
    }

    #[test]
    fn test_blog_style_uses_blog_template() {
        let prompt = task(HeadlineStyle::Blog, 4).prompt().unwrap();
        assert!(prompt.contains("blog post ideas"));
        assert!(prompt.contains("Number of ideas: 4"));
    }
}
