//! Rephrasing in a requested style and tone.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::llm_client::error::GenerationError;
use crate::llm_client::transport::GenerationConfig;
use crate::llm_client::validate::ShapeContract;
use crate::llm_client::StructuredTask;
use crate::models::task::{label, RephraseStyle, RephraseTone, TaskKind};
use crate::tools::prompt_builder::{self, GenerationRequest};
use crate::tools::{alias, rewrite, string_list};

const CONFIG: GenerationConfig = GenerationConfig::new(0.7, 1, 1.0, 4096);

const NOT_AVAILABLE: &str = "Not available";

static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*{1,3}|_{2,3}").expect("emphasis pattern is valid"));
static HEADING_MARK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+").expect("heading pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RephrasedContent {
    #[serde(default)]
    pub original: String,
    pub rephrased: String,
    #[serde(default)]
    pub keywords_maintained: Vec<String>,
    #[serde(default = "not_available")]
    pub readability_score: String,
    #[serde(default = "not_available")]
    pub tone_analysis: String,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

pub struct RephraseTask {
    content: String,
    style: RephraseStyle,
    tone: RephraseTone,
    preserve_keywords: bool,
}

impl RephraseTask {
    pub fn new(
        content: impl Into<String>,
        style: RephraseStyle,
        tone: RephraseTone,
        preserve_keywords: bool,
    ) -> Self {
        Self {
            content: content.into(),
            style,
            tone,
            preserve_keywords,
        }
    }
}

impl StructuredTask for RephraseTask {
    type Output = RephrasedContent;

    fn kind(&self) -> TaskKind {
        TaskKind::Rephrasing
    }

    fn prompt(&self) -> Result<String, GenerationError> {
        let keyword_instruction = if self.preserve_keywords {
            "Important: Preserve all key terms and phrases from the original text."
        } else {
            ""
        };
        prompt_builder::build(
            &GenerationRequest::new(TaskKind::Rephrasing)
                .text("content", &self.content)
                .text("style", label(&self.style))
                .text("tone", label(&self.tone))
                .text("keyword_instruction", keyword_instruction),
        )
    }

    fn generation_config(&self) -> GenerationConfig {
        CONFIG
    }

    fn normalize(&self, mut json: Value) -> Value {
        alias(&mut json, "rephrased", &["rephrasedContent", "rewritten", "content"]);
        alias(&mut json, "keywordsMaintained", &["keywords_maintained", "keywords"]);
        alias(&mut json, "readabilityScore", &["readability_score", "readability"]);
        alias(&mut json, "toneAnalysis", &["tone_analysis", "tone"]);

        rewrite(&mut json, "keywordsMaintained", |v| json!(string_list(v)));
        for key in ["readabilityScore", "toneAnalysis"] {
            rewrite(&mut json, key, |v| match v {
                Value::Number(n) => json!(n.to_string()),
                other => other.clone(),
            });
        }
        json
    }

    fn contract(&self) -> ShapeContract {
        ShapeContract::new().text("rephrased", 1)
    }

    fn finalize(&self, mut output: RephrasedContent) -> Result<RephrasedContent, GenerationError> {
        output.original = self.content.clone();
        output.rephrased = strip_markdown(&output.rephrased);
        if output.rephrased.is_empty() {
            return Err(GenerationError::ValidationFailed(
                "rephrased text is empty".to_string(),
            ));
        }
        Ok(output)
    }
}

/// Drops emphasis markers and heading hashes; keeps line structure.
pub fn strip_markdown(text: &str) -> String {
    let without_headings = HEADING_MARK.replace_all(text, "");
    EMPHASIS.replace_all(&without_headings, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedTransport;
    use crate::llm_client::GenerationClient;
    use std::sync::Arc;

    #[test]
    fn test_strip_markdown() {
        assert_eq!(
            strip_markdown("## Intro\nThis is **bold** and *soft* and __strong__."),
            "Intro\nThis is bold and soft and strong."
        );
        assert_eq!(strip_markdown("snake_case stays"), "snake_case stays");
    }

    #[tokio::test]
    async fn test_comma_keywords_and_original_are_filled_in() {
        let reply = json!({
            "rephrased": "**Plain** words now.",
            "keywords": "latency, throughput",
            "readabilityScore": 8
        });
        let transport = Arc::new(ScriptedTransport::replying(reply.to_string()));
        let out = GenerationClient::new(transport)
            .generate(&RephraseTask::new(
                "Original words.",
                RephraseStyle::Simple,
                RephraseTone::Neutral,
                true,
            ))
            .await
            .unwrap()
            .result;
        assert_eq!(out.original, "Original words.");
        assert_eq!(out.rephrased, "Plain words now.");
        assert_eq!(out.keywords_maintained, vec!["latency", "throughput"]);
        assert_eq!(out.readability_score, "8");
        assert_eq!(out.tone_analysis, NOT_AVAILABLE);
    }

    #[test]
    fn test_preserve_keywords_adds_instruction() {
        let keep = RephraseTask::new("x", RephraseStyle::Academic, RephraseTone::Formal, true);
        let loose = RephraseTask::new("x", RephraseStyle::Academic, RephraseTone::Formal, false);
        assert!(keep.prompt().unwrap().contains("Preserve all key terms"));
        assert!(!loose.prompt().unwrap().contains("Preserve all key terms"));
    }
}
