//! Long-form article generation. The model answers in a section-marker grammar
//! rather than JSON, so this task brings its own parser.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::llm_client::error::GenerationError;
use crate::llm_client::extract::ExtractedPayload;
use crate::llm_client::transport::GenerationConfig;
use crate::llm_client::validate::ShapeContract;
use crate::llm_client::StructuredTask;
use crate::models::task::{label, ArticleLength, TaskKind};
use crate::tools::prompt_builder::{self, GenerationRequest};
use crate::tools::{reading_minutes, string_list, word_count};

const CONFIG: GenerationConfig = GenerationConfig::new(0.7, 40, 0.8, 4096);

pub const MIN_TITLE_CHARS: usize = 3;

static META_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)===META INFORMATION START===(?P<meta>.*?)===META INFORMATION END===")
        .expect("meta section pattern is valid")
});
static CONTENT_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)===CONTENT START===(?P<content>.*?)===CONTENT END===")
        .expect("content section pattern is valid")
});
static META_FIELDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(?P<field>SEO Title|Meta Description|Target Keywords|Target Audience):[ \t]*(?P<value>.+?)\s*$",
    )
    .expect("meta field pattern is valid")
});
/// Instruction lines the model sometimes echoes back into the content section.
static ECHOED_INSTRUCTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(\[full content[^\]]*\]|- Use <[^>]+> for .*)\s*$\n?")
        .expect("instruction echo pattern is valid")
});
static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("html tag pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArticle {
    pub title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub target_audience: String,
    #[serde(default)]
    pub reading_time: String,
    /// HTML body.
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ArticleBrief {
    pub title: String,
    pub keywords: Vec<String>,
    pub content_type: String,
    pub tone: String,
    pub length: ArticleLength,
    pub language: String,
    pub key_notes: Option<String>,
}

pub struct ArticleTask {
    brief: ArticleBrief,
}

impl ArticleTask {
    pub fn new(brief: ArticleBrief) -> Self {
        Self { brief }
    }
}

impl StructuredTask for ArticleTask {
    type Output = GeneratedArticle;

    fn kind(&self) -> TaskKind {
        TaskKind::Article
    }

    fn prompt(&self) -> Result<String, GenerationError> {
        let brief = &self.brief;
        let keywords_line = if brief.keywords.is_empty() {
            String::new()
        } else {
            format!("- Keywords: {}", brief.keywords.join(", "))
        };
        let notes_line = brief
            .key_notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| format!("- Additional Requirements: {n}"))
            .unwrap_or_default();

        prompt_builder::build(
            &GenerationRequest::new(TaskKind::Article)
                .text("title", &brief.title)
                .text("content_type", &brief.content_type)
                .text("tone", &brief.tone)
                .text("length", label(&brief.length))
                .text("target_words", brief.length.target_words().to_string())
                .text("language", &brief.language)
                .text("keywords_line", keywords_line)
                .text("notes_line", notes_line),
        )
    }

    fn generation_config(&self) -> GenerationConfig {
        CONFIG
    }

    fn parse(&self, raw: &str) -> Result<ExtractedPayload, GenerationError> {
        parse_sections(raw)
    }

    fn contract(&self) -> ShapeContract {
        ShapeContract::new()
            .text("title", MIN_TITLE_CHARS)
            .text("metaDescription", 1)
            .array("keywords", 1, "target keywords")
            .text("targetAudience", 1)
            .text("content", 1)
    }

    fn finalize(&self, mut output: GeneratedArticle) -> Result<GeneratedArticle, GenerationError> {
        let words = word_count(&HTML_TAG.replace_all(&output.content, " "));
        output.reading_time = format!("{} min read", reading_minutes(words).max(1));
        Ok(output)
    }
}

/// Reads the meta and content sections. A missing section or meta field is
/// `Malformed`, which the retry loop treats as worth another attempt.
pub fn parse_sections(raw: &str) -> Result<ExtractedPayload, GenerationError> {
    let meta = META_SECTION
        .captures(raw)
        .and_then(|c| c.name("meta"))
        .ok_or_else(|| GenerationError::Malformed("missing meta information section".into()))?;
    let content = CONTENT_SECTION
        .captures(raw)
        .and_then(|c| c.name("content"))
        .ok_or_else(|| GenerationError::Malformed("missing content section".into()))?;

    let mut fields = json!({});
    for caps in META_FIELDS.captures_iter(meta.as_str()) {
        let key = match &caps["field"] {
            "SEO Title" => "title",
            "Meta Description" => "metaDescription",
            "Target Keywords" => "keywords",
            _ => "targetAudience",
        };
        let value = caps["value"].trim();
        fields[key] = if key == "keywords" {
            json!(string_list(&json!(value)))
        } else {
            json!(value)
        };
    }
    for required in ["title", "metaDescription", "keywords", "targetAudience"] {
        if fields.get(required).is_none() {
            return Err(GenerationError::Malformed(format!(
                "meta information is missing `{required}`"
            )));
        }
    }

    let body = ECHOED_INSTRUCTIONS.replace_all(content.as_str(), "");
    fields["content"] = json!(body.trim());

    Ok(ExtractedPayload {
        json: fields,
        source_span: raw[meta.start().min(content.start())..meta.end().max(content.end())]
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::error::FailureKind;
    use crate::llm_client::testing::ScriptedTransport;
    use crate::llm_client::GenerationClient;
    use std::sync::Arc;

    fn brief(title: &str) -> ArticleBrief {
        ArticleBrief {
            title: title.to_string(),
            keywords: vec!["rust".into(), "tokio".into()],
            content_type: "blog post".into(),
            tone: "friendly".into(),
            length: ArticleLength::Short,
            language: "English".into(),
            key_notes: Some("mention cancellation".into()),
        }
    }

    fn response(body: &str) -> String {
        format!(
            "Sure, here it is.\n\n===META INFORMATION START===\n\
             SEO Title: Async Rust Without Tears\n\
             Meta Description: A plain guide to async Rust.\n\
             Target Keywords: async rust, tokio, futures\n\
             Target Audience: Backend developers new to Rust\n\
             ===META INFORMATION END===\n\n\
             ===CONTENT START===\n{body}\n===CONTENT END===\n"
        )
    }

    #[test]
    fn test_parse_sections_reads_meta_and_body() {
        let payload =
            parse_sections(&response("<h1>Async Rust</h1>\n<p>Futures are lazy.</p>")).unwrap();
        assert_eq!(payload.json["title"], "Async Rust Without Tears");
        assert_eq!(payload.json["keywords"], json!(["async rust", "tokio", "futures"]));
        assert_eq!(payload.json["targetAudience"], "Backend developers new to Rust");
        assert!(payload.json["content"].as_str().unwrap().starts_with("<h1>"));
        assert!(payload.source_span.contains("SEO Title"));
    }

    #[test]
    fn test_echoed_instructions_are_removed() {
        let payload = parse_sections(&response(
            "[full content using HTML tags: h1, h2]\n- Use <h2> for major sections\n<p>Real text.</p>",
        ))
        .unwrap();
        assert_eq!(payload.json["content"], "<p>Real text.</p>");
    }

    #[test]
    fn test_missing_section_is_malformed() {
        let err = parse_sections("SEO Title: something\nno markers here").unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[test]
    fn test_missing_meta_field_is_malformed() {
        let raw = "===META INFORMATION START===\nSEO Title: Only a title\n===META INFORMATION END===\n\
                   ===CONTENT START===\n<p>x</p>\n===CONTENT END===";
        match parse_sections(raw).unwrap_err() {
            GenerationError::Malformed(msg) => assert!(msg.contains("metaDescription")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_answer_is_retried_then_succeeds() {
        let words = vec!["word"; 450].join(" ");
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok("I wrote it as prose instead.".to_string()),
            Ok(response(&format!("<p>{words}</p>"))),
        ]));
        let out = GenerationClient::new(transport.clone())
            .generate(&ArticleTask::new(brief("Async Rust")))
            .await
            .unwrap();
        assert_eq!(out.result.reading_time, "3 min read");
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_short_seo_title_fails_validation() {
        let raw = response("<p>x</p>").replace("Async Rust Without Tears", "AR");
        let transport = Arc::new(ScriptedTransport::replying(raw));
        let record = GenerationClient::new(transport)
            .generate(&ArticleTask::new(brief("Async Rust")))
            .await
            .unwrap_err();
        assert_eq!(record.kind, FailureKind::ValidationFailed);
    }

    #[test]
    fn test_prompt_carries_length_target_and_notes() {
        let prompt = ArticleTask::new(brief("Async Rust")).prompt().unwrap();
        assert!(prompt.contains("Length: short (~500 words)"));
        assert!(prompt.contains("- Keywords: rust, tokio"));
        assert!(prompt.contains("- Additional Requirements: mention cancellation"));
        assert!(prompt.contains("delve"));
    }
}
