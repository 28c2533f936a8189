//! Keyword extraction with relevance, type, frequency and density per keyword.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::llm_client::error::GenerationError;
use crate::llm_client::transport::GenerationConfig;
use crate::llm_client::validate::ShapeContract;
use crate::llm_client::StructuredTask;
use crate::models::task::TaskKind;
use crate::tools::prompt_builder::{self, GenerationRequest};
use crate::tools::{alias, number, rewrite, string_list, word_count};

const CONFIG: GenerationConfig = GenerationConfig::new(0.3, 1, 1.0, 2048);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordReport {
    pub keywords: Vec<String>,
    pub topics: Vec<String>,
    pub relevance_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub keyword_types: BTreeMap<String, String>,
    #[serde(default)]
    pub keyword_frequency: BTreeMap<String, u64>,
    #[serde(default)]
    pub keyword_density: BTreeMap<String, String>,
    #[serde(default)]
    pub content_summary: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub main_theme: String,
    #[serde(default)]
    pub word_count: usize,
}

pub struct KeywordTask {
    content: String,
}

impl KeywordTask {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl StructuredTask for KeywordTask {
    type Output = KeywordReport;

    fn kind(&self) -> TaskKind {
        TaskKind::KeywordExtraction
    }

    fn prompt(&self) -> Result<String, GenerationError> {
        prompt_builder::build(
            &GenerationRequest::new(TaskKind::KeywordExtraction).text("content", &self.content),
        )
    }

    fn generation_config(&self) -> GenerationConfig {
        CONFIG
    }

    fn normalize(&self, mut json: Value) -> Value {
        if !json.is_object() {
            return json;
        }
        alias(&mut json, "relevanceScores", &["relevance_scores", "scores"]);
        alias(&mut json, "keywordTypes", &["keyword_types", "types"]);
        alias(&mut json, "keywordFrequency", &["keyword_frequency", "frequency"]);
        alias(&mut json, "keywordDensity", &["keyword_density", "density"]);
        alias(&mut json, "contentSummary", &["content_summary", "summary"]);
        alias(&mut json, "contentType", &["content_type"]);
        alias(&mut json, "mainTheme", &["main_theme"]);
        alias(&mut json, "wordCount", &["word_count"]);

        rewrite(&mut json, "keywords", |v| json!(string_list(v)));
        rewrite(&mut json, "topics", |v| json!(string_list(v)));

        // Scores outside [0, 1] are dropped rather than clamped.
        rewrite(&mut json, "relevanceScores", |v| {
            numeric_map(v, |n| (0.0..=1.0).contains(&n).then(|| json!(n)))
        });
        rewrite(&mut json, "keywordFrequency", |v| {
            numeric_map(v, |n| (n >= 0.0).then(|| json!(n.round() as u64)))
        });
        rewrite(&mut json, "keywordDensity", |v| {
            entries(v)
                .into_iter()
                .filter_map(|(k, v)| match v {
                    Value::String(s) => Some((k, json!(s.trim()))),
                    Value::Number(n) => Some((k, json!(format!("{n}%")))),
                    _ => None,
                })
                .collect::<Map<String, Value>>()
                .into()
        });
        rewrite(&mut json, "keywordTypes", |v| {
            entries(v)
                .into_iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k, json!(s.trim()))))
                .collect::<Map<String, Value>>()
                .into()
        });
        rewrite(&mut json, "wordCount", |v| {
            json!(number(v).map_or(0, |n| n.max(0.0).round() as u64))
        });
        json
    }

    fn contract(&self) -> ShapeContract {
        ShapeContract::new()
            .array("keywords", 1, "keywords")
            .array("topics", 1, "topics")
            .non_empty_map("relevanceScores", "relevance scores")
    }

    fn finalize(&self, mut output: KeywordReport) -> Result<KeywordReport, GenerationError> {
        if output.word_count == 0 {
            output.word_count = word_count(&self.content);
        }
        Ok(output)
    }
}

/// Map entries from an object, or from a list of `{keyword, <value>}` records.
fn entries(value: &Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.trim().to_string(), v.clone()))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                let key = obj
                    .get("keyword")
                    .or_else(|| obj.get("word"))
                    .and_then(Value::as_str)?;
                let value = obj
                    .iter()
                    .find(|(k, _)| !matches!(k.as_str(), "keyword" | "word"))
                    .map(|(_, v)| v.clone())?;
                Some((key.trim().to_string(), value))
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn numeric_map(value: &Value, keep: impl Fn(f64) -> Option<Value>) -> Value {
    entries(value)
        .into_iter()
        .filter_map(|(k, v)| number(&v).and_then(&keep).map(|n| (k, n)))
        .collect::<Map<String, Value>>()
        .into()
}
