//! Content analysis: SEO keywords, structure, readability and improvements.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::llm_client::error::GenerationError;
use crate::llm_client::transport::GenerationConfig;
use crate::llm_client::validate::ShapeContract;
use crate::llm_client::StructuredTask;
use crate::models::task::TaskKind;
use crate::tools::prompt_builder::{self, GenerationRequest};
use crate::tools::{alias, number, rewrite, string_list};

const CONFIG: GenerationConfig = GenerationConfig::new(0.1, 1, 1.0, 4096);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub target_keyword: String,
    pub keywords: KeywordBreakdown,
    pub structure: ContentStructure,
    pub seo: SeoReport,
    pub improvements: Improvements,
    #[serde(default)]
    pub improvement_suggestions: ImprovementSuggestions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordBreakdown {
    pub main: Vec<KeywordUsage>,
    pub lsi: Vec<KeywordUsage>,
    #[serde(default)]
    pub related: Vec<String>,
    #[serde(default)]
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordUsage {
    pub word: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub density: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentStructure {
    #[serde(default)]
    pub headings: Headings,
    #[serde(default)]
    pub readability: Option<Readability>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Headings {
    #[serde(default)]
    pub h1: Vec<String>,
    #[serde(default)]
    pub h2: Vec<String>,
    #[serde(default)]
    pub h3: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Readability {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoReport {
    pub score: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub title_optimization: Option<TitleOptimization>,
    #[serde(default)]
    pub content_gaps: Option<ContentGaps>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleOptimization {
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentGaps {
    #[serde(default)]
    pub missing_topics: Vec<String>,
    #[serde(default)]
    pub competitor_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Improvements {
    #[serde(default)]
    pub priority: Vec<String>,
    #[serde(default)]
    pub additional: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImprovementSuggestions {
    #[serde(default)]
    pub content: Vec<Suggestion>,
    #[serde(default)]
    pub style: Vec<Suggestion>,
    #[serde(default)]
    pub seo: Vec<Suggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub suggestion: String,
    #[serde(default)]
    pub priority: String,
}

pub struct ContentAnalysisTask {
    content: String,
}

impl ContentAnalysisTask {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl StructuredTask for ContentAnalysisTask {
    type Output = ContentAnalysis;

    fn kind(&self) -> TaskKind {
        TaskKind::ContentAnalysis
    }

    fn prompt(&self) -> Result<String, GenerationError> {
        prompt_builder::build(
            &GenerationRequest::new(TaskKind::ContentAnalysis).text("content", &self.content),
        )
    }

    fn generation_config(&self) -> GenerationConfig {
        CONFIG
    }

    fn normalize(&self, mut json: Value) -> Value {
        if !json.is_object() {
            return json;
        }
        alias(&mut json, "targetKeyword", &["target_keyword", "mainKeyword"]);
        alias(&mut json, "improvementSuggestions", &["improvement_suggestions"]);

        // Older answers put keyword lists at the top level or under `seo`.
        if json.get("keywords").map_or(true, |k| !k.is_object()) {
            let seo = json.get("seo").cloned().unwrap_or(Value::Null);
            let main = json
                .get("mainKeywords")
                .or_else(|| seo.get("mainKeywords"))
                .cloned();
            let lsi = json
                .get("lsiKeywords")
                .or_else(|| seo.get("lsiKeywords"))
                .cloned();
            if main.is_some() || lsi.is_some() {
                json["keywords"] = json!({
                    "main": main.unwrap_or(Value::Null),
                    "lsi": lsi.unwrap_or(Value::Null),
                });
            }
        }

        if let Some(keywords) = json.get_mut("keywords") {
            rewrite(keywords, "main", keyword_entries);
            rewrite(keywords, "lsi", keyword_entries);
            rewrite(keywords, "related", |v| json!(string_list(v)));
            rewrite(keywords, "questions", |v| json!(string_list(v)));
        }
        if let Some(seo) = json.get_mut("seo") {
            rewrite(seo, "score", coerce_number);
        }
        if let Some(readability) = json.pointer_mut("/structure/readability") {
            rewrite(readability, "score", coerce_number);
        }
        json
    }

    fn contract(&self) -> ShapeContract {
        ShapeContract::new()
            .array("keywords.main", 3, "main keywords")
            .array("keywords.lsi", 3, "LSI keywords")
            .object("structure")
            .object("seo")
            .object("improvements")
            .number("seo.score", 0.0, 100.0)
            .text("targetKeyword", 3)
    }
}

fn coerce_number(value: &Value) -> Value {
    number(value).map_or_else(|| value.clone(), |n| json!(n))
}

/// Accepts `{word, count, density}` objects (with numeric strings) or bare strings.
fn keyword_entries(value: &Value) -> Value {
    let Some(items) = value.as_array() else {
        return value.clone();
    };
    let entries: Vec<Value> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(word) if !word.trim().is_empty() => Some(json!({
                "word": word.trim(),
                "count": 0,
                "density": 0.0,
            })),
            Value::Object(map) => {
                let word = map
                    .get("word")
                    .or_else(|| map.get("keyword"))
                    .and_then(Value::as_str)?
                    .trim();
                if word.is_empty() {
                    return None;
                }
                let count = map.get("count").and_then(number).unwrap_or(0.0);
                let density = map.get("density").and_then(number).unwrap_or(0.0);
                Some(json!({
                    "word": word,
                    "count": count.max(0.0).round() as u64,
                    "density": density,
                }))
            }
            _ => None,
        })
        .collect();
    Value::Array(entries)
}
