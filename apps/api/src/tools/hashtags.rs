//! Hashtag generation with per-platform canned fallbacks.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::llm_client::error::GenerationError;
use crate::llm_client::extract::{self, ExtractedPayload};
use crate::llm_client::transport::GenerationConfig;
use crate::llm_client::validate::ShapeContract;
use crate::llm_client::StructuredTask;
use crate::models::task::{label, HashtagPlatform, TaskKind, Variant};
use crate::tools::fallback::{self, GENERAL_TARGET};
use crate::tools::prompt_builder::{self, GenerationRequest};
use crate::tools::{alias, string_list};

const CONFIG: GenerationConfig = GenerationConfig::new(0.7, 40, 0.9, 1024);

pub const MAX_TAG_CHARS: usize = 30;
const MIN_CONTENT_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashtagSet {
    #[serde(default)]
    pub platform: HashtagPlatform,
    pub hashtags: Vec<String>,
}

pub struct HashtagTask {
    content: String,
    platform: HashtagPlatform,
}

impl HashtagTask {
    pub fn new(content: impl Into<String>, platform: HashtagPlatform) -> Self {
        Self {
            content: content.into(),
            platform,
        }
    }
}

impl StructuredTask for HashtagTask {
    type Output = HashtagSet;

    fn kind(&self) -> TaskKind {
        TaskKind::Hashtags
    }

    fn prompt(&self) -> Result<String, GenerationError> {
        prompt_builder::build(
            &GenerationRequest::new(TaskKind::Hashtags)
                .variant(Variant::Hashtag(self.platform))
                .text("content", &self.content)
                .text("platform", label(&self.platform)),
        )
    }

    fn generation_config(&self) -> GenerationConfig {
        CONFIG
    }

    /// JSON first; otherwise one `#Tag` per line.
    fn parse(&self, raw: &str) -> Result<ExtractedPayload, GenerationError> {
        match extract::extract(raw) {
            Ok(payload) => Ok(payload),
            Err(GenerationError::Malformed(reason)) => {
                let tags = hashtag_lines(raw);
                if tags.is_empty() {
                    return Err(GenerationError::Malformed(reason));
                }
                debug!("Hashtag response was not JSON; read {} tags from lines", tags.len());
                Ok(ExtractedPayload {
                    json: json!({ "hashtags": tags }),
                    source_span: raw.trim().to_string(),
                })
            }
            Err(other) => Err(other),
        }
    }

    fn normalize(&self, json: Value) -> Value {
        let mut json = match json {
            Value::Array(items) => json!({ "hashtags": items }),
            other => other,
        };
        alias(&mut json, "hashtags", &["tags", "hashTags"]);
        if let Some(tags) = json.get("hashtags").map(string_list) {
            json["hashtags"] = json!(clean_tags(tags));
        }
        json
    }

    fn contract(&self) -> ShapeContract {
        ShapeContract::new().array("hashtags", 1, "hashtags")
    }

    fn finalize(&self, mut output: HashtagSet) -> Result<HashtagSet, GenerationError> {
        output.platform = self.platform;
        if self.platform == HashtagPlatform::General {
            output.hashtags = fallback::top_up(output.hashtags, GENERAL_TARGET);
        }
        Ok(output)
    }

    fn fallback(&self) -> Option<HashtagSet> {
        Some(HashtagSet {
            platform: self.platform,
            hashtags: fallback::hashtags_for(self.platform),
        })
    }

    fn insufficient_input(&self) -> bool {
        self.content.trim().chars().count() < MIN_CONTENT_CHARS
    }
}

/// Lines that are a single well-formed hashtag.
fn hashtag_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|tag| is_valid_tag(tag))
        .map(str::to_string)
        .collect()
}

fn is_valid_tag(tag: &str) -> bool {
    tag.starts_with('#')
        && tag.chars().count() > 1
        && tag.chars().count() <= MAX_TAG_CHARS
        && !tag.chars().any(char::is_whitespace)
}

/// Adds the leading `#`, drops malformed tags and case-insensitive duplicates.
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|tag| {
            let tag = tag.trim().trim_start_matches('#');
            format!("#{tag}")
        })
        .filter(|tag| is_valid_tag(tag))
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .collect()
}
