//! Converts content into platform-specific social post variations.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::llm_client::error::GenerationError;
use crate::llm_client::transport::GenerationConfig;
use crate::llm_client::validate::ShapeContract;
use crate::llm_client::StructuredTask;
use crate::models::task::{SocialFormat, SocialPlatform, TaskKind, Variant};
use crate::tools::prompt_builder::{self, GenerationRequest};
use crate::tools::{alias, string_list};

const CONFIG: GenerationConfig = GenerationConfig::new(0.7, 40, 0.95, 1024);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialPostSet {
    pub platform: SocialPlatform,
    pub format: SocialFormat,
    pub posts: Vec<SocialPost>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    pub content: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// 1-based position in the model's answer.
    pub variation: u32,
}

pub struct SocialPostTask {
    content: String,
    platform: SocialPlatform,
    format: SocialFormat,
}

impl SocialPostTask {
    pub fn new(content: impl Into<String>, platform: SocialPlatform, format: SocialFormat) -> Self {
        Self {
            content: content.into(),
            platform,
            format,
        }
    }
}

fn format_phrase(format: SocialFormat) -> &'static str {
    match format {
        SocialFormat::Professional => "professional",
        SocialFormat::Howto => "\"How-To\"",
        SocialFormat::Comparison => "comparison-based",
        SocialFormat::Stepbystep => "step-by-step",
    }
}

fn platform_phrase(platform: SocialPlatform) -> &'static str {
    match platform {
        SocialPlatform::Linkedin => "LinkedIn",
        SocialPlatform::Twitter => "Twitter",
        SocialPlatform::Facebook => "Facebook",
    }
}

impl StructuredTask for SocialPostTask {
    type Output = SocialPostSet;

    fn kind(&self) -> TaskKind {
        TaskKind::SocialPosts
    }

    fn prompt(&self) -> Result<String, GenerationError> {
        prompt_builder::build(
            &GenerationRequest::new(TaskKind::SocialPosts)
                .variant(Variant::Social(self.format, self.platform))
                .text("content", &self.content)
                .text("format", format_phrase(self.format))
                .text("platform", platform_phrase(self.platform)),
        )
    }

    fn generation_config(&self) -> GenerationConfig {
        CONFIG
    }

    fn normalize(&self, json: Value) -> Value {
        let mut json = match json {
            Value::Array(items) => json!({ "posts": items }),
            other => other,
        };
        alias(&mut json, "posts", &["variations", "variants"]);

        let posts: Option<Vec<Value>> = json
            .get("posts")
            .and_then(Value::as_array)
            .map(|items| items.iter().enumerate().map(post_entry).collect());

        match posts {
            Some(posts) => json!({
                "platform": self.platform,
                "format": self.format,
                "posts": posts,
            }),
            None => json,
        }
    }

    fn contract(&self) -> ShapeContract {
        ShapeContract::new().array("posts", 1, "posts")
    }

    fn finalize(&self, output: SocialPostSet) -> Result<SocialPostSet, GenerationError> {
        if let Some(empty) = output.posts.iter().find(|p| p.content.is_empty()) {
            return Err(GenerationError::ValidationFailed(format!(
                "variation {} has no content",
                empty.variation
            )));
        }
        Ok(output)
    }
}

/// One post as `{content, hashtags, variation}`; bare strings are treated as content.
fn post_entry((i, item): (usize, &Value)) -> Value {
    let (content, hashtags) = match item {
        Value::String(text) => (text.clone(), Vec::new()),
        other => (
            other
                .get("content")
                .or_else(|| other.get("text"))
                .or_else(|| other.get("post"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            other.get("hashtags").map(hashtag_list).unwrap_or_default(),
        ),
    };
    json!({
        "content": content.trim(),
        "hashtags": hashtags,
        "variation": i + 1,
    })
}

/// Hashtags as a list or as one space/comma separated string, each with a leading `#`.
fn hashtag_list(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::String(s) => s.split_whitespace().map(str::to_string).collect(),
        other => string_list(other),
    };
    raw.into_iter()
        .flat_map(|tag| {
            tag.split(',')
                .map(|t| t.trim().trim_start_matches('#').to_string())
                .collect::<Vec<_>>()
        })
        .filter(|t| !t.is_empty())
        .map(|t| format!("#{t}"))
        .collect()
}
