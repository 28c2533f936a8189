//! Summaries with key points and reading statistics.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::llm_client::error::GenerationError;
use crate::llm_client::transport::GenerationConfig;
use crate::llm_client::validate::ShapeContract;
use crate::llm_client::StructuredTask;
use crate::models::task::{
    label, SummaryFocus, SummaryLength, SummaryStyle, SummaryTone, TaskKind,
};
use crate::tools::prompt_builder::{self, GenerationRequest};
use crate::tools::{alias, reading_minutes, rewrite, string_list, word_count};

const CONFIG: GenerationConfig = GenerationConfig::new(0.3, 20, 0.8, 1024);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub summary: String,
    pub key_points: Vec<String>,
    #[serde(default)]
    pub original_word_count: usize,
    #[serde(default)]
    pub summary_word_count: usize,
    #[serde(default)]
    pub reading_time_minutes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    pub length: SummaryLength,
    pub style: SummaryStyle,
    pub focus: Option<SummaryFocus>,
    pub tone: Option<SummaryTone>,
}

pub struct SummaryTask {
    content: String,
    options: SummaryOptions,
}

impl SummaryTask {
    pub fn new(content: impl Into<String>, options: SummaryOptions) -> Self {
        Self {
            content: content.into(),
            options,
        }
    }
}

impl StructuredTask for SummaryTask {
    type Output = SummaryResult;

    fn kind(&self) -> TaskKind {
        TaskKind::Summarization
    }

    fn prompt(&self) -> Result<String, GenerationError> {
        let length = match self.options.length {
            SummaryLength::Concise => "Brief 2-3 sentences",
            SummaryLength::Detailed => "Detailed 2-3 paragraphs",
        };
        let format = match self.options.style {
            SummaryStyle::Bullet => "Bullet points",
            SummaryStyle::Paragraph => "Paragraph format",
        };
        let focus = self
            .options
            .focus
            .map(|f| format!("Focus on: {}", label(&f).replace('_', " ")))
            .unwrap_or_default();
        let tone = self
            .options
            .tone
            .map(|t| format!("Tone: {}", label(&t)))
            .unwrap_or_default();

        prompt_builder::build(
            &GenerationRequest::new(TaskKind::Summarization)
                .text("content", &self.content)
                .text("length_instruction", length)
                .text("format_instruction", format)
                .text("focus_instruction", focus)
                .text("tone_instruction", tone),
        )
    }

    fn generation_config(&self) -> GenerationConfig {
        CONFIG
    }

    fn normalize(&self, mut json: Value) -> Value {
        alias(&mut json, "keyPoints", &["key_points", "points", "keypoints"]);
        // Bullet-style answers sometimes return the summary itself as a list.
        rewrite(&mut json, "summary", |v| match v {
            Value::Array(_) => json!(string_list(v)
                .iter()
                .map(|line| format!("- {line}"))
                .collect::<Vec<_>>()
                .join("\n")),
            other => other.clone(),
        });
        rewrite(&mut json, "keyPoints", |v| json!(string_list(v)));
        json
    }

    fn contract(&self) -> ShapeContract {
        ShapeContract::new()
            .text("summary", 1)
            .array("keyPoints", 1, "key points")
    }

    fn finalize(&self, mut output: SummaryResult) -> Result<SummaryResult, GenerationError> {
        output.summary = output.summary.trim().to_string();
        output.original_word_count = word_count(&self.content);
        output.summary_word_count = word_count(&output.summary);
        output.reading_time_minutes = reading_minutes(output.original_word_count);

        if output.summary_word_count >= output.original_word_count {
            return Err(GenerationError::ValidationFailed(format!(
                "summary is not shorter than the original ({} vs {} words)",
                output.summary_word_count, output.original_word_count
            )));
        }
        Ok(output)
    }
}
