use serde::{Deserialize, Serialize};

/// A named content-generation operation with its own template and result shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    ContentAnalysis,
    Headlines,
    Summarization,
    Rephrasing,
    Hashtags,
    SocialPosts,
    KeywordExtraction,
    Article,
}

/// Sub-selector choosing among templates of the same task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Headline(HeadlineStyle),
    Hashtag(HashtagPlatform),
    Social(SocialFormat, SocialPlatform),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadlineStyle {
    #[default]
    Professional,
    Creative,
    News,
    Blog,
    Social,
    Cta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadlineTone {
    #[default]
    Formal,
    Casual,
    Persuasive,
    Informative,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashtagPlatform {
    Linkedin,
    Instagram,
    Twitter,
    Facebook,
    #[default]
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Linkedin,
    Twitter,
    Facebook,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialFormat {
    #[default]
    Professional,
    Howto,
    Comparison,
    Stepbystep,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    #[default]
    Concise,
    Detailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    Bullet,
    #[default]
    Paragraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryFocus {
    KeyPoints,
    MainIdeas,
    ActionableInsights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryTone {
    Formal,
    Casual,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RephraseStyle {
    #[default]
    Professional,
    Casual,
    Academic,
    Creative,
    Simple,
    Persuasive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RephraseTone {
    Formal,
    Informal,
    Empathetic,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ArticleLength {
    pub fn target_words(self) -> u32 {
        match self {
            ArticleLength::Short => 500,
            ArticleLength::Medium => 1000,
            ArticleLength::Long => 2000,
        }
    }
}

/// Lowercase wire name of a serde unit variant, for use inside prompts.
pub fn label<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
