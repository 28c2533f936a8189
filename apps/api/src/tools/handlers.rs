use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthenticatedCaller;
use crate::errors::AppError;
use crate::llm_client::{Generated, StructuredTask};
use crate::models::task::{
    ArticleLength, HashtagPlatform, HeadlineStyle, HeadlineTone, RephraseStyle, RephraseTone,
    SocialFormat, SocialPlatform, SummaryFocus, SummaryLength, SummaryStyle, SummaryTone,
};
use crate::state::AppState;
use crate::tools::analyzer::{ContentAnalysis, ContentAnalysisTask};
use crate::tools::article::{ArticleBrief, ArticleTask, GeneratedArticle, MIN_TITLE_CHARS};
use crate::tools::hashtags::{HashtagSet, HashtagTask};
use crate::tools::headlines::{HeadlineSet, HeadlineTask, DEFAULT_COUNT, MAX_COUNT};
use crate::tools::keywords::{KeywordReport, KeywordTask};
use crate::tools::rephraser::{RephraseTask, RephrasedContent};
use crate::tools::social::{SocialPostSet, SocialPostTask};
use crate::tools::summarizer::{SummaryOptions, SummaryResult, SummaryTask};

type ToolResponse<T> = Result<Json<Generated<T>>, AppError>;

/// Runs `task` for `caller`, superseding any earlier request of theirs for the same tool.
async fn run_tool<T>(state: &AppState, caller: &AuthenticatedCaller, task: T) -> ToolResponse<T::Output>
where
    T: StructuredTask,
    T::Output: Serialize,
{
    let kind = task.kind();
    let ticket = state.in_flight.begin(&caller.0.user_id, kind);
    info!(
        "{kind:?} requested by {} (request #{})",
        caller.0.user_id,
        ticket.generation()
    );
    let generated = ticket.run(state.llm.generate(&task)).await??;
    Ok(Json(generated))
}

fn require_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct HeadlineRequest {
    pub topic: String,
    #[serde(default)]
    pub style: HeadlineStyle,
    #[serde(default)]
    pub tone: HeadlineTone,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub content: String,
    #[serde(default)]
    pub length: SummaryLength,
    #[serde(default)]
    pub style: SummaryStyle,
    pub focus: Option<SummaryFocus>,
    pub tone: Option<SummaryTone>,
}

#[derive(Debug, Deserialize)]
pub struct RephraseRequest {
    pub content: String,
    #[serde(default)]
    pub style: RephraseStyle,
    #[serde(default)]
    pub tone: RephraseTone,
    #[serde(default)]
    pub preserve_keywords: bool,
}

#[derive(Debug, Deserialize)]
pub struct HashtagRequest {
    pub content: String,
    #[serde(default)]
    pub platform: HashtagPlatform,
}

#[derive(Debug, Deserialize)]
pub struct SocialPostRequest {
    pub content: String,
    pub platform: SocialPlatform,
    #[serde(default)]
    pub format: SocialFormat,
}

#[derive(Debug, Deserialize)]
pub struct ArticleRequest {
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default)]
    pub length: ArticleLength,
    #[serde(default = "default_language")]
    pub language: String,
    pub key_notes: Option<String>,
}

fn default_content_type() -> String {
    "blog post".to_string()
}

fn default_tone() -> String {
    "professional".to_string()
}

fn default_language() -> String {
    "English".to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tools/content-analysis
pub async fn handle_content_analysis(
    State(state): State<AppState>,
    caller: AuthenticatedCaller,
    Json(req): Json<ContentRequest>,
) -> ToolResponse<ContentAnalysis> {
    require_content(&req.content)?;
    run_tool(&state, &caller, ContentAnalysisTask::new(req.content)).await
}

/// POST /api/v1/tools/headlines
pub async fn handle_headlines(
    State(state): State<AppState>,
    caller: AuthenticatedCaller,
    Json(req): Json<HeadlineRequest>,
) -> ToolResponse<HeadlineSet> {
    require_content(&req.topic)?;
    let count = req.count.unwrap_or(DEFAULT_COUNT);
    if !(1..=MAX_COUNT).contains(&count) {
        return Err(AppError::Validation(format!(
            "count must be between 1 and {MAX_COUNT}"
        )));
    }
    run_tool(
        &state,
        &caller,
        HeadlineTask::new(req.topic, req.style, req.tone, count),
    )
    .await
}

/// POST /api/v1/tools/summaries
pub async fn handle_summary(
    State(state): State<AppState>,
    caller: AuthenticatedCaller,
    Json(req): Json<SummaryRequest>,
) -> ToolResponse<SummaryResult> {
    require_content(&req.content)?;
    let options = SummaryOptions {
        length: req.length,
        style: req.style,
        focus: req.focus,
        tone: req.tone,
    };
    run_tool(&state, &caller, SummaryTask::new(req.content, options)).await
}

/// POST /api/v1/tools/rephrase
pub async fn handle_rephrase(
    State(state): State<AppState>,
    caller: AuthenticatedCaller,
    Json(req): Json<RephraseRequest>,
) -> ToolResponse<RephrasedContent> {
    require_content(&req.content)?;
    run_tool(
        &state,
        &caller,
        RephraseTask::new(req.content, req.style, req.tone, req.preserve_keywords),
    )
    .await
}

/// POST /api/v1/tools/hashtags
///
/// Short content is not rejected here; the tool answers it with the canned set.
pub async fn handle_hashtags(
    State(state): State<AppState>,
    caller: AuthenticatedCaller,
    Json(req): Json<HashtagRequest>,
) -> ToolResponse<HashtagSet> {
    run_tool(&state, &caller, HashtagTask::new(req.content, req.platform)).await
}

/// POST /api/v1/tools/social-posts
pub async fn handle_social_posts(
    State(state): State<AppState>,
    caller: AuthenticatedCaller,
    Json(req): Json<SocialPostRequest>,
) -> ToolResponse<SocialPostSet> {
    require_content(&req.content)?;
    run_tool(
        &state,
        &caller,
        SocialPostTask::new(req.content, req.platform, req.format),
    )
    .await
}

/// POST /api/v1/tools/keywords
pub async fn handle_keywords(
    State(state): State<AppState>,
    caller: AuthenticatedCaller,
    Json(req): Json<ContentRequest>,
) -> ToolResponse<KeywordReport> {
    require_content(&req.content)?;
    run_tool(&state, &caller, KeywordTask::new(req.content)).await
}

/// POST /api/v1/tools/articles
pub async fn handle_article(
    State(state): State<AppState>,
    caller: AuthenticatedCaller,
    Json(req): Json<ArticleRequest>,
) -> ToolResponse<GeneratedArticle> {
    let title = req.title.trim().to_string();
    if title.chars().count() < MIN_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "title must be at least {MIN_TITLE_CHARS} characters"
        )));
    }
    let brief = ArticleBrief {
        title,
        keywords: req
            .keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        content_type: req.content_type,
        tone: req.tone,
        length: req.length,
        language: req.language,
        key_notes: req.key_notes,
    };
    run_tool(&state, &caller, ArticleTask::new(brief)).await
}
