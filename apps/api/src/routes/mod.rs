pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::tools::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Content tools
        .route(
            "/api/v1/tools/content-analysis",
            post(handlers::handle_content_analysis),
        )
        .route("/api/v1/tools/headlines", post(handlers::handle_headlines))
        .route("/api/v1/tools/summaries", post(handlers::handle_summary))
        .route("/api/v1/tools/rephrase", post(handlers::handle_rephrase))
        .route("/api/v1/tools/hashtags", post(handlers::handle_hashtags))
        .route(
            "/api/v1/tools/social-posts",
            post(handlers::handle_social_posts),
        )
        .route("/api/v1/tools/keywords", post(handlers::handle_keywords))
        .route("/api/v1/tools/articles", post(handlers::handle_article))
        .with_state(state)
}
