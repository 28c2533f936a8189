use std::sync::Arc;

use crate::auth::IdentityVerifier;
use crate::config::Config;
use crate::in_flight::InFlightRegistry;
use crate::llm_client::GenerationClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: GenerationClient,
    /// Pluggable identity verifier. Hosted lookup when `IDENTITY_API_KEY` is set.
    pub identity: Arc<dyn IdentityVerifier>,
    pub in_flight: Arc<InFlightRegistry>,
    pub config: Config,
}
