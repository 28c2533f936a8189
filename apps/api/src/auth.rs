//! Caller authentication against the hosted identity provider.
//!
//! Handlers take an `AuthenticatedCaller` argument; the extractor reads the
//! bearer token, asks the configured `IdentityVerifier` who it belongs to and
//! refuses callers whose email is not verified.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::user::Caller;
use crate::state::AppState;

const IDENTITY_API_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

/// Resolves an ID token to the caller it was issued to.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Caller, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Hosted verifier
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

/// Looks tokens up through the identity toolkit `accounts:lookup` endpoint.
#[derive(Clone)]
pub struct HostedIdentityVerifier {
    client: Client,
    api_key: String,
    base_url: String,
}

impl HostedIdentityVerifier {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: IDENTITY_API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl IdentityVerifier for HostedIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<Caller, AppError> {
        let response = self
            .client
            .post(format!("{}/accounts:lookup", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "idToken": token }))
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("identity lookup failed: {e}")))?;

        let status = response.status();
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Identity provider rejected token ({status})");
                return Err(AppError::Unauthorized("Invalid or expired token".to_string()));
            }
            s if !s.is_success() => {
                warn!("Identity provider returned {s}");
                return Err(AppError::Internal(anyhow::anyhow!(
                    "identity provider returned {s}"
                )));
            }
            _ => {}
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("identity lookup body: {e}")))?;

        let user = body
            .users
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(Caller {
            user_id: user.local_id,
            email: user.email,
            email_verified: user.email_verified,
        })
    }
}

/// Used when no identity API key is configured. Every protected request fails loudly.
pub struct UnconfiguredVerifier;

#[async_trait]
impl IdentityVerifier for UnconfiguredVerifier {
    async fn verify(&self, _token: &str) -> Result<Caller, AppError> {
        Err(AppError::Configuration(
            "identity provider is not configured".to_string(),
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extractor
// ────────────────────────────────────────────────────────────────────────────

/// A caller with a valid token and a verified email.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub Caller);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
        let caller = state.identity.verify(token).await?;
        if !caller.email_verified {
            return Err(AppError::Forbidden(
                "Email address has not been verified".to_string(),
            ));
        }
        Ok(AuthenticatedCaller(caller))
    }
}

#[cfg(test)]
pub mod testing {
    //! Fixed-answer verifier for handler and router tests.

    use super::*;

    pub struct StaticVerifier {
        pub caller: Option<Caller>,
    }

    impl StaticVerifier {
        pub fn verified(user_id: &str) -> Self {
            Self {
                caller: Some(Caller {
                    user_id: user_id.to_string(),
                    email: Some(format!("{user_id}@example.com")),
                    email_verified: true,
                }),
            }
        }

        pub fn unverified(user_id: &str) -> Self {
            let mut verifier = Self::verified(user_id);
            if let Some(caller) = verifier.caller.as_mut() {
                caller.email_verified = false;
            }
            verifier
        }

        pub fn rejecting() -> Self {
            Self { caller: None }
        }
    }

    #[async_trait]
    impl IdentityVerifier for StaticVerifier {
        async fn verify(&self, _token: &str) -> Result<Caller, AppError> {
            self.caller
                .clone()
                .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))
        }
    }
}
