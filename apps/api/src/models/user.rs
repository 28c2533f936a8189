use serde::Serialize;

/// The authenticated caller behind a request, as reported by the identity provider.
#[derive(Debug, Clone, Serialize)]
pub struct Caller {
    pub user_id: String,
    pub email: Option<String>,
    pub email_verified: bool,
}
