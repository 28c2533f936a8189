//! Generation client: the single point of entry for all generative-API calls.
//!
//! ARCHITECTURAL RULE: tools never talk to the endpoint directly. They describe
//! themselves as a `StructuredTask` and hand it to `GenerationClient::generate`,
//! which owns retrying, extraction, normalization, validation and fallback.
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub mod error;
pub mod extract;
pub mod prompts;
pub mod retry;
pub mod transport;
pub mod validate;

use crate::models::task::TaskKind;
use error::{FailureRecord, GenerationError};
use extract::ExtractedPayload;
use retry::RetryPolicy;
use transport::{GenerationConfig, Transport};
use validate::ShapeContract;

/// The model used for every generation call. Hardcoded to avoid drift between tools.
pub const MODEL: &str = "gemini-1.5-pro";

/// What a tool must declare to be run by the client.
pub trait StructuredTask: Send + Sync {
    type Output: DeserializeOwned + Serialize + Send;

    fn kind(&self) -> TaskKind;

    /// Renders the full prompt. Errors here are configuration errors and are never retried.
    fn prompt(&self) -> Result<String, GenerationError>;

    fn generation_config(&self) -> GenerationConfig;

    /// Turns raw model text into a JSON payload. Runs inside the retry loop,
    /// so `Malformed` here costs an attempt rather than failing the invocation.
    fn parse(&self, raw: &str) -> Result<ExtractedPayload, GenerationError> {
        extract::extract(raw)
    }

    /// Maps historically-observed payload shapes onto the canonical one.
    fn normalize(&self, json: Value) -> Value {
        json
    }

    fn contract(&self) -> ShapeContract;

    /// Derived fields and checks that need the typed record.
    fn finalize(&self, output: Self::Output) -> Result<Self::Output, GenerationError> {
        Ok(output)
    }

    /// Canned result used instead of a non-critical failure. `None` means fail loudly.
    fn fallback(&self) -> Option<Self::Output> {
        None
    }

    /// True when the input is too thin to be worth a network call.
    fn insufficient_input(&self) -> bool {
        false
    }
}

/// Where a result came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultSource {
    Generated { attempts: u32 },
    Fallback { reason: String },
}

/// A validated, canonical result plus its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct Generated<T> {
    pub result: T,
    pub source: ResultSource,
}

/// Per-invocation states. Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Idle,
    Building,
    Attempting(u32),
    Extracting,
    Validating,
    Done,
    ValidationFailed,
    Aborted,
    Exhausted,
}

impl InvocationState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InvocationState::Done
                | InvocationState::ValidationFailed
                | InvocationState::Aborted
                | InvocationState::Exhausted
        )
    }

    fn after_failure(err: &GenerationError) -> Self {
        match err {
            GenerationError::Exhausted { .. } => InvocationState::Exhausted,
            GenerationError::ValidationFailed(_) => InvocationState::ValidationFailed,
            _ => InvocationState::Aborted,
        }
    }
}

/// Constructed once at startup and shared for the process lifetime. Cloning is cheap.
#[derive(Clone)]
pub struct GenerationClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl GenerationClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
        }
    }

    #[cfg(test)]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `task` end to end. Falls back to the task's canned result for
    /// non-critical failures when it has one.
    pub async fn generate<T: StructuredTask>(
        &self,
        task: &T,
    ) -> Result<Generated<T::Output>, FailureRecord> {
        let invocation = Uuid::new_v4();
        let kind = task.kind();

        if task.insufficient_input() {
            if let Some(result) = task.fallback() {
                info!("[{invocation}] {kind:?}: input too short, serving fallback");
                return Ok(Generated {
                    result,
                    source: ResultSource::Fallback {
                        reason: "content too short to analyze".to_string(),
                    },
                });
            }
            return Err(GenerationError::ValidationFailed(
                "content is too short to analyze".to_string(),
            )
            .into_record(0));
        }

        match self.run(invocation, task).await {
            Ok((result, attempts)) => Ok(Generated {
                result,
                source: ResultSource::Generated { attempts },
            }),
            Err(record) if record.kind.allows_fallback() => match task.fallback() {
                Some(result) => {
                    warn!(
                        "[{invocation}] {kind:?}: serving fallback after failure: {}",
                        record.message
                    );
                    Ok(Generated {
                        result,
                        source: ResultSource::Fallback {
                            reason: record.message,
                        },
                    })
                }
                None => Err(record),
            },
            Err(record) => Err(record),
        }
    }

    async fn run<T: StructuredTask>(
        &self,
        invocation: Uuid,
        task: &T,
    ) -> Result<(T::Output, u32), FailureRecord> {
        let kind = task.kind();
        let mut state = InvocationState::Idle;
        let mut transition = |next: InvocationState| {
            debug_assert!(!state.is_terminal(), "left terminal state {state:?}");
            debug!("[{invocation}] {kind:?}: {state:?} -> {next:?}");
            state = next;
        };

        transition(InvocationState::Building);
        let prompt = match task.prompt() {
            Ok(prompt) => prompt,
            Err(err) => {
                error!("[{invocation}] {kind:?}: prompt build failed: {err}");
                transition(InvocationState::Aborted);
                return Err(err.into_record(0));
            }
        };
        let config = task.generation_config();
        let prompt = prompt.as_str();

        let mut log = Vec::new();
        let outcome = self
            .policy
            .execute(&mut log, |attempt| {
                let transport = Arc::clone(&self.transport);
                async move {
                    let raw = transport.send(prompt, &config, attempt.timeout).await?;
                    debug!(
                        "[{invocation}] {kind:?}: attempt {} got HTTP {} ({} chars)",
                        attempt.attempt_number,
                        raw.http_status,
                        raw.text.len()
                    );
                    task.parse(&raw.text)
                }
            })
            .await;
        let attempts = log.len() as u32;
        if let Some(attempt) = log.last() {
            debug!(
                "[{invocation}] {kind:?}: last attempt {} started at {}",
                attempt.attempt_number,
                attempt.started_at.to_rfc3339()
            );
            transition(InvocationState::Attempting(attempt.attempt_number));
        }

        let payload = match outcome {
            Ok(payload) => payload,
            Err(err) => {
                error!("[{invocation}] {kind:?}: generation failed: {err}");
                transition(InvocationState::after_failure(&err));
                return Err(err.into_record(attempts));
            }
        };
        transition(InvocationState::Extracting);
        debug!(
            "[{invocation}] {kind:?}: extracted {} chars of JSON",
            payload.source_span.len()
        );

        transition(InvocationState::Validating);
        let validated = validate::validate::<T::Output>(&task.contract(), task.normalize(payload.json))
            .and_then(|output| task.finalize(output));

        match validated {
            Ok(output) => {
                transition(InvocationState::Done);
                info!("[{invocation}] {kind:?}: done after {attempts} attempt(s)");
                Ok((output, attempts))
            }
            Err(err) => {
                warn!("[{invocation}] {kind:?}: {err}");
                transition(InvocationState::after_failure(&err));
                Err(err.into_record(attempts))
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::error::FailureKind;
    use super::testing::ScriptedTransport;
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Tags {
        tags: Vec<String>,
    }

    struct TagTask {
        fallback: bool,
        short: bool,
    }

    impl StructuredTask for TagTask {
        type Output = Tags;

        fn kind(&self) -> TaskKind {
            TaskKind::Hashtags
        }

        fn prompt(&self) -> Result<String, GenerationError> {
            Ok("give me tags".to_string())
        }

        fn generation_config(&self) -> GenerationConfig {
            GenerationConfig::new(0.5, 10, 0.9, 128)
        }

        fn normalize(&self, mut json: Value) -> Value {
            if let Some(list) = json.get("hashtags").cloned() {
                json["tags"] = list;
            }
            json
        }

        fn contract(&self) -> ShapeContract {
            ShapeContract::new().array("tags", 2, "tags")
        }

        fn fallback(&self) -> Option<Tags> {
            self.fallback.then(|| Tags {
                tags: vec!["#Default".to_string()],
            })
        }

        fn insufficient_input(&self) -> bool {
            self.short
        }
    }

    fn client(transport: ScriptedTransport) -> (GenerationClient, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        (GenerationClient::new(transport.clone()), transport)
    }

    const LOUD: TagTask = TagTask {
        fallback: false,
        short: false,
    };

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let (client, transport) = client(ScriptedTransport::replying(r##"{"tags": ["#a", "#b"]}"##));
        let out = client.generate(&LOUD).await.unwrap();
        assert_eq!(out.result.tags, vec!["#a", "#b"]);
        assert_eq!(out.source, ResultSource::Generated { attempts: 1 });
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_normalize_runs_before_validation() {
        let (client, _) = client(ScriptedTransport::replying(
            "Here you go: ```json\n{\"hashtags\": [\"#x\", \"#y\"]}\n```",
        ));
        let out = client.generate(&LOUD).await.unwrap();
        assert_eq!(out.result.tags, vec!["#x", "#y"]);
    }

    #[tokio::test]
    async fn test_malformed_then_valid_succeeds_with_escalated_timeouts() {
        let (client, transport) = client(ScriptedTransport::new(vec![
            Ok("I cannot do that".to_string()),
            Err(GenerationError::Timeout { timeout_ms: 90_000 }),
            Ok(r##"{"tags": ["#a", "#b"]}"##.to_string()),
        ]));
        let out = client.generate(&LOUD).await.unwrap();
        assert_eq!(out.source, ResultSource::Generated { attempts: 3 });
        assert_eq!(
            *transport.timeouts.lock().unwrap(),
            vec![
                Duration::from_millis(60_000),
                Duration::from_millis(90_000),
                Duration::from_millis(135_000)
            ]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_surfaces_failure_record() {
        let (client, transport) = client(ScriptedTransport::new(vec![
            Err(GenerationError::network("down")),
            Err(GenerationError::network("down")),
            Err(GenerationError::network("down")),
        ]));
        let record = client.generate(&LOUD).await.unwrap_err();
        assert_eq!(record.kind, FailureKind::Exhausted);
        assert_eq!(record.attempts, 3);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried_or_replaced_by_fallback() {
        let (client, transport) = client(ScriptedTransport::new(vec![Err(
            GenerationError::Unauthorized("bad key".into()),
        )]));
        let task = TagTask {
            fallback: true,
            short: false,
        };
        let record = client.generate(&task).await.unwrap_err();
        assert_eq!(record.kind, FailureKind::Unauthorized);
        assert_eq!(record.attempts, 1);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_is_not_retried() {
        let (client, transport) = client(ScriptedTransport::new(vec![
            Ok(r##"{"tags": ["#only"]}"##.to_string()),
            Ok(r##"{"tags": ["#a", "#b"]}"##.to_string()),
        ]));
        let record = client.generate(&LOUD).await.unwrap_err();
        assert_eq!(record.kind, FailureKind::ValidationFailed);
        assert!(record.message.contains("fewer than 2 tags"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_fallback_replaces_exhaustion() {
        let (client, _) = client(ScriptedTransport::new(vec![]));
        let task = TagTask {
            fallback: true,
            short: false,
        };
        let out = client.generate(&task).await.unwrap();
        assert_eq!(out.result.tags, vec!["#Default"]);
        assert!(matches!(out.source, ResultSource::Fallback { .. }));
    }

    #[tokio::test]
    async fn test_insufficient_input_skips_the_network() {
        let (client, transport) = client(ScriptedTransport::new(vec![]));
        let task = TagTask {
            fallback: true,
            short: true,
        };
        let out = client.generate(&task).await.unwrap();
        assert_eq!(
            out.source,
            ResultSource::Fallback {
                reason: "content too short to analyze".to_string()
            }
        );
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_custom_policy_bounds_attempts() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let client = GenerationClient::new(transport.clone()).with_policy(RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        });
        let record = client.generate(&LOUD).await.unwrap_err();
        assert_eq!(record.attempts, 1);
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_terminal_states() {
        assert!(InvocationState::Done.is_terminal());
        assert!(InvocationState::Exhausted.is_terminal());
        assert!(!InvocationState::Attempting(2).is_terminal());
        assert!(!InvocationState::Idle.is_terminal());
        assert_eq!(
            InvocationState::after_failure(&GenerationError::Unauthorized("x".into())),
            InvocationState::Aborted
        );
    }

    #[test]
    fn test_generated_serializes_source_tag() {
        let out = Generated {
            result: json!({ "ok": true }),
            source: ResultSource::Generated { attempts: 2 },
        };
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["source"]["type"], "generated");
        assert_eq!(value["source"]["attempts"], 2);
    }
}
