//! Backend clients for hosted LLM chat endpoints.
//!
//! One [`Backend`] per provider wire shape, selected by configuration rather
//! than code duplication. Both variants deliver their answer through the
//! same [`AnswerStream`]: buffered backends emit exactly one delta, streaming
//! backends emit zero or more in arrival order.

mod gemini;
mod openai;
pub(crate) mod sse;

pub use gemini::GenerateContentBackend;
pub use openai::ChatCompletionsBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::credentials::{CredentialFormat, CredentialPolicy};
use crate::error::{QueryError, Result};
use crate::prompt::Prompt;

/// Shown when a backend answers successfully but carries no text at the
/// expected response path, or when a stream ends without ever producing one.
pub const NO_RESPONSE_FALLBACK: &str = "No response received";

/// Channel capacity for in-flight deltas.
const STREAM_BUFFER: usize = 32;

/// How a backend authenticates its requests. Applied from configuration,
/// never hard-coded into a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// Secret appended as a query parameter with the given name.
    QueryParam(String),
    /// `Authorization: Bearer <secret>` header.
    Bearer,
    /// No authentication at all (trusted proxy deployments).
    None,
}

/// Everything that varies between backend deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub id: String,
    pub endpoint: String,
    /// Model name for endpoints that take it in the body; `None` when the
    /// endpoint path already names the model.
    pub model: Option<String>,
    pub auth: AuthScheme,
    /// Statuses treated as credential rejection rather than generic failure.
    /// 401/403 everywhere, plus 400 for backends that signal a malformed key
    /// that way.
    pub reject_statuses: Vec<u16>,
    pub credential_format: CredentialFormat,
    pub policy: CredentialPolicy,
    /// Request incremental delivery where the wire shape supports it.
    pub stream: bool,
}

impl BackendConfig {
    /// Buffered `generateContent` deployment with the key in the query
    /// string. This API reports a malformed key as 400.
    pub fn gemini() -> Self {
        Self {
            id: "gemini".to_string(),
            endpoint:
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
                    .to_string(),
            model: None,
            auth: AuthScheme::QueryParam("key".to_string()),
            reject_statuses: vec![400, 401, 403],
            credential_format: CredentialFormat {
                min_len: 20,
                required_prefix: Some("AIza".to_string()),
            },
            policy: CredentialPolicy::UserSupplied,
            stream: false,
        }
    }

    /// Chat-completions deployment with bearer auth.
    pub fn chat_completions(
        id: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        stream: bool,
    ) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            model: Some(model.into()),
            auth: AuthScheme::Bearer,
            reject_statuses: vec![401, 403],
            credential_format: CredentialFormat {
                min_len: 20,
                required_prefix: Some("sk-".to_string()),
            },
            policy: CredentialPolicy::UserSupplied,
            stream,
        }
    }

    pub fn with_policy(mut self, policy: CredentialPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_credential_format(mut self, format: CredentialFormat) -> Self {
        self.credential_format = format;
        self
    }

    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }
}

/// One element of an in-progress answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerEvent {
    /// A text fragment, to be appended in arrival order.
    Delta(String),
    /// End of the answer. Nothing follows.
    Done,
}

/// Ordered, finite, non-restartable sequence of answer events.
///
/// Consumed by the controller, which re-renders the cumulative text on each
/// delta. Errors mid-stream terminate the sequence.
pub struct AnswerStream {
    rx: mpsc::Receiver<Result<AnswerEvent>>,
}

impl AnswerStream {
    /// New stream plus the sender its producer task feeds.
    pub fn channel() -> (mpsc::Sender<Result<AnswerEvent>>, Self) {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        (tx, Self { rx })
    }

    /// Single-element stream for buffered backends.
    pub fn from_text(text: impl Into<String>) -> Self {
        let (tx, stream) = Self::channel();
        // capacity is STREAM_BUFFER, these two sends cannot fail
        tx.try_send(Ok(AnswerEvent::Delta(text.into()))).ok();
        tx.try_send(Ok(AnswerEvent::Done)).ok();
        stream
    }

    pub async fn next(&mut self) -> Option<Result<AnswerEvent>> {
        self.rx.recv().await
    }
}

/// A hosted LLM chat endpoint and its wire shape.
#[async_trait]
pub trait Backend: Send + Sync {
    fn config(&self) -> &BackendConfig;

    /// Dispatch one request. A single failed attempt surfaces to the caller;
    /// no retries.
    async fn send(&self, prompt: &Prompt, secret: Option<&str>) -> Result<AnswerStream>;
}

/// Endpoint URL with query-parameter auth applied when configured.
pub(crate) fn request_url(cfg: &BackendConfig, secret: Option<&str>) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(&cfg.endpoint)
        .map_err(|e| QueryError::Transport(format!("invalid endpoint {}: {e}", cfg.endpoint)))?;
    if let (AuthScheme::QueryParam(name), Some(secret)) = (&cfg.auth, secret) {
        url.query_pairs_mut().append_pair(name, secret);
    }
    Ok(url)
}

/// Header-based auth applied when configured.
pub(crate) fn authorize(
    builder: reqwest::RequestBuilder,
    cfg: &BackendConfig,
    secret: Option<&str>,
) -> reqwest::RequestBuilder {
    match (&cfg.auth, secret) {
        (AuthScheme::Bearer, Some(secret)) => builder.bearer_auth(secret),
        _ => builder,
    }
}

/// Map a non-success status to the right error, consuming the response body
/// for the generic-failure case.
pub(crate) async fn ensure_success(
    cfg: &BackendConfig,
    resp: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let code = status.as_u16();
    if cfg.reject_statuses.contains(&code) {
        return Err(QueryError::CredentialRejected);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(QueryError::RequestFailed { status: code, body })
}
