//! Per-widget orchestration: one submission from question to rendered answer.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::{AnswerEvent, Backend, NO_RESPONSE_FALLBACK};
use crate::credentials::{
    self, AcquireOutcome, CredentialPolicy, CredentialPrompt, CredentialStore,
};
use crate::error::QueryError;
use crate::page::{self, Document, NodeId};
use crate::prompt;
use crate::render;

use super::{QueryState, WidgetSurface};

/// Placeholder hint shown when the user submits an empty question.
const EMPTY_QUESTION_HINT: &str = "Please type a question first...";

/// Drives the query pipeline for one widget instance.
///
/// All state mutation happens inside [`submit`](Self::submit), which runs as
/// a single task per invocation; the `accepts_submit` guard is the only
/// concurrency control needed.
pub struct WidgetController<S: WidgetSurface> {
    state: QueryState,
    anchor: NodeId,
    backend: Arc<dyn Backend>,
    store: Arc<dyn CredentialStore>,
    credential_prompt: Arc<dyn CredentialPrompt>,
    surface: S,
}

impl<S: WidgetSurface> WidgetController<S> {
    pub fn new(
        anchor: NodeId,
        backend: Arc<dyn Backend>,
        store: Arc<dyn CredentialStore>,
        credential_prompt: Arc<dyn CredentialPrompt>,
        surface: S,
    ) -> Self {
        Self {
            state: QueryState::Idle,
            anchor,
            backend,
            store,
            credential_prompt,
            surface,
        }
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Run one submission end to end. Returns `false` when the submission
    /// was a no-op (busy widget or empty question) and no request was made.
    pub async fn submit(&mut self, doc: &Document, question: &str) -> bool {
        if !self.state.accepts_submit() {
            debug!(state = ?self.state, "submission ignored while busy");
            return false;
        }

        if question.trim().is_empty() {
            self.state = QueryState::Idle;
            self.surface.focus_input(Some(EMPTY_QUESTION_HINT));
            return false;
        }

        self.state = QueryState::InFlight;
        self.surface.set_busy(true);

        let context = page::extract(doc, self.anchor);
        let prompt = match prompt::build(&context, question) {
            Ok(p) => p,
            Err(e) => {
                self.finish_idle(Some(&e.to_string()));
                return false;
            }
        };

        let secret = match self.resolve_credential() {
            Ok(secret) => secret,
            // already back in Idle, no request was sent
            Err(QueryError::CredentialDeclined) => return true,
            Err(e) => {
                self.fail(&e);
                return true;
            }
        };

        let mut stream = match self.backend.send(&prompt, secret.as_deref()).await {
            Ok(stream) => stream,
            Err(e) => {
                self.handle_request_error(e);
                return true;
            }
        };

        let streaming_backend = self.backend.config().stream;
        let mut answer = String::new();
        loop {
            match stream.next().await {
                Some(Ok(AnswerEvent::Delta(text))) => {
                    if streaming_backend {
                        self.state = QueryState::Streaming;
                    }
                    answer.push_str(&text);
                    self.surface.show_output(&render::render(&answer));
                }
                Some(Ok(AnswerEvent::Done)) | None => break,
                Some(Err(e)) => {
                    self.handle_request_error(e);
                    return true;
                }
            }
        }

        if answer.is_empty() {
            self.surface.show_output(&render::render(NO_RESPONSE_FALLBACK));
        }
        info!(backend = %self.backend.config().id, len = answer.len(), "answer rendered");
        self.state = QueryState::Succeeded;
        self.surface.set_busy(false);
        true
    }

    /// Resolve the secret for this backend per its credential policy.
    ///
    /// `CredentialDeclined` means the invocation ended without a request
    /// (prompt cancelled or secret malformed); the widget is already back
    /// in `Idle` when it is returned.
    fn resolve_credential(&mut self) -> crate::error::Result<Option<String>> {
        let cfg = self.backend.config();
        match &cfg.policy {
            CredentialPolicy::Static(secret) => Ok(Some(secret.clone())),
            CredentialPolicy::UserSupplied => {
                if let Some(secret) = self.store.get(&cfg.id) {
                    return Ok(Some(secret));
                }
                self.state = QueryState::AwaitingCredential;
                let outcome = credentials::acquire(
                    self.store.as_ref(),
                    self.credential_prompt.as_ref(),
                    &cfg.id,
                    &cfg.credential_format,
                )?;
                match outcome {
                    AcquireOutcome::Granted(secret) => {
                        self.state = QueryState::InFlight;
                        Ok(Some(secret))
                    }
                    AcquireOutcome::Declined => {
                        self.finish_idle(None);
                        Err(QueryError::CredentialDeclined)
                    }
                    AcquireOutcome::Invalid => {
                        self.finish_idle(Some("That key doesn't look valid; nothing was saved."));
                        Err(QueryError::CredentialDeclined)
                    }
                }
            }
        }
    }

    /// Terminal handling for send/stream errors.
    fn handle_request_error(&mut self, err: QueryError) {
        match err {
            QueryError::CredentialRejected => {
                let cfg = self.backend.config();
                if matches!(cfg.policy, CredentialPolicy::UserSupplied) {
                    if let Err(e) = self.store.clear(&cfg.id) {
                        warn!(backend = %cfg.id, error = %e, "failed to clear rejected credential");
                    }
                }
                info!(backend = %cfg.id, "credential rejected; cleared for re-prompt");
                self.finish_idle(Some(
                    "The backend rejected your key. Submit again to enter a new one.",
                ));
            }
            other => self.fail(&other),
        }
    }

    /// Recovered outcome: back to `Idle`, control re-enabled, optional notice.
    fn finish_idle(&mut self, notice: Option<&str>) {
        if let Some(message) = notice {
            self.surface.show_notice(message);
        }
        self.state = QueryState::Idle;
        self.surface.set_busy(false);
    }

    /// Unrecovered outcome: error text rendered into the output region,
    /// widget re-submittable from `Failed`.
    fn fail(&mut self, err: &QueryError) {
        warn!(backend = %self.backend.config().id, error = %err, "submission failed");
        self.surface.show_output(&render::render(&err.to_string()));
        self.state = QueryState::Failed;
        self.surface.set_busy(false);
    }
}
