//! Error taxonomy for the query pipeline.
//!
//! Every failure here is terminal for the current invocation: the controller
//! surfaces it in the widget's output region and returns the widget to a
//! re-submittable state. Nothing in this crate retries automatically.

use thiserror::Error;

/// Failures that can end a single widget invocation.
///
/// A malformed streaming frame is deliberately *not* represented here: the
/// SSE decoder skips bad frames without aborting the stream, so they never
/// propagate to the caller.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The question was empty or whitespace-only after trimming.
    ///
    /// The controller pre-validates input, so this is a defensive invariant
    /// for direct callers of the prompt builder.
    #[error("question is empty")]
    EmptyQuestion,

    /// The user cancelled the credential prompt or supplied a secret that
    /// failed the backend's format check. No request was sent.
    #[error("credential entry declined")]
    CredentialDeclined,

    /// The backend rejected the supplied credential (401/403, or a
    /// backend-specific key-format status). For a user-supplied policy the
    /// stored secret is cleared so the next attempt re-prompts.
    #[error("backend rejected the credential")]
    CredentialRejected,

    /// Non-success HTTP status other than a credential rejection.
    /// Surfaced verbatim to the user, never retried.
    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// Connection, DNS, or timeout failure before or during the response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The credential store could not be read or written.
    #[error("credential store failure: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;
