//! Widget state machine and host display contract.
//!
//! One [`controller::WidgetController`] per widget instance owns the
//! authoritative [`QueryState`] and guarantees at most one in-flight request.
//! The host supplies a [`WidgetSurface`]: the minimal contract over the real
//! input/submit/output grouping in the page.

pub mod controller;


pub use controller::WidgetController;

use crate::render::SafeHtml;

/// Authoritative per-widget state. Submissions are accepted only from
/// `Idle`, `Succeeded`, or `Failed`; everything else ignores them (no
/// queuing, no cancellation of the active request).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Idle,
    /// Blocked on the user supplying a secret for a user-supplied-credential
    /// backend.
    AwaitingCredential,
    /// Request dispatched, nothing received yet.
    InFlight,
    /// At least one streamed delta has arrived.
    Streaming,
    Succeeded,
    Failed,
}

impl QueryState {
    /// Whether a new submission may start from this state.
    pub fn accepts_submit(self) -> bool {
        matches!(
            self,
            QueryState::Idle | QueryState::Succeeded | QueryState::Failed
        )
    }
}

/// Host-side display contract for one widget instance.
///
/// The host owns the actual markup; the controller only drives these
/// transitions. `set_busy(true)` disables the submit control and shows its
/// busy label, `set_busy(false)` restores it. The keyboard contract (submit
/// key in the input activates submission) is the host's wiring; both paths
/// land in [`controller::WidgetController::submit`].
pub trait WidgetSurface: Send {
    /// Disable/enable the submit control, swapping its label.
    fn set_busy(&mut self, busy: bool);

    /// Replace the widget's output region with rendered markup.
    fn show_output(&mut self, html: &SafeHtml);

    /// Surface a short user-visible notice (credential prompts, hints).
    fn show_notice(&mut self, message: &str);

    /// Focus the text input, optionally swapping in a placeholder hint.
    fn focus_input(&mut self, placeholder: Option<&str>);
}
