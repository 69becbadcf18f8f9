//! Busy-state handling around a single remote call.
//!
//! Every feature action goes through [`RequestLifecycle::run`]: validate the
//! input, disable the trigger, call the service once, apply or report, and
//! always re-enable the trigger afterwards.

use std::future::Future;

use tracing::{debug, error, warn};

use crate::error::{require_prompt, RemoteError};
use crate::notify::ToastNotifier;
use crate::shared::Shared;

#[derive(Debug, Clone)]
struct ControlState {
    idle_label: String,
    pending_label: String,
    label: String,
    enabled: bool,
}

/// A user-facing button: enabled with its idle label, or disabled showing a
/// pending label while its request is in flight.
#[derive(Debug, Clone)]
pub struct TriggerControl {
    state: Shared<ControlState>,
}

impl TriggerControl {
    pub fn new(idle_label: impl Into<String>, pending_label: impl Into<String>) -> Self {
        let idle_label = idle_label.into();
        Self {
            state: Shared::new(ControlState {
                label: idle_label.clone(),
                idle_label,
                pending_label: pending_label.into(),
                enabled: true,
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.with(|state| state.enabled)
    }

    pub fn label(&self) -> String {
        self.state.with(|state| state.label.clone())
    }

    /// Disables the control and swaps in the pending label. Returns `None`
    /// if it is already disabled.
    pub fn engage(&self) -> Option<BusyGuard> {
        self.state.with(|state| {
            if !state.enabled {
                return None;
            }
            state.enabled = false;
            state.label = state.pending_label.clone();
            Some(BusyGuard {
                control: self.clone(),
            })
        })
    }

    fn restore(&self) {
        self.state.with(|state| {
            state.enabled = true;
            state.label = state.idle_label.clone();
        });
    }
}

/// Re-enables its control when dropped, on every exit path including
/// unwinding.
#[derive(Debug)]
pub struct BusyGuard {
    control: TriggerControl,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.control.restore();
    }
}

/// Per-action wording for the lifecycle's notifications.
#[derive(Debug, Clone, Copy)]
pub struct ActionSpec {
    pub name: &'static str,
    pub empty_message: &'static str,
    pub success_title: &'static str,
    pub failure_message: &'static str,
}

/// How a trigger activation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Input failed validation; nothing was sent.
    Rejected,
    /// The control was already busy; nothing was sent.
    Busy,
    Applied,
    Failed,
}

#[derive(Debug, Clone)]
pub struct RequestLifecycle {
    notifier: ToastNotifier,
}

impl RequestLifecycle {
    pub fn new(notifier: ToastNotifier) -> Self {
        Self { notifier }
    }

    /// Runs one trigger activation.
    ///
    /// `call` receives the trimmed prompt and is invoked at most once.
    /// `apply` only sees successful payloads; if it returns a message, a
    /// success toast titled `spec.success_title` is shown.
    pub async fn run<T, F, Fut, A>(
        &self,
        spec: &ActionSpec,
        control: &TriggerControl,
        input: &str,
        call: F,
        apply: A,
    ) -> Outcome
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
        A: FnOnce(T) -> Option<String>,
    {
        let prompt = match require_prompt(input) {
            Ok(prompt) => prompt,
            Err(_) => {
                self.notifier.error("Empty Prompt", spec.empty_message);
                return Outcome::Rejected;
            }
        };

        let Some(_busy) = control.engage() else {
            debug!(action = spec.name, "trigger already busy, ignoring activation");
            return Outcome::Busy;
        };

        debug!(action = spec.name, chars = prompt.chars().count(), "dispatching request");
        match call(prompt).await {
            Ok(payload) => {
                if let Some(message) = apply(payload) {
                    self.notifier.success(spec.success_title, message);
                }
                Outcome::Applied
            }
            Err(err) => {
                match &err {
                    RemoteError::Rejected { .. } => warn!(action = spec.name, error = %err, "request rejected"),
                    _ => error!(action = spec.name, error = %err, "request failed"),
                }
                self.notifier.error("Error", spec.failure_message);
                Outcome::Failed
            }
        }
    }
}
