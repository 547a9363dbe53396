//! Login screen reducer.
//!
//! `update` maps the current snapshot and one intent to the next snapshot
//! plus at most one effect. It performs no I/O; the controller executes the
//! returned effect.

use crate::providers::{AuthOperation, AuthOutcome};
use crate::view_state::{AuthMode, ViewState};

/// Error shown when the provider fails without a message.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// A discrete user or system action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthIntent {
    SetEmail(String),
    SetPassword(String),
    ToggleMode,
    Submit,
    AcknowledgeError,
    /// A provider call finished.
    Resolved(AuthResolution),
}

/// Outcome of one provider call, tagged with what was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResolution {
    pub operation: AuthOperation,
    pub email: String,
    pub outcome: AuthOutcome,
}

/// Side effects requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEffect {
    CallProvider {
        operation: AuthOperation,
        email: String,
        password: String,
    },
}

pub fn update(state: &ViewState, intent: AuthIntent) -> (ViewState, Option<AuthEffect>) {
    match intent {
        AuthIntent::SetEmail(email) => (state.with_email(email), None),
        AuthIntent::SetPassword(password) => (state.with_password(password), None),
        AuthIntent::ToggleMode => (state.with_mode_toggled(), None),
        AuthIntent::Submit => {
            let operation = match state.mode() {
                AuthMode::Login => AuthOperation::Login,
                AuthMode::Register => AuthOperation::Register,
            };
            let effect = AuthEffect::CallProvider {
                operation,
                email: state.email.clone(),
                password: state.password.clone(),
            };
            (state.with_loading(true), Some(effect))
        }
        AuthIntent::AcknowledgeError => (state.with_error(None), None),
        AuthIntent::Resolved(resolution) => (apply_outcome(state, resolution.outcome), None),
    }
}

fn apply_outcome(state: &ViewState, outcome: AuthOutcome) -> ViewState {
    let idle = state.with_loading(false);
    match outcome {
        // A success leaves any unacknowledged error in place.
        AuthOutcome::Success => idle,
        AuthOutcome::Failure { message } => {
            let message = message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
            idle.with_error(Some(message))
        }
    }
}
