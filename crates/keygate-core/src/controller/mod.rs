//! Authentication view-state controller.
//!
//! The controller owns the current [`ViewState`], turns intents into new
//! snapshots through the pure [`update`] reducer, publishes every snapshot
//! to observers, and executes the provider effect.
//!
//! ## Resolution inbox
//!
//! `submit()` spawns the provider call on the tokio runtime and returns at
//! once. The spawned task posts an [`AuthResolution`] to the controller's
//! inbox; the owner feeds it back through `drain_resolutions()` or
//! `next_resolution()`. That is the only asynchronous re-entry point, so all
//! state changes stay serialized on the owner's context.
//!
//! ```text
//! intent ──► update() ──► publish snapshot ──► observers
//!                │
//!                └─► CallProvider ──► tokio task ──► inbox ──► update()
//! ```

mod subscription;
mod update;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::mpsc;

pub use subscription::StateSubscription;
use subscription::Observers;
pub use update::{AuthEffect, AuthIntent, AuthResolution, FALLBACK_ERROR_MESSAGE, update};

use crate::providers::{AuthOutcome, AuthProvider};
use crate::view_state::ViewState;

/// Stateful owner of the login screen's view state.
///
/// Not meant to be shared across threads: intents are expected to arrive
/// serialized from one scheduling context.
pub struct AuthController {
    state: Arc<ViewState>,
    provider: Arc<dyn AuthProvider>,
    observers: Observers,
    inbox_tx: mpsc::UnboundedSender<AuthResolution>,
    inbox_rx: mpsc::UnboundedReceiver<AuthResolution>,
    /// Provider calls dispatched but not yet fed back.
    pending: usize,
}

impl AuthController {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(ViewState::default()),
            provider,
            observers: Observers::default(),
            inbox_tx,
            inbox_rx,
            pending: 0,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<ViewState> {
        Arc::clone(&self.state)
    }

    /// Registers an observer. The subscription yields the current snapshot
    /// first, then every later one.
    pub fn subscribe(&mut self) -> StateSubscription {
        self.observers.attach(Arc::clone(&self.state))
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Number of provider calls whose resolution has not been applied yet.
    pub fn pending_calls(&self) -> usize {
        self.pending
    }

    pub fn set_email(&mut self, text: impl Into<String>) {
        self.dispatch(AuthIntent::SetEmail(text.into()));
    }

    pub fn set_password(&mut self, text: impl Into<String>) {
        self.dispatch(AuthIntent::SetPassword(text.into()));
    }

    pub fn toggle_mode(&mut self) {
        self.dispatch(AuthIntent::ToggleMode);
    }

    /// Marks the screen loading and dispatches login or register.
    ///
    /// Does not guard against an outstanding call; see
    /// [`ViewState::can_submit`].
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn submit(&mut self) {
        self.dispatch(AuthIntent::Submit);
    }

    pub fn acknowledge_error(&mut self) {
        self.dispatch(AuthIntent::AcknowledgeError);
    }

    /// Applies one intent: computes the next snapshot, publishes it, then
    /// runs the effect (if any).
    pub fn dispatch(&mut self, intent: AuthIntent) {
        if matches!(intent, AuthIntent::Submit) && self.state.loading {
            tracing::warn!("submit while a provider call is outstanding");
        }
        let (next, effect) = update(&self.state, intent);
        self.replace(next);
        if let Some(effect) = effect {
            self.execute(effect);
        }
    }

    /// Applies every resolution already in the inbox, oldest first.
    pub fn drain_resolutions(&mut self) -> Vec<AuthResolution> {
        let mut applied = Vec::new();
        while let Ok(resolution) = self.inbox_rx.try_recv() {
            self.apply_resolution(resolution.clone());
            applied.push(resolution);
        }
        applied
    }

    /// Waits for the next provider resolution and applies it.
    ///
    /// Returns `None` immediately when no call is outstanding.
    pub async fn next_resolution(&mut self) -> Option<AuthResolution> {
        if self.pending == 0 {
            return None;
        }
        let resolution = self.inbox_rx.recv().await?;
        self.apply_resolution(resolution.clone());
        Some(resolution)
    }

    /// Detaches all observers. The controller keeps working but nobody is
    /// notified anymore.
    pub fn dispose(&mut self) {
        tracing::debug!(observers = self.observers.len(), "auth controller disposed");
        self.observers.clear();
    }

    fn apply_resolution(&mut self, resolution: AuthResolution) {
        self.pending = self.pending.saturating_sub(1);
        match &resolution.outcome {
            AuthOutcome::Success => {
                tracing::info!(
                    operation = resolution.operation.label(),
                    "authentication successful"
                );
            }
            AuthOutcome::Failure { message } => {
                tracing::info!(
                    operation = resolution.operation.label(),
                    reason = message.as_deref().unwrap_or(FALLBACK_ERROR_MESSAGE),
                    "authentication failed"
                );
            }
        }
        self.dispatch(AuthIntent::Resolved(resolution));
    }

    fn replace(&mut self, next: ViewState) {
        if *self.state == next {
            return;
        }
        tracing::debug!(
            loading = next.loading,
            register_mode = next.register_mode,
            submit_enabled = next.submit_enabled,
            has_error = next.error.is_some(),
            "view state updated"
        );
        self.state = Arc::new(next);
        self.observers.publish(&self.state);
    }

    fn execute(&mut self, effect: AuthEffect) {
        match effect {
            AuthEffect::CallProvider {
                operation,
                email,
                password,
            } => {
                self.pending += 1;
                let provider = Arc::clone(&self.provider);
                let inbox = self.inbox_tx.clone();
                tracing::debug!(operation = operation.label(), "dispatching provider call");
                tokio::spawn(async move {
                    // A panicking provider still resolves, as a failure.
                    let call = AssertUnwindSafe(async {
                        provider.call(operation, &email, &password).await
                    });
                    let outcome = match call.catch_unwind().await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            tracing::warn!(operation = operation.label(), "provider call panicked");
                            AuthOutcome::Failure { message: None }
                        }
                    };
                    // Receiver is gone only if the controller was dropped.
                    let _ = inbox.send(AuthResolution {
                        operation,
                        email,
                        outcome,
                    });
                });
            }
        }
    }
}

impl Drop for AuthController {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests;
