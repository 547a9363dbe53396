use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::oneshot;

use super::*;
use crate::providers::{AuthOperation, AuthOutcome, AuthProvider};
use crate::validation::{is_email_valid, is_password_valid};

/// Provider double: records calls and resolves each one with the next
/// scripted outcome (or waits on a gate when one is queued).
#[derive(Default)]
struct ScriptedProvider {
    calls: Mutex<Vec<(AuthOperation, String, String)>>,
    outcomes: Mutex<VecDeque<AuthOutcome>>,
    gates: Mutex<VecDeque<oneshot::Receiver<AuthOutcome>>>,
}

impl ScriptedProvider {
    fn with_outcome(outcome: AuthOutcome) -> Arc<Self> {
        let provider = Self::default();
        provider.outcomes.lock().unwrap().push_back(outcome);
        Arc::new(provider)
    }

    /// Next call blocks until the returned sender fires.
    fn gate(&self) -> oneshot::Sender<AuthOutcome> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    fn calls(&self) -> Vec<(AuthOperation, String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn respond<'a>(
        &'a self,
        operation: AuthOperation,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, AuthOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push((operation, email.to_string(), password.to_string()));
        let gate = self.gates.lock().unwrap().pop_front();
        let scripted = self.outcomes.lock().unwrap().pop_front();
        async move {
            match gate {
                Some(rx) => rx.await.unwrap_or(AuthOutcome::Failure { message: None }),
                None => scripted.unwrap_or(AuthOutcome::Success),
            }
        }
        .boxed()
    }
}

impl AuthProvider for ScriptedProvider {
    fn login<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, AuthOutcome> {
        self.respond(AuthOperation::Login, email, password)
    }

    fn register<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, AuthOutcome> {
        self.respond(AuthOperation::Register, email, password)
    }
}

fn controller_with(provider: &Arc<ScriptedProvider>) -> AuthController {
    let provider: Arc<dyn AuthProvider> = Arc::clone(provider) as Arc<dyn AuthProvider>;
    AuthController::new(provider)
}

fn fill_valid(controller: &mut AuthController) {
    controller.set_email("test@example.com");
    controller.set_password("123456");
}

#[test]
fn test_set_email_invalid_sets_error() {
    let mut controller = controller_with(&Arc::default());
    controller.set_email("invalid");
    assert_eq!(controller.state().email_error.as_deref(), Some("Invalid email"));
}

#[test]
fn test_set_email_valid_clears_error() {
    let mut controller = controller_with(&Arc::default());
    controller.set_email("invalid");
    controller.set_email("test@example.com");
    assert_eq!(controller.state().email_error, None);
    controller.set_email("");
    assert_eq!(controller.state().email_error, None);
}

#[test]
fn test_set_password_short_sets_error() {
    let mut controller = controller_with(&Arc::default());
    controller.set_password("123");
    assert_eq!(
        controller.state().password_error.as_deref(),
        Some("Password must be at least 6 characters")
    );
    controller.set_password("123456");
    assert_eq!(controller.state().password_error, None);
}

#[test]
fn test_submit_enabled_follows_every_field_edit() {
    let mut controller = controller_with(&Arc::default());
    let edits: [(&str, &str); 8] = [
        ("email", "test@example.com"),
        ("password", "12345"),
        ("password", "123456"),
        ("email", "nope"),
        ("email", "a@b"),
        ("password", ""),
        ("password", "longer password"),
        ("email", ""),
    ];
    for (field, text) in edits {
        if field == "email" {
            controller.set_email(text);
        } else {
            controller.set_password(text);
        }
        let state = controller.state();
        assert_eq!(
            state.submit_enabled,
            is_email_valid(&state.email) && is_password_valid(&state.password),
            "after setting {field} to {text:?}"
        );
    }
}

#[test]
fn test_toggle_mode_parity() {
    let mut controller = controller_with(&Arc::default());
    let original = controller.state().register_mode;
    for flips in 1..=5 {
        controller.toggle_mode();
        assert_eq!(controller.state().register_mode, original ^ (flips % 2 == 1));
    }
}

#[test]
fn test_acknowledge_error_always_clears() {
    let mut controller = controller_with(&Arc::default());
    controller.acknowledge_error();
    assert_eq!(controller.state().error, None);

    controller.dispatch(AuthIntent::Resolved(AuthResolution {
        operation: AuthOperation::Login,
        email: String::new(),
        outcome: AuthOutcome::failure("Login failed"),
    }));
    assert_eq!(controller.state().error.as_deref(), Some("Login failed"));
    controller.acknowledge_error();
    assert_eq!(controller.state().error, None);
}

#[tokio::test]
async fn test_login_success_clears_loading_and_error() {
    let provider = ScriptedProvider::with_outcome(AuthOutcome::Success);
    let mut controller = controller_with(&provider);
    fill_valid(&mut controller);

    controller.submit();
    assert!(controller.state().loading);

    let resolution = controller.next_resolution().await.unwrap();
    assert_eq!(resolution.operation, AuthOperation::Login);
    assert!(resolution.outcome.is_success());

    let state = controller.state();
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(
        provider.calls(),
        vec![(
            AuthOperation::Login,
            "test@example.com".to_string(),
            "123456".to_string()
        )]
    );
}

#[tokio::test]
async fn test_register_failure_sets_error_and_clears_loading() {
    let provider = ScriptedProvider::with_outcome(AuthOutcome::failure("Register failed"));
    let mut controller = controller_with(&provider);
    fill_valid(&mut controller);
    controller.toggle_mode();

    controller.submit();
    assert!(controller.state().loading);
    controller.next_resolution().await.unwrap();

    let state = controller.state();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("Register failed"));
    assert_eq!(provider.calls()[0].0, AuthOperation::Register);
}

#[tokio::test]
async fn test_login_failure_without_message_uses_fallback() {
    let provider = ScriptedProvider::with_outcome(AuthOutcome::Failure { message: None });
    let mut controller = controller_with(&provider);
    fill_valid(&mut controller);

    controller.submit();
    controller.next_resolution().await.unwrap();

    assert_eq!(
        controller.state().error.as_deref(),
        Some(FALLBACK_ERROR_MESSAGE)
    );
}

#[tokio::test]
async fn test_loading_stays_true_until_resolution_is_applied() {
    let provider = Arc::new(ScriptedProvider::default());
    let release = provider.gate();
    let mut controller = controller_with(&provider);
    let mut subscription = controller.subscribe();
    fill_valid(&mut controller);

    controller.submit();
    tokio::task::yield_now().await;
    assert!(controller.drain_resolutions().is_empty());
    assert!(controller.state().loading);
    assert_eq!(controller.pending_calls(), 1);

    release.send(AuthOutcome::Success).unwrap();
    controller.next_resolution().await.unwrap();
    assert!(!controller.state().loading);
    assert_eq!(controller.pending_calls(), 0);

    // Once loading turns on, no snapshot shows it off until the
    // resolution lands.
    let loading: Vec<bool> = subscription.drain().iter().map(|s| s.loading).collect();
    assert_eq!(loading, vec![false, false, false, true, false]);
}

#[tokio::test]
async fn test_success_does_not_clear_unacknowledged_error() {
    let provider = Arc::new(ScriptedProvider::default());
    provider
        .outcomes
        .lock()
        .unwrap()
        .extend([AuthOutcome::failure("Login failed"), AuthOutcome::Success]);
    let mut controller = controller_with(&provider);
    fill_valid(&mut controller);

    controller.submit();
    controller.next_resolution().await.unwrap();
    controller.submit();
    controller.next_resolution().await.unwrap();

    let state = controller.state();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("Login failed"));
}

#[tokio::test]
async fn test_field_edits_never_clear_provider_error() {
    let provider = ScriptedProvider::with_outcome(AuthOutcome::failure("Login failed"));
    let mut controller = controller_with(&provider);
    fill_valid(&mut controller);
    controller.submit();
    controller.next_resolution().await.unwrap();

    controller.set_email("other@example.com");
    controller.set_password("x");
    controller.toggle_mode();
    assert_eq!(controller.state().error.as_deref(), Some("Login failed"));
}

#[tokio::test]
async fn test_controller_does_not_block_overlapping_submits() {
    let provider = Arc::new(ScriptedProvider::default());
    let mut controller = controller_with(&provider);
    fill_valid(&mut controller);

    controller.submit();
    controller.submit();
    assert_eq!(controller.pending_calls(), 2);
    controller.next_resolution().await.unwrap();
    controller.next_resolution().await.unwrap();
    assert_eq!(provider.calls().len(), 2);
    assert!(!controller.state().loading);
}

#[tokio::test]
async fn test_next_resolution_without_pending_call_returns_none() {
    let mut controller = controller_with(&Arc::default());
    assert!(controller.next_resolution().await.is_none());
}

#[test]
fn test_subscription_starts_with_current_snapshot() {
    let mut controller = controller_with(&Arc::default());
    controller.set_email("invalid");
    let mut subscription = controller.subscribe();
    let first = subscription.try_next().unwrap();
    assert_eq!(first.email, "invalid");
    assert!(subscription.try_next().is_none());
}

#[test]
fn test_every_transition_reaches_every_observer_in_order() {
    let mut controller = controller_with(&Arc::default());
    let mut first = controller.subscribe();
    let mut second = controller.subscribe();

    controller.set_email("a");
    controller.set_email("ab");
    controller.toggle_mode();

    for subscription in [&mut first, &mut second] {
        let snapshots = subscription.drain();
        let emails: Vec<&str> = snapshots.iter().map(|s| s.email.as_str()).collect();
        assert_eq!(emails, vec!["", "a", "ab", "ab"]);
        assert!(snapshots[3].register_mode);
        assert!(!snapshots[2].register_mode);
    }
}

#[test]
fn test_no_op_intent_emits_nothing() {
    let mut controller = controller_with(&Arc::default());
    let mut subscription = controller.subscribe();
    subscription.drain();

    controller.acknowledge_error();
    controller.set_email("");
    assert!(subscription.try_next().is_none());
}

#[test]
fn test_dropped_subscription_is_pruned() {
    let mut controller = controller_with(&Arc::default());
    let kept = controller.subscribe();
    let dropped = controller.subscribe();
    assert_eq!(controller.observer_count(), 2);

    dropped.detach();
    controller.set_email("x");
    assert_eq!(controller.observer_count(), 1);
    drop(kept);
}

#[tokio::test]
async fn test_dispose_detaches_observers() {
    let mut controller = controller_with(&Arc::default());
    let mut subscription = controller.subscribe();
    subscription.drain();

    controller.dispose();
    controller.set_email("x");
    assert_eq!(controller.observer_count(), 0);
    assert!(subscription.next().await.is_none());
}

/// Panics before returning a future on login, and while polling on register.
struct PanickingProvider;

fn blow_up() -> AuthOutcome {
    panic!("provider blew up")
}

impl AuthProvider for PanickingProvider {
    fn login<'a>(&'a self, _email: &'a str, _password: &'a str) -> BoxFuture<'a, AuthOutcome> {
        panic!("provider blew up")
    }

    fn register<'a>(&'a self, _email: &'a str, _password: &'a str) -> BoxFuture<'a, AuthOutcome> {
        async { blow_up() }.boxed()
    }
}

async fn resolve_with_panicking_provider(register: bool) {
    let mut controller = AuthController::new(Arc::new(PanickingProvider));
    if register {
        controller.toggle_mode();
    }
    fill_valid(&mut controller);

    controller.submit();
    let resolution = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        controller.next_resolution(),
    )
    .await
    .expect("panicked call never resolved")
    .unwrap();

    assert_eq!(resolution.outcome, AuthOutcome::Failure { message: None });
    let state = controller.state();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some(FALLBACK_ERROR_MESSAGE));
    assert_eq!(controller.pending_calls(), 0);
}

#[tokio::test]
async fn test_provider_panic_while_starting_call_resolves_with_fallback() {
    resolve_with_panicking_provider(false).await;
}

#[tokio::test]
async fn test_provider_panic_while_polling_resolves_with_fallback() {
    resolve_with_panicking_provider(true).await;
}
