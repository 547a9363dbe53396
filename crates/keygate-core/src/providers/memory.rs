//! In-process identity provider.
//!
//! Accounts live in a mutex-guarded map for the lifetime of the provider.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::{AuthOutcome, AuthProvider};
use crate::config::MemoryConfig;

pub const EMAIL_IN_USE_MESSAGE: &str = "Email already in use";
pub const BAD_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

#[derive(Debug, Default)]
pub struct MemoryAuthProvider {
    accounts: Mutex<HashMap<String, String>>,
    latency: Option<Duration>,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        config
            .accounts
            .iter()
            .fold(Self::new(), |provider, (email, password)| {
                provider.with_account(email, password)
            })
            .with_latency(config.latency())
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Option<Duration>) -> Self {
        self.latency = latency;
        self
    }

    /// Adds an account up front.
    #[must_use]
    pub fn with_account(mut self, email: &str, password: &str) -> Self {
        self.accounts
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize(email), password.to_string());
        self
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().map_or(0, |accounts| accounts.len())
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_login(&self, email: &str, password: &str) -> AuthOutcome {
        let Ok(accounts) = self.accounts.lock() else {
            return AuthOutcome::failure("Account store unavailable");
        };
        match accounts.get(&normalize(email)) {
            Some(stored) if stored == password => AuthOutcome::Success,
            _ => AuthOutcome::failure(BAD_CREDENTIALS_MESSAGE),
        }
    }

    fn insert_account(&self, email: &str, password: &str) -> AuthOutcome {
        let Ok(mut accounts) = self.accounts.lock() else {
            return AuthOutcome::failure("Account store unavailable");
        };
        let key = normalize(email);
        if accounts.contains_key(&key) {
            return AuthOutcome::failure(EMAIL_IN_USE_MESSAGE);
        }
        accounts.insert(key, password.to_string());
        AuthOutcome::Success
    }
}

impl AuthProvider for MemoryAuthProvider {
    fn login<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, AuthOutcome> {
        async move {
            self.simulate_latency().await;
            self.check_login(email, password)
        }
        .boxed()
    }

    fn register<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, AuthOutcome> {
        async move {
            self.simulate_latency().await;
            self.insert_account(email, password)
        }
        .boxed()
    }
}

// Emails are case-insensitive for lookup.
fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_then_login() {
        let provider = MemoryAuthProvider::new();
        assert_eq!(
            provider.register("a@example.com", "secret1").await,
            AuthOutcome::Success
        );
        assert_eq!(
            provider.login("A@Example.com", "secret1").await,
            AuthOutcome::Success
        );
        assert_eq!(provider.account_count(), 1);
    }

    #[tokio::test]
    async fn test_from_config_seeds_accounts() {
        let mut config = MemoryConfig {
            latency_ms: 0,
            ..MemoryConfig::default()
        };
        config
            .accounts
            .insert("Seed@Example.com".to_string(), "secret1".to_string());

        let provider = MemoryAuthProvider::from_config(&config);
        assert_eq!(provider.account_count(), 1);
        assert!(provider.login("seed@example.com", "secret1").await.is_success());
    }

    #[tokio::test]
    async fn test_duplicate_register_fails() {
        let provider = MemoryAuthProvider::new().with_account("a@example.com", "secret1");
        assert_eq!(
            provider.register("a@example.com", "other12").await,
            AuthOutcome::failure(EMAIL_IN_USE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password_or_unknown_user() {
        let provider = MemoryAuthProvider::new().with_account("a@example.com", "secret1");
        assert_eq!(
            provider.login("a@example.com", "wrong12").await,
            AuthOutcome::failure(BAD_CREDENTIALS_MESSAGE)
        );
        assert_eq!(
            provider.login("b@example.com", "secret1").await,
            AuthOutcome::failure(BAD_CREDENTIALS_MESSAGE)
        );
    }

    #[test]
    fn test_with_account_seeds_a_poisoned_store() {
        let provider = MemoryAuthProvider::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _held = provider.accounts.lock().unwrap();
            panic!("poison the account store");
        }));
        assert!(provider.accounts.is_poisoned());

        let provider = provider.with_account("A@Example.com", "secret1");
        let accounts = provider
            .accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        assert_eq!(
            accounts.get("a@example.com").map(String::as_str),
            Some("secret1")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let provider = MemoryAuthProvider::new()
            .with_account("a@example.com", "secret1")
            .with_latency(Some(Duration::from_secs(5)));
        let started = tokio::time::Instant::now();
        assert!(provider.login("a@example.com", "secret1").await.is_success());
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
