//! Identity provider capability and implementations.
//!
//! The controller only sees [`AuthProvider`]. Concrete providers:
//! - `firebase`: Firebase Identity Toolkit REST API
//! - `memory`: in-process account table for offline runs and tests

pub mod firebase;
pub mod memory;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use firebase::FirebaseAuthProvider;
pub use memory::MemoryAuthProvider;

use crate::config::Config;

/// Resolved result of a provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    /// The provider may not supply a message; the controller falls back to
    /// a fixed one.
    Failure { message: Option<String> },
}

impl AuthOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        AuthOutcome::Failure {
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success)
    }
}

/// The two network-backed operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    Login,
    Register,
}

impl AuthOperation {
    pub fn label(self) -> &'static str {
        match self {
            AuthOperation::Login => "login",
            AuthOperation::Register => "register",
        }
    }
}

/// External identity provider.
///
/// Both calls resolve exactly once and never fail synchronously: every
/// failure, including transport errors, travels in the [`AuthOutcome`].
pub trait AuthProvider: Send + Sync {
    fn login<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, AuthOutcome>;

    fn register<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, AuthOutcome>;

    /// Dispatches to `login` or `register`.
    fn call<'a>(
        &'a self,
        operation: AuthOperation,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, AuthOutcome> {
        match operation {
            AuthOperation::Login => self.login(email, password),
            AuthOperation::Register => self.register(email, password),
        }
    }
}

/// Provider selection from config or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Firebase,
    Memory,
}

impl ProviderKind {
    pub fn id(self) -> &'static str {
        match self {
            ProviderKind::Firebase => "firebase",
            ProviderKind::Memory => "memory",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firebase" => Ok(ProviderKind::Firebase),
            "memory" => Ok(ProviderKind::Memory),
            other => Err(format!(
                "unknown provider '{other}' (expected 'firebase' or 'memory')"
            )),
        }
    }
}

/// Builds the provider selected by `config.provider`.
///
/// # Errors
/// Returns an error if the selected provider is missing required settings.
pub fn build_provider(config: &Config) -> Result<Arc<dyn AuthProvider>> {
    let provider: Arc<dyn AuthProvider> = match config.provider {
        ProviderKind::Firebase => Arc::new(FirebaseAuthProvider::from_config(&config.firebase)?),
        ProviderKind::Memory => Arc::new(MemoryAuthProvider::from_config(&config.memory)),
    };
    tracing::debug!(provider = %config.provider, "auth provider ready");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("firebase".parse::<ProviderKind>(), Ok(ProviderKind::Firebase));
        assert_eq!(" Memory ".parse::<ProviderKind>(), Ok(ProviderKind::Memory));
        assert!("ldap".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_outcome_failure_helper() {
        let outcome = AuthOutcome::failure("nope");
        assert!(!outcome.is_success());
        assert_eq!(
            outcome,
            AuthOutcome::Failure {
                message: Some("nope".to_string())
            }
        );
    }

    #[test]
    fn test_build_memory_provider() {
        let config = Config {
            provider: ProviderKind::Memory,
            ..Config::default()
        };
        assert!(build_provider(&config).is_ok());
    }

    #[test]
    fn test_build_firebase_without_key_fails() {
        let mut config = Config::default();
        config.firebase.api_key = None;
        // Env override must not leak into this test.
        if std::env::var(crate::config::FIREBASE_API_KEY_ENV).is_ok() {
            return;
        }
        let err = build_provider(&config).err().expect("missing key should fail");
        assert!(err.to_string().contains("API key"));
    }
}
