//! Firebase Identity Toolkit provider.
//!
//! Email/password sign-in and sign-up over the REST API:
//! - login: `POST {base}/accounts:signInWithPassword?key=...`
//! - register: `POST {base}/accounts:signUp?key=...`
//!
//! Every failure, including transport errors and timeouts, becomes an
//! [`AuthOutcome::Failure`]. The API key never appears in logs or messages.

use anyhow::{Context, Result};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::{AuthOperation, AuthOutcome, AuthProvider};
use crate::config::{FIREBASE_API_KEY_ENV, FirebaseConfig};

pub struct FirebaseAuthProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    #[serde(default)]
    local_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseAuthProvider {
    /// Builds the provider from config.
    ///
    /// # Errors
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &FirebaseConfig) -> Result<Self> {
        let api_key = config.resolved_api_key().with_context(|| {
            format!("Firebase API key not configured: set {FIREBASE_API_KEY_ENV} or firebase.api_key")
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(operation: AuthOperation) -> &'static str {
        match operation {
            AuthOperation::Login => "accounts:signInWithPassword",
            AuthOperation::Register => "accounts:signUp",
        }
    }

    async fn send(&self, operation: AuthOperation, email: &str, password: &str) -> AuthOutcome {
        let url = format!("{}/{}", self.base_url, Self::endpoint(operation));
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };

        let response = match self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let err = err.without_url();
                tracing::warn!(operation = operation.label(), error = %err, "firebase request failed");
                return AuthOutcome::failure(transport_message(&err));
            }
        };

        let status = response.status();
        if status.is_success() {
            match response.json::<PasswordResponse>().await {
                Ok(parsed) => {
                    tracing::info!(
                        operation = operation.label(),
                        user_id = parsed.local_id.as_deref().unwrap_or("-"),
                        "firebase accepted credentials"
                    );
                }
                Err(err) => {
                    tracing::debug!(error = %err.without_url(), "firebase success body not parsed");
                }
            }
            return AuthOutcome::Success;
        }

        let text = response.text().await.unwrap_or_default();
        let message = parse_error_message(&text);
        tracing::warn!(
            operation = operation.label(),
            status = status.as_u16(),
            reason = message.as_deref().unwrap_or("-"),
            "firebase rejected credentials"
        );
        AuthOutcome::Failure { message }
    }
}

impl AuthProvider for FirebaseAuthProvider {
    fn login<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, AuthOutcome> {
        self.send(AuthOperation::Login, email, password).boxed()
    }

    fn register<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, AuthOutcome> {
        self.send(AuthOperation::Register, email, password).boxed()
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "Request timed out".to_string()
    } else if err.is_connect() {
        "Could not reach the authentication server".to_string()
    } else {
        format!("Network error: {err}")
    }
}

/// Extracts a readable message from an Identity Toolkit error body.
///
/// Returns `None` when the body is not the documented error envelope.
fn parse_error_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    Some(describe_error_code(&envelope.error.message))
}

/// Maps error codes to user-facing text.
///
/// Codes may carry a detail suffix (`WEAK_PASSWORD : Password should be ...`).
fn describe_error_code(raw: &str) -> String {
    let (code, detail) = match raw.split_once(" : ") {
        Some((code, detail)) => (code.trim(), Some(detail.trim())),
        None => (raw.trim(), None),
    };
    let known = match code {
        "EMAIL_EXISTS" => "The email address is already in use by another account.",
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "The email or password is incorrect."
        }
        "USER_DISABLED" => "The user account has been disabled by an administrator.",
        "WEAK_PASSWORD" => "The password is too weak.",
        "INVALID_EMAIL" => "The email address is badly formatted.",
        "OPERATION_NOT_ALLOWED" => "Password sign-in is disabled for this project.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => {
            "Too many unsuccessful attempts. Please try again later."
        }
        _ => return detail.map_or_else(|| raw.trim().to_string(), str::to_string),
    };
    known.to_string()
}
