//! Headless login/register.
//!
//! Drives the same controller as the interactive screen: fill the fields,
//! submit, wait for the resolution, report.

use anyhow::{Context, Result, bail};
use keygate_core::config::Config;
use keygate_core::controller::FALLBACK_ERROR_MESSAGE;
use keygate_core::providers;
use keygate_core::{AuthController, AuthOperation};

pub async fn run(
    config: &Config,
    operation: AuthOperation,
    email: &str,
    password: &str,
) -> Result<()> {
    let provider = providers::build_provider(config)?;
    let mut controller = AuthController::new(provider);

    if operation == AuthOperation::Register {
        controller.toggle_mode();
    }
    controller.set_email(email);
    controller.set_password(password);

    let state = controller.state();
    if let Some(field_error) = state
        .email_error
        .as_deref()
        .or(state.password_error.as_deref())
    {
        bail!("{field_error}");
    }
    if !state.can_submit() {
        bail!("Email and password are required");
    }

    controller.submit();
    let resolution = controller
        .next_resolution()
        .await
        .context("provider call did not resolve")?;

    if resolution.outcome.is_success() {
        match operation {
            AuthOperation::Login => println!("Logged in as {}", resolution.email),
            AuthOperation::Register => println!("Registered {}", resolution.email),
        }
        return Ok(());
    }

    let message = controller
        .state()
        .error
        .clone()
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
    bail!("{message}")
}
