//! Immutable snapshot of the login screen.
//!
//! A `ViewState` is never edited in place by the controller. Every
//! transition builds a new value with the `with_*` helpers and publishes it
//! wholesale, so observers always see a consistent snapshot.

use crate::validation;

/// Which provider operation the screen drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }
}

/// Everything the screen needs to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Raw email input.
    pub email: String,
    /// Set iff `email` is non-empty and invalid.
    pub email_error: Option<String>,
    /// Raw password input.
    pub password: String,
    /// Set iff `password` is non-empty and invalid.
    pub password_error: Option<String>,
    /// Both fields currently valid.
    pub submit_enabled: bool,
    /// A provider call is outstanding.
    pub loading: bool,
    /// Registration (true) or login (false).
    pub register_mode: bool,
    /// Last unacknowledged provider failure.
    pub error: Option<String>,
}

impl ViewState {
    pub fn mode(&self) -> AuthMode {
        if self.register_mode {
            AuthMode::Register
        } else {
            AuthMode::Login
        }
    }

    /// Whether a submit press should reach the controller.
    ///
    /// The controller itself accepts overlapping submits; the presentation
    /// layer gates on this.
    pub fn can_submit(&self) -> bool {
        self.submit_enabled && !self.loading
    }

    pub(crate) fn with_email(&self, email: String) -> Self {
        let email_error = validation::email_error(&email).map(str::to_string);
        Self {
            email,
            email_error,
            ..self.clone()
        }
        .with_submit_recomputed()
    }

    pub(crate) fn with_password(&self, password: String) -> Self {
        let password_error = validation::password_error(&password).map(str::to_string);
        Self {
            password,
            password_error,
            ..self.clone()
        }
        .with_submit_recomputed()
    }

    pub(crate) fn with_mode_toggled(&self) -> Self {
        Self {
            register_mode: !self.register_mode,
            ..self.clone()
        }
    }

    pub(crate) fn with_loading(&self, loading: bool) -> Self {
        Self {
            loading,
            ..self.clone()
        }
    }

    pub(crate) fn with_error(&self, error: Option<String>) -> Self {
        Self {
            error,
            ..self.clone()
        }
    }

    fn with_submit_recomputed(self) -> Self {
        let submit_enabled = validation::is_email_valid(&self.email)
            && validation::is_password_valid(&self.password);
        Self {
            submit_enabled,
            ..self
        }
    }
}
