//! Screen state.
//!
//! `ScreenState` holds what the terminal screen adds on top of the
//! controller's [`ViewState`]: focus, the signed-in banner and the quit
//! flag. The view itself is only ever replaced by snapshots from the
//! controller.

use std::sync::Arc;

use keygate_core::{AuthOperation, ViewState};

/// Focusable elements, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Email,
    Password,
    Submit,
    ModeToggle,
}

impl Focus {
    const ORDER: [Focus; 4] = [
        Focus::Email,
        Focus::Password,
        Focus::Submit,
        Focus::ModeToggle,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Whether typing edits this element.
    pub fn is_text_field(self) -> bool {
        matches!(self, Focus::Email | Focus::Password)
    }
}

/// Account the screen signed in (or registered) successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub operation: AuthOperation,
    pub email: String,
}

#[derive(Debug)]
pub struct ScreenState {
    /// Latest snapshot received from the controller.
    pub view: Arc<ViewState>,
    pub focus: Focus,
    pub signed_in: Option<SignedIn>,
    pub should_quit: bool,
    /// Advanced on every tick while loading.
    pub spinner_frame: usize,
}

impl ScreenState {
    pub fn new(view: Arc<ViewState>) -> Self {
        Self {
            view,
            focus: Focus::default(),
            signed_in: None,
            should_quit: false,
            spinner_frame: 0,
        }
    }

    /// Text of the focused field, if a text field has focus.
    pub fn focused_text(&self) -> Option<&str> {
        match self.focus {
            Focus::Email => Some(&self.view.email),
            Focus::Password => Some(&self.view.password),
            Focus::Submit | Focus::ModeToggle => None,
        }
    }

    /// Whether the error notice is covering the form.
    pub fn has_notice(&self) -> bool {
        self.view.error.is_some()
    }
}
