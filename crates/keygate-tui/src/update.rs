//! Screen reducer (update function).
//!
//! The session calls `update(screen, event)` and executes the returned
//! effects. Field edits never touch `screen.view` directly: they dispatch
//! the full new text and wait for the controller's snapshot.

use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use keygate_core::{AuthIntent, ViewState};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{Focus, ScreenState, SignedIn};

/// The main reducer function.
pub fn update(screen: &mut ScreenState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            if screen.view.loading {
                screen.spinner_frame = screen.spinner_frame.wrapping_add(1);
            }
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(screen, term_event),
        UiEvent::Snapshot(next) => handle_snapshot(screen, next),
        UiEvent::Resolved(resolution) => {
            if resolution.outcome.is_success() {
                screen.signed_in = Some(SignedIn {
                    operation: resolution.operation,
                    email: resolution.email,
                });
            }
            vec![]
        }
    }
}

/// Adopts a new snapshot. A flip of `register_mode` between two
/// consecutive snapshots clears both inputs.
fn handle_snapshot(screen: &mut ScreenState, next: Arc<ViewState>) -> Vec<UiEffect> {
    let previous = std::mem::replace(&mut screen.view, next);
    if previous.register_mode == screen.view.register_mode {
        return vec![];
    }
    screen.focus = Focus::Email;
    vec![
        UiEffect::Dispatch(AuthIntent::SetEmail(String::new())),
        UiEffect::Dispatch(AuthIntent::SetPassword(String::new())),
    ]
}

fn handle_terminal_event(screen: &mut ScreenState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(screen, key),
        Event::Paste(text) => handle_paste(screen, &text),
        _ => vec![],
    }
}

fn handle_key(screen: &mut ScreenState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    // The notice is modal: it swallows everything but its own keys.
    if screen.has_notice() {
        return match key.code {
            KeyCode::Enter | KeyCode::Esc => vec![UiEffect::Dispatch(AuthIntent::AcknowledgeError)],
            _ => vec![],
        };
    }

    if screen.signed_in.is_some() {
        return match key.code {
            KeyCode::Esc => vec![UiEffect::Quit],
            KeyCode::Enter => sign_out(screen),
            _ => vec![],
        };
    }

    match key.code {
        KeyCode::Esc => vec![UiEffect::Quit],
        KeyCode::Char('r') if ctrl => toggle_if_idle(screen),
        KeyCode::Tab | KeyCode::Down => {
            screen.focus = screen.focus.next();
            vec![]
        }
        KeyCode::BackTab | KeyCode::Up => {
            screen.focus = screen.focus.prev();
            vec![]
        }
        KeyCode::Enter => match screen.focus {
            Focus::ModeToggle => toggle_if_idle(screen),
            Focus::Email | Focus::Password | Focus::Submit => submit_if_allowed(screen),
        },
        KeyCode::Char(' ') if screen.focus == Focus::ModeToggle => toggle_if_idle(screen),
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            edit_focused(screen, |text| text.push(c))
        }
        KeyCode::Backspace => edit_focused(screen, |text| {
            text.pop();
        }),
        KeyCode::Char('u') if ctrl => edit_focused(screen, String::clear),
        _ => vec![],
    }
}

fn handle_paste(screen: &mut ScreenState, pasted: &str) -> Vec<UiEffect> {
    if screen.has_notice() || screen.signed_in.is_some() {
        return vec![];
    }
    let cleaned: String = pasted.chars().filter(|c| !c.is_control()).collect();
    if cleaned.is_empty() {
        return vec![];
    }
    edit_focused(screen, |text| text.push_str(&cleaned))
}

/// Applies `edit` to a copy of the focused field and dispatches the result.
fn edit_focused(screen: &ScreenState, edit: impl FnOnce(&mut String)) -> Vec<UiEffect> {
    let Some(current) = screen.focused_text() else {
        return vec![];
    };
    let mut text = current.to_string();
    edit(&mut text);
    if text == current {
        return vec![];
    }
    let intent = match screen.focus {
        Focus::Email => AuthIntent::SetEmail(text),
        _ => AuthIntent::SetPassword(text),
    };
    vec![UiEffect::Dispatch(intent)]
}

fn submit_if_allowed(screen: &ScreenState) -> Vec<UiEffect> {
    if screen.view.can_submit() {
        vec![UiEffect::Dispatch(AuthIntent::Submit)]
    } else {
        tracing::debug!(
            loading = screen.view.loading,
            submit_enabled = screen.view.submit_enabled,
            "submit ignored"
        );
        vec![]
    }
}

/// The mode is fixed while a call is outstanding.
fn toggle_if_idle(screen: &ScreenState) -> Vec<UiEffect> {
    if screen.view.loading {
        tracing::debug!("mode toggle ignored while loading");
        return vec![];
    }
    vec![UiEffect::Dispatch(AuthIntent::ToggleMode)]
}

fn sign_out(screen: &mut ScreenState) -> Vec<UiEffect> {
    screen.signed_in = None;
    screen.focus = Focus::Password;
    vec![UiEffect::Dispatch(AuthIntent::SetPassword(String::new()))]
}
