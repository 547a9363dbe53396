//! UI effect types.
//!
//! Effects are commands returned by the reducer that the session executes.
//! The reducer never talks to the controller directly; it asks for an
//! intent to be dispatched instead.

use keygate_core::AuthIntent;

/// Effects returned by the reducer for the session to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Leave the screen.
    Quit,

    /// Hand an intent to the auth controller.
    Dispatch(AuthIntent),
}
