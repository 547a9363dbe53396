//! Core Keygate library (view state, validation, controller, providers, config).

pub mod config;
pub mod controller;
pub mod logging;
pub mod providers;
pub mod validation;
pub mod view_state;

pub use controller::{AuthController, AuthIntent, AuthResolution, StateSubscription};
pub use providers::{AuthOperation, AuthOutcome, AuthProvider};
pub use view_state::{AuthMode, ViewState};
