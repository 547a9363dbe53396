//! Events fed to the screen reducer.

use std::sync::Arc;

use crossterm::event::Event;
use keygate_core::{AuthResolution, ViewState};

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Periodic tick for the loading spinner.
    Tick,
    /// Raw terminal input.
    Terminal(Event),
    /// A snapshot published by the controller.
    Snapshot(Arc<ViewState>),
    /// A provider call finished and the controller applied it.
    Resolved(AuthResolution),
}
