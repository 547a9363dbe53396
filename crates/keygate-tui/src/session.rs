//! Login session: the screen reducer wired to an [`AuthController`].
//!
//! The session owns the controller and the screen's subscription. Every
//! event goes through the reducer, the returned effects are executed, and
//! the snapshots they caused are fed back until the queue is quiet. After
//! `handle` returns, `screen.view` always equals the controller's state.

use std::sync::Arc;

use keygate_core::{AuthController, AuthProvider, StateSubscription};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::ScreenState;
use crate::update;

pub struct LoginSession {
    controller: AuthController,
    subscription: Option<StateSubscription>,
    pub screen: ScreenState,
}

impl LoginSession {
    /// Starts a session and subscribes the screen to the controller.
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let mut controller = AuthController::new(provider);
        let subscription = controller.subscribe();
        let screen = ScreenState::new(controller.state());
        let mut session = Self {
            controller,
            subscription: Some(subscription),
            screen,
        };
        session.pump_snapshots();
        session
    }

    pub fn controller(&self) -> &AuthController {
        &self.controller
    }

    /// Runs one event through the reducer and settles the result.
    pub fn handle(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.screen, event);
        self.execute_effects(effects);
        self.pump_snapshots();
    }

    /// Applies finished provider calls without blocking.
    ///
    /// Returns whether anything was applied.
    pub fn poll_resolutions(&mut self) -> bool {
        let resolutions = self.controller.drain_resolutions();
        let any = !resolutions.is_empty();
        // The controller already published the new state; adopt it before
        // the screen reacts to the outcome.
        self.pump_snapshots();
        for resolution in resolutions {
            self.handle(UiEvent::Resolved(resolution));
        }
        any
    }

    /// Waits for the outstanding provider call, if any, and applies it.
    pub async fn wait_for_resolution(&mut self) -> bool {
        let Some(resolution) = self.controller.next_resolution().await else {
            return false;
        };
        self.pump_snapshots();
        self.handle(UiEvent::Resolved(resolution));
        true
    }

    /// Drops the screen's subscription. Further snapshots are not observed.
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.detach();
        }
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            match effect {
                UiEffect::Quit => self.screen.should_quit = true,
                UiEffect::Dispatch(intent) => self.controller.dispatch(intent),
            }
        }
    }

    /// Feeds queued snapshots to the reducer until none are left.
    fn pump_snapshots(&mut self) {
        loop {
            let Some(subscription) = self.subscription.as_mut() else {
                return;
            };
            let snapshots = subscription.drain();
            if snapshots.is_empty() {
                return;
            }
            for snapshot in snapshots {
                let effects = update::update(&mut self.screen, UiEvent::Snapshot(snapshot));
                self.execute_effects(effects);
            }
        }
    }
}
