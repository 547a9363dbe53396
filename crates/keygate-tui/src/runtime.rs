//! TUI runtime: owns the terminal, runs the event loop.
//!
//! The loop is synchronous and runs inside the tokio runtime context, so
//! the controller can spawn provider calls while the loop keeps polling
//! the terminal. Each iteration:
//! 1. applies finished provider calls (`LoginSession::poll_resolutions`)
//! 2. polls crossterm, with a short timeout while loading
//! 3. feeds every event through the session
//! 4. redraws if anything changed

use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use keygate_core::AuthProvider;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::events::UiEvent;
use crate::session::LoginSession;
use crate::{render, terminal};

/// Tick cadence while a provider call is outstanding (spinner animation).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Spinner frames advance at most this often.
const SPINNER_INTERVAL: Duration = Duration::from_millis(120);

pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub session: LoginSession,
    last_tick: Instant,
}

impl TuiRuntime {
    /// Enters the alternate screen and subscribes a fresh login session.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(provider: Arc<dyn AuthProvider>) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        Ok(Self {
            terminal,
            session: LoginSession::new(provider),
            last_tick: Instant::now(),
        })
    }

    /// Runs until the user quits.
    ///
    /// # Errors
    /// Returns an error if terminal I/O fails.
    pub fn run(&mut self) -> Result<()> {
        let result = self.event_loop();
        self.session.detach();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.session.screen.should_quit {
            if self.session.poll_resolutions() {
                dirty = true;
            }

            for event in self.collect_events()? {
                let is_tick = matches!(event, UiEvent::Tick);
                let frame_before = self.session.screen.spinner_frame;
                self.session.handle(event);
                if !is_tick || self.session.screen.spinner_frame != frame_before {
                    dirty = true;
                }
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.session.screen, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Resolutions arrive through the controller inbox, so poll fast
        // while one is outstanding.
        let poll_duration = if self.session.screen.view.loading {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= SPINNER_INTERVAL {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
