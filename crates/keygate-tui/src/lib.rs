//! Full-screen login screen for Keygate.

pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod session;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};
use std::sync::Arc;

use anyhow::Result;
use keygate_core::{AuthOperation, AuthProvider};
pub use runtime::TuiRuntime;
pub use session::LoginSession;
pub use state::{ScreenState, SignedIn};

/// Runs the interactive login screen until the user quits.
///
/// Returns the account that signed in last, if any.
///
/// Must be called from within a tokio runtime; provider calls are spawned
/// on it while the event loop blocks the current thread.
///
/// # Errors
/// Returns an error if stderr is not a terminal or terminal I/O fails.
pub fn run_login_screen(provider: Arc<dyn AuthProvider>) -> Result<Option<SignedIn>> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The login screen requires a terminal.\n\
             Use `keygate login --email ... --password ...` for non-interactive use."
        );
    }

    let signed_in = {
        let mut runtime = TuiRuntime::new(provider)?;
        runtime.run()?;
        runtime.session.screen.signed_in.take()
    };

    // Terminal restored by the runtime's Drop.
    if let Some(account) = &signed_in {
        let verb = match account.operation {
            AuthOperation::Login => "Signed in as",
            AuthOperation::Register => "Registered",
        };
        writeln!(stderr(), "{verb} {}", account.email)?;
    }
    Ok(signed_in)
}
