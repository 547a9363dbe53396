//! Interactive login screen.

use anyhow::Result;
use keygate_core::config::Config;
use keygate_core::providers;

pub fn run(config: &Config) -> Result<()> {
    let provider = providers::build_provider(config)?;
    keygate_tui::run_login_screen(provider)?;
    Ok(())
}
