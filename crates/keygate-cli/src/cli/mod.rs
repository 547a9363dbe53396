//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use keygate_core::AuthOperation;
use keygate_core::config::{self, Config};
use keygate_core::logging;
use keygate_core::providers::ProviderKind;

mod commands;

#[derive(Parser)]
#[command(name = "keygate")]
#[command(version)]
#[command(about = "Email/password login backed by Firebase Authentication")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Identity provider to use (firebase, memory); overrides the config
    #[arg(long, global = true, value_name = "PROVIDER")]
    provider: Option<ProviderKind>,
}

/// Credentials for the headless commands.
#[derive(clap::Args, Debug, Clone)]
struct CredentialArgs {
    /// Account email
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "KEYGATE_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in without the interactive screen
    Login {
        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Create an account without the interactive screen
    Register {
        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Write the default config file
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, provider } = cli;

    match command {
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
        Some(Commands::Login { credentials }) => {
            let (config, _log) = prepare(provider)?;
            commands::auth::run(
                &config,
                AuthOperation::Login,
                &credentials.email,
                &credentials.password,
            )
            .await
        }
        Some(Commands::Register { credentials }) => {
            let (config, _log) = prepare(provider)?;
            commands::auth::run(
                &config,
                AuthOperation::Register,
                &credentials.email,
                &credentials.password,
            )
            .await
        }
        None => {
            let (config, _log) = prepare(provider)?;
            commands::screen::run(&config)
        }
    }
}

/// Keeps the background log writer alive while a command runs.
type LogGuard = Option<logging::WorkerGuard>;

/// Loads config, applies the `--provider` override and starts file logging.
fn prepare(provider: Option<ProviderKind>) -> Result<(Config, LogGuard)> {
    let mut config = Config::load().context("load config")?;
    if let Some(kind) = provider {
        config.provider = kind;
    }

    let guard = match logging::init_file_logging(&config::paths::logs_dir(), &config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {e:#}");
            None
        }
    };
    tracing::info!(provider = %config.provider, "keygate starting");
    Ok((config, guard))
}
