//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use lorepane_core::config;

mod commands;

#[derive(Parser)]
#[command(name = "lorepane")]
#[command(version)]
#[command(about = "Center panel display pipeline for terminal text adventures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the interactive panel demo
    Demo {
        /// Override the panel capacity from config
        #[arg(long, value_name = "LINES")]
        max_lines: Option<usize>,
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
    /// Create a default config file
    Init,
    /// Print a fresh config generated from the built-in defaults
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything; the demo loop itself blocks this thread
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    let _enter = rt.enter();

    dispatch(cli)
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Demo { max_lines } => {
            let mut config = config::Config::load().context("load config")?;
            if let Some(max_lines) = max_lines {
                config.panel.max_lines = max_lines;
            }
            commands::demo::run(&config)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}
