//! Interactive demo command.

use anyhow::{Context, Result};
use lorepane_core::config::Config;
use lorepane_core::logging;

pub fn run(config: &Config) -> Result<()> {
    // Held until the demo returns so buffered log lines are flushed.
    let _log_guard = logging::init(&config.log).context("init logging")?;
    tracing::info!(max_lines = config.panel.max_lines, "starting demo");

    lorepane_tui::run_demo(config)
}
