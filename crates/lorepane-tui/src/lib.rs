//! Terminal front end for the lorepane center panel.

pub mod canvas;
pub mod demo;
pub mod render;
pub mod runtime;
pub mod scrollbar;
pub mod state;
pub mod terminal;
pub mod update;
pub mod world;

use std::io::{IsTerminal, stdout};

use anyhow::Result;
pub use canvas::TerminalCanvas;
use lorepane_core::config::Config;
pub use runtime::DemoRuntime;
pub use world::DemoWorld;

/// Runs the interactive demo until the user quits.
///
/// Must be called from inside a tokio runtime.
pub fn run_demo(config: &Config) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The demo requires a terminal.\n\
             Run `lorepane demo` from an interactive shell."
        );
    }

    let mut runtime = DemoRuntime::new(config)?;
    runtime.run()
}
