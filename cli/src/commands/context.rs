//! `n8n-stack context` — manage cached lookups.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ContextStore;

/// Context subcommands.
#[derive(Subcommand)]
pub enum ContextCommand {
    /// Forget cached hosted zone lookups
    ///
    /// Lookups are cached per `env.account`. Without it they share one
    /// `default` slot, so clear the cache after switching AWS credentials.
    Clear,
}

/// Run the context command.
pub fn run(app: &AppContext, cmd: &ContextCommand) -> Result<ExitCode> {
    match cmd {
        ContextCommand::Clear => {
            let store = app.context_store()?;
            let removed = store.clear()?;
            app.renderer()
                .render_context_cleared(&store.path()?, removed)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
