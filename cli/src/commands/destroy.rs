//! `n8n-stack destroy` — delete the stack.
//!
//! The file system is deleted with the stack, so this discards all n8n data.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::deploy_service;

/// Run the destroy command.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.effective_config()?;
    let prompt = format!(
        "Delete stack {} in {}? Workflow data on its file system is deleted too.",
        config.stack.name, config.env.region
    );
    if !app.confirm(&prompt, false)? {
        app.output.info("Cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    {
        let reporter = app.reporter();
        deploy_service::destroy(&config, &app.aws, &reporter).await?;
    }
    app.renderer().render_destroyed(&config.stack.name)?;
    Ok(ExitCode::SUCCESS)
}
