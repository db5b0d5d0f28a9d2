//! `n8n-stack outputs` — show outputs of the deployed stack.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::deploy_service;

/// Run the outputs command.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.effective_config()?;
    let outputs = deploy_service::outputs(&config, &app.aws).await?;
    app.renderer().render_outputs(&config.stack.name, &outputs)?;
    Ok(ExitCode::SUCCESS)
}
