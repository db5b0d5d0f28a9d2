//! `n8n-stack deploy` — synthesize and deploy, then print the outputs.

use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::ProgressReporter;
use crate::application::services::{deploy_service, synth_service};

/// Run the deploy command.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let config = app.effective_config()?;
    let cache = app.context_store()?;
    let reporter = app.reporter();

    reporter.step("Synthesizing template...");
    let synthesis = synth_service::synthesize(&config, &app.aws, &cache, &app.templates)
        .await
        .context("synthesizing stack")?;
    reporter.success(&format!(
        "Template ready ({} resources)",
        synthesis.stack.template.resources.len()
    ));

    let outputs = deploy_service::deploy(
        &config,
        &synthesis.stack,
        &synthesis.body,
        &app.aws,
        &reporter,
    )
    .await?;
    drop(reporter);

    app.renderer()
        .render_outputs(&synthesis.stack.stack_name, &outputs)?;
    Ok(ExitCode::SUCCESS)
}
