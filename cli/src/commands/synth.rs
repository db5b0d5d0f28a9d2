//! `n8n-stack synth` — print or write the CloudFormation template.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ArtifactWriter;
use crate::application::services::synth_service;
use crate::infra::fs::LocalFs;

/// Arguments for the synth command.
#[derive(Args)]
pub struct SynthArgs {
    /// Write `<stack>.template.json` into this directory instead of stdout
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

/// File name of the written template.
#[must_use]
pub fn template_file_name(stack_name: &str) -> String {
    format!("{stack_name}.template.json")
}

/// Run the synth command.
pub async fn run(app: &AppContext, args: &SynthArgs) -> Result<ExitCode> {
    let config = app.effective_config()?;
    let cache = app.context_store()?;
    let synthesis = synth_service::synthesize(&config, &app.aws, &cache, &app.templates)
        .await
        .context("synthesizing stack")?;

    let written = match &args.out {
        Some(dir) => {
            let name = template_file_name(&synthesis.stack.stack_name);
            LocalFs
                .write_files(dir, &[(name.as_str(), synthesis.body.as_str())])?
                .into_iter()
                .next()
        }
        None => None,
    };
    app.renderer()
        .render_synth(&synthesis, written.as_deref())?;
    Ok(ExitCode::SUCCESS)
}
