//! `n8n-stack render` — render the boot payload for inspection.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ArtifactWriter;
use crate::application::services::render_service;
use crate::infra::fs::LocalFs;

/// Arguments for the render command.
#[derive(Args)]
pub struct RenderArgs {
    /// File system ID to embed instead of the deploy-time token
    #[arg(long, value_name = "ID")]
    pub file_system_id: Option<String>,

    /// Write all rendered files into this directory
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

/// Run the render command.
pub fn run(app: &AppContext, args: &RenderArgs) -> Result<ExitCode> {
    let config = app.effective_config()?;
    let boot = render_service::render(&config, &app.templates, args.file_system_id.as_deref())?;
    let written = match &args.out {
        Some(dir) => LocalFs.write_files(dir, &boot.files())?,
        None => Vec::new(),
    };
    app.renderer().render_boot(&boot, &written)?;
    Ok(ExitCode::SUCCESS)
}
