//! JSON output helpers and renderer.
//!
//! Every `--json` code path prints exactly one pretty-printed JSON document
//! on stdout. Failures use the error object from `format_error`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use n8n_stack_common::StackOutputs;
use serde_json::{Value, json};

use crate::application::services::synth_service::Synthesis;
use crate::domain::bootstrap::RenderedBoot;
use crate::domain::config::StackConfig;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

fn print(value: &Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("JSON serialization failed")?
    );
    Ok(())
}

fn paths(written: &[PathBuf]) -> Vec<String> {
    written.iter().map(|p| p.display().to_string()).collect()
}

/// Renders command results as JSON documents on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn render_version(&self, version: &str) -> Result<()> {
        print(&json!({ "version": version }))
    }

    pub fn render_synth(&self, synthesis: &Synthesis, written: Option<&Path>) -> Result<()> {
        let template: Value =
            serde_json::from_str(&synthesis.body).context("re-reading template JSON")?;
        print(&json!({
            "stack": synthesis.stack.stack_name,
            "digest": synthesis.digest,
            "resources": synthesis.stack.template.resources.len(),
            "zoneSource": synthesis.zone_source.as_str(),
            "path": written.map(|p| p.display().to_string()),
            "template": template,
        }))
    }

    pub fn render_boot(&self, boot: &RenderedBoot, written: &[PathBuf]) -> Result<()> {
        let files: serde_json::Map<String, Value> = boot
            .files()
            .iter()
            .map(|(name, content)| ((*name).to_string(), json!(content)))
            .collect();
        print(&json!({ "files": files, "written": paths(written) }))
    }

    pub fn render_outputs(&self, stack_name: &str, outputs: &StackOutputs) -> Result<()> {
        print(&json!({ "stack": stack_name, "outputs": outputs }))
    }

    pub fn render_destroyed(&self, stack_name: &str) -> Result<()> {
        print(&json!({ "stack": stack_name, "deleted": true }))
    }

    pub fn render_config(&self, config: &StackConfig, path: &Path) -> Result<()> {
        print(&json!({ "path": path.display().to_string(), "config": config }))
    }

    pub fn render_config_set(&self, key: &str, value: &str, path: &Path) -> Result<()> {
        print(&json!({ "key": key, "value": value, "path": path.display().to_string() }))
    }

    pub fn render_context_cleared(&self, path: &Path, removed: bool) -> Result<()> {
        print(&json!({ "path": path.display().to_string(), "removed": removed }))
    }
}
