//! Output formatting module

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use std::path::{Path, PathBuf};

use anyhow::Result;
use console::Term;
use n8n_stack_common::StackOutputs;
use owo_colors::OwoColorize as _;
pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::application::services::synth_service::Synthesis;
use crate::domain::bootstrap::RenderedBoot;
use crate::domain::config::StackConfig;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stderr is a TTY (progress indicators draw there).
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stderr().is_term();
        let use_colors =
            !no_color && Term::stdout().is_term() && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠` to stderr. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}

/// Renderer selected by the output mode.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    pub fn render_version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_version(version);
                Ok(())
            }
            Self::Json(r) => r.render_version(version),
        }
    }

    pub fn render_synth(&self, synthesis: &Synthesis, written: Option<&Path>) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_synth(synthesis, written);
                Ok(())
            }
            Self::Json(r) => r.render_synth(synthesis, written),
        }
    }

    pub fn render_boot(&self, boot: &RenderedBoot, written: &[PathBuf]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_boot(boot, written);
                Ok(())
            }
            Self::Json(r) => r.render_boot(boot, written),
        }
    }

    pub fn render_outputs(&self, stack_name: &str, outputs: &StackOutputs) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_outputs(stack_name, outputs);
                Ok(())
            }
            Self::Json(r) => r.render_outputs(stack_name, outputs),
        }
    }

    pub fn render_destroyed(&self, stack_name: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_destroyed(stack_name);
                Ok(())
            }
            Self::Json(r) => r.render_destroyed(stack_name),
        }
    }

    pub fn render_config(&self, config: &StackConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config(config, path);
                Ok(())
            }
            Self::Json(r) => r.render_config(config, path),
        }
    }

    pub fn render_config_set(&self, key: &str, value: &str, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config_set(key, value);
                Ok(())
            }
            Self::Json(r) => r.render_config_set(key, value, path),
        }
    }

    pub fn render_context_cleared(&self, path: &Path, removed: bool) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_context_cleared(path, removed);
                Ok(())
            }
            Self::Json(r) => r.render_context_cleared(path, removed),
        }
    }
}
