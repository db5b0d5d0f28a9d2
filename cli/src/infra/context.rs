//! Lookup context cache persisted as JSON next to the config file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{ContextStore, LookupContext};

pub const CONTEXT_FILE: &str = "n8n-stack.context.json";

/// JSON-file implementation of `ContextStore`.
#[derive(Debug, Clone)]
pub struct JsonContextStore {
    path: PathBuf,
}

impl JsonContextStore {
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache stored in the same directory as `config_path`.
    #[must_use]
    pub fn beside(config_path: &Path) -> Self {
        Self::at(config_path.with_file_name(CONTEXT_FILE))
    }
}

impl ContextStore for JsonContextStore {
    fn load(&self) -> Result<LookupContext> {
        if !self.path.exists() {
            return Ok(LookupContext::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }

    fn save(&self, context: &LookupContext) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let mut content =
            serde_json::to_string_pretty(context).context("cannot serialize context")?;
        content.push('\n');
        std::fs::write(&self.path, content)
            .with_context(|| format!("cannot write {}", self.path.display()))
    }

    fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("cannot remove {}", self.path.display())),
        }
    }

    fn path(&self) -> Result<PathBuf> {
        Ok(self.path.clone())
    }
}
