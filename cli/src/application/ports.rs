//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared types crate,
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;
use n8n_stack_common::StackOutputs;

use crate::domain::{HostedZone, StackConfig, TemplateSet};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
}

// ── Cloud Provider Ports ──────────────────────────────────────────────────────

/// Resolves an existing hosted zone by name.
#[allow(async_fn_in_trait)]
pub trait ZoneLookup {
    /// Find the public hosted zone whose name is exactly `zone_name`.
    async fn lookup_zone(&self, zone_name: &str, region: &str) -> Result<HostedZone>;
}

/// A template submission.
#[derive(Debug)]
pub struct DeployRequest<'a> {
    pub stack_name: &'a str,
    pub region: &'a str,
    pub template_body: &'a str,
    pub tags: &'a BTreeMap<String, String>,
}

/// Creates, inspects, and deletes the deployed stack.
#[allow(async_fn_in_trait)]
pub trait StackDeployer {
    /// Create or update the stack and wait for completion.
    async fn deploy(&self, request: &DeployRequest<'_>) -> Result<()>;
    /// Outputs of the deployed stack.
    async fn describe_outputs(&self, stack_name: &str, region: &str) -> Result<StackOutputs>;
    /// Delete the stack and wait until it is gone.
    async fn delete(&self, stack_name: &str, region: &str) -> Result<()>;
}

/// Reports which account the active credentials belong to.
#[allow(async_fn_in_trait)]
pub trait IdentityProbe {
    async fn caller_account(&self, region: &str) -> Result<String>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config and Context Ports ──────────────────────────────────────────────────

/// Abstracts configuration file persistence.
pub trait ConfigStore {
    /// Load the file configuration, or defaults when no file exists.
    fn load(&self) -> Result<StackConfig>;
    /// Persist the given configuration.
    fn save(&self, config: &StackConfig) -> Result<()>;
    /// Path of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}

/// Cached lookup results keyed by `zone::lookup_key`.
pub type LookupContext = BTreeMap<String, HostedZone>;

/// Abstracts lookup cache persistence.
pub trait ContextStore {
    /// Load cached lookups; empty when nothing is cached.
    fn load(&self) -> Result<LookupContext>;
    fn save(&self, context: &LookupContext) -> Result<()>;
    /// Remove the cache. Returns `false` when there was nothing to remove.
    fn clear(&self) -> Result<bool>;
    fn path(&self) -> Result<PathBuf>;
}

// ── Template and Artifact Ports ───────────────────────────────────────────────

/// Supplies the raw provisioning templates.
pub trait TemplateSource {
    fn templates(&self) -> Result<TemplateSet>;
}

/// Writes generated files to a local directory.
pub trait ArtifactWriter {
    /// Write each `(file name, content)` pair under `dir`, creating it if
    /// needed, and return the written paths in order.
    fn write_files(&self, dir: &Path, files: &[(&str, &str)]) -> Result<Vec<PathBuf>>;
}
