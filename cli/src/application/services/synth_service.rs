//! Application service — template synthesis.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::application::ports::{ContextStore, TemplateSource, ZoneLookup};
use crate::application::services::zone_service::{self, ZoneSource};
use crate::domain::config::StackConfig;
use crate::domain::stack::{self, SynthesizedStack};

/// A synthesized stack plus how its zone was resolved.
#[derive(Debug)]
pub struct Synthesis {
    pub stack: SynthesizedStack,
    pub zone_source: ZoneSource,
    /// Serialized template.
    pub body: String,
    /// Hex SHA-256 of `body`.
    pub digest: String,
}

/// Validate `config`, resolve the hosted zone, and assemble the template.
///
/// # Errors
///
/// Returns an error if validation, zone resolution, template loading, or
/// assembly fails.
pub async fn synthesize(
    config: &StackConfig,
    lookup: &impl ZoneLookup,
    cache: &impl ContextStore,
    source: &impl TemplateSource,
) -> Result<Synthesis> {
    config.validate()?;
    let (zone, zone_source) = zone_service::resolve_zone(config, lookup, cache).await?;
    let templates = source.templates().context("loading provisioning templates")?;
    let stack = stack::assemble(config, &zone, &templates)?;
    let body = stack
        .template_body()
        .context("serializing stack template")?;
    let digest = sha256_hex(body.as_bytes());
    tracing::debug!(stack = %stack.stack_name, %digest, "template synthesized");
    Ok(Synthesis {
        stack,
        zone_source,
        body,
        digest,
    })
}

/// Hex-encoded SHA-256 of `data`.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    use std::fmt::Write as _;
    Sha256::digest(data)
        .iter()
        .fold(String::with_capacity(64), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}
