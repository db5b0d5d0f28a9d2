//! Application service — hosted zone resolution.
//!
//! Resolution order: an explicit `domain.zone_id`, then the lookup cache,
//! then a live lookup whose result is written back to the cache.

use anyhow::Result;

use crate::application::ports::{ContextStore, ZoneLookup};
use crate::domain::config::StackConfig;
use crate::domain::error::{ConfigError, SynthError};
use crate::domain::zone::{self, HostedZone};

/// Where a resolved zone came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSource {
    Configured,
    Cached,
    Looked,
}

impl ZoneSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configured => "configured",
            Self::Cached => "cached",
            Self::Looked => "lookup",
        }
    }
}

/// Resolve the hosted zone the DNS record is published in.
///
/// # Errors
///
/// Returns `SynthError::ZoneLookup` when the live lookup fails, or a
/// `ConfigError` when no zone name can be derived.
pub async fn resolve_zone(
    config: &StackConfig,
    lookup: &impl ZoneLookup,
    cache: &impl ContextStore,
) -> Result<(HostedZone, ZoneSource)> {
    let zone_name = config.zone_name().ok_or_else(|| ConfigError::InvalidValue {
        key: "domain.zone".to_string(),
        value: String::new(),
        reason: format!("cannot derive a hosted zone from '{}'", config.domain.name),
    })?;

    if let Some(id) = config.domain.zone_id.as_deref() {
        tracing::debug!(zone = %zone_name, id, "using configured hosted zone id");
        return Ok((HostedZone::new(id, &zone_name), ZoneSource::Configured));
    }

    let key = zone::lookup_key(&zone_name, config.env.account.as_deref(), &config.env.region);
    let mut context = cache.load()?;
    if let Some(hit) = context.get(&key) {
        tracing::debug!(%key, id = %hit.id, "hosted zone served from context cache");
        return Ok((hit.clone(), ZoneSource::Cached));
    }

    tracing::info!(zone = %zone_name, region = %config.env.region, "looking up hosted zone");
    let found = lookup
        .lookup_zone(&zone_name, &config.env.region)
        .await
        .map_err(|e| SynthError::ZoneLookup {
            zone: zone_name.clone(),
            reason: format!("{e:#}"),
        })?;

    context.insert(key, found.clone());
    cache.save(&context)?;
    Ok((found, ZoneSource::Looked))
}
