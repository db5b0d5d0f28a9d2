//! Application service — configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::{EnvOverrides, StackConfig};

/// Load the file configuration.
pub fn load_config(store: &impl ConfigStore) -> Result<StackConfig> {
    store.load()
}

/// Save configuration.
pub fn save_config(store: &impl ConfigStore, config: &StackConfig) -> Result<()> {
    store.save(config)
}

/// File configuration with environment overrides applied, validated.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the merged configuration
/// fails validation.
pub fn effective_config(store: &impl ConfigStore, env: &EnvOverrides) -> Result<StackConfig> {
    let config = store.load()?.with_overrides(env);
    config.validate()?;
    Ok(config)
}

/// Validate and persist a single key. Environment overrides are not written.
///
/// # Errors
///
/// Returns an error if the key or value is invalid or the file cannot be
/// written.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<StackConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    tracing::info!(key, "configuration updated");
    Ok(config)
}
