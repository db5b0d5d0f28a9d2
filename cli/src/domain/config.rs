//! Domain types and validators for stack configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access. Loading from
//! disk and reading the environment happen in `crate::infra::config`.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::naming;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "stack.name",
    "stack.description",
    "env.account",
    "env.region",
    "domain.name",
    "domain.zone",
    "domain.zone_id",
    "certificate.email",
    "instance.type",
    "instance.key_name",
    "app.timezone",
    "app.image",
];

/// Keys whose value may be cleared with an empty string.
const OPTIONAL_KEYS: &[&str] = &["env.account", "domain.zone", "domain.zone_id"];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `n8n-stack.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StackConfig {
    pub stack: StackSection,
    pub env: EnvSection,
    pub domain: DomainSection,
    pub certificate: CertificateSection,
    pub instance: InstanceSection,
    pub app: AppSection,
}

/// Stack identity and stack-wide tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StackSection {
    pub name: String,
    pub description: String,
    pub tags: BTreeMap<String, String>,
}

/// Deployment target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnvSection {
    /// When set, deploys refuse to run against any other account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub region: String,
}

/// Public name of the application and the zone it is published in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DomainSection {
    pub name: String,
    /// Existing hosted zone. Defaults to the parent of `name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Hosted zone ID. Skips the zone lookup when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

/// ACME registration details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CertificateSection {
    pub email: String,
}

/// Compute settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstanceSection {
    #[serde(rename = "type")]
    pub instance_type: String,
    pub key_name: String,
}

/// Settings passed through to the n8n container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppSection {
    pub timezone: String,
    pub image: String,
}

impl Default for StackSection {
    fn default() -> Self {
        Self {
            name: "N8nStack".to_string(),
            description: "n8n workflow automation deployment on AWS EC2".to_string(),
            tags: BTreeMap::from([
                ("Environment".to_string(), "PoC".to_string()),
                ("ManagedBy".to_string(), "n8n-stack".to_string()),
                ("Project".to_string(), "n8n-aws".to_string()),
            ]),
        }
    }
}

impl Default for EnvSection {
    fn default() -> Self {
        Self {
            account: None,
            region: "us-east-1".to_string(),
        }
    }
}

impl Default for DomainSection {
    fn default() -> Self {
        Self {
            name: "n8n.aws.yyogestiono.com".to_string(),
            zone: None,
            zone_id: None,
        }
    }
}

impl Default for CertificateSection {
    fn default() -> Self {
        Self {
            email: "admin@yyogestiono.com".to_string(),
        }
    }
}

impl Default for InstanceSection {
    fn default() -> Self {
        Self {
            instance_type: "t3.nano".to_string(),
            key_name: "n8n-key".to_string(),
        }
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            timezone: "America/Mexico_City".to_string(),
            image: "n8nio/n8n:latest".to_string(),
        }
    }
}

/// Values read from the process environment, layered over the file config.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EnvOverrides {
    pub domain_name: Option<String>,
    pub hosted_zone_name: Option<String>,
    pub hosted_zone_id: Option<String>,
    pub aws_account_id: Option<String>,
    pub aws_region: Option<String>,
    pub certbot_email: Option<String>,
}

impl StackConfig {
    /// Apply environment overrides. Empty values are ignored.
    #[must_use]
    pub fn with_overrides(mut self, env: &EnvOverrides) -> Self {
        fn pick(v: Option<&String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty()).map(|s| s.trim().to_string())
        }
        if let Some(v) = pick(env.domain_name.as_ref()) {
            self.domain.name = v;
        }
        if let Some(v) = pick(env.hosted_zone_name.as_ref()) {
            self.domain.zone = Some(v);
        }
        if let Some(v) = pick(env.hosted_zone_id.as_ref()) {
            self.domain.zone_id = Some(v);
        }
        if let Some(v) = pick(env.aws_account_id.as_ref()) {
            self.env.account = Some(v);
        }
        if let Some(v) = pick(env.aws_region.as_ref()) {
            self.env.region = v;
        }
        if let Some(v) = pick(env.certbot_email.as_ref()) {
            self.certificate.email = v;
        }
        self
    }

    /// Normalized application domain.
    #[must_use]
    pub fn domain_name(&self) -> String {
        naming::normalize_domain(&self.domain.name)
    }

    /// Hosted zone to publish the record in: explicit, else the domain's parent.
    #[must_use]
    pub fn zone_name(&self) -> Option<String> {
        match &self.domain.zone {
            Some(zone) => Some(naming::normalize_domain(zone)),
            None => naming::parent_domain(&self.domain.name),
        }
    }

    /// Public URL of the application.
    #[must_use]
    pub fn app_url(&self) -> String {
        format!("https://{}", self.domain_name())
    }

    /// Set a single dotted key. The value is validated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        let optional = || (!value.is_empty()).then(|| value.to_string());
        match key {
            "stack.name" => self.stack.name = value.to_string(),
            "stack.description" => self.stack.description = value.to_string(),
            "env.account" => self.env.account = optional(),
            "env.region" => self.env.region = value.to_string(),
            "domain.name" => self.domain.name = naming::normalize_domain(value),
            "domain.zone" => self.domain.zone = optional().map(|z| naming::normalize_domain(&z)),
            "domain.zone_id" => self.domain.zone_id = optional(),
            "certificate.email" => self.certificate.email = value.to_string(),
            "instance.type" => self.instance.instance_type = value.to_string(),
            "instance.key_name" => self.instance.key_name = value.to_string(),
            "app.timezone" => self.app.timezone = value.to_string(),
            "app.image" => self.app.image = value.to_string(),
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }

    /// Validate every field, returning the first problem found.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, Option<&str>); 12] = [
            ("stack.name", Some(self.stack.name.as_str())),
            ("stack.description", Some(self.stack.description.as_str())),
            ("env.account", self.env.account.as_deref()),
            ("env.region", Some(self.env.region.as_str())),
            ("domain.name", Some(self.domain.name.as_str())),
            ("domain.zone", self.domain.zone.as_deref()),
            ("domain.zone_id", self.domain.zone_id.as_deref()),
            ("certificate.email", Some(self.certificate.email.as_str())),
            ("instance.type", Some(self.instance.instance_type.as_str())),
            ("instance.key_name", Some(self.instance.key_name.as_str())),
            ("app.timezone", Some(self.app.timezone.as_str())),
            ("app.image", Some(self.app.image.as_str())),
        ];
        // A present optional value must not be blank: only `set` clears
        // optional keys, by removing them.
        for (key, value) in checks.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))) {
            if let Err(reason) = non_blank(value) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason,
                }
                .into());
            }
            validate_config_value(key, value)?;
        }
        if self.zone_name().is_none() {
            return Err(ConfigError::InvalidValue {
                key: "domain.zone".to_string(),
                value: String::new(),
                reason: format!(
                    "cannot derive a hosted zone from '{}'; set domain.zone",
                    self.domain.name
                ),
            }
            .into());
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    if value.is_empty() && OPTIONAL_KEYS.contains(&key) {
        return Ok(());
    }
    let checked = match key {
        "stack.name" => naming::validate_stack_name(value),
        "env.account" => naming::validate_account(value),
        "env.region" => naming::validate_region(value),
        "domain.name" | "domain.zone" => naming::validate_domain_name(value),
        "domain.zone_id" => non_blank(value),
        "certificate.email" => naming::validate_email(value),
        "instance.type" => naming::validate_instance_type(value),
        "instance.key_name" => naming::validate_key_name(value),
        "stack.description" | "app.timezone" | "app.image" => non_blank(value),
        _ => Ok(()),
    };
    checked.map_err(|reason| {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        }
        .into()
    })
}

fn non_blank(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err("value must not be empty".to_string())
    } else {
        Ok(())
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
